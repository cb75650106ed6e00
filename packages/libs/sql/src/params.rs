//! 요청 파라미터
//!
//! `/query`, `/command` 요청 본문(JSON 객체)을 템플릿 필드 값으로 파싱합니다.
//! 값의 형태(스칼라/리스트)는 역직렬화 시점에 한 번만 결정됩니다.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// 바인딩 가능한 스칼라 값
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
}

impl TryFrom<Value> for Scalar {
    type Error = FieldValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Scalar::Null),
            Value::Bool(b) => Ok(Scalar::Bool(b)),
            Value::Number(n) => Ok(Scalar::Number(n)),
            Value::String(s) => Ok(Scalar::Text(s)),
            Value::Array(_) => Err(FieldValueError::NestedList),
            Value::Object(_) => Err(FieldValueError::Object),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(b),
            Scalar::Number(n) => Value::Number(n),
            Scalar::Text(s) => Value::String(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Number(v.into())
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_string())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
            Scalar::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// 템플릿 필드 값
///
/// 리스트는 `IN (...)` 확장에 사용됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum FieldValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl FieldValue {
    /// null이 아닌 값인지
    pub fn is_present(&self) -> bool {
        !matches!(self, FieldValue::Scalar(Scalar::Null))
    }
}

impl TryFrom<Value> for FieldValue {
    type Error = FieldValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(Scalar::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List),
            other => Scalar::try_from(other).map(FieldValue::Scalar),
        }
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Scalar(s) => s.into(),
            FieldValue::List(items) => Value::Array(items.into_iter().map(Value::from).collect()),
        }
    }
}

impl From<Scalar> for FieldValue {
    fn from(v: Scalar) -> Self {
        FieldValue::Scalar(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Scalar(v.into())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Scalar(v.into())
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Scalar(v.into())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Scalar(v.into())
    }
}

/// 필드 값 파싱 에러
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldValueError {
    #[error("object values are not supported as sql parameters")]
    Object,

    #[error("nested lists are not supported as sql parameters")]
    NestedList,
}

/// 요청 필드 맵
///
/// 키가 없거나 값이 null이면 "없는" 필드로 취급합니다.
///
/// # 예시
///
/// ```json
/// { "id": 1 }                 // id = ?
/// { "ids": [1, 2, 3] }        // id IN (?,?,?)
/// { "name": null }            // {#name}...{/name} 블록 제거
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestFields(pub HashMap<String, FieldValue>);

impl RequestFields {
    /// 빈 필드 맵
    pub fn empty() -> Self {
        Self(HashMap::new())
    }

    /// 필드 추가
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// 리스트 필드 추가
    pub fn with_list<I, T>(mut self, name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Scalar>,
    {
        let items = items.into_iter().map(Into::into).collect();
        self.0.insert(name.into(), FieldValue::List(items));
        self
    }

    /// 존재하는(null이 아닌) 필드 값
    pub fn get_present(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name).filter(|v| v.is_present())
    }

    pub fn is_present(&self, name: &str) -> bool {
        self.get_present(name).is_some()
    }

    /// 요청 본문 파싱 (빈 본문 = 필드 없음)
    pub fn from_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }
        serde_json::from_slice(body)
    }
}
