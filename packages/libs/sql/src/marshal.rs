//! 결과 행 마샬러
//!
//! 드라이버 커서에서 읽은 행을 JSON 객체로 변환합니다.
//! 컬럼 이름은 한 번만 읽고 `KeyCase` 정책으로 한 번만 변환합니다.
//!
//! 커서는 `RowCursor` 트레이트로 추상화되어 있어, 실제 드라이버 바인딩은
//! Gateway 쪽에 있고 이 모듈은 타입 검사 없이 `Cell`만 다룹니다.

use async_trait::async_trait;
use serde_json::{Map, Number, Value};
use sgt_core::KeyCase;
use tokio_util::sync::CancellationToken;

/// 결과 행 (변환된 컬럼 이름 → 값)
pub type ResultRow = Map<String, Value>;

/// 드라이버가 채우는 결과 셀
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// 바이트 값 (UTF-8 텍스트로 변환됨)
    Bytes(Vec<u8>),
}

impl Cell {
    /// f64 셀 (NaN/무한대는 null)
    pub fn float(v: f64) -> Self {
        Number::from_f64(v).map(Cell::Number).unwrap_or(Cell::Null)
    }

    /// JSON 값으로 변환
    pub fn into_json(self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Bool(b) => Value::Bool(b),
            Cell::Number(n) => Value::Number(n),
            Cell::Text(s) => Value::String(s),
            Cell::Bytes(bytes) => Value::String(match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
            }),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v.into())
    }
}

impl From<u64> for Cell {
    fn from(v: u64) -> Self {
        Cell::Number(v.into())
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<Vec<u8>> for Cell {
    fn from(v: Vec<u8>) -> Self {
        Cell::Bytes(v)
    }
}

/// 결과 커서
///
/// 커서는 drop 시 드라이버 자원을 반환해야 합니다.
#[async_trait]
pub trait RowCursor: Send {
    type Error: std::error::Error + Send + Sync + 'static;

    /// 결과 컬럼 이름 (순서대로)
    async fn columns(&mut self) -> Result<Vec<String>, Self::Error>;

    /// 다음 행. 끝이면 `None`
    async fn next_row(&mut self) -> Result<Option<Vec<Cell>>, Self::Error>;
}

/// 마샬링 에러
#[derive(Debug, thiserror::Error)]
pub enum MarshalError<E: std::error::Error + 'static> {
    #[error("query cancelled")]
    Cancelled,

    #[error("row has {actual} values but {expected} columns were reported")]
    ColumnMismatch { expected: usize, actual: usize },

    #[error("{0}")]
    Store(#[source] E),
}

/// 행 마샬러
///
/// `next`는 한 행씩 지연 변환하고, `collect`는 전부 성공했을 때만 결과를 반환합니다.
/// 에러나 취소 이후에는 더 이상 행을 내지 않습니다.
pub struct RowMarshaler<C> {
    cursor: C,
    case: KeyCase,
    cancel: CancellationToken,
    columns: Option<Vec<String>>,
    done: bool,
}

impl<C: RowCursor> RowMarshaler<C> {
    pub fn new(cursor: C, case: KeyCase, cancel: CancellationToken) -> Self {
        Self {
            cursor,
            case,
            cancel,
            columns: None,
            done: false,
        }
    }

    /// 다음 행 변환
    pub async fn next(&mut self) -> Result<Option<ResultRow>, MarshalError<C::Error>> {
        if self.done {
            return Ok(None);
        }

        let result = self.read_row().await;
        if !matches!(result, Ok(Some(_))) {
            self.done = true;
        }
        result
    }

    /// 전체 행 수집 (all-or-nothing)
    pub async fn collect(mut self) -> Result<Vec<ResultRow>, MarshalError<C::Error>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    async fn read_row(&mut self) -> Result<Option<ResultRow>, MarshalError<C::Error>> {
        if self.cancel.is_cancelled() {
            return Err(MarshalError::Cancelled);
        }

        if self.columns.is_none() {
            let columns = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(MarshalError::Cancelled),
                columns = self.cursor.columns() => columns.map_err(MarshalError::Store)?,
            };
            let case = self.case;
            self.columns = Some(columns.iter().map(|c| case.apply(c)).collect());
        }

        let cells = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(MarshalError::Cancelled),
            row = self.cursor.next_row() => row.map_err(MarshalError::Store)?,
        };
        let Some(cells) = cells else {
            return Ok(None);
        };

        let columns = self.columns.as_deref().unwrap_or_default();
        if cells.len() != columns.len() {
            return Err(MarshalError::ColumnMismatch {
                expected: columns.len(),
                actual: cells.len(),
            });
        }

        let mut row = ResultRow::with_capacity(columns.len());
        for (name, cell) in columns.iter().zip(cells) {
            row.insert(name.clone(), cell.into_json());
        }
        Ok(Some(row))
    }
}
