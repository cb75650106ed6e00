//! 결과 컬럼 이름 변환 정책
//!
//! 설정의 `format` 값(`lowerCamel`, `upperCamel`, `underscore`)에 대응합니다.
//! 모든 변환은 컬럼 이름과 정책만으로 결정되는 순수 함수입니다.

use crate::error::{Error, Result};

/// 컬럼 이름 변환 정책
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum KeyCase {
    /// 변환 없음
    #[default]
    None,
    /// `user_name` → `userName`
    LowerCamel,
    /// `user_name` → `UserName`
    UpperCamel,
    /// `userName` → `user_name`
    Underscore,
}

impl KeyCase {
    /// 설정 문자열에서 파싱
    ///
    /// 빈 문자열과 `none`은 변환 없음으로 취급합니다.
    pub fn from_format(format: &str) -> Result<Self> {
        match format.trim() {
            "" | "none" => Ok(KeyCase::None),
            "lowerCamel" => Ok(KeyCase::LowerCamel),
            "upperCamel" => Ok(KeyCase::UpperCamel),
            "underscore" => Ok(KeyCase::Underscore),
            other => Err(Error::UnknownFormat {
                format: other.to_string(),
            }),
        }
    }

    /// 컬럼 이름에 정책 적용
    pub fn apply(&self, name: &str) -> String {
        match self {
            KeyCase::None => name.to_string(),
            KeyCase::LowerCamel => to_camel_case(name, false),
            KeyCase::UpperCamel => to_camel_case(name, true),
            KeyCase::Underscore => to_underscore(name),
        }
    }
}

/// 밑줄 구분 이름을 카멜 케이스로 변환
///
/// 각 단어의 첫 글자만 대문자로 바꾸고 나머지는 그대로 둡니다.
pub fn to_camel_case(name: &str, upper_first: bool) -> String {
    let mut out = String::with_capacity(name.len());
    for word in name.split(|c| c == '_' || c == ' ') {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }

    if upper_first {
        return out;
    }

    let mut chars = out.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => out,
    }
}

/// 카멜 케이스 이름을 밑줄 구분 소문자로 변환
pub fn to_underscore(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_format() {
        assert_eq!(KeyCase::from_format("lowerCamel").unwrap(), KeyCase::LowerCamel);
        assert_eq!(KeyCase::from_format("upperCamel").unwrap(), KeyCase::UpperCamel);
        assert_eq!(KeyCase::from_format("underscore").unwrap(), KeyCase::Underscore);
        assert_eq!(KeyCase::from_format("").unwrap(), KeyCase::None);
        assert!(KeyCase::from_format("kebab").is_err());
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(to_camel_case("user_name", false), "userName");
        assert_eq!(to_camel_case("user_name", true), "UserName");
        assert_eq!(to_camel_case("created_at_utc", false), "createdAtUtc");
        assert_eq!(to_camel_case("id", true), "Id");
        assert_eq!(to_camel_case("already_camelCase", false), "alreadyCamelCase");
        assert_eq!(to_camel_case("", false), "");
    }

    #[test]
    fn test_underscore() {
        assert_eq!(to_underscore("userName"), "user_name");
        assert_eq!(to_underscore("UserName"), "user_name");
        assert_eq!(to_underscore("createdAtUTC"), "created_at_u_t_c");
        assert_eq!(to_underscore("plain"), "plain");
    }

    #[test]
    fn test_identity_is_idempotent() {
        for name in ["user_name", "UserName", "id", "MiXeD_case"] {
            let once = KeyCase::None.apply(name);
            assert_eq!(once, name);
            assert_eq!(KeyCase::None.apply(&once), once);
        }
    }

    #[test]
    fn test_apply_is_pure() {
        let case = KeyCase::LowerCamel;
        assert_eq!(case.apply("order_id"), case.apply("order_id"));
        assert_eq!(KeyCase::Underscore.apply("orderId"), "order_id");
    }
}
