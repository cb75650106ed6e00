//! 공통 에러 타입
//!
//! 설정 로드 단계에서 발생하는 에러를 정의합니다.
//! 요청 처리 중의 에러는 Gateway 쪽 에러 타입이 담당합니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// SQL Gateway 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Config Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("config parse error: {message}")]
    ConfigParse { message: String },

    #[error("config validation error: {message}")]
    ConfigValidation { message: String },

    #[error("duplicate database name: {name}")]
    DuplicateDatabase { name: String },

    #[error("duplicate api: {route}")]
    DuplicateApi { route: String },

    #[error("unsupported database type: {type_name}")]
    UnsupportedEngine { type_name: String },

    #[error("unknown format '{format}' (expected lowerCamel, upperCamel or underscore)")]
    UnknownFormat { format: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Template Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid sql template for api '{route}': {reason}")]
    InvalidTemplate { route: String, reason: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // IO/Serialization Errors
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// 에러 코드 (로그/클라이언트용)
    pub fn code(&self) -> &'static str {
        match self {
            Error::ConfigParse { .. } => "CONFIG_PARSE_ERROR",
            Error::ConfigValidation { .. } => "CONFIG_VALIDATION_ERROR",
            Error::DuplicateDatabase { .. } => "DUPLICATE_DATABASE",
            Error::DuplicateApi { .. } => "DUPLICATE_API",
            Error::UnsupportedEngine { .. } => "UNSUPPORTED_ENGINE",
            Error::UnknownFormat { .. } => "UNKNOWN_FORMAT",
            Error::InvalidTemplate { .. } => "INVALID_TEMPLATE",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Io(_) => "IO_ERROR",
        }
    }
}
