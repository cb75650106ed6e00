//! 설정 YAML 파싱 및 검증된 설정 모델
//!
//! # 개요
//!
//! Gateway 설정은 하나의 YAML 파일(`config.yaml`)로 정의됩니다.
//! 이 모듈은 YAML을 Raw 구조체로 역직렬화한 뒤, 상속/기본값/검증을 거쳐
//! 불변 설정 모델(`GatewayConfig`)로 변환합니다.
//!
//! # 모듈 구조
//!
//! - `model`: 검증된 설정 모델 (Registry/Gateway가 사용하는 최종 형태)
//! - `parser`: YAML 파싱 로직

mod model;
mod parser;

pub use model::{
    Account, ApiConfig, DatabaseConfig, Engine, GatewayConfig, GroupConfig, LogConfig,
    ServerConfig, DEFAULT_LOG_SIZE_MB,
};
pub use parser::ConfigParser;
