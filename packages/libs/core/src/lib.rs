//! sgt-core: SQL Gateway 공통 핵심 라이브러리
//!
//! 이 크레이트는 템플릿 엔진(`sgt-sql`)과 Gateway 서비스가 공유하는 타입을 제공합니다.
//!
//! # 모듈 구조
//!
//! - `config`: 설정 YAML 파싱 및 검증된 설정 모델
//! - `casing`: 결과 컬럼 이름 변환 정책
//! - `error`: 공통 에러 타입

pub mod casing;
pub mod config;
pub mod error;

pub use casing::KeyCase;
pub use config::{ConfigParser, GatewayConfig};
pub use error::{Error, Result};
