//! 검증된 설정 모델
//!
//! 파서가 만든 뒤에는 변경되지 않습니다.

use std::time::Duration;

use crate::casing::KeyCase;
use crate::error::{Error, Result};

/// Gateway 전체 설정
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub databases: Vec<DatabaseConfig>,
}

impl GatewayConfig {
    /// 이름으로 데이터베이스 설정 조회
    pub fn database(&self, name: &str) -> Option<&DatabaseConfig> {
        self.databases.iter().find(|db| db.name == name)
    }
}

/// HTTP 서버 설정
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub addr: String,
    pub port: u16,

    /// Basic 인증 사용 여부
    pub auth: bool,
    pub accounts: Vec<Account>,

    /// 시작 시 라우트 목록 출력 + 모든 API 응답에 SQL/args 포함
    pub debug: bool,

    /// 쿼리 타임아웃 (None = 무제한)
    pub query_timeout: Option<Duration>,
}

impl ServerConfig {
    /// 바인드 주소 (`addr:port`)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

/// Basic 인증 계정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub password: String,
}

/// 로그 파일 회전 기준 크기 기본값 (MB)
pub const DEFAULT_LOG_SIZE_MB: u64 = 100;

/// 로그 설정
#[derive(Debug, Clone, PartialEq)]
pub struct LogConfig {
    /// 로그 파일 디렉토리 (`<path>/runtime.log`)
    pub path: Option<String>,

    /// 기본 로그 필터 (RUST_LOG가 없을 때)
    pub level: Option<String>,

    /// 이 크기를 넘으면 `runtime-<시각>.log`로 회전
    pub max_size_mb: u64,

    /// 회전된 파일 보관 기간 (None = 무제한)
    pub max_age_days: Option<u64>,

    /// 회전된 파일 보관 개수 (None = 무제한)
    pub max_backups: Option<usize>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            level: None,
            max_size_mb: DEFAULT_LOG_SIZE_MB,
            max_age_days: None,
            max_backups: None,
        }
    }
}

/// 논리 데이터베이스 설정
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub name: String,
    pub engine: Engine,
    pub dsn: String,
    pub max_connections: u32,
    pub groups: Vec<GroupConfig>,
}

/// API 그룹
#[derive(Debug, Clone, PartialEq)]
pub struct GroupConfig {
    pub name: String,
    pub apis: Vec<ApiConfig>,
}

/// 단일 API (SQL 템플릿)
///
/// `case`와 `debug`는 상위 레벨 값이 이미 반영된 상태입니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub name: String,
    pub sql: String,
    pub case: KeyCase,
    pub debug: bool,
}

/// 지원하는 데이터베이스 엔진
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
    Postgres,
    MySql,
    Sqlite,
}

impl Engine {
    /// 설정의 `type` 값에서 파싱
    pub fn from_type(type_name: &str) -> Result<Self> {
        match type_name.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pgx" => Ok(Engine::Postgres),
            "mysql" => Ok(Engine::MySql),
            "sqlite" | "sqlite3" => Ok(Engine::Sqlite),
            _ => Err(Error::UnsupportedEngine {
                type_name: type_name.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Engine::Postgres => "postgres",
            Engine::MySql => "mysql",
            Engine::Sqlite => "sqlite",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_from_type() {
        assert_eq!(Engine::from_type("pgx").unwrap(), Engine::Postgres);
        assert_eq!(Engine::from_type("MySQL").unwrap(), Engine::MySql);
        assert_eq!(Engine::from_type("sqlite3").unwrap(), Engine::Sqlite);
        assert!(matches!(
            Engine::from_type("sqlserver"),
            Err(Error::UnsupportedEngine { .. })
        ));
    }
}
