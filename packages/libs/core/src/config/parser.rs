//! 설정 YAML 파서
//!
//! `config.yaml`을 파싱하여 `GatewayConfig`로 변환합니다.

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use super::model::{
    Account, ApiConfig, DatabaseConfig, Engine, GatewayConfig, GroupConfig, LogConfig,
    ServerConfig, DEFAULT_LOG_SIZE_MB,
};
use crate::casing::KeyCase;
use crate::error::{Error, Result};

const DEFAULT_ADDR: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// 설정 파서
pub struct ConfigParser;

impl ConfigParser {
    /// 파일에서 로드
    pub fn load_file(path: impl AsRef<Path>) -> Result<GatewayConfig> {
        let yaml = std::fs::read_to_string(path)?;
        Self::parse_yaml(&yaml)
    }

    /// YAML 문자열 파싱
    pub fn parse_yaml(yaml: &str) -> Result<GatewayConfig> {
        let raw: RawConfig = serde_yaml::from_str(yaml)?;
        Self::convert_raw_config(raw)
    }

    fn convert_raw_config(raw: RawConfig) -> Result<GatewayConfig> {
        let server = Self::convert_raw_server(raw.server.unwrap_or_default())?;
        let log = raw
            .log
            .map(|l| LogConfig {
                path: l.path.filter(|p| !p.trim().is_empty()),
                level: l.level.filter(|v| !v.trim().is_empty()),
                max_size_mb: l.size.filter(|&v| v > 0).unwrap_or(DEFAULT_LOG_SIZE_MB),
                max_age_days: l.age.filter(|&v| v > 0),
                max_backups: l.backups.filter(|&v| v > 0),
            })
            .unwrap_or_default();

        let mut db_names = HashSet::new();
        let mut databases = Vec::new();
        for raw_db in raw.dbs {
            let db = Self::convert_raw_db(raw_db, server.debug)?;
            if !db_names.insert(db.name.clone()) {
                return Err(Error::DuplicateDatabase { name: db.name });
            }
            databases.push(db);
        }

        Ok(GatewayConfig {
            server,
            log,
            databases,
        })
    }

    fn convert_raw_server(raw: RawServer) -> Result<ServerConfig> {
        if raw.tls {
            return Err(Error::ConfigValidation {
                message: "tls is not supported by the gateway listener; terminate TLS in front of it"
                    .to_string(),
            });
        }

        let accounts = raw
            .accounts
            .into_iter()
            .map(|a| Account {
                username: a.username,
                password: a.password,
            })
            .collect::<Vec<_>>();

        if raw.auth && accounts.is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.auth is enabled but no accounts are configured".to_string(),
            });
        }

        let timeout_secs = raw.query_timeout.unwrap_or(DEFAULT_QUERY_TIMEOUT_SECS);

        Ok(ServerConfig {
            addr: raw
                .addr
                .filter(|a| !a.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            port: raw.port.unwrap_or(DEFAULT_PORT),
            auth: raw.auth,
            accounts,
            debug: raw.debug,
            query_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        })
    }

    fn convert_raw_db(raw: RawDatabase, server_debug: bool) -> Result<DatabaseConfig> {
        let name = Self::require_name(raw.name, "dbs[].name")?;
        let type_name = raw.r#type.ok_or_else(|| Error::ConfigValidation {
            message: format!("database '{}' is missing 'type'", name),
        })?;
        let engine = Engine::from_type(&type_name)?;

        let dsn = raw.dsn.unwrap_or_default();
        if dsn.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: format!("database '{}' is missing 'dsn'", name),
            });
        }

        let max_connections = raw.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS);
        if max_connections == 0 {
            return Err(Error::ConfigValidation {
                message: format!("database '{}' must allow at least one connection", name),
            });
        }

        let db_case = KeyCase::from_format(raw.format.as_deref().unwrap_or_default())?;

        let mut group_names = HashSet::new();
        let mut groups = Vec::new();
        for raw_group in raw.groups {
            let group = Self::convert_raw_group(&name, raw_group, db_case, server_debug)?;
            if !group_names.insert(group.name.clone()) {
                return Err(Error::ConfigValidation {
                    message: format!("duplicate group '{}' in database '{}'", group.name, name),
                });
            }
            groups.push(group);
        }

        Ok(DatabaseConfig {
            name,
            engine,
            dsn,
            max_connections,
            groups,
        })
    }

    fn convert_raw_group(
        db: &str,
        raw: RawGroup,
        db_case: KeyCase,
        server_debug: bool,
    ) -> Result<GroupConfig> {
        let name = Self::require_name(raw.name, "groups[].name")?;
        let group_case = match raw.format.as_deref() {
            Some(format) if !format.trim().is_empty() => KeyCase::from_format(format)?,
            _ => db_case,
        };

        let mut api_names = HashSet::new();
        let mut apis = Vec::new();
        for raw_api in raw.apis {
            let api = Self::convert_raw_api(raw_api, group_case, server_debug)?;
            if !api_names.insert(api.name.clone()) {
                return Err(Error::DuplicateApi {
                    route: format!("{}/{}/{}", db, name, api.name),
                });
            }
            apis.push(api);
        }

        Ok(GroupConfig { name, apis })
    }

    /// format 상속: api → group → db
    fn convert_raw_api(raw: RawApi, group_case: KeyCase, server_debug: bool) -> Result<ApiConfig> {
        let name = Self::require_name(raw.name, "apis[].name")?;
        let sql = raw.sql.unwrap_or_default();
        if sql.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: format!("api '{}' has an empty sql template", name),
            });
        }

        let case = match raw.format.as_deref() {
            Some(format) if !format.trim().is_empty() => KeyCase::from_format(format)?,
            _ => group_case,
        };

        Ok(ApiConfig {
            name,
            sql,
            case,
            debug: raw.debug || server_debug,
        })
    }

    fn require_name(name: Option<String>, field: &str) -> Result<String> {
        match name {
            Some(n) if !n.trim().is_empty() => Ok(n.trim().to_string()),
            _ => Err(Error::ConfigValidation {
                message: format!("'{}' must not be empty", field),
            }),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Raw YAML 구조체 (serde 역직렬화용)
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawConfig {
    #[serde(default)]
    server: Option<RawServer>,
    #[serde(default)]
    log: Option<RawLog>,
    #[serde(default)]
    dbs: Vec<RawDatabase>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawServer {
    addr: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    auth: bool,
    #[serde(default)]
    accounts: Vec<RawAccount>,
    #[serde(default)]
    tls: bool,
    #[serde(default)]
    debug: bool,
    query_timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawLog {
    path: Option<String>,
    level: Option<String>,
    size: Option<u64>,
    age: Option<u64>,
    backups: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawDatabase {
    name: Option<String>,
    r#type: Option<String>,
    dsn: Option<String>,
    format: Option<String>,
    max_connections: Option<u32>,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawGroup {
    name: Option<String>,
    format: Option<String>,
    #[serde(default)]
    apis: Vec<RawApi>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct RawApi {
    name: Option<String>,
    sql: Option<String>,
    format: Option<String>,
    #[serde(default)]
    debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
server:
  addr: 127.0.0.1
  port: 9000
  query-timeout: 5
log:
  path: ./logs
  size: 10
  backups: 3
dbs:
  - name: main
    type: mysql
    dsn: mysql://root:pw@localhost/app
    format: underscore
    groups:
      - name: user
        format: lowerCamel
        apis:
          - name: list
            sql: SELECT * FROM users WHERE id IN {ids}
          - name: detail
            format: upperCamel
            debug: true
            sql: SELECT * FROM users WHERE id = {id}
      - name: order
        apis:
          - name: list
            sql: SELECT * FROM orders
"#;

    #[test]
    fn test_parse_config() {
        let config = ConfigParser::parse_yaml(SAMPLE).unwrap();
        assert_eq!(config.server.bind_addr(), "127.0.0.1:9000");
        assert_eq!(config.server.query_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.log.path.as_deref(), Some("./logs"));
        assert_eq!(config.log.max_size_mb, 10);
        assert_eq!(config.log.max_age_days, None);
        assert_eq!(config.log.max_backups, Some(3));

        let db = config.database("main").unwrap();
        assert_eq!(db.engine, Engine::MySql);
        assert_eq!(db.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(db.groups.len(), 2);
    }

    #[test]
    fn test_format_inheritance() {
        let config = ConfigParser::parse_yaml(SAMPLE).unwrap();
        let db = config.database("main").unwrap();

        let user = &db.groups[0];
        assert_eq!(user.apis[0].case, KeyCase::LowerCamel);
        assert_eq!(user.apis[1].case, KeyCase::UpperCamel);
        assert!(!user.apis[0].debug);
        assert!(user.apis[1].debug);

        let order = &db.groups[1];
        assert_eq!(order.apis[0].case, KeyCase::Underscore);
    }

    #[test]
    fn test_defaults() {
        let config = ConfigParser::parse_yaml("dbs: []").unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8080");
        assert_eq!(
            config.server.query_timeout,
            Some(Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS))
        );
        assert!(config.databases.is_empty());
        assert_eq!(config.log, LogConfig::default());
        assert_eq!(config.log.max_size_mb, DEFAULT_LOG_SIZE_MB);

        let config =
            ConfigParser::parse_yaml("log: { path: ./logs, size: 0, age: 7, backups: 0 }").unwrap();
        assert_eq!(config.log.max_size_mb, DEFAULT_LOG_SIZE_MB);
        assert_eq!(config.log.max_age_days, Some(7));
        assert_eq!(config.log.max_backups, None);

        let config = ConfigParser::parse_yaml("server: { query-timeout: 0 }").unwrap();
        assert_eq!(config.server.query_timeout, None);
    }

    #[test]
    fn test_server_debug_applies_to_all_apis() {
        let yaml = r#"
server: { debug: true }
dbs:
  - name: main
    type: sqlite
    dsn: "sqlite::memory:"
    groups:
      - name: g
        apis:
          - { name: a, sql: "SELECT 1" }
"#;
        let config = ConfigParser::parse_yaml(yaml).unwrap();
        assert!(config.databases[0].groups[0].apis[0].debug);
    }

    #[test]
    fn test_duplicate_api_rejected() {
        let yaml = r#"
dbs:
  - name: main
    type: sqlite
    dsn: "sqlite::memory:"
    groups:
      - name: g
        apis:
          - { name: a, sql: "SELECT 1" }
          - { name: a, sql: "SELECT 2" }
"#;
        let err = ConfigParser::parse_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::DuplicateApi { ref route } if route == "main/g/a"));
    }

    #[test]
    fn test_duplicate_database_rejected() {
        let yaml = r#"
dbs:
  - { name: main, type: sqlite, dsn: "sqlite::memory:" }
  - { name: main, type: mysql, dsn: "mysql://localhost/x" }
"#;
        assert!(matches!(
            ConfigParser::parse_yaml(yaml),
            Err(Error::DuplicateDatabase { .. })
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let unknown_engine = "dbs: [{ name: x, type: clickhouse, dsn: tcp://localhost }]";
        assert!(matches!(
            ConfigParser::parse_yaml(unknown_engine),
            Err(Error::UnsupportedEngine { .. })
        ));

        let unknown_format = "dbs: [{ name: x, type: mysql, dsn: mysql://h/x, format: snake }]";
        assert!(matches!(
            ConfigParser::parse_yaml(unknown_format),
            Err(Error::UnknownFormat { .. })
        ));

        let tls = "server: { tls: true, cert-file: a.pem, key-file: a.key }";
        assert!(matches!(
            ConfigParser::parse_yaml(tls),
            Err(Error::ConfigValidation { .. })
        ));

        let auth = "server: { auth: true }";
        assert!(matches!(
            ConfigParser::parse_yaml(auth),
            Err(Error::ConfigValidation { .. })
        ));

        let missing_dsn = "dbs: [{ name: x, type: mysql }]";
        assert!(matches!(
            ConfigParser::parse_yaml(missing_dsn),
            Err(Error::ConfigValidation { .. })
        ));
    }
}
