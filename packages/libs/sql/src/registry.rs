//! API 레지스트리
//!
//! 설정의 모든 API를 `(db, group, api)` 경로로 조회할 수 있게 만듭니다.
//! 템플릿 검증과 파라미터 추출은 로드 시점에 한 번만 수행합니다.

use std::collections::BTreeMap;
use std::sync::Arc;

use sgt_core::config::{Engine, GatewayConfig};
use sgt_core::{Error, KeyCase, Result};

use crate::dialect::PlaceholderStyle;
use crate::template::{extract_params, validate_template};

/// 컴파일 준비가 끝난 API
#[derive(Debug, Clone, PartialEq)]
pub struct ApiDescriptor {
    pub db: String,
    pub group: String,
    pub name: String,
    pub engine: Engine,

    /// 원본 SQL 템플릿
    pub sql: String,

    /// 선언 파라미터 (추출 순서)
    pub params: Vec<String>,

    pub case: KeyCase,

    /// 응답에 SQL/args 포함 여부
    pub debug: bool,
}

impl ApiDescriptor {
    /// `db/group/api`
    pub fn route(&self) -> String {
        ApiRegistry::route_key(&self.db, &self.group, &self.name)
    }

    pub fn placeholder_style(&self) -> PlaceholderStyle {
        PlaceholderStyle::for_engine(self.engine)
    }
}

/// API 레지스트리
///
/// 생성 이후에는 읽기 전용이므로 요청 간에 잠금 없이 공유합니다.
#[derive(Debug, Clone, Default)]
pub struct ApiRegistry {
    routes: BTreeMap<String, Arc<ApiDescriptor>>,

    /// 설정 순서
    order: Vec<String>,
}

impl ApiRegistry {
    /// 설정에서 레지스트리 생성
    pub fn from_config(config: &GatewayConfig) -> Result<Self> {
        let mut registry = Self::default();

        for db in &config.databases {
            for group in &db.groups {
                for api in &group.apis {
                    let route = Self::route_key(&db.name, &group.name, &api.name);

                    validate_template(&api.sql).map_err(|e| Error::InvalidTemplate {
                        route: route.clone(),
                        reason: e.to_string(),
                    })?;

                    let descriptor = ApiDescriptor {
                        db: db.name.clone(),
                        group: group.name.clone(),
                        name: api.name.clone(),
                        engine: db.engine,
                        sql: api.sql.clone(),
                        params: extract_params(&api.sql),
                        case: api.case,
                        debug: api.debug,
                    };

                    if registry
                        .routes
                        .insert(route.clone(), Arc::new(descriptor))
                        .is_some()
                    {
                        return Err(Error::DuplicateApi { route });
                    }
                    registry.order.push(route);
                }
            }
        }

        tracing::debug!(apis = registry.len(), "api registry built");
        Ok(registry)
    }

    /// 경로 키 생성
    pub fn route_key(db: &str, group: &str, api: &str) -> String {
        format!("{}/{}/{}", db, group, api)
    }

    /// API 조회
    pub fn resolve(&self, db: &str, group: &str, api: &str) -> Option<Arc<ApiDescriptor>> {
        self.routes.get(&Self::route_key(db, group, api)).cloned()
    }

    /// 설정 순서대로 순회
    pub fn iter(&self) -> impl Iterator<Item = &ApiDescriptor> {
        self.order
            .iter()
            .filter_map(|route| self.routes.get(route).map(|d| d.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgt_core::ConfigParser;

    fn sample_config() -> GatewayConfig {
        ConfigParser::parse_yaml(
            r#"
dbs:
  - name: main
    type: postgres
    dsn: postgres://localhost/app
    format: lowerCamel
    groups:
      - name: user
        apis:
          - name: search
            sql: SELECT * FROM users WHERE 1=1{#name} AND name = {name}{/name} AND org = {org}
          - name: list
            sql: SELECT * FROM users
  - name: logs
    type: sqlite
    dsn: "sqlite::memory:"
    groups:
      - name: event
        apis:
          - name: recent
            debug: true
            sql: SELECT * FROM events WHERE kind IN {kinds}
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve() {
        let registry = ApiRegistry::from_config(&sample_config()).unwrap();
        assert_eq!(registry.len(), 3);

        let api = registry.resolve("main", "user", "search").unwrap();
        assert_eq!(api.params, vec!["name", "org"]);
        assert_eq!(api.case, KeyCase::LowerCamel);
        assert_eq!(api.engine, Engine::Postgres);
        assert_eq!(api.placeholder_style(), PlaceholderStyle::Dollar);
        assert_eq!(api.route(), "main/user/search");

        let api = registry.resolve("logs", "event", "recent").unwrap();
        assert!(api.debug);
        assert_eq!(api.params, vec!["kinds"]);
        assert_eq!(api.placeholder_style(), PlaceholderStyle::Question);

        assert!(registry.resolve("main", "user", "missing").is_none());
        assert!(registry.resolve("logs", "user", "search").is_none());
    }

    #[test]
    fn test_iter_keeps_config_order() {
        let registry = ApiRegistry::from_config(&sample_config()).unwrap();
        let routes: Vec<_> = registry.iter().map(|d| d.route()).collect();
        assert_eq!(
            routes,
            vec!["main/user/search", "main/user/list", "logs/event/recent"]
        );
    }

    #[test]
    fn test_empty_config() {
        let config = ConfigParser::parse_yaml("dbs: []").unwrap();
        let registry = ApiRegistry::from_config(&config).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.iter().count(), 0);
    }

    #[test]
    fn test_invalid_template_rejected_at_load() {
        let config = ConfigParser::parse_yaml(
            r#"
dbs:
  - name: main
    type: mysql
    dsn: mysql://localhost/app
    groups:
      - name: user
        apis:
          - name: broken
            sql: SELECT * FROM users WHERE 1=1{#name} AND name = {name}
"#,
        )
        .unwrap();

        let err = ApiRegistry::from_config(&config).unwrap_err();
        match err {
            Error::InvalidTemplate { route, reason } => {
                assert_eq!(route, "main/user/broken");
                assert!(reason.contains("never closed"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
