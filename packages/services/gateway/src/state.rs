//! Gateway 앱 상태

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use sgt_core::config::{GatewayConfig, ServerConfig};
use sgt_sql::{ApiDescriptor, ApiRegistry};

use crate::db::DbPool;

/// 앱 상태
///
/// 모든 핸들러에서 공유하는 상태입니다. 생성 이후에는 읽기 전용입니다.
pub struct AppState {
    /// 서버 설정
    pub server: ServerConfig,

    /// API 레지스트리
    pub registry: ApiRegistry,

    /// DB 커넥션 풀 (db 이름 → Pool)
    pub pools: HashMap<String, DbPool>,
}

impl AppState {
    /// 새 상태 생성
    ///
    /// 풀은 지연 연결이므로 DB가 내려가 있어도 기동은 성공합니다.
    pub async fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let registry = ApiRegistry::from_config(config).context("failed to build api registry")?;

        let mut pools = HashMap::with_capacity(config.databases.len());
        for db in &config.databases {
            let pool = DbPool::connect_lazy(db)
                .with_context(|| format!("invalid connection settings for db '{}'", db.name))?;
            tracing::debug!(db = %db.name, engine = db.engine.as_str(), "connection pool ready");
            pools.insert(db.name.clone(), pool);
        }

        Ok(Self {
            server: config.server.clone(),
            registry,
            pools,
        })
    }

    /// API가 속한 DB의 풀
    pub fn pool_for(&self, api: &ApiDescriptor) -> Option<&DbPool> {
        self.pools.get(&api.db)
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.server.query_timeout
    }
}
