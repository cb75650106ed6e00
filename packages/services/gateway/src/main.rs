//! SQL Gateway 실행 파일

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use sgt_gateway::config::Settings;
use sgt_gateway::logging::init_tracing;
use sgt_gateway::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 환경변수 로드
    dotenvy::dotenv().ok();

    // 설정 로드
    let settings = Settings::parse();
    let config = settings.load_config()?;

    // 로깅 초기화
    init_tracing(&config.log)?;
    tracing::info!(
        config = %settings.config.display(),
        databases = config.databases.len(),
        "Starting SQL gateway"
    );

    // 앱 상태 초기화
    let state = AppState::new(&config).await?;
    if state.registry.is_empty() {
        tracing::warn!("no apis configured; only /health and /info will respond");
    }
    for api in state.registry.iter() {
        if config.server.debug {
            tracing::info!(route = %api.route(), params = ?api.params, "api registered");
        } else {
            tracing::debug!(route = %api.route(), params = ?api.params, "api registered");
        }
    }
    let state = Arc::new(state);

    // 라우터 구성
    let app = create_router(state);

    // 서버 시작
    let addr = config.server.bind_addr();
    tracing::info!("Gateway listening on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
