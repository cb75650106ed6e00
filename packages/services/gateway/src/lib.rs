//! SQL Gateway (HTTP 서비스)
//!
//! 설정 파일에 선언된 SQL 템플릿을 `/query`, `/command` 엔드포인트로 노출합니다.

use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod state;

pub use state::AppState;

/// 라우터 생성
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // SQL endpoints
        .route("/query/:db/:group/:api", post(handlers::call::handle_query))
        .route("/command/:db/:group/:api", post(handlers::call::handle_command))
        // Capability listing
        .route("/info", get(handlers::info::handle_info))
        // Health check
        .route("/health", get(handlers::health::health_check))
        // Middleware
        .layer(from_fn_with_state(state.clone(), middleware::basic_auth))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(from_fn(middleware::request_id))
        // State
        .with_state(state)
}
