//! /info 핸들러
//!
//! 등록된 API 목록과 선언 파라미터를 설정 순서대로 보여줍니다.

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub result: Vec<ApiInfo>,
}

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub db: String,
    pub group: String,
    pub api: String,
    pub uri: String,
    pub params: Vec<String>,
}

pub async fn handle_info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let result = state
        .registry
        .iter()
        .map(|api| ApiInfo {
            db: api.db.clone(),
            group: api.group.clone(),
            api: api.name.clone(),
            uri: format!("/{}", api.route()),
            params: api.params.clone(),
        })
        .collect();

    Json(InfoResponse { result })
}
