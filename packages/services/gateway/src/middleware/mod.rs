//! Gateway 미들웨어
//!
//! 요청 ID 부여와 Basic 인증을 정의합니다.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use base64::prelude::*;
use uuid::Uuid;

use crate::error::GatewayError;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 인증 없이 열려 있는 경로
const PUBLIC_PATHS: &[&str] = &["/health"];

#[derive(Clone, Debug)]
pub struct RequestId(pub String);

tokio::task_local! {
    static REQUEST_ID: String;
}

pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 요청 ID 부여
///
/// 클라이언트가 보낸 `x-request-id`가 있으면 그대로 사용합니다.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(id.clone()));
    let mut resp = REQUEST_ID
        .scope(id.clone(), async move { next.run(req).await })
        .await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}

/// HTTP Basic 인증 (`server.auth`가 켜진 경우)
pub async fn basic_auth(State(state): State<Arc<AppState>>, req: Request, next: Next) -> Response {
    let server = &state.server;
    if !server.auth || PUBLIC_PATHS.contains(&req.uri().path()) {
        return next.run(req).await;
    }

    let Some((username, password)) = basic_credentials(&req) else {
        return GatewayError::Unauthorized {
            message: "missing basic credentials".to_string(),
        }
        .into_response();
    };

    let known = server
        .accounts
        .iter()
        .any(|a| a.username == username && a.password == password);
    if !known {
        tracing::warn!(username = %username, "rejected credentials");
        return GatewayError::Unauthorized {
            message: "invalid username or password".to_string(),
        }
        .into_response();
    }

    next.run(req).await
}

fn basic_credentials(req: &Request) -> Option<(String, String)> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64_STANDARD.decode(encoded.trim()).ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}
