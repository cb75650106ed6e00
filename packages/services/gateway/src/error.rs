//! Gateway 에러 타입

use std::fmt::Display;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use sgt_sql::{CompiledStatement, TemplateError};

/// Gateway 에러
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("not found: {message}")]
    NotFound { message: String },

    /// 저장소 실행 실패 (취소/타임아웃 포함)
    #[error("{message}")]
    Execution { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl GatewayError {
    /// `<err> / sql: <sql> / args: <args>` 형식의 실행 에러
    pub fn execution(err: impl Display, statement: &CompiledStatement) -> Self {
        let args = serde_json::to_string(&statement.args).unwrap_or_else(|_| "[]".to_string());
        GatewayError::Execution {
            message: format!("{} / sql: {} / args: {}", err, statement.sql, args),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GatewayError::BadRequest { .. } => "BAD_REQUEST",
            GatewayError::Unauthorized { .. } => "UNAUTHORIZED",
            GatewayError::NotFound { .. } => "NOT_FOUND",
            GatewayError::Execution { .. } => "EXECUTION_ERROR",
            GatewayError::Internal { .. } => "INTERNAL_ERROR",
            GatewayError::Template(TemplateError::MissingParam { .. }) => "MISSING_PARAMETER",
            GatewayError::Template(_) => "INVALID_TEMPLATE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest { .. }
            | GatewayError::Execution { .. }
            | GatewayError::Template(TemplateError::MissingParam { .. }) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::Internal { .. } | GatewayError::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// 에러 응답 JSON
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            GatewayError::BadRequest { message }
            | GatewayError::Unauthorized { message }
            | GatewayError::NotFound { message }
            | GatewayError::Execution { message }
            | GatewayError::Internal { message } => message.clone(),
            GatewayError::Template(e) => e.to_string(),
        };

        if status.is_server_error() {
            tracing::error!(code, "{}", message);
        } else {
            tracing::warn!(code, "{}", message);
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                request_id: crate::middleware::current_request_id(),
            },
        };

        let mut resp = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            resp.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"sgt-gateway\""),
            );
        }
        resp
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use sgt_sql::Scalar;

    #[test]
    fn test_execution_message_format() {
        let statement = CompiledStatement {
            sql: "SELECT * FROM t WHERE id = ?".to_string(),
            args: vec![Scalar::from(7i64), Scalar::from("x")],
        };
        let err = GatewayError::execution("no such table: t", &statement);
        assert_eq!(
            err.to_string(),
            "no such table: t / sql: SELECT * FROM t WHERE id = ? / args: [7,\"x\"]"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "EXECUTION_ERROR");
    }

    #[test]
    fn test_missing_param_is_bad_request() {
        let err = GatewayError::from(TemplateError::MissingParam {
            name: "id".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "MISSING_PARAMETER");
    }
}
