//! /query, /command 핸들러
//!
//! 요청 본문을 필드로 읽고, 템플릿을 컴파일한 뒤 해당 DB에서 실행합니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use sgt_sql::{
    compile_with_style, ApiDescriptor, CompiledStatement, RequestFields, ResultRow, RowMarshaler,
    Scalar,
};

use crate::db::{CommandResult, DbPool};
use crate::error::{GatewayError, Result};
use crate::state::AppState;

/// `/:db/:group/:api`
#[derive(Debug, Deserialize)]
pub struct ApiPath {
    pub db: String,
    pub group: String,
    pub api: String,
}

/// /query 응답 본문
#[derive(Debug, Serialize)]
pub struct QueryResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Scalar>>,

    pub result: Vec<ResultRow>,
}

/// /command 응답 본문
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<Scalar>>,

    pub result: CommandResult,
}

/// 실행 준비가 끝난 호출
struct PreparedCall<'s> {
    api: Arc<ApiDescriptor>,
    pool: &'s DbPool,
    statement: CompiledStatement,
}

impl PreparedCall<'_> {
    /// debug API면 (sql, args) 반환
    fn echo(&self) -> (Option<String>, Option<Vec<Scalar>>) {
        if self.api.debug {
            (
                Some(self.statement.sql.clone()),
                Some(self.statement.args.clone()),
            )
        } else {
            (None, None)
        }
    }
}

/// 타임아웃 시 토큰을 취소하는 타이머. drop 시 타이머도 정리됩니다.
struct Deadline(Option<JoinHandle<()>>);

impl Deadline {
    fn arm(cancel: &CancellationToken, timeout: Option<Duration>) -> Self {
        Self(timeout.map(|timeout| {
            let token = cancel.clone();
            tokio::spawn(async move {
                tokio::time::sleep(timeout).await;
                token.cancel();
            })
        }))
    }
}

impl Drop for Deadline {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.abort();
        }
    }
}

fn prepare<'s>(state: &'s AppState, path: &ApiPath, body: &[u8]) -> Result<PreparedCall<'s>> {
    let api = state
        .registry
        .resolve(&path.db, &path.group, &path.api)
        .ok_or_else(|| GatewayError::NotFound {
            message: format!("api not found: {}/{}/{}", path.db, path.group, path.api),
        })?;

    let pool = state.pool_for(&api).ok_or_else(|| GatewayError::Internal {
        message: format!("no connection pool for db '{}'", api.db),
    })?;

    let fields = RequestFields::from_body(body).map_err(|e| GatewayError::BadRequest {
        message: format!("invalid request body: {}", e),
    })?;

    let statement =
        compile_with_style(&api.sql, &fields, &api.params, api.placeholder_style())?;
    tracing::debug!(
        route = %api.route(),
        sql = %statement.sql,
        args = statement.args.len(),
        "statement compiled"
    );

    Ok(PreparedCall {
        api,
        pool,
        statement,
    })
}

/// POST /query/:db/:group/:api
pub async fn handle_query(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ApiPath>,
    body: Bytes,
) -> Result<Json<QueryResponse>> {
    let call = prepare(&state, &path, &body)?;

    let cancel = CancellationToken::new();
    let _deadline = Deadline::arm(&cancel, state.query_timeout());

    let cursor = call.pool.fetch(&call.statement.sql, &call.statement.args);
    let rows = RowMarshaler::new(cursor, call.api.case, cancel)
        .collect()
        .await
        .map_err(|e| GatewayError::execution(e, &call.statement))?;

    tracing::debug!(route = %call.api.route(), rows = rows.len(), "query finished");

    let (sql, args) = call.echo();
    Ok(Json(QueryResponse {
        sql,
        args,
        result: rows,
    }))
}

/// POST /command/:db/:group/:api
pub async fn handle_command(
    State(state): State<Arc<AppState>>,
    Path(path): Path<ApiPath>,
    body: Bytes,
) -> Result<Json<CommandResponse>> {
    let call = prepare(&state, &path, &body)?;

    let cancel = CancellationToken::new();
    let _deadline = Deadline::arm(&cancel, state.query_timeout());

    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(GatewayError::execution("query cancelled", &call.statement)),
        done = call.pool.execute(&call.statement.sql, &call.statement.args) => {
            done.map_err(|e| GatewayError::execution(e, &call.statement))
        }
    }?;

    tracing::debug!(
        route = %call.api.route(),
        rows_affected = result.rows_affected,
        "command finished"
    );

    let (sql, args) = call.echo();
    Ok(Json(CommandResponse { sql, args, result }))
}
