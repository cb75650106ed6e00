//! 실행 계층
//!
//! 논리 데이터베이스마다 sqlx 커넥션 풀을 하나씩 둡니다.
//! 쿼리는 `RowCursor`를 구현한 커서로, 명령은 영향받은 행 수로 돌려줍니다.

mod bind;
mod cells;
mod cursor;

use futures::{StreamExt, TryStreamExt};
use serde::Serialize;
use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

use sgt_core::config::{DatabaseConfig, Engine};
use sgt_sql::Scalar;

pub use cells::DbRow;
pub use cursor::SqlxCursor;

use bind::bind_args;

/// 엔진별 커넥션 풀
#[derive(Debug, Clone)]
pub enum DbPool {
    Postgres(PgPool),
    MySql(MySqlPool),
    Sqlite(SqlitePool),
}

/// 명령 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub rows_affected: u64,

    /// PostgreSQL은 항상 0 (RETURNING + /query 사용)
    pub last_insert_id: i64,
}

impl DbPool {
    /// 풀 생성 (첫 쿼리 시점에 연결)
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let max = config.max_connections;
        let pool = match config.engine {
            Engine::Postgres => DbPool::Postgres(
                PgPoolOptions::new()
                    .max_connections(max)
                    .connect_lazy(&config.dsn)?,
            ),
            Engine::MySql => DbPool::MySql(
                MySqlPoolOptions::new()
                    .max_connections(max)
                    .connect_lazy(&config.dsn)?,
            ),
            Engine::Sqlite => DbPool::Sqlite(
                SqlitePoolOptions::new()
                    .max_connections(max)
                    .connect_lazy(&config.dsn)?,
            ),
        };
        Ok(pool)
    }

    /// 쿼리 실행 (행 커서 반환)
    ///
    /// `sql`은 해당 엔진의 플레이스홀더 형식으로 컴파일된 문자열이어야 합니다.
    pub fn fetch<'a>(&'a self, sql: &'a str, args: &[Scalar]) -> SqlxCursor<'a> {
        let stream = match self {
            DbPool::Postgres(pool) => bind_args(sqlx::query(sql), args)
                .fetch(pool)
                .map_ok(DbRow::Postgres)
                .boxed(),
            DbPool::MySql(pool) => bind_args(sqlx::query(sql), args)
                .fetch(pool)
                .map_ok(DbRow::MySql)
                .boxed(),
            DbPool::Sqlite(pool) => bind_args(sqlx::query(sql), args)
                .fetch(pool)
                .map_ok(DbRow::Sqlite)
                .boxed(),
        };
        SqlxCursor::new(stream)
    }

    /// 명령 실행
    pub async fn execute(&self, sql: &str, args: &[Scalar]) -> Result<CommandResult, sqlx::Error> {
        let result = match self {
            DbPool::Postgres(pool) => {
                let done = bind_args(sqlx::query(sql), args).execute(pool).await?;
                CommandResult {
                    rows_affected: done.rows_affected(),
                    last_insert_id: 0,
                }
            }
            DbPool::MySql(pool) => {
                let done = bind_args(sqlx::query(sql), args).execute(pool).await?;
                CommandResult {
                    rows_affected: done.rows_affected(),
                    last_insert_id: i64::try_from(done.last_insert_id()).unwrap_or(i64::MAX),
                }
            }
            DbPool::Sqlite(pool) => {
                let done = bind_args(sqlx::query(sql), args).execute(pool).await?;
                CommandResult {
                    rows_affected: done.rows_affected(),
                    last_insert_id: done.last_insert_rowid(),
                }
            }
        };
        Ok(result)
    }
}
