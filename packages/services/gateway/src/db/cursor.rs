//! sqlx 행 스트림 커서

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::TryStreamExt;

use sgt_sql::{Cell, RowCursor};

use super::cells::DbRow;

/// sqlx 스트림 기반 커서
///
/// sqlx는 컬럼 정보를 행과 함께 주므로 `columns`는 첫 행을 미리 읽어 둡니다.
/// 결과가 비어 있으면 컬럼도 비어 있습니다. 커서를 drop하면 스트림과
/// 커넥션이 반환됩니다.
pub struct SqlxCursor<'a> {
    stream: BoxStream<'a, Result<DbRow, sqlx::Error>>,
    peeked: Option<DbRow>,
    exhausted: bool,
}

impl<'a> SqlxCursor<'a> {
    pub(crate) fn new(stream: BoxStream<'a, Result<DbRow, sqlx::Error>>) -> Self {
        Self {
            stream,
            peeked: None,
            exhausted: false,
        }
    }

    async fn pull(&mut self) -> Result<Option<DbRow>, sqlx::Error> {
        if self.exhausted {
            return Ok(None);
        }
        let row = self.stream.try_next().await?;
        if row.is_none() {
            self.exhausted = true;
        }
        Ok(row)
    }
}

#[async_trait]
impl<'a> RowCursor for SqlxCursor<'a> {
    type Error = sqlx::Error;

    async fn columns(&mut self) -> Result<Vec<String>, sqlx::Error> {
        if self.peeked.is_none() {
            self.peeked = self.pull().await?;
        }
        Ok(self
            .peeked
            .as_ref()
            .map(DbRow::column_names)
            .unwrap_or_default())
    }

    async fn next_row(&mut self) -> Result<Option<Vec<Cell>>, sqlx::Error> {
        let row = match self.peeked.take() {
            Some(row) => Some(row),
            None => self.pull().await?,
        };
        row.map(|r| r.cells()).transpose()
    }
}
