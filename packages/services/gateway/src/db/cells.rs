//! 드라이버 값 → `Cell` 변환
//!
//! 선언 타입 이름으로 디코딩 방법을 고릅니다. 시간 값과 NUMERIC, UUID, JSON은
//! 텍스트로, 바이너리 컬럼은 바이트로 넘겨 마샬러에서 텍스트가 됩니다.
//! PostgreSQL 배열은 JSON 배열 텍스트가 되고, 모르는 타입은 디코딩 오류입니다.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::mysql::{MySql, MySqlRow, MySqlValueRef};
use sqlx::postgres::types::{Oid, PgInterval, PgMoney, PgTimeTz};
use sqlx::postgres::{PgRow, PgValueRef, Postgres};
use sqlx::sqlite::{Sqlite, SqliteRow, SqliteValueRef};
use sqlx::types::{Decimal, JsonValue, Uuid};
use sqlx::{Column, Decode, Row, TypeInfo, ValueRef};

use sgt_sql::Cell;

/// 엔진별 결과 행
pub enum DbRow {
    Postgres(PgRow),
    MySql(MySqlRow),
    Sqlite(SqliteRow),
}

impl DbRow {
    pub fn column_names(&self) -> Vec<String> {
        match self {
            DbRow::Postgres(row) => names(row),
            DbRow::MySql(row) => names(row),
            DbRow::Sqlite(row) => names(row),
        }
    }

    pub fn cells(&self) -> Result<Vec<Cell>, sqlx::Error> {
        match self {
            DbRow::Postgres(row) => (0..row.len()).map(|i| pg_cell(row, i)).collect(),
            DbRow::MySql(row) => (0..row.len()).map(|i| mysql_cell(row, i)).collect(),
            DbRow::Sqlite(row) => (0..row.len()).map(|i| sqlite_cell(row, i)).collect(),
        }
    }
}

fn names<R: Row>(row: &R) -> Vec<String> {
    row.columns().iter().map(|c| c.name().to_string()).collect()
}

fn timestamp(v: NaiveDateTime) -> String {
    v.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

/// PostgreSQL 기본 출력 형식 (`1 year 2 mons 3 days 04:05:06`)
fn interval_text(v: &PgInterval) -> String {
    let mut parts = Vec::new();
    let (years, months) = (v.months / 12, v.months % 12);
    if years != 0 {
        parts.push(unit(years, "year"));
    }
    if months != 0 {
        parts.push(unit(months, "mon"));
    }
    if v.days != 0 {
        parts.push(unit(v.days, "day"));
    }
    if v.microseconds != 0 || parts.is_empty() {
        parts.push(clock(v.microseconds));
    }
    parts.join(" ")
}

fn unit(n: i32, name: &str) -> String {
    if n == 1 {
        format!("{} {}", n, name)
    } else {
        format!("{} {}s", n, name)
    }
}

fn clock(microseconds: i64) -> String {
    let sign = if microseconds < 0 { "-" } else { "" };
    let total = microseconds.unsigned_abs();
    let (secs, frac) = (total / 1_000_000, total % 1_000_000);
    let mut out = format!(
        "{}{:02}:{:02}:{:02}",
        sign,
        secs / 3600,
        secs / 60 % 60,
        secs % 60
    );
    if frac != 0 {
        out.push('.');
        out.push_str(format!("{:06}", frac).trim_end_matches('0'));
    }
    out
}

/// 배열 → JSON 배열 텍스트
fn json_array<T: Into<JsonValue>>(items: Vec<Option<T>>) -> Cell {
    Cell::Text(items.into_iter().collect::<JsonValue>().to_string())
}

fn pg<'r, T: Decode<'r, Postgres>>(raw: PgValueRef<'r>) -> Result<T, sqlx::Error> {
    T::decode(raw).map_err(sqlx::Error::Decode)
}

fn mysql<'r, T: Decode<'r, MySql>>(raw: MySqlValueRef<'r>) -> Result<T, sqlx::Error> {
    T::decode(raw).map_err(sqlx::Error::Decode)
}

fn sqlite<'r, T: Decode<'r, Sqlite>>(raw: SqliteValueRef<'r>) -> Result<T, sqlx::Error> {
    T::decode(raw).map_err(sqlx::Error::Decode)
}

fn pg_cell(row: &PgRow, index: usize) -> Result<Cell, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }

    let type_name = raw.type_info().name().to_ascii_uppercase();
    let cell = match type_name.as_str() {
        "BOOL" => Cell::Bool(pg::<bool>(raw)?),
        "INT2" => Cell::from(i64::from(pg::<i16>(raw)?)),
        "INT4" => Cell::from(i64::from(pg::<i32>(raw)?)),
        "INT8" => Cell::from(pg::<i64>(raw)?),
        "FLOAT4" => Cell::float(f64::from(pg::<f32>(raw)?)),
        "FLOAT8" => Cell::float(pg::<f64>(raw)?),
        "NUMERIC" => Cell::Text(pg::<Decimal>(raw)?.to_string()),
        "UUID" => Cell::Text(pg::<Uuid>(raw)?.to_string()),
        "JSON" | "JSONB" => Cell::Text(pg::<JsonValue>(raw)?.to_string()),
        "TIMESTAMPTZ" => Cell::Text(pg::<DateTime<Utc>>(raw)?.to_rfc3339()),
        "TIMESTAMP" => Cell::Text(timestamp(pg::<NaiveDateTime>(raw)?)),
        "DATE" => Cell::Text(pg::<NaiveDate>(raw)?.to_string()),
        "TIME" => Cell::Text(pg::<NaiveTime>(raw)?.to_string()),
        "TIMETZ" => {
            let v = pg::<PgTimeTz<NaiveTime, FixedOffset>>(raw)?;
            Cell::Text(format!("{}{}", v.time, v.offset))
        }
        "INTERVAL" => Cell::Text(interval_text(&pg::<PgInterval>(raw)?)),
        "OID" => Cell::from(u64::from(pg::<Oid>(raw)?.0)),
        "MONEY" => Cell::Text(pg::<PgMoney>(raw)?.to_decimal(2).to_string()),
        "TEXT" | "VARCHAR" | "BPCHAR" | "CHAR" | "NAME" | "CITEXT" => {
            Cell::Text(pg::<String>(raw)?)
        }
        "BYTEA" => Cell::Bytes(pg::<Vec<u8>>(raw)?),
        "VOID" => Cell::Null,
        "BOOL[]" => json_array(pg::<Vec<Option<bool>>>(raw)?),
        "INT2[]" => json_array(pg::<Vec<Option<i16>>>(raw)?),
        "INT4[]" => json_array(pg::<Vec<Option<i32>>>(raw)?),
        "INT8[]" => json_array(pg::<Vec<Option<i64>>>(raw)?),
        "FLOAT4[]" => json_array(pg::<Vec<Option<f32>>>(raw)?),
        "FLOAT8[]" => json_array(pg::<Vec<Option<f64>>>(raw)?),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => {
            json_array(pg::<Vec<Option<String>>>(raw)?)
        }
        "NUMERIC[]" => json_array(
            pg::<Vec<Option<Decimal>>>(raw)?
                .into_iter()
                .map(|v| v.map(|d| d.to_string()))
                .collect(),
        ),
        "UUID[]" => json_array(
            pg::<Vec<Option<Uuid>>>(raw)?
                .into_iter()
                .map(|v| v.map(|u| u.to_string()))
                .collect(),
        ),
        _ => {
            return Err(sqlx::Error::Decode(
                format!("unsupported column type {}", type_name).into(),
            ))
        }
    };
    Ok(cell)
}

fn mysql_cell(row: &MySqlRow, index: usize) -> Result<Cell, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }

    let type_name = raw.type_info().name().to_ascii_uppercase();
    if type_name.ends_with(" UNSIGNED") {
        return Ok(Cell::from(mysql::<u64>(raw)?));
    }

    let cell = match type_name.as_str() {
        "BOOLEAN" => Cell::Bool(mysql::<bool>(raw)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
            Cell::from(mysql::<i64>(raw)?)
        }
        "FLOAT" => Cell::float(f64::from(mysql::<f32>(raw)?)),
        "DOUBLE" => Cell::float(mysql::<f64>(raw)?),
        "DECIMAL" => Cell::Text(mysql::<Decimal>(raw)?.to_string()),
        "DATETIME" => Cell::Text(timestamp(mysql::<NaiveDateTime>(raw)?)),
        "TIMESTAMP" => Cell::Text(mysql::<DateTime<Utc>>(raw)?.to_rfc3339()),
        "DATE" => Cell::Text(mysql::<NaiveDate>(raw)?.to_string()),
        "TIME" => Cell::Text(mysql::<NaiveTime>(raw)?.to_string()),
        "JSON" => Cell::Text(mysql::<JsonValue>(raw)?.to_string()),
        "NULL" => Cell::Null,
        // 문자열 계열과 BLOB 계열 모두 바이트로 읽음
        _ => Cell::Bytes(mysql::<Vec<u8>>(raw)?),
    };
    Ok(cell)
}

fn sqlite_cell(row: &SqliteRow, index: usize) -> Result<Cell, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Cell::Null);
    }

    // 선언 타입이 아니라 값의 저장 타입
    let type_name = raw.type_info().name().to_ascii_uppercase();
    let cell = match type_name.as_str() {
        "NULL" => Cell::Null,
        "BOOLEAN" => Cell::Bool(sqlite::<bool>(raw)?),
        "INTEGER" => Cell::from(sqlite::<i64>(raw)?),
        "REAL" => Cell::float(sqlite::<f64>(raw)?),
        "BLOB" => Cell::Bytes(sqlite::<Vec<u8>>(raw)?),
        _ => Cell::Text(sqlite::<String>(raw)?),
    };
    Ok(cell)
}
