//! 인자 바인딩

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::mysql::MySql;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgArgumentBuffer, PgTypeInfo, Postgres};
use sqlx::query::Query;
use sqlx::sqlite::Sqlite;
use sqlx::types::Decimal;
use sqlx::{Database, Encode, Type};

use sgt_sql::Scalar;

type Bound<'q, DB> = Query<'q, DB, <DB as Database>::Arguments<'q>>;

/// 엔진마다 다르게 바인딩해야 하는 값
pub(crate) trait EngineBind: Database {
    /// 타입 없는 NULL
    fn bind_null(query: Bound<'_, Self>) -> Bound<'_, Self>;

    /// i64 범위를 넘는 양의 정수
    fn bind_wide(query: Bound<'_, Self>, value: u64) -> Bound<'_, Self>;
}

/// PostgreSQL에 타입 OID 0(미지정)으로 보내는 NULL
///
/// 서버가 사용 위치에서 타입을 추론하므로 정수나 날짜 컬럼에도 그대로 들어갑니다.
#[derive(Debug, Clone, Copy)]
struct UntypedNull;

impl Type<Postgres> for UntypedNull {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_oid(Oid(0))
    }
}

impl Encode<'_, Postgres> for UntypedNull {
    fn encode_by_ref(&self, _buf: &mut PgArgumentBuffer) -> Result<IsNull, BoxDynError> {
        Ok(IsNull::Yes)
    }
}

impl EngineBind for Postgres {
    fn bind_null(query: Bound<'_, Self>) -> Bound<'_, Self> {
        query.bind(UntypedNull)
    }

    fn bind_wide(query: Bound<'_, Self>, value: u64) -> Bound<'_, Self> {
        query.bind(Decimal::from(value))
    }
}

impl EngineBind for MySql {
    fn bind_null(query: Bound<'_, Self>) -> Bound<'_, Self> {
        query.bind(None::<String>)
    }

    fn bind_wide(query: Bound<'_, Self>, value: u64) -> Bound<'_, Self> {
        query.bind(value)
    }
}

impl EngineBind for Sqlite {
    fn bind_null(query: Bound<'_, Self>) -> Bound<'_, Self> {
        query.bind(None::<String>)
    }

    // SQLite 정수는 i64까지라 자릿수를 잃지 않도록 텍스트로 넘김
    fn bind_wide(query: Bound<'_, Self>, value: u64) -> Bound<'_, Self> {
        query.bind(value.to_string())
    }
}

/// 컴파일된 인자를 순서대로 바인딩
///
/// 정수는 i64, i64를 넘는 양의 정수는 엔진별 표현, 그 밖의 숫자는 f64로
/// 바인딩합니다.
pub(crate) fn bind_args<'q, DB>(mut query: Bound<'q, DB>, args: &[Scalar]) -> Bound<'q, DB>
where
    DB: EngineBind,
    bool: Encode<'q, DB> + Type<DB>,
    i64: Encode<'q, DB> + Type<DB>,
    f64: Encode<'q, DB> + Type<DB>,
    String: Encode<'q, DB> + Type<DB>,
{
    for arg in args {
        query = match arg {
            Scalar::Null => DB::bind_null(query),
            Scalar::Bool(b) => query.bind(*b),
            Scalar::Number(n) => {
                if let Some(i) = n.as_i64() {
                    query.bind(i)
                } else if let Some(u) = n.as_u64() {
                    DB::bind_wide(query, u)
                } else if let Some(f) = n.as_f64() {
                    query.bind(f)
                } else {
                    query.bind(n.to_string())
                }
            }
            Scalar::Text(s) => query.bind(s.clone()),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Number;
    use sqlx::sqlite::SqlitePoolOptions;
    use sqlx::Row;

    #[test]
    fn test_postgres_null_has_unspecified_type() {
        assert_eq!(
            <UntypedNull as Type<Postgres>>::type_info(),
            PgTypeInfo::with_oid(Oid(0))
        );
    }

    #[tokio::test]
    async fn test_sqlite_binds_every_scalar() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let args = vec![
            Scalar::Null,
            Scalar::Bool(true),
            Scalar::Number(Number::from(-3i64)),
            Scalar::Number(Number::from(u64::MAX)),
            Scalar::Number(Number::from(u64::MAX)),
            Scalar::Number(Number::from_f64(1.5).unwrap()),
            Scalar::Text("kim".to_string()),
        ];
        let sql = "SELECT ? AS a, ? AS b, ? AS c, typeof(?) AS d, ? AS e, ? AS f, ? AS g";
        let row = bind_args(sqlx::query(sql), &args)
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(row.try_get::<Option<String>, _>("a").unwrap(), None);
        assert!(row.try_get::<bool, _>("b").unwrap());
        assert_eq!(row.try_get::<i64, _>("c").unwrap(), -3);
        assert_eq!(row.try_get::<String, _>("d").unwrap(), "text");
        assert_eq!(
            row.try_get::<String, _>("e").unwrap(),
            "18446744073709551615"
        );
        assert_eq!(row.try_get::<f64, _>("f").unwrap(), 1.5);
        assert_eq!(row.try_get::<String, _>("g").unwrap(), "kim");
    }

    #[tokio::test]
    async fn test_sqlite_null_matches_is_null() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        let row = bind_args(sqlx::query("SELECT ? IS NULL AS n"), &[Scalar::Null])
            .fetch_one(&pool)
            .await
            .unwrap();
        assert!(row.try_get::<bool, _>("n").unwrap());
    }
}
