//! Convert serde_json::Value to types that sqlx can bind.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::encode::{Encode, IsNull};
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

use crate::model::ColumnType;

/// A value that can be bound to a PostgreSQL query. Each variant reports its
/// own wire type, so the `$n::type` cast in the SQL text does the rest.
#[derive(Clone, Debug, PartialEq)]
pub enum PgBindValue {
    Null,
    Bool(bool),
    I32(i32),
    I64(i64),
    F64(f64),
    String(String),
    Uuid(uuid::Uuid),
    Timestamp(DateTime<Utc>),
    Json(Value),
}

impl PgBindValue {
    /// Coerce a JSON value (request body or query-string text) to the
    /// column's storage type. Returns a human-readable reason on mismatch.
    pub fn for_column(v: &Value, ty: ColumnType) -> Result<Self, String> {
        if v.is_null() {
            return Ok(PgBindValue::Null);
        }
        let bad = || format!("expected {}, got {}", ty.pg_cast(), v);
        Ok(match ty {
            ColumnType::Uuid => {
                let s = v.as_str().ok_or_else(bad)?;
                PgBindValue::Uuid(uuid::Uuid::parse_str(s.trim()).map_err(|_| bad())?)
            }
            ColumnType::Text => match v {
                Value::String(s) => PgBindValue::String(s.clone()),
                Value::Number(_) | Value::Bool(_) => PgBindValue::String(v.to_string()),
                _ => return Err(bad()),
            },
            ColumnType::Int => {
                let n = as_i64(v).ok_or_else(bad)?;
                PgBindValue::I32(i32::try_from(n).map_err(|_| bad())?)
            }
            ColumnType::BigInt => PgBindValue::I64(as_i64(v).ok_or_else(bad)?),
            ColumnType::Float => PgBindValue::F64(as_f64(v).ok_or_else(bad)?),
            ColumnType::Bool => match v {
                Value::Bool(b) => PgBindValue::Bool(*b),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => PgBindValue::Bool(true),
                    "false" | "0" => PgBindValue::Bool(false),
                    _ => return Err(bad()),
                },
                _ => return Err(bad()),
            },
            ColumnType::Timestamptz => {
                let s = v.as_str().ok_or_else(bad)?;
                PgBindValue::Timestamp(s.trim().parse::<DateTime<Utc>>().map_err(|_| bad())?)
            }
            ColumnType::Json => PgBindValue::Json(v.clone()),
        })
    }
}

fn as_i64(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl<'q> Encode<'q, Postgres> for PgBindValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self {
            PgBindValue::Null => <Option<String> as Encode<Postgres>>::encode_by_ref(&None, buf)?,
            PgBindValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf)?,
            PgBindValue::I32(n) => <i32 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::I64(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::F64(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf)?,
            PgBindValue::String(s) => <String as Encode<Postgres>>::encode_by_ref(s, buf)?,
            PgBindValue::Uuid(u) => <uuid::Uuid as Encode<Postgres>>::encode_by_ref(u, buf)?,
            PgBindValue::Timestamp(t) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(t, buf)?,
            PgBindValue::Json(v) => <Value as Encode<Postgres>>::encode_by_ref(v, buf)?,
        })
    }

    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            PgBindValue::Null | PgBindValue::String(_) => <String as Type<Postgres>>::type_info(),
            PgBindValue::Bool(_) => <bool as Type<Postgres>>::type_info(),
            PgBindValue::I32(_) => <i32 as Type<Postgres>>::type_info(),
            PgBindValue::I64(_) => <i64 as Type<Postgres>>::type_info(),
            PgBindValue::F64(_) => <f64 as Type<Postgres>>::type_info(),
            PgBindValue::Uuid(_) => <uuid::Uuid as Type<Postgres>>::type_info(),
            PgBindValue::Timestamp(_) => <DateTime<Utc> as Type<Postgres>>::type_info(),
            PgBindValue::Json(_) => <Value as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for PgBindValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }
}
