//! Statement execution seam. Managers only talk to `QueryExecutor`, so they
//! run unchanged against PostgreSQL or against an in-memory recorder.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Transaction};

use crate::error::AppError;
use crate::sql::QueryBuf;

#[async_trait]
pub trait QueryExecutor: Send {
    async fn fetch_all(&mut self, q: &QueryBuf) -> Result<Vec<Value>, AppError>;

    async fn fetch_optional(&mut self, q: &QueryBuf) -> Result<Option<Value>, AppError>;

    /// Returns the number of rows affected.
    async fn execute(&mut self, q: &QueryBuf) -> Result<u64, AppError>;

    async fn commit(&mut self) -> Result<(), AppError>;
}

/// Request-scoped executor: one transaction, begun on the first statement.
/// Dropping it without `commit` rolls the transaction back.
pub struct PgExecutor {
    pool: PgPool,
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        PgExecutor { pool, tx: None }
    }

    async fn tx(&mut self) -> Result<&mut Transaction<'static, Postgres>, AppError> {
        let tx = match self.tx.take() {
            Some(tx) => tx,
            None => self.pool.begin().await?,
        };
        Ok(self.tx.insert(tx))
    }
}

fn bind(q: &QueryBuf) -> Query<'_, Postgres, PgArguments> {
    tracing::debug!(sql = %q.sql, params = q.params.len(), "query");
    let mut query = sqlx::query(&q.sql);
    for p in &q.params {
        query = query.bind(p.clone());
    }
    query
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn fetch_all(&mut self, q: &QueryBuf) -> Result<Vec<Value>, AppError> {
        let tx = self.tx().await?;
        let rows = bind(q).fetch_all(&mut **tx).await?;
        Ok(rows.iter().map(row_to_json).collect())
    }

    async fn fetch_optional(&mut self, q: &QueryBuf) -> Result<Option<Value>, AppError> {
        let tx = self.tx().await?;
        let row = bind(q).fetch_optional(&mut **tx).await?;
        Ok(row.as_ref().map(row_to_json))
    }

    async fn execute(&mut self, q: &QueryBuf) -> Result<u64, AppError> {
        let tx = self.tx().await?;
        let done = bind(q).execute(&mut **tx).await?;
        Ok(done.rows_affected())
    }

    async fn commit(&mut self) -> Result<(), AppError> {
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
        }
        Ok(())
    }
}

fn row_to_json(row: &PgRow) -> Value {
    use sqlx::Column;
    use sqlx::Row;
    let mut map = serde_json::Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), cell_to_value(row, name));
    }
    Value::Object(map)
}

/// Decode one cell by trying the column types the schema uses.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}
