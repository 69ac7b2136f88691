//! Generic data access for one mapped entity type.

use std::marker::PhantomData;

use serde_json::{Map, Value};
use tracing::Span;

use super::executor::QueryExecutor;
use crate::error::AppError;
use crate::model::Entity;
use crate::sql::{self, Filter, OrderDirective, Pagination, PgBindValue, DEFAULT_BATCH_SIZE};

/// One item of a create-or-update batch: the client-supplied id, if any,
/// and the remaining column values.
pub type WriteItem = (Option<Value>, Map<String, Value>);

pub struct EntityManager<'x, E, X: ?Sized> {
    exec: &'x mut X,
    span: Span,
    _entity: PhantomData<fn() -> E>,
}

impl<'x, E, X> EntityManager<'x, E, X>
where
    E: Entity,
    X: QueryExecutor + ?Sized,
{
    pub fn new(exec: &'x mut X) -> Self {
        EntityManager {
            exec,
            span: tracing::info_span!("entity_manager", table = E::TABLE.name),
            _entity: PhantomData,
        }
    }

    fn decode(row: Value) -> Result<E, AppError> {
        serde_json::from_value(row)
            .map_err(|e| AppError::Internal(format!("decoding {} row: {}", E::TABLE.name, e)))
    }

    fn decode_all(rows: Vec<Value>) -> Result<Vec<E>, AppError> {
        rows.into_iter().map(Self::decode).collect()
    }

    fn bind_id(&self, id: &E::Id) -> Result<PgBindValue, AppError> {
        let raw = serde_json::to_value(id).map_err(|e| AppError::Internal(e.to_string()))?;
        Self::bind_raw_id(&raw)
    }

    fn bind_raw_id(raw: &Value) -> Result<PgBindValue, AppError> {
        let pk = E::TABLE.pk_column();
        PgBindValue::for_column(raw, pk.ty).map_err(|e| AppError::Validation(format!("{}: {}", pk.name, e)))
    }

    pub async fn create(&mut self, payload: &Map<String, Value>) -> Result<E, AppError> {
        let q = sql::insert(E::TABLE, payload)?;
        let row = self
            .exec
            .fetch_optional(&q)
            .await?
            .ok_or_else(|| AppError::Internal(format!("insert into {} returned no row", E::TABLE.name)))?;
        tracing::info!(parent: &self.span, "created row");
        Self::decode(row)
    }

    pub async fn get_by_id(&mut self, id: &E::Id) -> Result<Option<E>, AppError> {
        let q = sql::select_by_id(E::TABLE, self.bind_id(id)?);
        self.exec.fetch_optional(&q).await?.map(Self::decode).transpose()
    }

    /// `None` when no row has this id; nothing is written then.
    pub async fn update_by_id(&mut self, id: &E::Id, payload: &Map<String, Value>) -> Result<Option<E>, AppError> {
        let id = self.bind_id(id)?;
        self.update_bound(id, payload).await
    }

    async fn update_bound(&mut self, id: PgBindValue, payload: &Map<String, Value>) -> Result<Option<E>, AppError> {
        let q = sql::update(E::TABLE, id, payload)?;
        let row = self.exec.fetch_optional(&q).await?;
        if row.is_some() {
            tracing::info!(parent: &self.span, fields = payload.len(), "updated row");
        }
        row.map(Self::decode).transpose()
    }

    /// Deleting an absent row is not an error.
    pub async fn delete_by_id(&mut self, id: &E::Id) -> Result<(), AppError> {
        let q = sql::delete_by_id(E::TABLE, self.bind_id(id)?);
        let n = self.exec.execute(&q).await?;
        tracing::info!(parent: &self.span, deleted = n, "delete by id");
        Ok(())
    }

    pub async fn count(&mut self, filters: &[Filter]) -> Result<u64, AppError> {
        let q = sql::count(E::TABLE, filters);
        let n = self
            .exec
            .fetch_optional(&q)
            .await?
            .and_then(|row| row.get("count").and_then(Value::as_i64))
            .unwrap_or(0);
        Ok(u64::try_from(n).unwrap_or(0))
    }

    pub async fn search(
        &mut self,
        order_by: &[OrderDirective],
        pagination: Option<Pagination>,
        filters: &[Filter],
    ) -> Result<Vec<E>, AppError> {
        let q = sql::select(E::TABLE, filters, order_by, pagination);
        let rows = self.exec.fetch_all(&q).await?;
        tracing::debug!(parent: &self.span, rows = rows.len(), "search");
        Self::decode_all(rows)
    }

    /// One UPDATE per item; ids that match no row are skipped.
    pub async fn bulk_update(&mut self, items: Vec<(E::Id, Map<String, Value>)>) -> Result<Vec<E>, AppError> {
        let mut out = Vec::with_capacity(items.len());
        for (id, payload) in &items {
            if let Some(e) = self.update_by_id(id, payload).await? {
                out.push(e);
            }
        }
        Ok(out)
    }

    /// Returns the number of rows removed.
    pub async fn bulk_delete(&mut self, ids: &[E::Id]) -> Result<u64, AppError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let bound = ids.iter().map(|id| self.bind_id(id)).collect::<Result<Vec<_>, _>>()?;
        let q = sql::delete_in(E::TABLE, bound);
        let n = self.exec.execute(&q).await?;
        tracing::info!(parent: &self.span, requested = ids.len(), deleted = n, "bulk delete");
        Ok(n)
    }

    pub async fn bulk_insert(&mut self, rows: &[Map<String, Value>]) -> Result<Vec<E>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let q = sql::insert_many(E::TABLE, rows)?;
        let out = self.exec.fetch_all(&q).await?;
        tracing::info!(parent: &self.span, rows = out.len(), "bulk insert");
        Self::decode_all(out)
    }

    /// Chunked `INSERT ... ON CONFLICT`; one statement per `batch_size` rows
    /// (default `DEFAULT_BATCH_SIZE`), then a single commit.
    pub async fn bulk_upsert(
        &mut self,
        rows: &[Map<String, Value>],
        conflict: &[&str],
        update_columns: &[&str],
        batch_size: Option<usize>,
    ) -> Result<Vec<E>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let batch_size = batch_size.filter(|n| *n > 0).unwrap_or(DEFAULT_BATCH_SIZE);
        let mut out = Vec::with_capacity(rows.len());
        for batch in rows.chunks(batch_size) {
            let q = sql::upsert(E::TABLE, batch, conflict, update_columns)?;
            let returned = self.exec.fetch_all(&q).await?;
            tracing::debug!(parent: &self.span, batch = batch.len(), "upsert batch");
            out.extend(Self::decode_all(returned)?);
        }
        self.exec.commit().await?;
        tracing::info!(parent: &self.span, rows = rows.len(), "bulk upsert committed");
        Ok(out)
    }

    /// Items carrying an id are updated, the rest inserted; results keep input
    /// order. An id that matches no row is a not-found error.
    pub async fn create_or_update(&mut self, items: Vec<WriteItem>) -> Result<Vec<E>, AppError> {
        let mut out = Vec::with_capacity(items.len());
        for (id, payload) in items {
            match id {
                Some(raw) => {
                    let bound = Self::bind_raw_id(&raw)?;
                    let updated = self.update_bound(bound, &payload).await?.ok_or_else(|| {
                        AppError::NotFound(format!("{} {} not found", E::TABLE.name, raw))
                    })?;
                    out.push(updated);
                }
                None => out.push(self.create(&payload).await?),
            }
        }
        tracing::info!(parent: &self.span, processed = out.len(), "create or update");
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseCategory, UserCourseProgress};
    use crate::service::executor::testing::RecordingExecutor;
    use serde_json::json;
    use uuid::Uuid;

    fn category_row(id: Uuid, name: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "description": null,
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": "2024-01-01T00:00:00+00:00",
        })
    }

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn create_or_update_issues_one_insert_and_one_update_in_order() {
        let existing = Uuid::new_v4();
        let fresh = Uuid::new_v4();
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![category_row(existing, "Renamed")])
            .reply(vec![category_row(fresh, "New")]);

        let items = vec![
            (Some(json!(existing.to_string())), obj(json!({"name": "Renamed"}))),
            (None, obj(json!({"name": "New"}))),
        ];
        let out = EntityManager::<CourseCategory, _>::new(&mut exec)
            .create_or_update(items)
            .await
            .unwrap();

        assert_eq!(exec.verbs(), vec!["UPDATE", "INSERT"]);
        assert_eq!(out[0].id, existing);
        assert_eq!(out[1].name, "New");
    }

    #[tokio::test]
    async fn create_or_update_with_unknown_id_is_not_found() {
        let mut exec = RecordingExecutor::default();
        let items = vec![(Some(json!(Uuid::new_v4().to_string())), obj(json!({"name": "Ghost"})))];
        let err = EntityManager::<CourseCategory, _>::new(&mut exec)
            .create_or_update(items)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn bulk_upsert_chunks_and_commits_once() {
        let rows: Vec<Map<String, Value>> = (0..12_000)
            .map(|i| {
                obj(json!({
                    "user_id": Uuid::nil().to_string(),
                    "course_id": Uuid::new_v4().to_string(),
                    "score": i % 100,
                }))
            })
            .collect();
        let mut exec = RecordingExecutor::default();
        EntityManager::<UserCourseProgress, _>::new(&mut exec)
            .bulk_upsert(&rows, &["user_id", "course_id"], &["score"], Some(5000))
            .await
            .unwrap();

        let batch_rows: Vec<usize> = exec.statements.iter().map(|s| s.params / 3).collect();
        assert_eq!(batch_rows, vec![5000, 5000, 2000]);
        assert_eq!(exec.commits, 1);
    }

    #[tokio::test]
    async fn default_batch_size_applies() {
        let rows: Vec<Map<String, Value>> = (0..DEFAULT_BATCH_SIZE + 1)
            .map(|_| obj(json!({"name": "x"})))
            .collect();
        let mut exec = RecordingExecutor::default();
        EntityManager::<CourseCategory, _>::new(&mut exec)
            .bulk_upsert(&rows, &["id"], &[], None)
            .await
            .unwrap();
        assert_eq!(exec.statements.len(), 2);
    }

    #[tokio::test]
    async fn empty_bulk_operations_issue_no_statements() {
        let mut exec = RecordingExecutor::default();
        let mut manager = EntityManager::<CourseCategory, _>::new(&mut exec);
        assert_eq!(manager.bulk_delete(&[]).await.unwrap(), 0);
        assert!(manager.bulk_insert(&[]).await.unwrap().is_empty());
        assert!(manager.bulk_upsert(&[], &["id"], &[], None).await.unwrap().is_empty());
        assert!(manager.bulk_update(vec![]).await.unwrap().is_empty());
        drop(manager);
        assert!(exec.statements.is_empty());
        assert_eq!(exec.commits, 0);
    }

    #[tokio::test]
    async fn update_of_absent_row_returns_none() {
        let mut exec = RecordingExecutor::default();
        let out = EntityManager::<CourseCategory, _>::new(&mut exec)
            .update_by_id(&Uuid::new_v4(), &obj(json!({"name": "x"})))
            .await
            .unwrap();
        assert!(out.is_none());
        assert_eq!(exec.statements.len(), 1);
    }

    #[tokio::test]
    async fn count_reads_the_count_column() {
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![json!({"count": 42})]);
        let n = EntityManager::<CourseCategory, _>::new(&mut exec).count(&[]).await.unwrap();
        assert_eq!(n, 42);
        assert!(exec.statements[0].sql.starts_with("SELECT COUNT(*)"));
    }
}
