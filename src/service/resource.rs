//! Generic list / get / create-or-update / delete shared by every resource router.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::executor::QueryExecutor;
use super::manager::{EntityManager, WriteItem};
use crate::error::AppError;
use crate::model::{Entity, User};
use crate::response::PaginationInfo;
use crate::schemas::{into_payload, ListParams, Validate};
use crate::sql::{parse_filters, parse_order_by};

/// An entity exposed over HTTP with list filters, search and batch writes.
pub trait Resource: Entity<Id = Uuid> + Serialize {
    type Write: DeserializeOwned + Serialize + Validate + Send + Sync;

    /// Column matched by the `search` query parameter (`ILIKE '%term%'`).
    const SEARCH_FIELD: Option<&'static str>;

    /// Fill caller-derived columns before a row is written. `creating` is
    /// false for items that carry an id.
    fn stamp(_payload: &mut Map<String, Value>, _caller: &User, _creating: bool) {}
}

pub struct Listing<R> {
    pub items: Vec<R>,
    pub pagination: PaginationInfo,
}

pub struct ResourceService;

impl ResourceService {
    /// `scope` filters are appended to the caller's and cannot be overridden.
    pub async fn list<R, X>(exec: &mut X, params: ListParams, scope: Vec<(String, Value)>) -> Result<Listing<R>, AppError>
    where
        R: Resource,
        X: QueryExecutor + ?Sized,
    {
        let params = params.with_search(R::SEARCH_FIELD);
        let mut filters = parse_filters(R::TABLE, params.filters)?;
        filters.extend(parse_filters(R::TABLE, scope)?);
        let order = parse_order_by(R::TABLE, &params.order_by)?;

        let mut manager = EntityManager::<R, X>::new(exec);
        let items = manager.search(&order, Some(params.pagination), &filters).await?;
        let total = manager.count(&filters).await?;
        Ok(Listing {
            items,
            pagination: PaginationInfo::new(params.pagination, total),
        })
    }

    pub async fn get<R, X>(exec: &mut X, id: Uuid) -> Result<R, AppError>
    where
        R: Resource,
        X: QueryExecutor + ?Sized,
    {
        EntityManager::<R, X>::new(exec)
            .get_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", R::TABLE.name, id)))
    }

    /// Validate, stamp, then create or update every item in one transaction.
    pub async fn upsert_batch<R, X>(exec: &mut X, items: Vec<R::Write>, caller: &User) -> Result<Vec<R>, AppError>
    where
        R: Resource,
        X: QueryExecutor + ?Sized,
    {
        items.validate()?;
        let mut writes: Vec<WriteItem> = Vec::with_capacity(items.len());
        for item in &items {
            let (id, mut payload) = into_payload(item)?;
            R::stamp(&mut payload, caller, id.is_none());
            writes.push((id, payload));
        }
        let out = EntityManager::<R, X>::new(exec).create_or_update(writes).await?;
        exec.commit().await?;
        Ok(out)
    }

    pub async fn delete_batch<R, X>(exec: &mut X, ids: Vec<Uuid>) -> Result<u64, AppError>
    where
        R: Resource,
        X: QueryExecutor + ?Sized,
    {
        let deleted = EntityManager::<R, X>::new(exec).bulk_delete(&ids).await?;
        if !ids.is_empty() {
            exec.commit().await?;
        }
        Ok(deleted)
    }
}

/// Set `column` to the caller's id on create when the client left it out.
pub(crate) fn default_to_caller(payload: &mut Map<String, Value>, column: &str, caller: &User, creating: bool) {
    if creating && !payload.contains_key(column) {
        payload.insert(column.to_string(), Value::String(caller.id.to_string()));
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Course;
    use crate::schemas::education::CourseWrite;
    use crate::service::executor::testing::RecordingExecutor;
    use serde_json::json;

    fn course_row(title: &str) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "title": title,
            "description": null,
            "is_active": true,
            "category_id": null,
            "lesson_url": null,
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": "2024-01-01T00:00:00+00:00",
        })
    }

    #[tokio::test]
    async fn list_searches_counts_and_paginates() {
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![course_row("Lesson 1"), course_row("Lesson 2")])
            .reply(vec![json!({"count": 12})]);
        let params = ListParams::from_pairs(vec![
            ("search".into(), "lesson".into()),
            ("per_page".into(), "2".into()),
            ("order_by".into(), "title".into()),
        ])
        .unwrap();

        let listing = ResourceService::list::<Course, _>(&mut exec, params, vec![]).await.unwrap();

        assert_eq!(listing.items.len(), 2);
        assert_eq!(listing.pagination.total_pages, 6);
        assert_eq!(listing.pagination.next_page, Some(2));
        let select = &exec.statements[0].sql;
        assert!(select.contains("WHERE \"title\"::text ILIKE $1"));
        assert!(select.contains("ORDER BY CAST(SUBSTRING(\"title\" FROM '[0-9]+') AS NUMERIC) ASC"));
        assert!(select.ends_with("LIMIT 2 OFFSET 0"));
    }

    #[tokio::test]
    async fn invalid_filter_stops_before_any_statement() {
        let mut exec = RecordingExecutor::default();
        let params = ListParams::from_pairs(vec![("title__between".into(), "a".into())]).unwrap();
        let err = ResourceService::list::<Course, _>(&mut exec, params, vec![]).await.err().unwrap();
        assert!(matches!(err, AppError::InvalidFilter(_)));
        assert!(exec.statements.is_empty());
    }

    #[tokio::test]
    async fn invalid_item_rejects_the_whole_batch() {
        let mut exec = RecordingExecutor::default();
        let items: Vec<CourseWrite> = serde_json::from_value(json!([{"title": "ok"}, {"title": "  "}])).unwrap();
        let err = ResourceService::upsert_batch::<Course, _>(&mut exec, items, &fixtures::user(true))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(exec.statements.is_empty());
    }

    #[tokio::test]
    async fn empty_delete_issues_no_statements() {
        let mut exec = RecordingExecutor::default();
        let n = ResourceService::delete_batch::<Course, _>(&mut exec, vec![]).await.unwrap();
        assert_eq!(n, 0);
        assert!(exec.statements.is_empty());
        assert_eq!(exec.commits, 0);
    }

    #[tokio::test]
    async fn get_missing_row_is_not_found() {
        let mut exec = RecordingExecutor::default();
        let err = ResourceService::get::<Course, _>(&mut exec, Uuid::new_v4()).await.err().unwrap();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
