//! Per-user course progress.

use std::collections::HashSet;

use serde_json::{json, Map, Value};

use super::executor::QueryExecutor;
use super::manager::EntityManager;
use super::resource::{default_to_caller, Listing, Resource, ResourceService};
use crate::error::AppError;
use crate::model::{User, UserCourseProgress};
use crate::schemas::education::{ProgressSync, ProgressWrite};
use crate::schemas::{ListParams, Validate};

const SYNC_CONFLICT: &[&str] = &["user_id", "course_id"];
const SYNC_UPDATES: &[&str] = &["completed_lessons", "score"];

impl Resource for UserCourseProgress {
    type Write = ProgressWrite;
    const SEARCH_FIELD: Option<&'static str> = None;

    fn stamp(payload: &mut Map<String, Value>, caller: &User, creating: bool) {
        default_to_caller(payload, "user_id", caller, creating);
    }
}

pub struct ProgressService;

impl ProgressService {
    pub async fn mine<X>(exec: &mut X, params: ListParams, caller: &User) -> Result<Listing<UserCourseProgress>, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        let scope = vec![("user_id".to_string(), Value::String(caller.id.to_string()))];
        ResourceService::list::<UserCourseProgress, X>(exec, params, scope).await
    }

    /// Upsert the caller's progress keyed on `(user_id, course_id)`. When a
    /// course appears more than once the last item wins, since one
    /// `ON CONFLICT DO UPDATE` statement cannot touch the same row twice.
    pub async fn sync<X>(exec: &mut X, items: Vec<ProgressSync>, caller: &User) -> Result<Vec<UserCourseProgress>, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        items.validate()?;
        let rows: Vec<Map<String, Value>> = last_per_course(items)
            .into_iter()
            .map(|item| {
                let mut row = Map::new();
                row.insert("user_id".into(), json!(caller.id));
                row.insert("course_id".into(), json!(item.course_id));
                row.insert("completed_lessons".into(), json!(item.completed_lessons));
                row.insert("score".into(), json!(item.score));
                row
            })
            .collect();
        EntityManager::<UserCourseProgress, X>::new(exec)
            .bulk_upsert(&rows, SYNC_CONFLICT, SYNC_UPDATES, None)
            .await
    }
}

fn last_per_course(items: Vec<ProgressSync>) -> Vec<ProgressSync> {
    let mut seen = HashSet::new();
    let mut kept: Vec<ProgressSync> = items.into_iter().rev().filter(|i| seen.insert(i.course_id)).collect();
    kept.reverse();
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::executor::testing::RecordingExecutor;
    use crate::service::resource::fixtures;
    use uuid::Uuid;

    #[tokio::test]
    async fn sync_upserts_on_user_and_course() {
        let caller = fixtures::user(false);
        let mut exec = RecordingExecutor::default();
        let items = vec![
            ProgressSync { course_id: Uuid::new_v4(), completed_lessons: vec![Uuid::new_v4()], score: 10 },
            ProgressSync { course_id: Uuid::new_v4(), completed_lessons: vec![], score: 0 },
        ];
        ProgressService::sync(&mut exec, items, &caller).await.unwrap();

        assert_eq!(exec.statements.len(), 1);
        let stmt = &exec.statements[0];
        assert!(stmt.sql.contains("ON CONFLICT (\"user_id\", \"course_id\") DO UPDATE"));
        assert_eq!(stmt.params, 8);
        assert_eq!(exec.commits, 1);
    }

    #[tokio::test]
    async fn repeated_course_keeps_the_last_item() {
        let caller = fixtures::user(false);
        let course = Uuid::new_v4();
        let other = Uuid::new_v4();
        let mut exec = RecordingExecutor::default();
        let items = vec![
            ProgressSync { course_id: course, completed_lessons: vec![], score: 1 },
            ProgressSync { course_id: other, completed_lessons: vec![], score: 5 },
            ProgressSync { course_id: course, completed_lessons: vec![Uuid::new_v4()], score: 9 },
        ];
        ProgressService::sync(&mut exec, items, &caller).await.unwrap();

        assert_eq!(exec.statements.len(), 1);
        assert_eq!(exec.statements[0].params, 8);

        let kept = last_per_course(vec![
            ProgressSync { course_id: course, completed_lessons: vec![], score: 1 },
            ProgressSync { course_id: other, completed_lessons: vec![], score: 5 },
            ProgressSync { course_id: course, completed_lessons: vec![], score: 9 },
        ]);
        let scores: Vec<(Uuid, i32)> = kept.iter().map(|i| (i.course_id, i.score)).collect();
        assert_eq!(scores, vec![(other, 5), (course, 9)]);
    }

    #[tokio::test]
    async fn empty_sync_is_a_no_op() {
        let mut exec = RecordingExecutor::default();
        let out = ProgressService::sync(&mut exec, vec![], &fixtures::user(false)).await.unwrap();
        assert!(out.is_empty());
        assert!(exec.statements.is_empty());
    }

    #[tokio::test]
    async fn mine_filters_on_the_caller() {
        let caller = fixtures::user(false);
        let mut exec = RecordingExecutor::default();
        ProgressService::mine(&mut exec, ListParams::default(), &caller).await.unwrap();
        assert!(exec.statements[0].sql.contains("WHERE \"user_id\" = $1::uuid"));
    }
}
