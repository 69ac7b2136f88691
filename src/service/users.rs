//! Account self-service and superuser user administration.

use serde_json::{json, Value};
use uuid::Uuid;

use super::executor::QueryExecutor;
use super::manager::EntityManager;
use crate::auth::password::hash_password;
use crate::error::AppError;
use crate::model::{Entity, User, UserProfile};
use crate::schemas::users::{ProfileWrite, UserEmail, UserUpdate, UserWithProfile};
use crate::schemas::{into_payload, Validate};
use crate::sql::Filter;

pub struct UserService;

impl UserService {
    pub async fn update_me<X>(exec: &mut X, caller: &User, input: UserUpdate) -> Result<User, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        input.validate()?;
        let mut payload = serde_json::Map::new();
        if let Some(email) = input.email {
            payload.insert("email".into(), json!(email.trim().to_lowercase()));
        }
        if let Some(username) = input.username {
            payload.insert("username".into(), json!(username));
        }
        if let Some(password) = input.password {
            payload.insert("hashed_password".into(), json!(hash_password(&password).await?));
        }
        let user = EntityManager::<User, X>::new(exec)
            .update_by_id(&caller.id, &payload)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {} not found", caller.id)))?;
        exec.commit().await?;
        Ok(user)
    }

    async fn profile_of<X>(exec: &mut X, user_id: Uuid) -> Result<Option<UserProfile>, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        let filters: Vec<Filter> = Filter::parse(UserProfile::TABLE, "user_id", json!(user_id))?
            .into_iter()
            .collect();
        let mut found = EntityManager::<UserProfile, X>::new(exec).search(&[], None, &filters).await?;
        Ok(found.pop())
    }

    pub async fn me_with_profile<X>(exec: &mut X, caller: User) -> Result<UserWithProfile, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        let user_profile = Self::profile_of(exec, caller.id).await?;
        Ok(UserWithProfile { user: caller, user_profile })
    }

    /// Create the caller's profile, or overwrite it when one exists.
    pub async fn upsert_profile<X>(exec: &mut X, caller: &User, input: ProfileWrite) -> Result<UserProfile, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        input.validate()?;
        let (_, mut payload) = into_payload(&input)?;
        let existing = Self::profile_of(exec, caller.id).await?;
        let mut manager = EntityManager::<UserProfile, X>::new(exec);
        let profile = match existing {
            Some(p) => manager
                .update_by_id(&p.id, &payload)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("user_profile {} not found", p.id)))?,
            None => {
                payload.insert("user_id".into(), Value::String(caller.id.to_string()));
                manager.create(&payload).await?
            }
        };
        drop(manager);
        exec.commit().await?;
        Ok(profile)
    }

    pub async fn get<X>(exec: &mut X, id: Uuid) -> Result<User, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        EntityManager::<User, X>::new(exec)
            .get_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user {} not found", id)))
    }

    pub async fn email_of<X>(exec: &mut X, id: Uuid) -> Result<UserEmail, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        Ok(Self::get(exec, id).await?.into())
    }

    pub async fn delete<X>(exec: &mut X, id: Uuid) -> Result<(), AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        Self::get(exec, id).await?;
        EntityManager::<User, X>::new(exec).delete_by_id(&id).await?;
        exec.commit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::executor::testing::RecordingExecutor;
    use crate::service::resource::fixtures;

    fn profile_row(id: Uuid, user_id: Uuid) -> Value {
        json!({
            "id": id,
            "user_id": user_id,
            "first_name": "Ada",
            "last_name": null,
            "avatar_url": null,
            "bio": null,
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": "2024-01-01T00:00:00+00:00",
        })
    }

    #[tokio::test]
    async fn first_profile_write_inserts_with_caller_id() {
        let caller = fixtures::user(false);
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![]).reply(vec![profile_row(Uuid::new_v4(), caller.id)]);
        let input = ProfileWrite { first_name: Some("Ada".into()), ..Default::default() };
        let profile = UserService::upsert_profile(&mut exec, &caller, input).await.unwrap();
        assert_eq!(profile.user_id, caller.id);
        assert_eq!(exec.verbs(), vec!["SELECT", "INSERT"]);
        assert!(exec.statements[1].sql.contains("\"user_id\""));
        assert_eq!(exec.commits, 1);
    }

    #[tokio::test]
    async fn existing_profile_is_updated() {
        let caller = fixtures::user(false);
        let profile_id = Uuid::new_v4();
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![profile_row(profile_id, caller.id)])
            .reply(vec![profile_row(profile_id, caller.id)]);
        UserService::upsert_profile(&mut exec, &caller, ProfileWrite::default()).await.unwrap();
        assert_eq!(exec.verbs(), vec!["SELECT", "UPDATE"]);
    }

    #[tokio::test]
    async fn email_of_missing_user_is_not_found() {
        let mut exec = RecordingExecutor::default();
        let err = UserService::email_of(&mut exec, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn profile_is_null_when_absent() {
        let caller = fixtures::user(false);
        let mut exec = RecordingExecutor::default();
        let out = UserService::me_with_profile(&mut exec, caller).await.unwrap();
        let json = serde_json::to_value(&out).unwrap();
        assert!(json["user_profile"].is_null());
        assert_eq!(json["email"], "owner@example.com");
    }
}
