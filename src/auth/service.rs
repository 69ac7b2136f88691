use chrono::Utc;
use serde_json::{json, Map, Value};

use super::password::{hash_password, verify_password};
use super::token::{generate_token, is_expired};
use crate::error::AppError;
use crate::model::{AccessToken, Entity, User};
use crate::schemas::users::{LoginForm, RegisterUser};
use crate::schemas::Validate;
use crate::service::{EntityManager, QueryExecutor};
use crate::sql::Filter;

pub const REGISTER_USER_ALREADY_EXISTS: &str = "REGISTER_USER_ALREADY_EXISTS";
pub const LOGIN_BAD_CREDENTIALS: &str = "LOGIN_BAD_CREDENTIALS";

pub struct AuthService;

async fn find_user_by_email<X>(exec: &mut X, email: &str) -> Result<Option<User>, AppError>
where
    X: QueryExecutor + ?Sized,
{
    // Emails are stored lowercased.
    let filters: Vec<Filter> = Filter::parse(User::TABLE, "email", Value::String(email.to_lowercase()))?
        .into_iter()
        .collect();
    let mut found = EntityManager::<User, X>::new(exec).search(&[], None, &filters).await?;
    Ok(found.pop())
}

impl AuthService {
    pub async fn register<X>(exec: &mut X, input: RegisterUser) -> Result<User, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        input.validate()?;
        let email = input.email.trim().to_lowercase();
        if find_user_by_email(exec, &email).await?.is_some() {
            return Err(AppError::BadRequest(REGISTER_USER_ALREADY_EXISTS.into()));
        }
        let mut payload = Map::new();
        payload.insert("email".into(), json!(email));
        payload.insert("username".into(), json!(input.username));
        payload.insert("hashed_password".into(), json!(hash_password(&input.password).await?));
        let user = EntityManager::<User, X>::new(exec).create(&payload).await?;
        exec.commit().await?;
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Issue a new token for valid credentials of an active user.
    pub async fn login<X>(exec: &mut X, form: LoginForm) -> Result<String, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        let bad = || AppError::BadRequest(LOGIN_BAD_CREDENTIALS.into());
        let user = find_user_by_email(exec, form.username.trim()).await?.ok_or_else(bad)?;
        if !verify_password(&form.password, &user.hashed_password).await? || !user.is_active {
            tracing::info!(user_id = %user.id, "login rejected");
            return Err(bad());
        }
        let token = generate_token();
        let mut payload = Map::new();
        payload.insert("token".into(), json!(token));
        payload.insert("user_id".into(), json!(user.id));
        EntityManager::<AccessToken, X>::new(exec).create(&payload).await?;
        exec.commit().await?;
        tracing::info!(user_id = %user.id, "token issued");
        Ok(token)
    }

    pub async fn logout<X>(exec: &mut X, token: &str) -> Result<(), AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        EntityManager::<AccessToken, X>::new(exec).delete_by_id(&token.to_string()).await?;
        exec.commit().await
    }

    /// Resolve a bearer token to its active user; anything else is unauthorized.
    pub async fn authenticate<X>(exec: &mut X, token: &str, lifetime_seconds: u64) -> Result<User, AppError>
    where
        X: QueryExecutor + ?Sized,
    {
        let access = EntityManager::<AccessToken, X>::new(exec)
            .get_by_id(&token.to_string())
            .await?
            .ok_or(AppError::Unauthorized)?;
        if is_expired(access.created_at, lifetime_seconds, Utc::now()) {
            tracing::debug!(user_id = %access.user_id, "expired token");
            return Err(AppError::Unauthorized);
        }
        let user = EntityManager::<User, X>::new(exec)
            .get_by_id(&access.user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if !user.is_active {
            return Err(AppError::Unauthorized);
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::executor::testing::RecordingExecutor;
    use serde_json::json;
    use uuid::Uuid;

    fn user_row(id: Uuid, hashed_password: &str, is_active: bool) -> Value {
        json!({
            "id": id,
            "email": "ada@example.com",
            "username": null,
            "hashed_password": hashed_password,
            "is_active": is_active,
            "is_superuser": false,
            "is_verified": false,
            "created_at": "2024-01-01T00:00:00+00:00",
            "updated_at": "2024-01-01T00:00:00+00:00",
        })
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![user_row(Uuid::new_v4(), "x", true)]);
        let input = RegisterUser { email: "Ada@Example.com".into(), password: "pw12".into(), username: None };
        let err = AuthService::register(&mut exec, input).await.unwrap_err();
        assert_eq!(err.to_string(), REGISTER_USER_ALREADY_EXISTS);
        assert_eq!(exec.statements.len(), 1);
    }

    #[tokio::test]
    async fn login_with_wrong_password_is_bad_credentials() {
        let hash = hash_password("right").await.unwrap();
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![user_row(Uuid::new_v4(), &hash, true)]);
        let form = LoginForm { username: "ada@example.com".into(), password: "wrong".into() };
        let err = AuthService::login(&mut exec, form).await.unwrap_err();
        assert_eq!(err.to_string(), LOGIN_BAD_CREDENTIALS);
    }

    #[tokio::test]
    async fn inactive_user_cannot_log_in() {
        let hash = hash_password("right").await.unwrap();
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![user_row(Uuid::new_v4(), &hash, false)]);
        let form = LoginForm { username: "ada@example.com".into(), password: "right".into() };
        assert!(AuthService::login(&mut exec, form).await.is_err());
    }

    #[tokio::test]
    async fn login_persists_a_token() {
        let hash = hash_password("right").await.unwrap();
        let id = Uuid::new_v4();
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![user_row(id, &hash, true)]);
        exec.reply(vec![json!({"token": "t", "user_id": id, "created_at": "2024-01-01T00:00:00+00:00"})]);
        let form = LoginForm { username: "ada@example.com".into(), password: "right".into() };
        let token = AuthService::login(&mut exec, form).await.unwrap();
        assert_eq!(token.len(), 43);
        assert!(exec.statements[1].sql.starts_with("INSERT INTO \"access_token\""));
        assert_eq!(exec.commits, 1);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let mut exec = RecordingExecutor::default();
        let err = AuthService::authenticate(&mut exec, "nope", 3600).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let mut exec = RecordingExecutor::default();
        exec.reply(vec![json!({"token": "t", "user_id": Uuid::new_v4(), "created_at": "2000-01-01T00:00:00+00:00"})]);
        let err = AuthService::authenticate(&mut exec, "t", 3600).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
        assert_eq!(exec.statements.len(), 1);
    }
}
