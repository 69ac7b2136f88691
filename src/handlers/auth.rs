use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::{Form, Json};

use super::body;
use crate::auth::AuthService;
use crate::error::AppError;
use crate::extractors::{bearer_token, CurrentUser, Db};
use crate::response::{success_created, success_one};
use crate::schemas::users::{BearerToken, LoginForm, RegisterUser};

pub async fn register(
    Db(mut db): Db,
    payload: Result<Json<RegisterUser>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthService::register(&mut db, body(payload)?).await?;
    Ok(success_created(user))
}

/// OAuth2 password form; answers with a bare token object, not the envelope.
pub async fn login(
    Db(mut db): Db,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<BearerToken>, AppError> {
    let Form(form) = form.map_err(|e| AppError::Validation(e.body_text()))?;
    let access_token = AuthService::login(&mut db, form).await?;
    Ok(Json(BearerToken {
        access_token,
        token_type: "bearer",
    }))
}

pub async fn logout(
    CurrentUser(user): CurrentUser,
    Db(mut db): Db,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let token = bearer_token(&headers).ok_or(AppError::Unauthorized)?;
    AuthService::logout(&mut db, token).await?;
    tracing::info!(user_id = %user.id, "logged out");
    Ok(success_one(serde_json::Value::Null))
}
