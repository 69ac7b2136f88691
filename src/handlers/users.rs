use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use super::{body, path};
use crate::error::AppError;
use crate::extractors::{CurrentUser, Db, SuperUser};
use crate::response::success_one;
use crate::schemas::users::{ProfileWrite, UserUpdate};
use crate::service::UserService;

pub async fn me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    success_one(user)
}

pub async fn update_me(
    CurrentUser(user): CurrentUser,
    Db(mut db): Db,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let updated = UserService::update_me(&mut db, &user, body(payload)?).await?;
    Ok(success_one(updated))
}

pub async fn profile(CurrentUser(user): CurrentUser, Db(mut db): Db) -> Result<impl IntoResponse, AppError> {
    Ok(success_one(UserService::me_with_profile(&mut db, user).await?))
}

pub async fn upsert_profile(
    CurrentUser(user): CurrentUser,
    Db(mut db): Db,
    payload: Result<Json<ProfileWrite>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let profile = UserService::upsert_profile(&mut db, &user, body(payload)?).await?;
    Ok(success_one(profile))
}

pub async fn email(
    _caller: CurrentUser,
    Db(mut db): Db,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_one(UserService::email_of(&mut db, path(id)?).await?))
}

pub async fn get_user(
    _admin: SuperUser,
    Db(mut db): Db,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    Ok(success_one(UserService::get(&mut db, path(id)?).await?))
}

pub async fn delete_user(
    SuperUser(admin): SuperUser,
    Db(mut db): Db,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let id = path(id)?;
    UserService::delete(&mut db, id).await?;
    tracing::info!(admin_id = %admin.id, user_id = %id, "user deleted");
    Ok(success_one(serde_json::json!({ "id": id })))
}
