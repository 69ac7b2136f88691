use axum::extract::rejection::QueryRejection;
use axum::extract::Query;
use axum::response::IntoResponse;

use super::list_params;
use crate::error::AppError;
use crate::extractors::{CurrentUser, Db};
use crate::response::success_many;
use crate::service::BusinessService;

/// Businesses owned by the caller; regular list filters still apply.
pub async fn yours(
    CurrentUser(user): CurrentUser,
    Db(mut db): Db,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let listing = BusinessService::yours(&mut db, list_params(query)?, &user).await?;
    Ok(success_many(listing.items, Some(listing.pagination)))
}
