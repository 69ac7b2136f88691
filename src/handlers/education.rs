use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::Query;
use axum::response::IntoResponse;
use axum::Json;

use super::{body, list_params};
use crate::error::AppError;
use crate::extractors::{CurrentUser, Db};
use crate::response::{success_created, success_many};
use crate::schemas::education::ProgressSync;
use crate::schemas::DataBatch;
use crate::service::ProgressService;

pub async fn my_progress(
    CurrentUser(user): CurrentUser,
    Db(mut db): Db,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let listing = ProgressService::mine(&mut db, list_params(query)?, &user).await?;
    Ok(success_many(listing.items, Some(listing.pagination)))
}

pub async fn sync_progress(
    CurrentUser(user): CurrentUser,
    Db(mut db): Db,
    payload: Result<Json<DataBatch<ProgressSync>>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let DataBatch { data } = body(payload)?;
    let rows = ProgressService::sync(&mut db, data, &user).await?;
    Ok(success_created(rows))
}
