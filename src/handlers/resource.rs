//! List / get / batch write / batch delete, generic over the resource and the
//! caller extractor that guards it.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use super::{body, list_params, path};
use crate::error::AppError;
use crate::extractors::{Caller, Db};
use crate::response::{success_created, success_many, success_one};
use crate::schemas::{DataBatch, Deleted, IdBatch};
use crate::service::{Resource, ResourceService};

pub async fn list<R, G>(
    _caller: G,
    Db(mut db): Db,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: Resource,
    G: Caller,
{
    let listing = ResourceService::list::<R, _>(&mut db, list_params(query)?, Vec::new()).await?;
    Ok(success_many(listing.items, Some(listing.pagination)))
}

pub async fn get_one<R, G>(
    _caller: G,
    Db(mut db): Db,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: Resource,
    G: Caller,
{
    let item = ResourceService::get::<R, _>(&mut db, path(id)?).await?;
    Ok(success_one(item))
}

pub async fn upsert<R, G>(
    caller: G,
    Db(mut db): Db,
    payload: Result<Json<DataBatch<R::Write>>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: Resource,
    G: Caller,
{
    let DataBatch { data } = body(payload)?;
    let rows = ResourceService::upsert_batch::<R, _>(&mut db, data, caller.user()).await?;
    tracing::info!(table = R::TABLE.name, rows = rows.len(), "batch written");
    Ok(success_created(rows))
}

pub async fn delete<R, G>(
    _caller: G,
    Db(mut db): Db,
    payload: Result<Json<IdBatch>, JsonRejection>,
) -> Result<impl IntoResponse, AppError>
where
    R: Resource,
    G: Caller,
{
    let IdBatch { id } = body(payload)?;
    let deleted = ResourceService::delete_batch::<R, _>(&mut db, id).await?;
    Ok(success_one(Deleted { deleted }))
}
