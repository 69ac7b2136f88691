//! HTTP handlers. Each one extracts, delegates to a service and wraps the result in the envelope.

pub mod auth;
pub mod business;
pub mod education;
pub mod resource;
pub mod users;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;

use crate::error::AppError;
use crate::schemas::ListParams;

pub(crate) fn body<T>(extracted: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    extracted
        .map(|Json(v)| v)
        .map_err(|e| AppError::Validation(e.body_text()))
}

pub(crate) fn path<T>(extracted: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    extracted
        .map(|Path(v)| v)
        .map_err(|e| AppError::BadRequest(e.body_text()))
}

pub(crate) fn list_params(
    extracted: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<ListParams, AppError> {
    let Query(pairs) = extracted.map_err(|e| AppError::BadRequest(e.body_text()))?;
    ListParams::from_pairs(pairs)
}
