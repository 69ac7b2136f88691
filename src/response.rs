//! Standard response envelope helpers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

use crate::sql::Pagination;

#[derive(Serialize)]
pub struct Envelope<T> {
    pub code: String,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PaginationInfo {
    pub total_items: u64,
    pub page: u32,
    pub items_per_page: u32,
    pub next_page: Option<u32>,
    pub prev_page: Option<u32>,
    pub total_pages: u64,
}

impl PaginationInfo {
    pub fn new(pagination: Pagination, total: u64) -> Self {
        let page = pagination.page;
        let per_page = pagination.per_page;
        let is_last_page = u64::from(page) * u64::from(per_page) >= total;
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(u64::from(per_page))
        };
        PaginationInfo {
            total_items: total,
            page,
            items_per_page: per_page,
            next_page: if is_last_page { None } else { Some(page + 1) },
            prev_page: if page > 1 { Some(page - 1) } else { None },
            total_pages,
        }
    }
}

fn envelope<T: Serialize>(status: StatusCode, data: T, pagination: Option<PaginationInfo>) -> (StatusCode, Json<Envelope<T>>) {
    (
        status,
        Json(Envelope {
            code: status.as_u16().to_string(),
            message: "Success".into(),
            data,
            pagination,
        }),
    )
}

pub fn success_one<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    envelope(StatusCode::OK, data, None)
}

pub fn success_created<T: Serialize>(data: T) -> (StatusCode, Json<Envelope<T>>) {
    envelope(StatusCode::CREATED, data, None)
}

pub fn success_many<T: Serialize>(data: Vec<T>, pagination: Option<PaginationInfo>) -> (StatusCode, Json<Envelope<Vec<T>>>) {
    envelope(StatusCode::OK, data, pagination)
}
