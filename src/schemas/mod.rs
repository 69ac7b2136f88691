//! Request/response shapes shared by every resource, plus per-entity write payloads.

pub mod business;
pub mod education;
pub mod users;
pub mod validation;

pub use validation::Validate;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppError;
use crate::sql::{FilterOp, Pagination, DEFAULT_PER_PAGE, MAX_PER_PAGE};

/// POST body: `{"data": [...]}`.
#[derive(Debug, Deserialize)]
pub struct DataBatch<T> {
    pub data: Vec<T>,
}

/// DELETE body: `{"id": [...]}`.
#[derive(Debug, Deserialize)]
pub struct IdBatch {
    pub id: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub deleted: u64,
}

/// Serialize a write payload into column/value pairs. Returns the optional
/// `id` separately so callers can dispatch between insert and update.
pub fn into_payload<T: Serialize>(item: &T) -> Result<(Option<Value>, Map<String, Value>), AppError> {
    match serde_json::to_value(item).map_err(|e| AppError::Internal(e.to_string()))? {
        Value::Object(mut map) => {
            let id = map.remove("id").filter(|v| !v.is_null());
            Ok((id, map))
        }
        _ => Err(AppError::Internal("payload did not serialize to an object".into())),
    }
}

/// Parsed list query string: reserved keys plus every remaining key as a raw filter.
#[derive(Debug, Default, PartialEq)]
pub struct ListParams {
    pub pagination: Pagination,
    pub order_by: Vec<String>,
    pub search: Option<String>,
    pub filters: Vec<(String, Value)>,
}

fn parse_positive(key: &str, raw: &str) -> Result<u32, AppError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::Validation(format!("{} must be a positive integer", key))),
    }
}

impl ListParams {
    /// Build from raw `(key, value)` pairs. `in`/`notin` keys may repeat; their
    /// values are merged into one list. Other keys become one filter each.
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self, AppError> {
        let mut out = ListParams::default();
        let mut per_page = DEFAULT_PER_PAGE;
        for (key, raw) in pairs {
            match key.as_str() {
                "page" => out.pagination.page = parse_positive("page", &raw)?,
                "per_page" => per_page = parse_positive("per_page", &raw)?,
                "order_by" => out.order_by.push(raw),
                "search" => {
                    if !raw.trim().is_empty() {
                        out.search = Some(raw);
                    }
                }
                _ => out.push_filter(key, raw),
            }
        }
        out.pagination.per_page = per_page.min(MAX_PER_PAGE);
        Ok(out)
    }

    fn push_filter(&mut self, key: String, raw: String) {
        let is_list = key
            .rsplit_once("__")
            .and_then(|(_, suffix)| FilterOp::from_suffix(suffix))
            .is_some_and(FilterOp::takes_list);
        if !is_list {
            self.filters.push((key, Value::String(raw)));
            return;
        }
        let items = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Value::String(s.to_string()));
        match self.filters.iter_mut().find(|(k, _)| *k == key) {
            Some((_, Value::Array(existing))) => existing.extend(items),
            _ => self.filters.push((key, Value::Array(items.collect()))),
        }
    }

    /// Add the resource's search filter (`field__ilike`) when `search` was given.
    pub fn with_search(mut self, search_field: Option<&str>) -> Self {
        if let (Some(field), Some(term)) = (search_field, self.search.take()) {
            self.filters.push((format!("{}__ilike", field), Value::String(term)));
        }
        self
    }
}
