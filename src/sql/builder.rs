//! Builds parameterized SELECT, INSERT, UPDATE, UPSERT and DELETE statements
//! from a table's field registry. Identifiers only ever come from the
//! registry; values are always parameters.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::filter::{where_clause, Filter};
use super::order::{order_clause, OrderDirective};
use super::params::PgBindValue;
use crate::error::AppError;
use crate::model::{ColumnDef, TableDef};

/// PostgreSQL caps a statement at 65 535 bind parameters; 3276 rows of 20
/// columns stay under it.
pub const DEFAULT_BATCH_SIZE: usize = 3276;

pub const DEFAULT_PER_PAGE: u32 = 100;
pub const MAX_PER_PAGE: u32 = 1000;

/// Quote identifier for PostgreSQL (safe: only from the registry).
pub(crate) fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    pub(crate) fn push_param(&mut self, v: PgBindValue) -> usize {
        self.params.push(v);
        self.params.len()
    }

    /// `$n::type` for a value destined to `col`.
    fn placeholder(&mut self, v: PgBindValue, col: &ColumnDef) -> String {
        let n = self.push_param(v);
        format!("${}::{}", n, col.ty.pg_cast())
    }
}

/// 1-based page number and page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: 1, per_page: DEFAULT_PER_PAGE }
    }
}

impl Pagination {
    pub fn limit(&self) -> u32 {
        self.per_page
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

fn column_list(table: &TableDef) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Look up a payload key, rejecting unknown and database-maintained columns.
fn writable_column(table: &'static TableDef, key: &str) -> Result<&'static ColumnDef, AppError> {
    let col = table
        .column(key)
        .ok_or_else(|| AppError::Validation(format!("unknown field `{}` for {}", key, table.name)))?;
    if !col.writable {
        return Err(AppError::Validation(format!("field `{}` is read-only", key)));
    }
    Ok(col)
}

fn bind(col: &ColumnDef, v: &Value) -> Result<PgBindValue, AppError> {
    PgBindValue::for_column(v, col.ty).map_err(|e| AppError::Validation(format!("{}: {}", col.name, e)))
}

/// SELECT with filters, ordering and optional LIMIT/OFFSET.
pub fn select(
    table: &'static TableDef,
    filters: &[Filter],
    order: &[OrderDirective],
    page: Option<Pagination>,
) -> QueryBuf {
    let mut q = QueryBuf::default();
    let where_sql = where_clause(filters, &mut q);
    let order_sql = order_clause(table, order);
    let page_sql = page
        .map(|p| format!(" LIMIT {} OFFSET {}", p.limit(), p.offset()))
        .unwrap_or_default();
    q.sql = format!(
        "SELECT {} FROM {}{}{}{}",
        column_list(table),
        quoted(table.name),
        where_sql,
        order_sql,
        page_sql
    );
    q
}

pub fn count(table: &'static TableDef, filters: &[Filter]) -> QueryBuf {
    let mut q = QueryBuf::default();
    let where_sql = where_clause(filters, &mut q);
    q.sql = format!("SELECT COUNT(*) AS \"count\" FROM {}{}", quoted(table.name), where_sql);
    q
}

pub fn select_by_id(table: &'static TableDef, id: PgBindValue) -> QueryBuf {
    let mut q = QueryBuf::default();
    let ph = q.placeholder(id, table.pk_column());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        column_list(table),
        quoted(table.name),
        quoted(table.pk),
        ph
    );
    q
}

/// INSERT one row; keys absent from the payload take the column default.
pub fn insert(table: &'static TableDef, payload: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::default();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (key, v) in payload {
        let col = writable_column(table, key)?;
        let value = bind(col, v)?;
        cols.push(quoted(col.name));
        placeholders.push(q.placeholder(value, col));
    }
    let values = if cols.is_empty() {
        "DEFAULT VALUES".to_string()
    } else {
        format!("({}) VALUES ({})", cols.join(", "), placeholders.join(", "))
    };
    q.sql = format!(
        "INSERT INTO {} {} RETURNING {}",
        quoted(table.name),
        values,
        column_list(table)
    );
    Ok(q)
}

/// Columns named by any row, in registry order.
fn union_columns(table: &'static TableDef, rows: &[Map<String, Value>]) -> Result<Vec<&'static ColumnDef>, AppError> {
    let mut named = BTreeSet::new();
    for row in rows {
        for key in row.keys() {
            writable_column(table, key)?;
            named.insert(key.as_str());
        }
    }
    Ok(table.columns.iter().filter(|c| named.contains(c.name)).collect())
}

fn values_rows(
    q: &mut QueryBuf,
    cols: &[&'static ColumnDef],
    rows: &[Map<String, Value>],
) -> Result<String, AppError> {
    let mut tuples = Vec::with_capacity(rows.len());
    for row in rows {
        let mut cells = Vec::with_capacity(cols.len());
        for col in cols {
            match row.get(col.name) {
                Some(v) => {
                    let value = bind(col, v)?;
                    cells.push(q.placeholder(value, col));
                }
                None => cells.push("DEFAULT".to_string()),
            }
        }
        tuples.push(format!("({})", cells.join(", ")));
    }
    Ok(tuples.join(", "))
}

/// Multi-row INSERT. Callers skip empty input; an empty slice still yields a
/// valid single-row `DEFAULT VALUES` statement.
pub fn insert_many(table: &'static TableDef, rows: &[Map<String, Value>]) -> Result<QueryBuf, AppError> {
    let cols = union_columns(table, rows)?;
    if cols.is_empty() {
        return insert(table, &Map::new());
    }
    let mut q = QueryBuf::default();
    let tuples = values_rows(&mut q, &cols, rows)?;
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES {} RETURNING {}",
        quoted(table.name),
        cols.iter().map(|c| quoted(c.name)).collect::<Vec<_>>().join(", "),
        tuples,
        column_list(table)
    );
    Ok(q)
}

/// UPDATE by id: SET only the payload's columns (the pk key is ignored) and
/// bump `updated_at` on timestamped tables.
pub fn update(table: &'static TableDef, id: PgBindValue, payload: &Map<String, Value>) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::default();
    let mut sets = Vec::new();
    for (key, v) in payload {
        if key == table.pk {
            continue;
        }
        let col = writable_column(table, key)?;
        let value = bind(col, v)?;
        sets.push(format!("{} = {}", quoted(col.name), q.placeholder(value, col)));
    }
    if table.timestamps {
        sets.push(format!("{} = NOW()", quoted("updated_at")));
    }
    let pk_ph = q.placeholder(id, table.pk_column());
    if sets.is_empty() {
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = {}",
            column_list(table),
            quoted(table.name),
            quoted(table.pk),
            pk_ph
        );
        return Ok(q);
    }
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        sets.join(", "),
        quoted(table.pk),
        pk_ph,
        column_list(table)
    );
    Ok(q)
}

pub fn delete_by_id(table: &'static TableDef, id: PgBindValue) -> QueryBuf {
    let mut q = QueryBuf::default();
    let ph = q.placeholder(id, table.pk_column());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {} RETURNING {}",
        quoted(table.name),
        quoted(table.pk),
        ph,
        quoted(table.pk)
    );
    q
}

/// DELETE every row whose pk is in `ids`. Returns the deleted pks.
pub fn delete_in(table: &'static TableDef, ids: Vec<PgBindValue>) -> QueryBuf {
    let mut q = QueryBuf::default();
    let pk = table.pk_column();
    let placeholders: Vec<String> = ids.into_iter().map(|id| q.placeholder(id, pk)).collect();
    let predicate = if placeholders.is_empty() {
        "FALSE".to_string()
    } else {
        format!("{} IN ({})", quoted(table.pk), placeholders.join(", "))
    };
    q.sql = format!(
        "DELETE FROM {} WHERE {} RETURNING {}",
        quoted(table.name),
        predicate,
        quoted(table.pk)
    );
    q
}

/// Multi-row `INSERT ... ON CONFLICT (keys) DO UPDATE SET c = EXCLUDED.c`.
/// With no update columns conflicting rows are left alone (`DO NOTHING`).
pub fn upsert(
    table: &'static TableDef,
    rows: &[Map<String, Value>],
    conflict: &[&str],
    update_columns: &[&str],
) -> Result<QueryBuf, AppError> {
    for key in conflict.iter().chain(update_columns) {
        writable_column(table, key)?;
    }
    let cols = union_columns(table, rows)?;
    let mut q = QueryBuf::default();
    let tuples = values_rows(&mut q, &cols, rows)?;
    let mut sets: Vec<String> = update_columns
        .iter()
        .map(|c| format!("{} = EXCLUDED.{}", quoted(c), quoted(c)))
        .collect();
    let action = if sets.is_empty() {
        "DO NOTHING".to_string()
    } else {
        if table.timestamps {
            sets.push(format!("{} = NOW()", quoted("updated_at")));
        }
        format!("DO UPDATE SET {}", sets.join(", "))
    };
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES {} ON CONFLICT ({}) {} RETURNING {}",
        quoted(table.name),
        cols.iter().map(|c| quoted(c.name)).collect::<Vec<_>>().join(", "),
        tuples,
        conflict.iter().map(|c| quoted(c)).collect::<Vec<_>>().join(", "),
        action,
        column_list(table)
    );
    Ok(q)
}
