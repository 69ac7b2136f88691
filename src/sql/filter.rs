//! Suffixed filter keys (`field__op`) parsed against a table's field registry.

use serde_json::Value;

use super::builder::{quoted, QueryBuf};
use super::params::PgBindValue;
use crate::error::AppError;
use crate::model::{ColumnDef, ColumnType, TableDef};

const OP_SEPARATOR: &str = "__";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
    Ne,
    Gte,
    Lte,
    In,
    NotIn,
    Is,
    IsNot,
    Like,
    ILike,
    IsNotNull,
    IsNull,
}

impl FilterOp {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "lt" => FilterOp::Lt,
            "le" => FilterOp::Le,
            "gt" => FilterOp::Gt,
            "ge" => FilterOp::Ge,
            "ne" => FilterOp::Ne,
            "gte" => FilterOp::Gte,
            "lte" => FilterOp::Lte,
            "in" => FilterOp::In,
            "notin" => FilterOp::NotIn,
            "is" => FilterOp::Is,
            "isnot" => FilterOp::IsNot,
            "like" => FilterOp::Like,
            "ilike" => FilterOp::ILike,
            "isnotnull" => FilterOp::IsNotNull,
            "isnull" => FilterOp::IsNull,
            _ => return None,
        })
    }

    /// Whether the query-string value may carry several comma-separated items.
    pub fn takes_list(self) -> bool {
        matches!(self, FilterOp::In | FilterOp::NotIn)
    }

    fn comparison(self) -> Option<&'static str> {
        Some(match self {
            FilterOp::Eq => "=",
            FilterOp::Lt => "<",
            FilterOp::Le | FilterOp::Lte => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge | FilterOp::Gte => ">=",
            FilterOp::Ne => "<>",
            _ => return None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
enum FilterArg {
    Single(PgBindValue),
    List(Vec<PgBindValue>),
    /// `NULL`, `TRUE` or `FALSE`; never user text.
    Keyword(&'static str),
    Pattern(String),
    Flag,
}

/// One predicate on one registered column, with its value already coerced.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub column: &'static ColumnDef,
    pub op: FilterOp,
    arg: FilterArg,
}

impl Filter {
    /// Parse `key` (`field` or `field__op`) against `table`. A null value
    /// drops the filter (`Ok(None)`); unknown fields or operators and values
    /// that do not fit the column are invalid filters.
    pub fn parse(table: &'static TableDef, key: &str, value: Value) -> Result<Option<Filter>, AppError> {
        let (field, op) = match table.column(key) {
            Some(_) => (key, FilterOp::Eq),
            None => match key.rsplit_once(OP_SEPARATOR) {
                Some((field, suffix)) => {
                    let op = FilterOp::from_suffix(suffix).ok_or_else(|| {
                        AppError::InvalidFilter(format!("unknown operator `{}` in `{}`", suffix, key))
                    })?;
                    (field, op)
                }
                None => (key, FilterOp::Eq),
            },
        };
        let column = table
            .column(field)
            .ok_or_else(|| AppError::InvalidFilter(format!("unknown field `{}` on {}", field, table.name)))?;
        if value.is_null() {
            return Ok(None);
        }
        let coerce = |v: &Value| {
            PgBindValue::for_column(v, column.ty).map_err(|e| AppError::InvalidFilter(format!("{}: {}", key, e)))
        };
        let arg = match op {
            FilterOp::In | FilterOp::NotIn => {
                let items = match &value {
                    Value::Array(items) => items.clone(),
                    Value::String(s) => s
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| Value::String(s.to_string()))
                        .collect(),
                    other => vec![other.clone()],
                };
                FilterArg::List(items.iter().map(coerce).collect::<Result<_, _>>()?)
            }
            FilterOp::Is | FilterOp::IsNot => FilterArg::Keyword(keyword(key, &value, column)?),
            FilterOp::Like => FilterArg::Pattern(scalar_text(key, &value)?),
            FilterOp::ILike => FilterArg::Pattern(format!("%{}%", scalar_text(key, &value)?)),
            FilterOp::IsNull | FilterOp::IsNotNull => FilterArg::Flag,
            _ => FilterArg::Single(coerce(&value)?),
        };
        Ok(Some(Filter { column, op, arg }))
    }

    /// Render the predicate, pushing its parameters onto `q`.
    pub(crate) fn render(&self, q: &mut QueryBuf) -> String {
        let col = quoted(self.column.name);
        let cast = self.column.ty.pg_cast();
        match (&self.arg, self.op) {
            (FilterArg::List(items), op) => {
                if items.is_empty() {
                    return if op == FilterOp::In { "FALSE" } else { "TRUE" }.to_string();
                }
                let placeholders: Vec<String> = items
                    .iter()
                    .map(|v| format!("${}::{}", q.push_param(v.clone()), cast))
                    .collect();
                let not = if op == FilterOp::NotIn { "NOT " } else { "" };
                format!("{} {}IN ({})", col, not, placeholders.join(", "))
            }
            (FilterArg::Keyword(kw), op) => {
                let not = if op == FilterOp::IsNot { "NOT " } else { "" };
                format!("{} IS {}{}", col, not, kw)
            }
            (FilterArg::Pattern(p), op) => {
                let n = q.push_param(PgBindValue::String(p.clone()));
                let like = if op == FilterOp::ILike { "ILIKE" } else { "LIKE" };
                format!("{}::text {} ${}", col, like, n)
            }
            (FilterArg::Flag, FilterOp::IsNotNull) => format!("{} IS NOT NULL", col),
            (FilterArg::Flag, _) => format!("{} IS NULL", col),
            (FilterArg::Single(v), op) => {
                let n = q.push_param(v.clone());
                format!("{} {} ${}::{}", col, op.comparison().unwrap_or("="), n, cast)
            }
        }
    }
}

/// `TRUE`/`FALSE` only apply to boolean columns; `NULL` applies to any.
fn keyword(key: &str, value: &Value, column: &ColumnDef) -> Result<&'static str, AppError> {
    let word = match value {
        Value::Bool(true) => "true".to_string(),
        Value::Bool(false) => "false".to_string(),
        Value::String(s) => s.trim().to_ascii_lowercase(),
        _ => String::new(),
    };
    let kw = match word.as_str() {
        "null" | "none" => return Ok("NULL"),
        "true" => "TRUE",
        "false" => "FALSE",
        _ => return Err(AppError::InvalidFilter(format!(
            "{} only accepts null, true or false, got {}",
            key, value
        ))),
    };
    if column.ty != ColumnType::Bool {
        return Err(AppError::InvalidFilter(format!(
            "{}: {} is not a boolean column",
            key, column.name
        )));
    }
    Ok(kw)
}

fn scalar_text(key: &str, value: &Value) -> Result<String, AppError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(_) | Value::Bool(_) => Ok(value.to_string()),
        _ => Err(AppError::InvalidFilter(format!("{} expects a text pattern", key))),
    }
}

/// Parse a whole filter map; null values are skipped.
pub fn parse_filters<I>(table: &'static TableDef, pairs: I) -> Result<Vec<Filter>, AppError>
where
    I: IntoIterator<Item = (String, Value)>,
{
    let mut out = Vec::new();
    for (key, value) in pairs {
        if let Some(f) = Filter::parse(table, &key, value)? {
            out.push(f);
        }
    }
    Ok(out)
}

/// `WHERE` clause joining every predicate with `AND`; empty when none.
pub(crate) fn where_clause(filters: &[Filter], q: &mut QueryBuf) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let parts: Vec<String> = filters.iter().map(|f| f.render(q)).collect();
    format!(" WHERE {}", parts.join(" AND "))
}
