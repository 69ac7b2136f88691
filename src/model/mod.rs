//! Entity field registry: every table declares its columns once, statically.

pub mod business;
pub mod education;
pub mod users;

pub use business::*;
pub use education::*;
pub use users::*;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Column storage type; drives parameter casts and query-string coercion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Uuid,
    Text,
    Int,
    BigInt,
    Float,
    Bool,
    Timestamptz,
    Json,
}

impl ColumnType {
    /// PostgreSQL type used in `$n::type` casts.
    pub fn pg_cast(self) -> &'static str {
        match self {
            ColumnType::Uuid => "uuid",
            ColumnType::Text => "text",
            ColumnType::Int => "int4",
            ColumnType::BigInt => "int8",
            ColumnType::Float => "float8",
            ColumnType::Bool => "bool",
            ColumnType::Timestamptz => "timestamptz",
            ColumnType::Json => "jsonb",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub ty: ColumnType,
    /// False for columns the database maintains (created_at, updated_at).
    pub writable: bool,
}

impl ColumnDef {
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef { name, ty, writable: true }
    }

    pub const fn read_only(name: &'static str, ty: ColumnType) -> Self {
        ColumnDef { name, ty, writable: false }
    }
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub pk: &'static str,
    pub columns: &'static [ColumnDef],
    /// Table carries `created_at`/`updated_at`; updates bump `updated_at`.
    pub timestamps: bool,
    /// Text ordering uses the embedded number first ("Lesson 2" < "Lesson 10").
    pub natural_sort: bool,
}

impl TableDef {
    pub fn column(&'static self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn pk_column(&'static self) -> &'static ColumnDef {
        self.column(self.pk).unwrap_or(&self.columns[0])
    }
}

/// A mapped record type. Rows come back from the executor as JSON objects
/// keyed by column name and are deserialized into `Self`.
pub trait Entity: DeserializeOwned + Send + Sync + 'static {
    type Id: Serialize + Send + Sync;

    const TABLE: &'static TableDef;
}

/// Columns shared by every table with generated ids and timestamps.
macro_rules! table_columns {
    ($($col:expr),* $(,)?) => {
        &[
            $crate::model::ColumnDef::new("id", $crate::model::ColumnType::Uuid),
            $($col,)*
            $crate::model::ColumnDef::read_only("created_at", $crate::model::ColumnType::Timestamptz),
            $crate::model::ColumnDef::read_only("updated_at", $crate::model::ColumnType::Timestamptz),
        ]
    };
}
pub(crate) use table_columns;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lookup_is_by_exact_name() {
        let table = Course::TABLE;
        assert!(table.column("title").is_some());
        assert!(table.column("Title").is_none());
        assert_eq!(table.pk_column().ty, ColumnType::Uuid);
    }

    #[test]
    fn timestamps_are_read_only() {
        let created = Lesson::TABLE.column("created_at").unwrap();
        assert!(!created.writable);
        assert!(Lesson::TABLE.column("name").unwrap().writable);
    }

    #[test]
    fn natural_sort_applies_to_lessons_and_courses_only() {
        assert!(Lesson::TABLE.natural_sort);
        assert!(Course::TABLE.natural_sort);
        assert!(!CourseCategory::TABLE.natural_sort);
        assert!(!Business::TABLE.natural_sort);
    }
}
