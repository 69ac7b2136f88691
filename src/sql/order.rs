//! Sort directives (`field` / `-field`) and natural ordering of labels.

use super::builder::quoted;
use crate::error::AppError;
use crate::model::{ColumnDef, ColumnType, TableDef};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderDirective {
    pub column: &'static ColumnDef,
    pub descending: bool,
}

impl OrderDirective {
    pub fn parse(table: &'static TableDef, directive: &str) -> Result<Self, AppError> {
        let directive = directive.trim();
        let (name, descending) = match directive.strip_prefix('-') {
            Some(rest) => (rest, true),
            None => (directive, false),
        };
        let column = table
            .column(name)
            .ok_or_else(|| AppError::InvalidFilter(format!("cannot order {} by unknown field `{}`", table.name, name)))?;
        Ok(OrderDirective { column, descending })
    }

    fn render(&self, table: &TableDef) -> String {
        let col = quoted(self.column.name);
        let dir = if self.descending { "DESC" } else { "ASC" };
        if table.natural_sort && self.column.ty == ColumnType::Text {
            format!("CAST(SUBSTRING({col} FROM '[0-9]+') AS NUMERIC) {dir}, {col} {dir}")
        } else {
            format!("{col} {dir}")
        }
    }
}

/// Parse `order_by` values; each may itself be a comma-separated list.
pub fn parse_order_by<S: AsRef<str>>(table: &'static TableDef, raw: &[S]) -> Result<Vec<OrderDirective>, AppError> {
    raw.iter()
        .flat_map(|s| s.as_ref().split(','))
        .filter(|s| !s.trim().is_empty())
        .map(|s| OrderDirective::parse(table, s))
        .collect()
}

/// `ORDER BY` in listed order, then the primary key so pages are stable.
pub(crate) fn order_clause(table: &'static TableDef, directives: &[OrderDirective]) -> String {
    let mut parts: Vec<String> = directives.iter().map(|d| d.render(table)).collect();
    if !directives.iter().any(|d| d.column.name == table.pk) {
        parts.push(format!("{} ASC", quoted(table.pk)));
    }
    format!(" ORDER BY {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Business, Entity, Lesson};
    use std::cmp::Ordering;

    /// Mirrors the natural `ORDER BY` that `render` emits for text columns:
    /// `CAST(SUBSTRING(col FROM '[0-9]+') AS NUMERIC)` compares the first run of
    /// digits numerically, then `col` breaks ties. Labels without digits give
    /// `NULL`, which PostgreSQL sorts last in ascending order.
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct NaturalKey {
        no_number: bool,
        digits: String,
        label: String,
    }

    impl Ord for NaturalKey {
        fn cmp(&self, other: &Self) -> Ordering {
            self.no_number
                .cmp(&other.no_number)
                .then_with(|| self.digits.len().cmp(&other.digits.len()))
                .then_with(|| self.digits.cmp(&other.digits))
                .then_with(|| self.label.cmp(&other.label))
        }
    }

    impl PartialOrd for NaturalKey {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    fn natural_sort_key(label: &str) -> NaturalKey {
        let digits: String = label
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let trimmed = digits.trim_start_matches('0');
        let digits = if trimmed.is_empty() && !digits.is_empty() { "0" } else { trimmed };
        NaturalKey {
            no_number: digits.is_empty(),
            digits: digits.to_string(),
            label: label.to_string(),
        }
    }

    #[test]
    fn directives_compare_by_column_and_direction() {
        let name = Business::TABLE.column("name").unwrap();
        assert_eq!(
            OrderDirective::parse(Business::TABLE, "-name").unwrap(),
            OrderDirective { column: name, descending: true }
        );
        assert_ne!(
            OrderDirective::parse(Business::TABLE, "name").unwrap(),
            OrderDirective::parse(Business::TABLE, "-name").unwrap()
        );
    }

    #[test]
    fn floors_sort_numerically() {
        let mut floors = vec!["Floor 2", "Floor 10", "Floor 1"];
        floors.sort_by_key(|s| natural_sort_key(s));
        assert_eq!(floors, vec!["Floor 1", "Floor 2", "Floor 10"]);
    }

    #[test]
    fn labels_without_numbers_sort_last() {
        let mut labels = vec!["Intro", "Lesson 3", "Lesson 007"];
        labels.sort_by_key(|s| natural_sort_key(s));
        assert_eq!(labels, vec!["Lesson 3", "Lesson 007", "Intro"]);
    }

    #[test]
    fn directives_render_in_listed_order() {
        let order = parse_order_by(Business::TABLE, &["-expected_revenue", "name"]).unwrap();
        assert_eq!(
            order_clause(Business::TABLE, &order),
            " ORDER BY \"expected_revenue\" DESC, \"name\" ASC, \"id\" ASC"
        );
    }

    #[test]
    fn comma_lists_split_and_pk_is_not_repeated() {
        let order = parse_order_by(Business::TABLE, &["name,-id"]).unwrap();
        assert_eq!(order.len(), 2);
        assert_eq!(order_clause(Business::TABLE, &order), " ORDER BY \"name\" ASC, \"id\" DESC");
    }

    #[test]
    fn natural_tables_order_text_by_embedded_number() {
        let order = parse_order_by(Lesson::TABLE, &["-name"]).unwrap();
        assert_eq!(
            order_clause(Lesson::TABLE, &order),
            " ORDER BY CAST(SUBSTRING(\"name\" FROM '[0-9]+') AS NUMERIC) DESC, \"name\" DESC, \"id\" ASC"
        );
    }

    #[test]
    fn unknown_sort_field_is_rejected() {
        let err = parse_order_by(Business::TABLE, &["-colour"]).unwrap_err();
        assert!(matches!(err, AppError::InvalidFilter(_)));
    }
}
