use crate::error::SchemaError;
use std::collections::HashMap;

/// An attribute of a table, as reported by one engine's
/// `information_schema.columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    /// `character_maximum_length`. 0 means "no bound" (numeric, boolean,
    /// timestamp, unbounded text) — a null length maps here.
    pub max_chars: i64,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, max_chars: i64) -> Self {
        Column {
            name: name.into(),
            data_type: data_type.into(),
            max_chars: max_chars.max(0),
        }
    }

    /// `self` (source) is compatible with `other` (destination) iff both are
    /// unbounded, or both are bounded and `self` is strictly narrower. The
    /// strict inequality mirrors the source-side `LENGTH(col) > max` probe,
    /// where `max` is the destination's exclusive bound.
    pub fn compatible(&self, other: &Column) -> bool {
        if self.max_chars == 0 && other.max_chars == 0 {
            return true;
        }
        self.max_chars > 0 && other.max_chars > 0 && self.max_chars < other.max_chars
    }

    pub fn incompatible(&self, other: &Column) -> bool {
        !self.compatible(other)
    }
}

/// A table's name and ordered column list, as seen by one engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Table {
            name: name.into(),
            columns,
        }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Exact-match lookup. Returns the column's position alongside it so
    /// callers (the scanner) can correlate scan slots with metadata.
    pub fn get_column(&self, name: &str) -> Option<(usize, &Column)> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .map(|i| (i, &self.columns[i]))
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A table name to `Table` mapping. Built once per top-level operation and
/// treated as immutable for its duration; iteration order is unspecified.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: HashMap<String, Table>,
}

impl Schema {
    pub fn new(tables: HashMap<String, Table>) -> Self {
        Schema { tables }
    }

    pub fn get_table(&self, name: &str) -> Result<&Table, SchemaError> {
        self.tables
            .get(name)
            .ok_or_else(|| SchemaError::TableNotFound(name.to_string()))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Builds a [`Schema`] from an engine's raw introspection rows, grouping by
/// table name. A missing/null string maps to the empty string by the time
/// it reaches here; a null `character_maximum_length` maps to 0.
pub fn build_schema<I>(rows: I) -> Schema
where
    I: IntoIterator<Item = (String, String, String, i64)>,
{
    let mut grouped: HashMap<String, Vec<Column>> = HashMap::new();
    for (table, column, data_type, max_chars) in rows {
        grouped
            .entry(table)
            .or_default()
            .push(Column::new(column, data_type, max_chars));
    }

    let tables = grouped
        .into_iter()
        .map(|(name, columns)| (name.clone(), Table::new(name, columns)))
        .collect();

    Schema::new(tables)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_unbounded_is_compatible() {
        let src = Column::new("bio", "text", 0);
        let dst = Column::new("bio", "text", 0);
        assert!(src.compatible(&dst));
    }

    #[test]
    fn strictly_narrower_is_compatible() {
        let src = Column::new("name", "varchar", 100);
        let dst = Column::new("name", "varchar", 255);
        assert!(src.compatible(&dst));
    }

    #[test]
    fn equal_widths_are_incompatible() {
        let src = Column::new("name", "varchar", 255);
        let dst = Column::new("name", "varchar", 255);
        assert!(src.incompatible(&dst));
    }

    #[test]
    fn one_bounded_one_unbounded_is_incompatible() {
        let src = Column::new("name", "varchar", 300);
        let dst = Column::new("name", "text", 0);
        assert!(src.incompatible(&dst));
    }

    #[test]
    fn build_schema_groups_by_table() {
        let rows = vec![
            ("t1".to_string(), "id".to_string(), "int".to_string(), 0),
            ("t1".to_string(), "name".to_string(), "varchar".to_string(), 255),
            ("t2".to_string(), "id".to_string(), "int".to_string(), 0),
        ];
        let schema = build_schema(rows);
        assert_eq!(schema.len(), 2);
        let t1 = schema.get_table("t1").unwrap();
        assert_eq!(t1.columns.len(), 2);
        assert!(t1.has_column("name"));
    }

    #[test]
    fn missing_table_is_an_error() {
        let schema = Schema::default();
        assert!(matches!(
            schema.get_table("ghost"),
            Err(SchemaError::TableNotFound(_))
        ));
    }
}
