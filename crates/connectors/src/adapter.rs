use async_trait::async_trait;
use model::Value;

use crate::error::DbError;

/// `(table_name, column_name, data_type, character_maximum_length)`, as
/// returned verbatim by the engine's `information_schema.columns` query.
pub type SchemaRow = (String, String, String, i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseKind {
    MySql,
    Postgres,
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseKind::MySql => write!(f, "mysql"),
            DatabaseKind::Postgres => write!(f, "postgresql"),
        }
    }
}

/// Receives the rows of a [`SqlAdapter::stream_rows`] query one at a time,
/// as the driver produces them. Implementors see each row before the next
/// one is fetched, so a table far larger than memory never needs to be
/// materialized in full.
#[async_trait]
pub trait RowHandler: Send + Sync {
    async fn handle_row(&self, row: Vec<Value>) -> Result<(), DbError>;
}

/// The capability set the migration core needs from either engine. One
/// adapter is opened for the source and one for the destination; which
/// methods are meaningful depends on which side an adapter is playing —
/// constraint toggling and the NULL-safe existence probe are
/// destination-only, and an adapter that never plays that role is free to
/// leave them at the default `Unsupported` implementation.
#[async_trait]
pub trait SqlAdapter: Send + Sync {
    fn kind(&self) -> DatabaseKind;

    async fn close(&self) -> Result<(), DbError>;

    /// Quotes `name` as an identifier per this engine's rules.
    fn column_ref(&self, name: &str) -> String;

    /// The bind placeholder for the `index`'th (1-based) parameter in a
    /// query built for this engine.
    fn placeholder(&self, index: usize) -> String;

    /// One `(table, column, data_type, max_chars)` row per user column,
    /// across every base table this engine exposes.
    async fn schema_rows(&self) -> Result<Vec<SchemaRow>, DbError>;

    /// Runs `sql`, binding `params` positionally per this engine's
    /// placeholder style, and returns the result set as dynamically-typed
    /// cells. The general-purpose escape hatch used by the core for bounded
    /// queries — introspection predicates, incompatible-row id lists, row
    /// counts — where materializing the whole result is expected to be
    /// cheap.
    async fn query_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>, DbError>;

    /// Runs `sql` and hands each row to `handler` as soon as it's read off
    /// the wire, without buffering the result set first. Used for the
    /// full-table scans behind the Missing-Row Scanner and the id-based
    /// migration path, where a table may be arbitrarily large.
    async fn stream_rows(&self, sql: &str, params: &[Value], handler: &dyn RowHandler) -> Result<(), DbError>;

    /// Inserts one row. `DbError::NoRowsAffected` if the engine reports zero
    /// rows written.
    async fn insert(&self, table: &str, columns: &[String], values: &[Value]) -> Result<(), DbError>;

    async fn truncate_table(&self, _table: &str) -> Result<(), DbError> {
        Err(DbError::Unsupported("truncate_table"))
    }

    /// Destination-only. Source adapters return `Unsupported`; the core
    /// never invokes this on a source.
    async fn disable_constraints(&self) -> Result<(), DbError> {
        Err(DbError::Unsupported("disable_constraints"))
    }

    async fn enable_constraints(&self) -> Result<(), DbError> {
        Err(DbError::Unsupported("enable_constraints"))
    }

    /// NULL-safe row-equality probe (`<=>` in MySQL). Destination-only.
    async fn row_exists_null_safe(
        &self,
        _table: &str,
        _columns: &[String],
        _values: &[Value],
    ) -> Result<bool, DbError> {
        Err(DbError::Unsupported("row_exists_null_safe"))
    }
}
