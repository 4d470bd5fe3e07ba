use thiserror::Error;

/// Referential gaps between the source and destination catalogs.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("table '{0}' not found")]
    TableNotFound(String),

    #[error("column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),
}
