use connectors::DbError;
use thiserror::Error;
use model::SchemaError;

/// Errors from the operations built on top of an adapter pair: schema
/// construction, validation, scanning, and migration.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("failed to re-enable destination constraints: {0}")]
    ConstraintToggle(DbError),
}
