use thiserror::Error;

/// Errors from opening a connection or connection pool.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid connection url: {0}")]
    InvalidUrl(String),

    #[error("mysql connection failed: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("postgres connection failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("tls configuration error: {0}")]
    Tls(#[from] native_tls::Error),
}

/// Errors from the query/introspection/insert layer, once a connection is
/// already open.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("mysql error: {0}")]
    MySql(#[from] mysql_async::Error),

    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("insert into '{table}' affected zero rows")]
    NoRowsAffected { table: String },

    #[error("'{0}' is not supported by this adapter")]
    Unsupported(&'static str),

    #[error("unexpected value shape: {0}")]
    UnexpectedValue(String),
}
