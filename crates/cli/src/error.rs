use connectors::{ConnectError, DbError};
use engine_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("failed to connect: {0}")]
    Connect(#[from] ConnectError),

    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("{0}")]
    Core(#[from] CoreError),
}
