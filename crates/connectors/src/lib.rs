pub mod adapter;
pub mod error;
pub mod mysql;
pub mod postgres;

pub use adapter::{DatabaseKind, RowHandler, SchemaRow, SqlAdapter};
pub use error::{ConnectError, DbError};
pub use mysql::MySqlAdapter;
pub use postgres::{PgAdapter, PgTlsMode};
