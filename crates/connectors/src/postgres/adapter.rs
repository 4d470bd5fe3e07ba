use async_trait::async_trait;
use futures_util::TryStreamExt;
use model::Value;
use tokio::task::JoinHandle;
use tokio_postgres::Client;
use tracing::debug;

use crate::adapter::{DatabaseKind, RowHandler, SchemaRow, SqlAdapter};
use crate::error::{ConnectError, DbError};
use crate::postgres::convert::{from_pg_row, pg_param_refs, to_pg_params};

const QUERY_COLUMNS_SQL: &str = include_str!("sql/columns.sql");

/// PostgreSQL is always the migration source in this tool. Constraint
/// toggling and the NULL-safe existence probe are destination-only
/// capabilities this adapter leaves at their default `Unsupported`.
pub struct PgAdapter {
    client: Client,
    connection_task: JoinHandle<()>,
    database: String,
}

/// Mirrors the handful of `sslmode` values this tool's config actually
/// distinguishes; anything stricter than `disable` gets a TLS handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PgTlsMode {
    Disable,
    Require,
}

impl PgAdapter {
    /// `database` is the catalog name to restrict introspection to
    /// (`table_catalog = $1`), matching the connection's own database.
    pub async fn connect(
        config: tokio_postgres::Config,
        database: impl Into<String>,
        tls: PgTlsMode,
    ) -> Result<Self, ConnectError> {
        let (client, connection_task) = match tls {
            PgTlsMode::Disable => Self::spawn_connection(config, tokio_postgres::NoTls).await?,
            PgTlsMode::Require => {
                let connector = native_tls::TlsConnector::new()?;
                let connector = postgres_native_tls::MakeTlsConnector::new(connector);
                Self::spawn_connection(config, connector).await?
            }
        };
        Ok(PgAdapter {
            client,
            connection_task,
            database: database.into(),
        })
    }

    async fn spawn_connection<T>(
        config: tokio_postgres::Config,
        tls: T,
    ) -> Result<(Client, JoinHandle<()>), ConnectError>
    where
        T: tokio_postgres::tls::MakeTlsConnect<tokio_postgres::Socket> + Send + 'static,
        T::TlsConnect: Send,
        T::Stream: Send,
        <T::TlsConnect as tokio_postgres::tls::TlsConnect<tokio_postgres::Socket>>::Future: Send,
    {
        let (client, connection) = config.connect(tls).await?;
        let task = tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "postgres connection driver exited with an error");
            }
        });
        Ok((client, task))
    }

    fn rows_to_values(rows: Vec<tokio_postgres::Row>) -> Vec<Vec<Value>> {
        rows.iter()
            .map(|row| (0..row.len()).map(|i| from_pg_row(row, i)).collect())
            .collect()
    }
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::Postgres
    }

    async fn close(&self) -> Result<(), DbError> {
        self.connection_task.abort();
        Ok(())
    }

    /// PostgreSQL identifiers are embedded bare, per spec's adapter
    /// contract — unlike MySQL's backtick-quoted `column_ref`, this side
    /// never quotes.
    fn column_ref(&self, name: &str) -> String {
        name.to_string()
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    async fn schema_rows(&self) -> Result<Vec<SchemaRow>, DbError> {
        debug!(database = %self.database, "introspecting postgres columns");
        let rows = self.client.query(QUERY_COLUMNS_SQL, &[&self.database]).await?;
        Ok(rows
            .iter()
            .map(|row| {
                let max_chars: Option<i32> = row.get(3);
                (
                    row.get::<_, String>(0),
                    row.get::<_, String>(1),
                    row.get::<_, String>(2),
                    max_chars.unwrap_or(0) as i64,
                )
            })
            .collect())
    }

    async fn query_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>, DbError> {
        debug!(%sql, "executing postgres query");
        let bound = to_pg_params(params);
        let refs = pg_param_refs(&bound);
        let rows = self.client.query(sql, &refs).await?;
        Ok(Self::rows_to_values(rows))
    }

    async fn stream_rows(&self, sql: &str, params: &[Value], handler: &dyn RowHandler) -> Result<(), DbError> {
        debug!(%sql, "streaming postgres query");
        let bound = to_pg_params(params);
        let refs = pg_param_refs(&bound);
        let stream = self.client.query_raw(sql, refs).await?;
        futures_util::pin_mut!(stream);
        while let Some(row) = stream.try_next().await? {
            let values = (0..row.len()).map(|i| from_pg_row(&row, i)).collect();
            handler.handle_row(values).await?;
        }
        Ok(())
    }

    async fn insert(&self, table: &str, columns: &[String], values: &[Value]) -> Result<(), DbError> {
        let column_list = columns
            .iter()
            .map(|c| self.column_ref(c))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=values.len())
            .map(|i| self.placeholder(i))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ({placeholders})",
            self.column_ref(table)
        );

        let bound = to_pg_params(values);
        let refs = pg_param_refs(&bound);
        let affected = self.client.execute(&sql, &refs).await?;
        if affected == 0 {
            return Err(DbError::NoRowsAffected {
                table: table.to_string(),
            });
        }
        Ok(())
    }
}
