use async_trait::async_trait;
use model::Value;
use mysql_async::prelude::Queryable;
use mysql_async::{Opts, Params, Pool, Row as MySqlRow};
use tracing::{debug, info};

use crate::adapter::{DatabaseKind, RowHandler, SchemaRow, SqlAdapter};
use crate::error::{ConnectError, DbError};
use crate::mysql::convert::{from_mysql_value, to_mysql_value};

const QUERY_COLUMNS_SQL: &str = include_str!("sql/columns.sql");

/// MySQL is always the migration destination in this tool, so this is the
/// only adapter that implements constraint toggling and the NULL-safe
/// existence probe.
pub struct MySqlAdapter {
    pool: Pool,
    schema: String,
}

impl MySqlAdapter {
    /// `url` is a standard `mysql://` connection string; `schema` is the
    /// database name to introspect (MySQL has no separate "schema"
    /// namespace distinct from the database).
    pub async fn connect(url: &str, schema: impl Into<String>) -> Result<Self, ConnectError> {
        let opts = Opts::from_url(url).map_err(|e| ConnectError::InvalidUrl(e.to_string()))?;
        let pool = Pool::new(opts);
        // Fail fast on bad credentials/host instead of deferring to the
        // first real query.
        pool.get_conn().await?;
        Ok(MySqlAdapter {
            pool,
            schema: schema.into(),
        })
    }

    fn bind(values: &[Value]) -> Params {
        Params::Positional(values.iter().map(to_mysql_value).collect())
    }

    fn rows_to_values(rows: Vec<MySqlRow>) -> Vec<Vec<Value>> {
        rows.into_iter()
            .map(|row| row.unwrap().into_iter().map(from_mysql_value).collect())
            .collect()
    }
}

#[async_trait]
impl SqlAdapter for MySqlAdapter {
    fn kind(&self) -> DatabaseKind {
        DatabaseKind::MySql
    }

    async fn close(&self) -> Result<(), DbError> {
        self.pool.clone().disconnect().await?;
        Ok(())
    }

    fn column_ref(&self, name: &str) -> String {
        format!("`{name}`")
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    async fn schema_rows(&self) -> Result<Vec<SchemaRow>, DbError> {
        let mut conn = self.pool.get_conn().await?;
        debug!(schema = %self.schema, "introspecting mysql columns");
        let rows: Vec<(String, String, String, Option<i64>)> =
            conn.exec(QUERY_COLUMNS_SQL, (&self.schema,)).await?;
        Ok(rows
            .into_iter()
            .map(|(table, column, data_type, max_chars)| {
                (table, column, data_type, max_chars.unwrap_or(0))
            })
            .collect())
    }

    async fn query_rows(&self, sql: &str, params: &[Value]) -> Result<Vec<Vec<Value>>, DbError> {
        let mut conn = self.pool.get_conn().await?;
        debug!(%sql, "executing mysql query");
        let rows: Vec<MySqlRow> = conn.exec(sql, Self::bind(params)).await?;
        Ok(Self::rows_to_values(rows))
    }

    async fn stream_rows(&self, sql: &str, params: &[Value], handler: &dyn RowHandler) -> Result<(), DbError> {
        let mut conn = self.pool.get_conn().await?;
        debug!(%sql, "streaming mysql query");
        let mut result = conn.exec_iter(sql, Self::bind(params)).await?;
        while let Some(row) = result.next().await? {
            let values = row.unwrap().into_iter().map(from_mysql_value).collect();
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
        let placeholders = (0..values.len())
            .map(|_| "?".to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({column_list}) VALUES ({placeholders})",
            self.column_ref(table)
        );
        info!(%sql, "inserting row");

        let mut conn = self.pool.get_conn().await?;
        conn.exec_drop(&sql, Self::bind(values)).await?;
        if conn.affected_rows() == 0 {
            return Err(DbError::NoRowsAffected {
                table: table.to_string(),
            });
        }
        Ok(())
    }

    async fn truncate_table(&self, table: &str) -> Result<(), DbError> {
        let sql = format!("TRUNCATE TABLE {}", self.column_ref(table));
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop(sql).await?;
        Ok(())
    }

    async fn disable_constraints(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop("SET FOREIGN_KEY_CHECKS = 0").await?;
        Ok(())
    }

    async fn enable_constraints(&self) -> Result<(), DbError> {
        let mut conn = self.pool.get_conn().await?;
        conn.query_drop("SET FOREIGN_KEY_CHECKS = 1").await?;
        Ok(())
    }

    async fn row_exists_null_safe(
        &self,
        table: &str,
        columns: &[String],
        values: &[Value],
    ) -> Result<bool, DbError> {
        let predicate = columns
            .iter()
            .map(|c| format!("{} <=> ?", self.column_ref(c)))
            .collect::<Vec<_>>()
            .join(" AND ");
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {predicate}) AS found",
            self.column_ref(table)
        );

        let mut conn = self.pool.get_conn().await?;
        let row: Option<(i64,)> = conn.exec_first(sql, Self::bind(values)).await?;
        Ok(row.map(|(found,)| found != 0).unwrap_or(false))
    }
}
