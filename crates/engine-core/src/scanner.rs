use async_trait::async_trait;
use connectors::{DbError, RowHandler, SqlAdapter};
use model::{Table, Value};

use crate::error::CoreError;

/// Receives every source row the scanner finds absent from the
/// destination. Implementors decide what "absent" means to them — the
/// Verifier just counts, the no-id Migrator path inserts.
#[async_trait]
pub trait MissingRowSink: Send + Sync {
    async fn on_missing_row(&self, values: Vec<Value>) -> Result<(), CoreError>;
}

/// Streams every row of `table` from `source` and, for each one, probes
/// `destination` with a NULL-safe equality check. Rows the probe doesn't
/// find are handed to `sink`.
///
/// Rows are fed to the probe one at a time as the source driver produces
/// them, never buffered as a whole table in memory. The source cursor and
/// the destination probe are both scoped to this call; an early error here
/// leaves neither open.
pub async fn scan_table(
    source: &dyn SqlAdapter,
    destination: &dyn SqlAdapter,
    table: &Table,
    sink: &dyn MissingRowSink,
) -> Result<(), CoreError> {
    let columns: Vec<String> = table.column_names().into_iter().map(str::to_string).collect();
    let column_list = columns
        .iter()
        .map(|c| source.column_ref(c))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!("SELECT {column_list} FROM {}", source.column_ref(&table.name));

    let handler = ProbeHandler {
        destination,
        table: &table.name,
        columns: &columns,
        sink,
    };
    source.stream_rows(&sql, &[], &handler).await?;
    Ok(())
}

/// Bridges the adapter's row-at-a-time streaming callback to the NULL-safe
/// existence probe and, for rows the probe doesn't find, to `sink`.
struct ProbeHandler<'a> {
    destination: &'a dyn SqlAdapter,
    table: &'a str,
    columns: &'a [String],
    sink: &'a dyn MissingRowSink,
}

#[async_trait]
impl RowHandler for ProbeHandler<'_> {
    async fn handle_row(&self, row: Vec<Value>) -> Result<(), DbError> {
        let probe_values: Vec<Value> = row
            .into_iter()
            .map(Value::truncate_timestamp_to_seconds)
            .collect();

        let exists = self
            .destination
            .row_exists_null_safe(self.table, self.columns, &probe_values)
            .await?;
        if !exists {
            self.sink
                .on_missing_row(probe_values)
                .await
                .map_err(|e| DbError::UnexpectedValue(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::{DatabaseKind, DbError, SchemaRow};
    use model::Column;
    use std::sync::Mutex;
    use tokio::sync::Mutex as AsyncMutex;

    struct FakeAdapter {
        kind: DatabaseKind,
        rows: Vec<Vec<Value>>,
        existing: Mutex<Vec<Vec<Value>>>,
    }

    #[async_trait]
    impl SqlAdapter for FakeAdapter {
        fn kind(&self) -> DatabaseKind {
            self.kind
        }

        async fn close(&self) -> Result<(), DbError> {
            Ok(())
        }

        fn column_ref(&self, name: &str) -> String {
            format!("\"{name}\"")
        }

        fn placeholder(&self, index: usize) -> String {
            format!("${index}")
        }

        async fn schema_rows(&self) -> Result<Vec<SchemaRow>, DbError> {
            Ok(Vec::new())
        }

        async fn query_rows(&self, _sql: &str, _params: &[Value]) -> Result<Vec<Vec<Value>>, DbError> {
            Ok(self.rows.clone())
        }

        async fn stream_rows(&self, _sql: &str, _params: &[Value], handler: &dyn RowHandler) -> Result<(), DbError> {
            for row in &self.rows {
                handler.handle_row(row.clone()).await?;
            }
            Ok(())
        }

        async fn insert(&self, _table: &str, _columns: &[String], _values: &[Value]) -> Result<(), DbError> {
            unimplemented!()
        }

        async fn row_exists_null_safe(
            &self,
            _table: &str,
            _columns: &[String],
            values: &[Value],
        ) -> Result<bool, DbError> {
            Ok(self.existing.lock().unwrap().iter().any(|r| r == values))
        }
    }

    struct RecordingSink {
        seen: AsyncMutex<Vec<Vec<Value>>>,
    }

    #[async_trait]
    impl MissingRowSink for RecordingSink {
        async fn on_missing_row(&self, values: Vec<Value>) -> Result<(), CoreError> {
            self.seen.lock().await.push(values);
            Ok(())
        }
    }

    #[tokio::test]
    async fn reports_rows_not_found_in_destination() {
        let table = Table::new("widgets", vec![Column::new("id", "int", 0), Column::new("name", "varchar", 50)]);
        let source = FakeAdapter {
            kind: DatabaseKind::Postgres,
            rows: vec![
                vec![Value::Int(1), Value::String("a".into())],
                vec![Value::Int(2), Value::String("b".into())],
            ],
            existing: Mutex::new(Vec::new()),
        };
        let destination = FakeAdapter {
            kind: DatabaseKind::MySql,
            rows: Vec::new(),
            existing: Mutex::new(vec![vec![Value::Int(1), Value::String("a".into())]]),
        };
        let sink = RecordingSink {
            seen: AsyncMutex::new(Vec::new()),
        };

        scan_table(&source, &destination, &table, &sink).await.unwrap();

        let seen = sink.seen.lock().await;
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], vec![Value::Int(2), Value::String("b".into())]);
    }

    #[tokio::test]
    async fn fully_replicated_table_reports_nothing() {
        let table = Table::new("widgets", vec![Column::new("id", "int", 0)]);
        let row = vec![Value::Int(7)];
        let source = FakeAdapter {
            kind: DatabaseKind::Postgres,
            rows: vec![row.clone()],
            existing: Mutex::new(Vec::new()),
        };
        let destination = FakeAdapter {
            kind: DatabaseKind::MySql,
            rows: Vec::new(),
            existing: Mutex::new(vec![row]),
        };
        let sink = RecordingSink {
            seen: AsyncMutex::new(Vec::new()),
        };

        scan_table(&source, &destination, &table, &sink).await.unwrap();
        assert!(sink.seen.lock().await.is_empty());
    }
}
