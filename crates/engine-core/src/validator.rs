use connectors::SqlAdapter;
use model::{Schema, Value, ValidationResult};

use crate::error::CoreError;

/// Runs the width validator over every table in `source_schema`, returning
/// one result per table. Aborts the whole operation — rather than
/// returning partial results — on a missing destination table, a missing
/// matching column, or a query failure, per the core's "no partial table
/// outcomes" contract.
pub async fn validate(
    source: &dyn SqlAdapter,
    source_schema: &Schema,
    destination_schema: &Schema,
) -> Result<Vec<ValidationResult>, CoreError> {
    let mut results = Vec::with_capacity(source_schema.len());
    for table in source_schema.tables() {
        let destination_table = destination_schema.get_table(&table.name)?;

        let mut incompatible_columns = Vec::new();
        for dest_column in &destination_table.columns {
            let (_, source_column) = table
                .get_column(&dest_column.name)
                .ok_or_else(|| model::SchemaError::ColumnNotFound(dest_column.name.clone(), table.name.clone()))?;
            if source_column.incompatible(dest_column) {
                incompatible_columns.push((source_column.name.clone(), dest_column.max_chars));
            }
        }

        if incompatible_columns.is_empty() {
            results.push(ValidationResult {
                table_name: table.name.clone(),
                incompatible_row_ids: Vec::new(),
                incompatible_row_count: 0,
            });
            continue;
        }

        let predicate = incompatible_columns
            .iter()
            .map(|(name, max_chars)| format!("LENGTH({}) > {max_chars}", source.column_ref(name)))
            .collect::<Vec<_>>()
            .join(" OR ");

        let result = if table.has_column("id") {
            let sql = format!("SELECT {} FROM {} WHERE {predicate}", source.column_ref("id"), source.column_ref(&table.name));
            let rows = source.query_rows(&sql, &[]).await?;
            let ids = rows
                .into_iter()
                .filter_map(|row| row.into_iter().next())
                .filter_map(|cell| match cell {
                    Value::Int(id) => Some(id),
                    _ => None,
                })
                .collect::<Vec<_>>();
            ValidationResult {
                table_name: table.name.clone(),
                incompatible_row_count: ids.len() as u64,
                incompatible_row_ids: ids,
            }
        } else {
            let sql = format!("SELECT COUNT(1) FROM {} WHERE {predicate}", source.column_ref(&table.name));
            let rows = source.query_rows(&sql, &[]).await?;
            let count = rows
                .into_iter()
                .next()
                .and_then(|row| row.into_iter().next())
                .and_then(|cell| match cell {
                    Value::Int(n) => Some(n as u64),
                    _ => None,
                })
                .unwrap_or(0);
            ValidationResult {
                table_name: table.name.clone(),
                incompatible_row_ids: Vec::new(),
                incompatible_row_count: count,
            }
        };

        results.push(result);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use connectors::{DatabaseKind, DbError, RowHandler, SchemaRow};
    use model::{build_schema, Column};
    use std::sync::Mutex;

    struct FakeSource {
        queries: Mutex<Vec<String>>,
        response: Vec<Vec<Value>>,
    }

    #[async_trait]
    impl SqlAdapter for FakeSource {
        fn kind(&self) -> DatabaseKind {
            DatabaseKind::Postgres
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

        async fn query_rows(&self, sql: &str, _params: &[Value]) -> Result<Vec<Vec<Value>>, DbError> {
            self.queries.lock().unwrap().push(sql.to_string());
            Ok(self.response.clone())
        }

        async fn stream_rows(&self, _sql: &str, _params: &[Value], _handler: &dyn RowHandler) -> Result<(), DbError> {
            unimplemented!("the width validator only uses bounded query_rows")
        }

        async fn insert(&self, _table: &str, _columns: &[String], _values: &[Value]) -> Result<(), DbError> {
            unimplemented!()
        }
    }

    fn schema_with(table: &str, columns: Vec<Column>) -> Schema {
        build_schema(
            columns
                .into_iter()
                .map(|c| (table.to_string(), c.name, c.data_type, c.max_chars)),
        )
    }

    #[tokio::test]
    async fn compatible_widths_report_zero() {
        let source_schema = schema_with("users", vec![Column::new("name", "varchar", 100)]);
        let destination_schema = schema_with("users", vec![Column::new("name", "varchar", 255)]);
        let adapter = FakeSource {
            queries: Mutex::new(Vec::new()),
            response: Vec::new(),
        };

        let results = validate(&adapter, &source_schema, &destination_schema).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].incompatible_row_count, 0);
        assert!(adapter.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn incompatible_width_with_id_collects_ids() {
        let source_schema = schema_with(
            "users",
            vec![Column::new("id", "int", 0), Column::new("name", "varchar", 300)],
        );
        let destination_schema = schema_with(
            "users",
            vec![Column::new("id", "int", 0), Column::new("name", "varchar", 255)],
        );
        let adapter = FakeSource {
            queries: Mutex::new(Vec::new()),
            response: vec![vec![Value::Int(3)]],
        };

        let results = validate(&adapter, &source_schema, &destination_schema).await.unwrap();
        assert_eq!(results[0].incompatible_row_ids, vec![3]);
        assert_eq!(results[0].incompatible_row_count, 1);
        let queries = adapter.queries.lock().unwrap();
        assert!(queries[0].contains("LENGTH(\"name\") > 255"));
    }

    #[tokio::test]
    async fn missing_destination_table_is_an_error() {
        let source_schema = schema_with("users", vec![Column::new("name", "varchar", 100)]);
        let destination_schema = Schema::default();
        let adapter = FakeSource {
            queries: Mutex::new(Vec::new()),
            response: Vec::new(),
        };

        let err = validate(&adapter, &source_schema, &destination_schema).await.unwrap_err();
        assert!(matches!(err, CoreError::Schema(_)));
    }
}
