use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use connectors::{DbError, RowHandler, SqlAdapter};
use model::{MigrationResult, Schema, Table, Value};

use crate::error::CoreError;
use crate::observer::Observer;
use crate::scanner::{scan_table, MissingRowSink};

/// Runs the full migrate operation: disables destination constraints once
/// for every table, migrates each table in `source_schema`'s iteration
/// order, then re-enables constraints on every exit path.
///
/// A fatal error during any table's migration aborts the whole operation —
/// results already accumulated for earlier tables are discarded, matching
/// the "no partial results" contract — but constraints are still
/// re-enabled before the error is returned.
pub async fn run_migration(
    source: &dyn SqlAdapter,
    destination: &dyn SqlAdapter,
    source_schema: &Schema,
    truncate_first: bool,
    observer: &dyn Observer,
) -> Result<Vec<MigrationResult>, CoreError> {
    observer.will_disable_constraints();
    destination.disable_constraints().await?;
    observer.did_disable_constraints();

    let mut results = Vec::with_capacity(source_schema.len());
    let migration_error = 'migrate: {
        for table in source_schema.tables() {
            match migrate_single_table(source, destination, table, truncate_first, observer).await {
                Ok(result) => results.push(result),
                Err(e) => break 'migrate Some(e),
            }
        }
        None
    };

    observer.will_enable_constraints();
    let enable_error = match destination.enable_constraints().await {
        Ok(()) => {
            observer.did_enable_constraints();
            None
        }
        Err(e) => {
            observer.did_fail_to_enable_constraints_with_error(&e);
            Some(e)
        }
    };

    if let Some(e) = migration_error {
        return Err(e);
    }
    if let Some(e) = enable_error {
        return Err(CoreError::ConstraintToggle(e));
    }
    Ok(results)
}

async fn migrate_single_table(
    source: &dyn SqlAdapter,
    destination: &dyn SqlAdapter,
    table: &Table,
    truncate_first: bool,
    observer: &dyn Observer,
) -> Result<MigrationResult, CoreError> {
    if truncate_first {
        observer.will_truncate_table(&table.name);
        destination.truncate_table(&table.name).await?;
        observer.truncate_table_did_finish(&table.name);
    }

    observer.table_migration_did_start(&table.name);

    let records_inserted = if table.has_column("id") {
        migrate_by_id(source, destination, table, observer).await?
    } else {
        migrate_by_full_row_scan(source, destination, table, observer).await?
    };

    observer.table_migration_did_finish(&table.name, records_inserted);
    Ok(MigrationResult {
        table_name: table.name.clone(),
        records_inserted,
    })
}

async fn migrate_by_id(
    source: &dyn SqlAdapter,
    destination: &dyn SqlAdapter,
    table: &Table,
    observer: &dyn Observer,
) -> Result<u64, CoreError> {
    let id_ref = destination.column_ref("id");
    let id_collector = IdCollector::default();
    destination
        .stream_rows(
            &format!("SELECT {id_ref} FROM {}", destination.column_ref(&table.name)),
            &[],
            &id_collector,
        )
        .await?;
    let existing_ids = id_collector.into_ids();

    let columns: Vec<String> = table.column_names().into_iter().map(str::to_string).collect();
    let column_list = columns
        .iter()
        .map(|c| source.column_ref(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("SELECT {column_list} FROM {}", source.column_ref(&table.name));
    if !existing_ids.is_empty() {
        let id_list = existing_ids
            .iter()
            .map(|id| quote_id_literal(id))
            .collect::<Vec<_>>()
            .join(", ");
        sql.push_str(&format!(" WHERE {} NOT IN ({id_list})", source.column_ref("id")));
    }

    let inserter = InsertingRowHandler {
        destination,
        table: &table.name,
        columns: &columns,
        observer,
        inserted: AtomicU64::new(0),
    };
    source.stream_rows(&sql, &[], &inserter).await?;
    Ok(inserter.inserted.load(Ordering::Relaxed))
}

/// Collects the first column of every streamed row as a string, used to
/// build the destination's existing-`id` set without buffering the whole
/// row set up front.
#[derive(Default)]
struct IdCollector {
    ids: Mutex<Vec<String>>,
}

impl IdCollector {
    fn into_ids(self) -> Vec<String> {
        self.ids.into_inner().unwrap()
    }
}

#[async_trait]
impl RowHandler for IdCollector {
    async fn handle_row(&self, row: Vec<Value>) -> Result<(), DbError> {
        if let Some(id) = row.into_iter().next() {
            self.ids.lock().unwrap().push(id.to_string());
        }
        Ok(())
    }
}

/// Inserts each streamed source row into the destination as it arrives.
/// Shared shape with [`InsertingSink`] below, but operating one level
/// lower — directly on the adapter's row stream rather than on rows the
/// Missing-Row Scanner has already filtered.
struct InsertingRowHandler<'a> {
    destination: &'a dyn SqlAdapter,
    table: &'a str,
    columns: &'a [String],
    observer: &'a dyn Observer,
    inserted: AtomicU64,
}

#[async_trait]
impl RowHandler for InsertingRowHandler<'_> {
    async fn handle_row(&self, row: Vec<Value>) -> Result<(), DbError> {
        match self.destination.insert(self.table, self.columns, &row).await {
            Ok(()) => {
                self.inserted.fetch_add(1, Ordering::Relaxed);
                self.observer.did_migrate_row(self.table, &row);
            }
            Err(e) => self.observer.did_fail_to_migrate_row_with_error(self.table, &row, &e),
        }
        Ok(())
    }
}

/// An `id` value re-embedded as a SQL literal for the `NOT IN` list. Plain
/// integers are embedded bare; anything else (UUID strings and the like)
/// is single-quote escaped, since the source adapter has no prepared
/// statement slot free for a variable-length `IN` list.
fn quote_id_literal(id: &str) -> String {
    if id.parse::<i64>().is_ok() {
        id.to_string()
    } else {
        format!("'{}'", id.replace('\'', "''"))
    }
}

async fn migrate_by_full_row_scan(
    source: &dyn SqlAdapter,
    destination: &dyn SqlAdapter,
    table: &Table,
    observer: &dyn Observer,
) -> Result<u64, CoreError> {
    let columns: Vec<String> = table.column_names().into_iter().map(str::to_string).collect();
    let sink = InsertingSink {
        destination,
        table: &table.name,
        columns: &columns,
        observer,
        inserted: AtomicU64::new(0),
    };
    scan_table(source, destination, table, &sink).await?;
    Ok(sink.inserted.load(Ordering::Relaxed))
}

struct InsertingSink<'a> {
    destination: &'a dyn SqlAdapter,
    table: &'a str,
    columns: &'a [String],
    observer: &'a dyn Observer,
    inserted: AtomicU64,
}

#[async_trait]
impl MissingRowSink for InsertingSink<'_> {
    async fn on_missing_row(&self, values: Vec<Value>) -> Result<(), CoreError> {
        match self.destination.insert(self.table, self.columns, &values).await {
            Ok(()) => {
                self.inserted.fetch_add(1, Ordering::Relaxed);
                self.observer.did_migrate_row(self.table, &values);
            }
            Err(e) => self.observer.did_fail_to_migrate_row_with_error(self.table, &values, &e),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_ids_embed_bare() {
        assert_eq!(quote_id_literal("42"), "42");
    }

    #[test]
    fn string_ids_are_quoted_and_escaped() {
        assert_eq!(quote_id_literal("a'b"), "'a''b'");
    }
}
