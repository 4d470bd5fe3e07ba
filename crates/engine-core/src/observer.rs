use connectors::DbError;
use model::Value;

/// Progress reporting capability for `migrate` and `verify`. Kept behind a
/// trait so the core is testable with an in-memory recorder instead of a
/// real terminal.
///
/// Every method has a no-op default; implementors override only the events
/// they care about.
pub trait Observer: Send + Sync {
    fn will_disable_constraints(&self) {}
    fn did_disable_constraints(&self) {}
    fn will_enable_constraints(&self) {}
    fn did_enable_constraints(&self) {}
    fn did_fail_to_enable_constraints_with_error(&self, _error: &DbError) {}

    fn will_truncate_table(&self, _table: &str) {}
    fn truncate_table_did_finish(&self, _table: &str) {}

    fn table_migration_did_start(&self, _table: &str) {}
    fn table_migration_did_finish(&self, _table: &str, _records_inserted: u64) {}
    fn did_migrate_row(&self, _table: &str, _values: &[Value]) {}
    fn did_fail_to_migrate_row_with_error(&self, _table: &str, _values: &[Value], _error: &DbError) {}

    fn table_verification_did_start(&self, _table: &str) {}
    fn table_verification_did_finish(&self, _table: &str, _missing_row_count: u64) {}
    fn table_verification_did_finish_with_error(&self, _table: &str, _error: &DbError) {}
}

/// Formats each event as a single stdout line. The default observer used
/// when a caller doesn't need to capture progress for itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutObserver;

impl Observer for StdoutObserver {
    fn will_disable_constraints(&self) {
        println!("disabling destination constraints");
    }

    fn did_disable_constraints(&self) {
        println!("destination constraints disabled");
    }

    fn will_enable_constraints(&self) {
        println!("re-enabling destination constraints");
    }

    fn did_enable_constraints(&self) {
        println!("destination constraints re-enabled");
    }

    fn did_fail_to_enable_constraints_with_error(&self, error: &DbError) {
        println!("failed to re-enable destination constraints: {error}");
    }

    fn will_truncate_table(&self, table: &str) {
        println!("truncating {table}");
    }

    fn truncate_table_did_finish(&self, table: &str) {
        println!("{table} truncated");
    }

    fn table_migration_did_start(&self, table: &str) {
        println!("migrating {table}");
    }

    fn table_migration_did_finish(&self, table: &str, records_inserted: u64) {
        println!("{table}: inserted {records_inserted} row(s)");
    }

    fn did_migrate_row(&self, table: &str, _values: &[Value]) {
        println!("{table}: inserted row");
    }

    fn did_fail_to_migrate_row_with_error(&self, table: &str, _values: &[Value], error: &DbError) {
        println!("{table}: failed to insert row: {error}");
    }

    fn table_verification_did_start(&self, table: &str) {
        println!("verifying {table}");
    }

    fn table_verification_did_finish(&self, table: &str, missing_row_count: u64) {
        println!("{table}: {missing_row_count} missing row(s)");
    }

    fn table_verification_did_finish_with_error(&self, table: &str, error: &DbError) {
        println!("{table}: verification failed: {error}");
    }
}
