use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use connectors::SqlAdapter;
use model::{Schema, Value, VerificationResult};

use crate::error::CoreError;
use crate::observer::Observer;
use crate::scanner::{scan_table, MissingRowSink};

/// Runs the Missing-Row Scanner over every table in `source_schema`. Unlike
/// migration, a per-table failure doesn't abort the run: it's reported to
/// the observer and the next table is still verified.
pub async fn verify(
    source: &dyn SqlAdapter,
    destination: &dyn SqlAdapter,
    source_schema: &Schema,
    observer: &dyn Observer,
) -> Vec<VerificationResult> {
    let mut results = Vec::with_capacity(source_schema.len());
    for table in source_schema.tables() {
        observer.table_verification_did_start(&table.name);

        let sink = CountingSink {
            missing: AtomicU64::new(0),
        };
        match scan_table(source, destination, table, &sink).await {
            Ok(()) => {
                let missing_row_count = sink.missing.load(Ordering::Relaxed);
                observer.table_verification_did_finish(&table.name, missing_row_count);
                results.push(VerificationResult {
                    table_name: table.name.clone(),
                    missing_row_count,
                });
            }
            Err(CoreError::Db(e)) => {
                observer.table_verification_did_finish_with_error(&table.name, &e);
            }
            Err(other) => {
                tracing::warn!(table = %table.name, error = %other, "verification aborted for table");
            }
        }
    }
    results
}

struct CountingSink {
    missing: AtomicU64,
}

#[async_trait]
impl MissingRowSink for CountingSink {
    async fn on_missing_row(&self, _values: Vec<Value>) -> Result<(), CoreError> {
        self.missing.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
