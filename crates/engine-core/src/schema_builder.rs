use connectors::SqlAdapter;
use model::{build_schema, Schema};

use crate::error::CoreError;

/// Asks `adapter` for its introspection rows and groups them into a
/// [`Schema`]. The rows are materialized once; the cursor the adapter used
/// internally to produce them is already released by the time this
/// returns, on every exit path — success or error — since `schema_rows`
/// itself owns that lifetime.
pub async fn build(adapter: &dyn SqlAdapter) -> Result<Schema, CoreError> {
    let rows = adapter.schema_rows().await?;
    Ok(build_schema(rows))
}
