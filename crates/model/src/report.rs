/// Per-table outcome of a migrate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    pub table_name: String,
    pub records_inserted: u64,
}

/// Per-table outcome of a validate run. `incompatible_row_ids` is only
/// populated when the source table has an `id` column; otherwise only the
/// count is meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationResult {
    pub table_name: String,
    pub incompatible_row_ids: Vec<i64>,
    pub incompatible_row_count: u64,
}

/// Per-table outcome of a verify run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub table_name: String,
    pub missing_row_count: u64,
}
