use model::{Table, ValidationResult, VerificationResult};

/// `<table> OK`, `found N incompatible rows in <table> with IDs [...]`, or
/// `found N incompatible rows in <table> (which has no 'id' column)`.
pub fn validation_line(table: &Table, result: &ValidationResult) -> String {
    if result.incompatible_row_count == 0 {
        return format!("{} OK", result.table_name);
    }

    if table.has_column("id") {
        format!(
            "found {} incompatible rows in {} with IDs {:?}",
            result.incompatible_row_count, result.table_name, result.incompatible_row_ids
        )
    } else {
        format!(
            "found {} incompatible rows in {} (which has no 'id' column)",
            result.incompatible_row_count, result.table_name
        )
    }
}

/// `<table> OK` or `found N missing rows in <table>`.
pub fn verification_line(result: &VerificationResult) -> String {
    if result.missing_row_count == 0 {
        format!("{} OK", result.table_name)
    } else {
        format!("found {} missing rows in {}", result.missing_row_count, result.table_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::Column;

    #[test]
    fn compatible_table_prints_ok() {
        let table = Table::new("widgets", vec![Column::new("id", "int", 0)]);
        let result = ValidationResult {
            table_name: "widgets".to_string(),
            incompatible_row_ids: Vec::new(),
            incompatible_row_count: 0,
        };
        assert_eq!(validation_line(&table, &result), "widgets OK");
    }

    #[test]
    fn incompatible_with_id_lists_ids() {
        let table = Table::new("widgets", vec![Column::new("id", "int", 0)]);
        let result = ValidationResult {
            table_name: "widgets".to_string(),
            incompatible_row_ids: vec![3, 7],
            incompatible_row_count: 2,
        };
        assert_eq!(
            validation_line(&table, &result),
            "found 2 incompatible rows in widgets with IDs [3, 7]"
        );
    }

    #[test]
    fn incompatible_without_id_reports_count_only() {
        let table = Table::new("widgets", vec![Column::new("name", "varchar", 255)]);
        let result = ValidationResult {
            table_name: "widgets".to_string(),
            incompatible_row_ids: Vec::new(),
            incompatible_row_count: 1,
        };
        assert_eq!(
            validation_line(&table, &result),
            "found 1 incompatible rows in widgets (which has no 'id' column)"
        );
    }

    #[test]
    fn fully_verified_table_prints_ok() {
        let result = VerificationResult {
            table_name: "widgets".to_string(),
            missing_row_count: 0,
        };
        assert_eq!(verification_line(&result), "widgets OK");
    }

    #[test]
    fn missing_rows_are_reported() {
        let result = VerificationResult {
            table_name: "widgets".to_string(),
            missing_row_count: 4,
        };
        assert_eq!(verification_line(&result), "found 4 missing rows in widgets");
    }
}
