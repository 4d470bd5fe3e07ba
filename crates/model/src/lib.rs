pub mod error;
pub mod report;
pub mod schema;
pub mod value;

pub use error::SchemaError;
pub use report::{MigrationResult, ValidationResult, VerificationResult};
pub use schema::{Column, Schema, Table};
pub use value::Value;
