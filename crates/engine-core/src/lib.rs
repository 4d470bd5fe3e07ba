pub mod error;
pub mod migrator;
pub mod observer;
pub mod scanner;
pub mod schema_builder;
pub mod validator;
pub mod verifier;

pub use error::CoreError;
pub use migrator::run_migration;
pub use observer::{Observer, StdoutObserver};
pub use scanner::{scan_table, MissingRowSink};
pub use validator::validate;
pub use verifier::verify;
