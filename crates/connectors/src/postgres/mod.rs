mod adapter;
mod convert;

pub use adapter::{PgAdapter, PgTlsMode};
