use chrono::{DateTime, Utc};
use std::fmt;

/// A dynamically-typed scan cell.
///
/// Column types are discovered at run time from `information_schema`, so a
/// row scanned from either engine has no compile-time type. `Value` is the
/// tagged variant the core operates on instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    Bool(bool),
    String(String),
    Bytes(Vec<u8>),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// PostgreSQL keeps microsecond precision; MySQL `DATETIME` cannot
    /// represent it. Without this, every row with a timestamp column would
    /// appear missing when probed against the destination.
    pub fn truncate_timestamp_to_seconds(self) -> Value {
        match self {
            Value::Timestamp(ts) => {
                let secs = ts.timestamp();
                Value::Timestamp(DateTime::<Utc>::from_timestamp(secs, 0).unwrap_or(ts))
            }
            other => other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::String(v) => write!(f, "{v}"),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn truncates_sub_second_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap() + chrono::Duration::nanoseconds(123_456_789);
        let value = Value::Timestamp(ts).truncate_timestamp_to_seconds();
        match value {
            Value::Timestamp(truncated) => assert_eq!(truncated.timestamp_subsec_nanos(), 0),
            _ => panic!("expected timestamp"),
        }
    }

    #[test]
    fn non_timestamp_values_pass_through() {
        let value = Value::Int(42).truncate_timestamp_to_seconds();
        assert_eq!(value, Value::Int(42));
    }
}
