use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use model::Value;
use mysql_async::Value as MyValue;

/// Converts one protocol-level column value into the core's dynamically
/// typed cell. Operates on the raw wire value rather than a per-column
/// target type, since the core has no compile-time notion of a row shape.
pub fn from_mysql_value(value: MyValue) -> Value {
    match value {
        MyValue::NULL => Value::Null,
        MyValue::Int(v) => Value::Int(v),
        MyValue::UInt(v) => Value::Int(v as i64),
        MyValue::Float(v) => Value::String(v.to_string()),
        MyValue::Double(v) => Value::String(v.to_string()),
        MyValue::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => Value::String(s),
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        MyValue::Date(year, month, day, hour, minute, second, micros) => {
            let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            let time = NaiveTime::from_hms_micro_opt(
                hour as u32,
                minute as u32,
                second as u32,
                micros,
            );
            match (date, time) {
                (Some(d), Some(t)) => {
                    Value::Timestamp(DateTime::<Utc>::from_naive_utc_and_offset(
                        NaiveDateTime::new(d, t),
                        Utc,
                    ))
                }
                _ => Value::Null,
            }
        }
        MyValue::Time(neg, days, hours, minutes, seconds, micros) => {
            let sign = if neg { "-" } else { "" };
            Value::String(format!(
                "{sign}{}:{:02}:{:02}.{:06}",
                days as u64 * 24 + hours as u64,
                minutes,
                seconds,
                micros
            ))
        }
    }
}

/// Converts a bound parameter into the wire value MySQL expects. Booleans
/// have no protocol type of their own; MySQL treats `TINYINT(1)` as the
/// boolean convention, so `1`/`0` round-trips through any boolean column.
pub fn to_mysql_value(value: &Value) -> MyValue {
    match value {
        Value::Null => MyValue::NULL,
        Value::Int(v) => MyValue::Int(*v),
        Value::Bool(b) => MyValue::Int(if *b { 1 } else { 0 }),
        Value::String(s) => MyValue::Bytes(s.clone().into_bytes()),
        Value::Bytes(b) => MyValue::Bytes(b.clone()),
        Value::Timestamp(ts) => MyValue::Date(
            ts.year() as u16,
            ts.month() as u8,
            ts.day() as u8,
            ts.hour() as u8,
            ts.minute() as u8,
            ts.second() as u8,
            ts.timestamp_subsec_micros(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_round_trips() {
        assert_eq!(from_mysql_value(MyValue::NULL), Value::Null);
    }

    #[test]
    fn bytes_that_are_valid_utf8_become_strings() {
        let v = from_mysql_value(MyValue::Bytes(b"hello".to_vec()));
        assert_eq!(v, Value::String("hello".to_string()));
    }

    #[test]
    fn bool_param_encodes_as_tinyint() {
        assert_eq!(to_mysql_value(&Value::Bool(true)), MyValue::Int(1));
        assert_eq!(to_mysql_value(&Value::Bool(false)), MyValue::Int(0));
    }
}
