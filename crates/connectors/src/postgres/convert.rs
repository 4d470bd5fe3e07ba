use bytes::BytesMut;
use chrono::{DateTime, Utc};
use model::Value;
use tokio_postgres::types::{FromSql, IsNull, ToSql, Type};

/// Converts one column of a `tokio_postgres::Row` using the column's
/// reported OID to pick a conversion, since the core has no compile-time
/// notion of a row shape.
pub fn from_pg_row(row: &tokio_postgres::Row, index: usize) -> Value {
    let column = &row.columns()[index];
    match *column.type_() {
        Type::INT2 | Type::INT4 => row
            .try_get::<_, Option<i32>>(index)
            .ok()
            .flatten()
            .map(|v| Value::Int(v as i64))
            .unwrap_or(Value::Null),
        Type::INT8 => row
            .try_get::<_, Option<i64>>(index)
            .ok()
            .flatten()
            .map(Value::Int)
            .unwrap_or(Value::Null),
        Type::BOOL => row
            .try_get::<_, Option<bool>>(index)
            .ok()
            .flatten()
            .map(Value::Bool)
            .unwrap_or(Value::Null),
        Type::BYTEA => row
            .try_get::<_, Option<Vec<u8>>>(index)
            .ok()
            .flatten()
            .map(Value::Bytes)
            .unwrap_or(Value::Null),
        Type::TIMESTAMP | Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(index)
            .ok()
            .flatten()
            .map(Value::Timestamp)
            .unwrap_or(Value::Null),
        Type::FLOAT4 | Type::FLOAT8 | Type::NUMERIC => row
            .try_get::<_, Option<AsText>>(index)
            .ok()
            .flatten()
            .map(|v| Value::String(v.0))
            .unwrap_or(Value::Null),
        _ => row
            .try_get::<_, Option<String>>(index)
            .ok()
            .flatten()
            .map(Value::String)
            .unwrap_or(Value::Null),
    }
}

/// Reads any textually-representable column as its output-formatted string,
/// used for numeric types our trimmed `Value` enum has no dedicated variant
/// for.
struct AsText(String);

impl<'a> FromSql<'a> for AsText {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn std::error::Error + Sync + Send>> {
        match *ty {
            Type::FLOAT4 => Ok(AsText(f32::from_sql(ty, raw)?.to_string())),
            Type::FLOAT8 => Ok(AsText(f64::from_sql(ty, raw)?.to_string())),
            _ => Ok(AsText(String::from_utf8_lossy(raw).to_string())),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(*ty, Type::FLOAT4 | Type::FLOAT8 | Type::NUMERIC)
    }
}

/// Wraps a [`Value`] for parameter binding. `tokio_postgres` needs a
/// concrete `ToSql` per parameter; this picks the matching wire encoding.
#[derive(Debug)]
pub struct PgParam(pub Value);

impl ToSql for PgParam {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match &self.0 {
            Value::Null => Ok(IsNull::Yes),
            Value::Int(v) => v.to_sql(ty, out),
            Value::Bool(v) => v.to_sql(ty, out),
            Value::String(v) => v.to_sql(ty, out),
            Value::Bytes(v) => v.to_sql(ty, out),
            Value::Timestamp(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

pub fn to_pg_params(values: &[Value]) -> Vec<PgParam> {
    values.iter().cloned().map(PgParam).collect()
}

pub fn pg_param_refs(params: &[PgParam]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}
