//! Conversion between wire values and JSON
//!
//! Two directions: result rows into JSON objects keyed by column name, and
//! caller-supplied JSON positional parameters into bind values.

use bytes::BytesMut;
use serde_json::{Map, Value};
use tokio_postgres::types::{to_sql_checked, FromSql, IsNull, ToSql, Type};
use tokio_postgres::Row;

/// Convert one result row into an ordered column -> value object.
pub fn row_to_object(row: &Row) -> Map<String, Value> {
    let mut object = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        object.insert(
            column.name().to_string(),
            column_value(row, idx, column.type_()),
        );
    }
    object
}

fn column_value(row: &Row, idx: usize, ty: &Type) -> Value {
    match ty.name() {
        "bool" => cell::<bool>(row, idx),
        "int2" => cell::<i16>(row, idx),
        "int4" => cell::<i32>(row, idx),
        "int8" => cell::<i64>(row, idx),
        "float4" => cell::<f32>(row, idx),
        "float8" => cell::<f64>(row, idx),
        "json" | "jsonb" => cell::<Value>(row, idx),
        "timestamp" => cell::<chrono::NaiveDateTime>(row, idx),
        "timestamptz" => cell::<chrono::DateTime<chrono::Utc>>(row, idx),
        "date" => cell::<chrono::NaiveDate>(row, idx),
        "time" => cell::<chrono::NaiveTime>(row, idx),
        // text, varchar, bpchar, name, and anything else that reads as text.
        // Types without a text representation here (e.g. numeric) come back
        // as null rather than failing the whole row.
        _ => cell::<String>(row, idx),
    }
}

fn cell<'a, T>(row: &'a Row, idx: usize) -> Value
where
    T: FromSql<'a> + serde::Serialize,
{
    match row.try_get::<_, Option<T>>(idx) {
        Ok(Some(v)) => serde_json::to_value(v).unwrap_or(Value::Null),
        Ok(None) => Value::Null,
        Err(_) => Value::Null,
    }
}

/// A positional query parameter decoded from caller JSON.
///
/// Numeric values encode against whatever width the server inferred for
/// their placeholder; a genuinely uncoercible pairing is left to the server
/// to reject.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Json(Value),
}

impl SqlParam {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => SqlParam::Null,
            Value::Bool(b) => SqlParam::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => SqlParam::Int(i),
                None => SqlParam::Float(n.as_f64().unwrap_or(0.0)),
            },
            Value::String(s) => SqlParam::Text(s.clone()),
            other => SqlParam::Json(other.clone()),
        }
    }
}

impl ToSql for SqlParam {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn std::error::Error + Sync + Send>> {
        match self {
            SqlParam::Null => Ok(IsNull::Yes),
            SqlParam::Bool(v) => v.to_sql(ty, out),
            SqlParam::Int(v) => match ty.name() {
                "int2" => (*v as i16).to_sql(ty, out),
                "int4" => (*v as i32).to_sql(ty, out),
                "float4" => (*v as f32).to_sql(ty, out),
                "float8" => (*v as f64).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            SqlParam::Float(v) => match ty.name() {
                "float4" => (*v as f32).to_sql(ty, out),
                _ => v.to_sql(ty, out),
            },
            SqlParam::Text(v) => v.to_sql(ty, out),
            SqlParam::Json(v) => v.to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        // The variant decides the encoding; true mismatches are the
        // server's error to report.
        true
    }

    to_sql_checked!();
}
