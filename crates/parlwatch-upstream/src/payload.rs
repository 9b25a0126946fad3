//! Tolerant extraction of the row list from upstream payloads.
//!
//! Upstreams wrap their rows differently: a bare array, or an object holding
//! the rows under `rows`, `items` or `value`. Anything else is treated as an
//! empty result rather than an error.

use serde_json::{Map, Value};

const ROW_KEYS: &[&str] = &["rows", "items", "value"];

/// The row list of `payload`, in upstream order.
///
/// Datasette can answer with array rows plus a `columns` list when the shape
/// directive is ignored; those rows are zipped into objects.
pub fn extract_rows(payload: Value) -> Vec<Value> {
  match payload {
    Value::Array(rows) => rows,
    Value::Object(mut obj) => {
      let columns: Option<Vec<String>> =
        obj.get("columns").and_then(Value::as_array).map(|cols| {
          cols
            .iter()
            .map(|c| c.as_str().unwrap_or_default().to_string())
            .collect()
        });
      let rows = ROW_KEYS
        .iter()
        .find_map(|key| match obj.remove(*key) {
          Some(Value::Array(rows)) => Some(rows),
          _ => None,
        })
        .unwrap_or_default();
      match columns {
        Some(columns) => rows.into_iter().map(|r| zip_row(&columns, r)).collect(),
        None => rows,
      }
    }
    _ => Vec::new(),
  }
}

fn zip_row(columns: &[String], row: Value) -> Value {
  match row {
    Value::Array(values) => Value::Object(
      columns.iter().cloned().zip(values).collect::<Map<String, Value>>(),
    ),
    other => other,
  }
}

/// Keep only object rows.
pub fn object_rows(rows: Vec<Value>) -> Vec<Map<String, Value>> {
  rows
    .into_iter()
    .filter_map(|r| match r {
      Value::Object(obj) => Some(obj),
      _ => None,
    })
    .collect()
}
