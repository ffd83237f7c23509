//! JSON field discovery.
//!
//! Supported input: a JSON array of objects, `[{"a":1}, {"a":2,"b":3}]`. Records may be sparse;
//! every key seen in any record becomes a field, once, in first-seen document order.

use std::collections::HashSet;
use std::io::{BufReader, Read};

use serde_json::Value;

use crate::error::SchemaError;

/// Parse the whole document and collect distinct keys across all records.
pub fn field_names<R: Read>(reader: R) -> Result<Vec<String>, SchemaError> {
    let doc: Value = serde_json::from_reader(BufReader::new(reader))?;
    let records = match doc {
        Value::Array(items) => items,
        other => {
            return Err(SchemaError::shape(format!(
                "top level must be an array of objects, found {}",
                kind_of(&other)
            )));
        }
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut names = Vec::new();
    for (idx0, record) in records.iter().enumerate() {
        let obj = record.as_object().ok_or_else(|| {
            SchemaError::shape(format!(
                "record {} is {}, expected an object",
                idx0 + 1,
                kind_of(record)
            ))
        })?;
        for key in obj.keys() {
            if seen.insert(key.as_str()) {
                names.push(key.clone());
            }
        }
    }

    Ok(names)
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
