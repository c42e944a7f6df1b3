// SPDX-License-Identifier: Apache-2.0

use crate::ApiError;
use serde_json::{Map, Value};

/// Success envelope: `success: true`, the route's own fields, `timestamp`.
/// Non-object `fields` are ignored rather than nested.
#[must_use]
pub fn success_envelope(fields: Value, now: &str) -> Value {
    let mut map = Map::new();
    map.insert("success".to_string(), Value::Bool(true));
    if let Value::Object(extra) = fields {
        for (key, value) in extra {
            map.insert(key, value);
        }
    }
    map.insert("timestamp".to_string(), Value::String(now.to_string()));
    Value::Object(map)
}

/// Failure envelope: the human-readable `error` string plus the machine
/// `code`; `details` appears only when the error carries structure.
#[must_use]
pub fn error_envelope(error: &ApiError, now: &str) -> Value {
    let mut map = Map::new();
    map.insert("success".to_string(), Value::Bool(false));
    map.insert("error".to_string(), Value::String(error.message.clone()));
    map.insert(
        "code".to_string(),
        Value::String(error.code.as_str().to_string()),
    );
    if !error.details.is_null() {
        map.insert("details".to_string(), error.details.clone());
    }
    map.insert("timestamp".to_string(), Value::String(now.to_string()));
    Value::Object(map)
}
