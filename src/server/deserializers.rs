use serde::{Deserialize, Deserializer};
use serde_aux::field_attributes::deserialize_number_from_string;
use serde_json::Value;

use super::error_handlers::ApiError;

// JSON clients may send ids as numbers or as numeric strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stri64(pub i64);

impl<'de> Deserialize<'de> for Stri64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_number_from_string(deserializer).map(Stri64)
    }
}

/// Parses an id path segment. Only plain ASCII digits are ids, so `-1`, `+1` and `abc`
/// are rejected as `NotFound`, the same way an unknown route is. Digits that do not fit an
/// `i64` name a record that cannot exist, which is `Unprocessable`.
pub fn path_id(segment: &str) -> Result<i64, ApiError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    segment.parse().map_err(|_| ApiError::Unprocessable)
}

/// JSON values a client uses to mean "nothing given".
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}
