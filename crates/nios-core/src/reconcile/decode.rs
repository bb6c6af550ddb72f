// ── Nested entry decoding ──
//
// Nested lists (DHCP options, CLI credentials) arrive as loosely typed
// JSON. Each entry is decoded field by field: a wrongly typed field is
// reported and left unset, a non-object entry is reported and skipped.

use serde_json::{Map, Value};

use super::ReconcileError;
use crate::diagnostics::Diagnostics;

/// Reads typed fields out of one JSON object, reporting bad ones.
pub struct FieldDecoder<'a> {
    obj: &'a Map<String, Value>,
    path: String,
    diags: &'a mut Diagnostics,
}

impl<'a> FieldDecoder<'a> {
    /// Wrap `value` if it is an object; otherwise report it and return `None`.
    pub fn new(value: &'a Value, path: impl Into<String>, diags: &'a mut Diagnostics) -> Option<Self> {
        let path = path.into();
        match value {
            Value::Object(obj) => Some(Self { obj, path, diags }),
            other => {
                diags.push(ReconcileError::MalformedEntry {
                    path,
                    reason: format!("expected an object, got {}", json_kind(other)),
                });
                None
            }
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    fn field(&self, name: &str) -> Option<&'a Value> {
        self.obj.get(name).filter(|v| !v.is_null())
    }

    fn bad_field(&mut self, name: &str, expected: &str, got: &Value) {
        self.diags.push(ReconcileError::MalformedEntry {
            path: format!("{}.{name}", self.path),
            reason: format!("expected {expected}, got {}", json_kind(got)),
        });
    }

    pub fn string(&mut self, name: &str) -> Option<String> {
        let raw = self.field(name)?;
        match raw {
            Value::String(s) => Some(s.clone()),
            other => {
                self.bad_field(name, "a string", other);
                None
            }
        }
    }

    /// An unsigned integer; numeric strings are accepted since some WAPI
    /// versions quote option codes.
    pub fn u32(&mut self, name: &str) -> Option<u32> {
        let raw = self.field(name)?;
        let parsed = match raw {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.bad_field(name, "an unsigned integer", raw);
        }
        parsed
    }

    pub fn bool(&mut self, name: &str) -> Option<bool> {
        let raw = self.field(name)?;
        match raw {
            Value::Bool(b) => Some(*b),
            other => {
                self.bad_field(name, "a boolean", other);
                None
            }
        }
    }

    /// Report a required field that is absent. Returns `None` for chaining.
    pub fn missing<T>(&mut self, name: &str) -> Option<T> {
        self.diags.push(ReconcileError::MalformedEntry {
            path: self.path.clone(),
            reason: format!("missing \"{name}\""),
        });
        None
    }
}

/// Type name of a JSON value for diagnostics. Values themselves are never
/// echoed: entries may hold credentials.
pub(crate) fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A nested record decodable from one WAPI list entry.
pub trait FromWireEntry: Sized {
    /// Decode one entry. Returning `None` drops it; the decoder has
    /// already reported why.
    fn decode(fields: &mut FieldDecoder<'_>) -> Option<Self>;
}

/// Decode every entry of a nested list, keeping the ones that decode.
pub fn decode_entries<T: FromWireEntry>(
    path: &str,
    entries: &[Value],
    diags: &mut Diagnostics,
) -> Vec<T> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(i, entry)| {
            let mut fields = FieldDecoder::new(entry, format!("{path}[{i}]"), diags)?;
            T::decode(&mut fields)
        })
        .collect()
}
