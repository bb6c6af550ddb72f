// ── Extensible attributes ──
//
// The attribute bag attached to every managed object. Values are opaque
// strings tagged with the JSON kind the server used, so server-managed
// values are written back with the type they were read with. The wire form
// (`{"Name": {"value": ..., "inheritance_source": ...}}`) is decoded entry
// by entry so one odd value never hides the rest.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;
use crate::reconcile::ReconcileError;
use crate::reconcile::decode::json_kind;

// ── AttrKind ────────────────────────────────────────────────────────

/// JSON type of an attribute value on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrKind {
    /// A string; also what every user-declared value starts as.
    #[default]
    String,
    Integer,
    Boolean,
    /// Multi-valued attribute, stored as a JSON array string.
    List,
}

impl AttrKind {
    #[allow(clippy::trivially_copy_pass_by_ref)]
    fn is_string(&self) -> bool {
        *self == Self::String
    }
}

// ── AttrValue ───────────────────────────────────────────────────────

/// One attribute value plus whether the object merely inherits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AttrRepr", into = "AttrRepr")]
pub struct AttrValue {
    pub value: String,
    pub inherited: bool,
    pub kind: AttrKind,
}

impl AttrValue {
    pub fn declared(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            inherited: false,
            kind: AttrKind::String,
        }
    }

    pub fn inherited(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            inherited: true,
            kind: AttrKind::String,
        }
    }

    pub fn with_kind(mut self, kind: AttrKind) -> Self {
        self.kind = kind;
        self
    }
}

/// State encoding: declared string values persist as bare strings, the
/// rest carry the inherited flag and any non-string kind.
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AttrRepr {
    Plain(String),
    Flagged {
        value: String,
        #[serde(default)]
        inherited: bool,
        #[serde(default, skip_serializing_if = "AttrKind::is_string")]
        kind: AttrKind,
    },
}

impl From<AttrRepr> for AttrValue {
    fn from(repr: AttrRepr) -> Self {
        match repr {
            AttrRepr::Plain(value) => Self::declared(value),
            AttrRepr::Flagged {
                value,
                inherited,
                kind,
            } => Self {
                value,
                inherited,
                kind,
            },
        }
    }
}

impl From<AttrValue> for AttrRepr {
    fn from(v: AttrValue) -> Self {
        if v.inherited || !v.kind.is_string() {
            Self::Flagged {
                value: v.value,
                inherited: v.inherited,
                kind: v.kind,
            }
        } else {
            Self::Plain(v.value)
        }
    }
}

// ── AttributeMap ────────────────────────────────────────────────────

/// Ordered, case-sensitive map of attribute name to value.
///
/// Insertion order carries no meaning but is preserved so that state and
/// request bodies are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeMap(IndexMap<String, AttrValue>);

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a user-declared value, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), AttrValue::declared(value));
    }

    pub fn insert_value(&mut self, name: impl Into<String>, value: AttrValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut AttrValue> {
        self.0.get_mut(name)
    }

    /// The plain string value of an attribute.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(|v| v.value.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.0.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    // ── Wire conversion ─────────────────────────────────────────────

    /// Decode the WAPI `extattrs` object.
    ///
    /// An entry carrying `inheritance_source` is flagged inherited. Entries
    /// that can't be decoded are skipped with a warning; a value that isn't
    /// an object at all is an error.
    pub fn from_wire(raw: &Value, diags: &mut Diagnostics) -> Result<Self, ReconcileError> {
        let Value::Object(entries) = raw else {
            return Err(ReconcileError::MalformedEntry {
                path: "extattrs".into(),
                reason: format!("expected an object, got {}", json_kind(raw)),
            });
        };

        let mut map = Self::new();
        for (name, entry) in entries {
            match decode_wire_entry(entry) {
                Ok(value) => map.insert_value(name.clone(), value),
                Err(reason) => diags.push(ReconcileError::MalformedEntry {
                    path: format!("extattrs[{name:?}]"),
                    reason,
                }),
            }
        }
        Ok(map)
    }

    /// Encode as a WAPI `extattrs` request object.
    ///
    /// Values holding a JSON array of strings are sent as multi-value lists.
    pub fn to_wire(&self) -> Value {
        let entries: Map<String, Value> = self
            .0
            .iter()
            .map(|(name, v)| {
                let mut obj = Map::new();
                obj.insert("value".into(), encode_wire_value(v));
                (name.clone(), Value::Object(obj))
            })
            .collect();
        Value::Object(entries)
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for AttributeMap {
    fn from(entries: [(K, V); N]) -> Self {
        let mut map = Self::new();
        for (k, v) in entries {
            map.insert(k, v);
        }
        map
    }
}

impl FromIterator<(String, AttrValue)> for AttributeMap {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for AttributeMap {
    type Item = (String, AttrValue);
    type IntoIter = indexmap::map::IntoIter<String, AttrValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn decode_wire_entry(entry: &Value) -> Result<AttrValue, String> {
    let Value::Object(obj) = entry else {
        return Err(format!("expected an object, got {}", json_kind(entry)));
    };
    let raw = obj.get("value").ok_or_else(|| "missing \"value\"".to_owned())?;

    let (value, kind) = match raw {
        Value::String(s) => (s.clone(), AttrKind::String),
        Value::Number(n) => (n.to_string(), AttrKind::Integer),
        Value::Bool(b) => (b.to_string(), AttrKind::Boolean),
        Value::Array(items) => {
            if !items.iter().all(|i| i.is_string() || i.is_number()) {
                return Err("list values must hold strings or numbers".into());
            }
            (Value::Array(items.clone()).to_string(), AttrKind::List)
        }
        Value::Null | Value::Object(_) => {
            return Err(format!("unsupported value type: {}", json_kind(raw)));
        }
    };

    let inherited = obj
        .get("inheritance_source")
        .is_some_and(|src| !src.is_null());

    Ok(AttrValue {
        value,
        inherited,
        kind,
    })
}

/// Restore the JSON type the value was read with. A value that no longer
/// parses as its kind is sent as a string and left for WAPI to reject.
fn encode_wire_value(attr: &AttrValue) -> Value {
    let value = attr.value.as_str();
    let typed = match attr.kind {
        AttrKind::Integer => value
            .parse::<i64>()
            .ok()
            .map(|n| Value::Number(n.into())),
        AttrKind::Boolean => value.parse::<bool>().ok().map(Value::Bool),
        AttrKind::List | AttrKind::String if value.starts_with('[') => {
            match serde_json::from_str::<Value>(value) {
                Ok(Value::Array(items)) => Some(Value::Array(items)),
                _ => None,
            }
        }
        AttrKind::List | AttrKind::String => None,
    };
    typed.unwrap_or_else(|| Value::String(value.to_owned()))
}
