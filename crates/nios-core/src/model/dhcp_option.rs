// ── DHCP option entries ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::diagnostics::Diagnostics;
use crate::reconcile::{FieldDecoder, FromWireEntry, ListEntry};

/// One entry of an object's `options` list.
///
/// An option is identified by its `name`, its `num`, or both; the server
/// always reports both, while configuration usually names only one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpOption {
    pub name: Option<String>,
    pub num: Option<u32>,
    pub value: Option<String>,
    pub vendor_class: Option<String>,
    pub use_option: Option<bool>,
}

impl DhcpOption {
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn numbered(num: u32, value: impl Into<String>) -> Self {
        Self {
            num: Some(num),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self, path: &str, diags: &mut Diagnostics) {
        if self.name.is_none() && self.num.is_none() {
            diags.add_error(
                "Invalid DHCP option",
                format!("{path}: one of \"name\" or \"num\" is required"),
            );
        }
        if let Some(num) = self.num {
            if num > 255 {
                diags.add_error(
                    "Invalid DHCP option",
                    format!("{path}: option number {num} is outside 0..=255"),
                );
            }
        }
    }

    pub fn to_wire(&self) -> Value {
        let mut obj = Map::new();
        if let Some(name) = &self.name {
            obj.insert("name".into(), Value::from(name.as_str()));
        }
        if let Some(num) = self.num {
            obj.insert("num".into(), Value::from(num));
        }
        if let Some(value) = &self.value {
            obj.insert("value".into(), Value::from(value.as_str()));
        }
        if let Some(vendor_class) = &self.vendor_class {
            obj.insert("vendor_class".into(), Value::from(vendor_class.as_str()));
        }
        if let Some(use_option) = self.use_option {
            obj.insert("use_option".into(), Value::Bool(use_option));
        }
        Value::Object(obj)
    }
}

impl ListEntry for DhcpOption {
    fn identity_keys(&self) -> Vec<(&'static str, String)> {
        let mut keys = Vec::with_capacity(2);
        if let Some(name) = &self.name {
            keys.push(("name", name.clone()));
        }
        if let Some(num) = self.num {
            keys.push(("num", num.to_string()));
        }
        keys
    }
}

impl FromWireEntry for DhcpOption {
    fn decode(fields: &mut FieldDecoder<'_>) -> Option<Self> {
        let option = Self {
            name: fields.string("name"),
            num: fields.u32("num"),
            value: fields.string("value"),
            vendor_class: fields.string("vendor_class"),
            use_option: fields.bool("use_option"),
        };
        if option.name.is_none() && option.num.is_none() {
            return fields.missing("name");
        }
        Some(option)
    }
}
