// ── DHCP option definition ──

use serde::{Deserialize, Serialize};

use super::common::{check_range, require};
use crate::diagnostics::Diagnostics;

pub const DEFAULT_OPTION_SPACE: &str = "DHCP";

/// Value types WAPI accepts for a custom option.
pub const OPTION_TYPES: &[&str] = &[
    "8-bit signed integer",
    "8-bit unsigned integer",
    "8-bit unsigned integer (1,2,4,8)",
    "16-bit signed integer",
    "16-bit unsigned integer",
    "32-bit signed integer",
    "32-bit unsigned integer",
    "array of 8-bit integer",
    "array of 8-bit unsigned integer",
    "array of 16-bit integer",
    "array of 16-bit unsigned integer",
    "array of 32-bit integer",
    "array of 32-bit unsigned integer",
    "array of ip-address",
    "array of ip-address pair",
    "boolean",
    "boolean array of ip-address",
    "boolean-text",
    "domain-list",
    "domain-name",
    "encapsulated",
    "ip-address",
    "string",
    "text",
];

/// A custom DHCP option in an option space.
///
/// Option definitions carry no extensible attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionDefinition {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    pub name: Option<String>,
    pub code: Option<u32>,
    #[serde(rename = "type")]
    pub option_type: Option<String>,
    pub space: Option<String>,
}

impl OptionDefinition {
    pub fn apply_defaults(&mut self) {
        self.space
            .get_or_insert_with(|| DEFAULT_OPTION_SPACE.to_owned());
    }

    pub fn validate(&self, diags: &mut Diagnostics) {
        const OBJECT: &str = "option definition";
        require(self.name.as_ref(), "name", OBJECT, diags);
        require(self.code.as_ref(), "code", OBJECT, diags);
        require(self.option_type.as_ref(), "type", OBJECT, diags);
        check_range(self.code, 1..=254, "code", OBJECT, diags);

        if let Some(t) = &self.option_type {
            if !OPTION_TYPES.contains(&t.as_str()) {
                diags.add_error(
                    "Invalid option definition",
                    format!("unsupported option type {t:?}"),
                );
            }
        }
    }
}
