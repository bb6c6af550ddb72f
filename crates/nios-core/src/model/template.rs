// ── Fixed address template ──

use serde::{Deserialize, Serialize};

use super::common::require;
use super::dhcp_option::DhcpOption;
use super::ext_attrs::AttributeMap;
use crate::diagnostics::Diagnostics;
use crate::plan::PlanValue;

/// Blueprint for bulk-creating fixed addresses in a network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedAddressTemplate {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    pub name: Option<String>,
    pub offset: Option<u32>,
    pub number_of_addresses: Option<u32>,
    pub comment: Option<String>,
    #[serde(default)]
    pub options: PlanValue<Vec<DhcpOption>>,
    pub use_options: Option<bool>,
    pub extattrs: Option<AttributeMap>,
    pub extattrs_all: Option<AttributeMap>,
}

impl FixedAddressTemplate {
    pub fn validate(&self, diags: &mut Diagnostics) {
        require(self.name.as_ref(), "name", "fixed address template", diags);

        if let Some(options) = self.options.known() {
            for (i, opt) in options.iter().enumerate() {
                opt.validate(&format!("options[{i}]"), diags);
            }
        }
    }
}
