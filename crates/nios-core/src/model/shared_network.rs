// ── Shared network ──

use serde::{Deserialize, Serialize};

use super::common::require;
use super::dhcp_option::DhcpOption;
use super::ext_attrs::AttributeMap;
use crate::diagnostics::Diagnostics;
use crate::plan::PlanValue;

/// Several IPv4 networks served as one physical segment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedNetwork {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    pub name: Option<String>,
    /// `network/...` references of the member networks.
    #[serde(default)]
    pub networks: Vec<String>,
    pub comment: Option<String>,
    pub disable: Option<bool>,
    pub network_view: Option<String>,
    #[serde(default)]
    pub options: PlanValue<Vec<DhcpOption>>,
    pub use_options: Option<bool>,
    pub extattrs: Option<AttributeMap>,
    pub extattrs_all: Option<AttributeMap>,
}

impl SharedNetwork {
    pub fn apply_defaults(&mut self) {
        self.network_view
            .get_or_insert_with(|| super::fixed_address::DEFAULT_NETWORK_VIEW.to_owned());
    }

    pub fn validate(&self, diags: &mut Diagnostics) {
        require(self.name.as_ref(), "name", "shared network", diags);

        if self.networks.is_empty() {
            diags.add_error(
                "Invalid shared network",
                "\"networks\" must list at least one network",
            );
        }
        for network in &self.networks {
            if !network.starts_with("network/") {
                diags.add_error(
                    "Invalid shared network",
                    format!("{network:?} is not a network reference"),
                );
            }
        }

        if let Some(options) = self.options.known() {
            for (i, opt) in options.iter().enumerate() {
                opt.validate(&format!("options[{i}]"), diags);
            }
        }
    }
}
