// ── Fixed address ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::common::MacAddress;
use super::credential::CliCredential;
use super::dhcp_option::DhcpOption;
use super::ext_attrs::AttributeMap;
use crate::diagnostics::Diagnostics;
use crate::plan::PlanValue;
use crate::reconcile::Field;

pub const DEFAULT_NETWORK_VIEW: &str = "default";

/// How the DHCP server matches a client to this reservation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchClient {
    #[default]
    MacAddress,
    ClientId,
    Reserved,
    CircuitId,
    RemoteId,
}

/// Server-side address allocation, sent in place of a literal `ipv4addr`.
///
/// `object_function` is the WAPI function (e.g. `nextavailableip`) and
/// `object_parameters` its arguments, usually a network CIDR and view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncCall {
    pub attribute_name: String,
    pub object_function: String,
    #[serde(default)]
    pub object_parameters: Vec<String>,
}

impl FuncCall {
    pub fn next_available_ip(network: impl Into<String>, network_view: impl Into<String>) -> Self {
        Self {
            attribute_name: "ipv4addr".into(),
            object_function: "nextavailableip".into(),
            object_parameters: vec![network.into(), network_view.into()],
        }
    }

    /// The `func:` string WAPI accepts in place of an address.
    pub fn to_wire(&self) -> String {
        format!(
            "func:{}:{}",
            self.object_function,
            self.object_parameters.join(",")
        )
    }
}

/// A DHCP reservation binding an IPv4 address to a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedAddress {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    pub ipv4addr: Option<String>,
    /// Never returned by the server; carried over from plan or state.
    pub func_call: Option<FuncCall>,
    pub mac: Option<String>,
    pub match_client: Option<MatchClient>,
    pub client_identifier: Option<String>,
    pub client_identifier_prepend_zero: Option<bool>,
    pub agent_circuit_id: Option<String>,
    pub agent_remote_id: Option<String>,
    pub name: Option<String>,
    pub comment: Option<String>,
    pub disable: Option<bool>,
    pub network_view: Option<String>,
    /// Computed: the network containing `ipv4addr`.
    pub network: Option<String>,
    #[serde(default)]
    pub options: PlanValue<Vec<DhcpOption>>,
    pub use_options: Option<bool>,
    #[serde(default)]
    pub cli_credentials: PlanValue<Vec<CliCredential>>,
    pub use_cli_credentials: Option<bool>,
    pub extattrs: Option<AttributeMap>,
    pub extattrs_all: Option<AttributeMap>,
}

pub const FUNC_CALL: Field<FixedAddress, FuncCall> = Field {
    name: "func_call",
    get: |fa| fa.func_call.as_ref(),
    set: |fa, v| fa.func_call = v,
};

impl FixedAddress {
    pub fn apply_defaults(&mut self) {
        self.match_client.get_or_insert_with(MatchClient::default);
        self.network_view
            .get_or_insert_with(|| DEFAULT_NETWORK_VIEW.to_owned());
    }

    pub fn validate(&self, diags: &mut Diagnostics) {
        const OBJECT: &str = "Invalid fixed address";

        if self.ipv4addr.is_none() && self.func_call.is_none() {
            diags.add_error(OBJECT, "one of \"ipv4addr\" or \"func_call\" is required");
        }
        if let Some(fc) = &self.func_call {
            if fc.attribute_name != "ipv4addr" {
                diags.add_error(
                    OBJECT,
                    format!(
                        "func_call can only allocate \"ipv4addr\", not {:?}",
                        fc.attribute_name
                    ),
                );
            }
        }

        if let Some(mac) = &self.mac {
            if !MacAddress::new(mac).is_valid() {
                diags.add_error(OBJECT, format!("{mac:?} is not a valid MAC address"));
            }
        }

        let required = match self.match_client.unwrap_or_default() {
            MatchClient::MacAddress => Some(("mac", self.mac.is_some())),
            MatchClient::ClientId => Some(("client_identifier", self.client_identifier.is_some())),
            MatchClient::CircuitId => Some(("agent_circuit_id", self.agent_circuit_id.is_some())),
            MatchClient::RemoteId => Some(("agent_remote_id", self.agent_remote_id.is_some())),
            MatchClient::Reserved => None,
        };
        if let Some((field, false)) = required {
            diags.add_error(
                OBJECT,
                format!(
                    "\"{field}\" is required when match_client is {}",
                    self.match_client.unwrap_or_default()
                ),
            );
        }

        if let Some(options) = self.options.known() {
            for (i, opt) in options.iter().enumerate() {
                opt.validate(&format!("options[{i}]"), diags);
            }
        }
        if let Some(creds) = self.cli_credentials.known() {
            for (i, cred) in creds.iter().enumerate() {
                cred.validate(&format!("cli_credentials[{i}]"), diags);
            }
        }
    }
}
