//! WAPI wire types for the DHCP objects the provider manages.
//!
//! Field names match the WAPI JSON exactly. Read-only fields (`_ref`,
//! `network`) deserialize but never serialize, so a struct read from the
//! server can be sent back as an update body. Nested lists (`options`,
//! `cli_credentials`) and `extattrs` stay as raw JSON: the core decodes
//! them entry by entry and reports malformed entries without discarding
//! the rest.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A WAPI object type the generic client verbs can operate on.
pub trait WireObject: Serialize + DeserializeOwned + Send + Sync {
    /// WAPI object type name, e.g. `fixedaddress`.
    const OBJECT_TYPE: &'static str;

    /// Fields requested through `_return_fields` on every read and write.
    const RETURN_FIELDS: &'static [&'static str];

    /// The object's `_ref`, present on anything read from the server.
    fn reference(&self) -> Option<&str>;

    /// Raw `extattrs`, for object types that carry them.
    fn ext_attrs(&self) -> Option<&Value> {
        None
    }

    fn set_ext_attrs(&mut self, _ext_attrs: Value) {}
}

// ── Envelope ─────────────────────────────────────────────────────────

/// `_return_as_object=1` response wrapper.
#[derive(Debug, Deserialize)]
pub(crate) struct ResultEnvelope<T> {
    pub result: T,
    #[serde(default)]
    pub next_page_id: Option<String>,
}

/// Error body returned with non-2xx status codes.
#[derive(Debug, Deserialize)]
pub(crate) struct WapiErrorBody {
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

// ── Shared nested types ──────────────────────────────────────────────

/// Reference to another WAPI object (`{"_ref": "network/..."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "_ref")]
    pub reference: String,
}

// ── fixedaddress ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedAddress {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    /// Either a dotted address or a `func:nextavailableip:...` call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipv4addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_client: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dhcp_client_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_identifier_prepend_zero: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_circuit_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_remote_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_view: Option<String>,
    #[serde(default, skip_serializing)]
    pub network: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_options: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_credentials: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_cli_credentials: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<Value>,
}

impl WireObject for FixedAddress {
    const OBJECT_TYPE: &'static str = "fixedaddress";
    const RETURN_FIELDS: &'static [&'static str] = &[
        "ipv4addr",
        "mac",
        "match_client",
        "dhcp_client_identifier",
        "client_identifier_prepend_zero",
        "agent_circuit_id",
        "agent_remote_id",
        "name",
        "comment",
        "disable",
        "network_view",
        "network",
        "options",
        "use_options",
        "cli_credentials",
        "use_cli_credentials",
        "extattrs",
    ];

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn ext_attrs(&self) -> Option<&Value> {
        self.extattrs.as_ref()
    }

    fn set_ext_attrs(&mut self, ext_attrs: Value) {
        self.extattrs = Some(ext_attrs);
    }
}

// ── sharednetwork ────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedNetwork {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networks: Option<Vec<ObjectRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_view: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_options: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<Value>,
}

impl WireObject for SharedNetwork {
    const OBJECT_TYPE: &'static str = "sharednetwork";
    const RETURN_FIELDS: &'static [&'static str] = &[
        "name",
        "networks",
        "comment",
        "disable",
        "network_view",
        "options",
        "use_options",
        "extattrs",
    ];

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn ext_attrs(&self) -> Option<&Value> {
        self.extattrs.as_ref()
    }

    fn set_ext_attrs(&mut self, ext_attrs: Value) {
        self.extattrs = Some(ext_attrs);
    }
}

// ── dhcpfailover ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DhcpFailover {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_server_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_server_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_response_delay: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_client_lead_time: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balance_split: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<Value>,
}

impl WireObject for DhcpFailover {
    const OBJECT_TYPE: &'static str = "dhcpfailover";
    const RETURN_FIELDS: &'static [&'static str] = &[
        "name",
        "primary",
        "primary_server_type",
        "secondary",
        "secondary_server_type",
        "max_response_delay",
        "max_client_lead_time",
        "load_balance_split",
        "comment",
        "extattrs",
    ];

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn ext_attrs(&self) -> Option<&Value> {
        self.extattrs.as_ref()
    }

    fn set_ext_attrs(&mut self, ext_attrs: Value) {
        self.extattrs = Some(ext_attrs);
    }
}

// ── dhcpoptiondefinition ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DhcpOptionDefinition {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub option_type: Option<String>,
}

impl WireObject for DhcpOptionDefinition {
    const OBJECT_TYPE: &'static str = "dhcpoptiondefinition";
    const RETURN_FIELDS: &'static [&'static str] = &["name", "code", "space", "type"];

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

// ── fixedaddresstemplate ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedAddressTemplate {
    #[serde(rename = "_ref", default, skip_serializing)]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_addresses: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_options: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extattrs: Option<Value>,
}

impl WireObject for FixedAddressTemplate {
    const OBJECT_TYPE: &'static str = "fixedaddresstemplate";
    const RETURN_FIELDS: &'static [&'static str] = &[
        "name",
        "offset",
        "number_of_addresses",
        "comment",
        "options",
        "use_options",
        "extattrs",
    ];

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn ext_attrs(&self) -> Option<&Value> {
        self.extattrs.as_ref()
    }

    fn set_ext_attrs(&mut self, ext_attrs: Value) {
        self.extattrs = Some(ext_attrs);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn read_only_fields_are_not_serialized() {
        let fa: FixedAddress = serde_json::from_value(json!({
            "_ref": "fixedaddress/ZG5zLmZpeGVk:10.0.0.5/default",
            "ipv4addr": "10.0.0.5",
            "mac": "aa:bb:cc:dd:ee:ff",
            "network": "10.0.0.0/24",
            "network_view": "default"
        }))
        .unwrap();

        assert_eq!(
            fa.reference.as_deref(),
            Some("fixedaddress/ZG5zLmZpeGVk:10.0.0.5/default")
        );
        let body = serde_json::to_value(&fa).unwrap();
        assert_eq!(
            body,
            json!({
                "ipv4addr": "10.0.0.5",
                "mac": "aa:bb:cc:dd:ee:ff",
                "network_view": "default"
            })
        );
    }

    #[test]
    fn option_definition_type_is_renamed() {
        let def = DhcpOptionDefinition {
            name: Some("tftp-servers".into()),
            code: Some(150),
            space: Some("DHCP".into()),
            option_type: Some("array of ip-address".into()),
            ..DhcpOptionDefinition::default()
        };
        let body = serde_json::to_value(&def).unwrap();
        assert_eq!(body["type"], json!("array of ip-address"));
    }
}
