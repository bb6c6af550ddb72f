// ── Wire-to-domain conversions ──
//
// Bridges `nios_api` wire structs and the `nios_core::model` state models
// in both directions. Expand builds a request body from a model; Flatten
// builds a model from a server object, decoding nested lists entry by
// entry. Neither touches extensible attributes: the handlers own those
// because they depend on the plan and prior state.

use std::str::FromStr;

use serde_json::Value;

use nios_api::{self as api, ObjectRef, WireObject};

use crate::diagnostics::Diagnostics;
use crate::model::{
    CliCredential, DhcpOption, FailoverAssociation, FixedAddress, FixedAddressTemplate,
    MacAddress, OptionDefinition, SharedNetwork,
};
use crate::plan::PlanValue;
use crate::reconcile::{FromWireEntry, ReconcileError, decode_entries};

/// Conversion between a state model and its WAPI wire struct.
pub trait WireConvert: Sized {
    type Wire: WireObject + Clone + Default;

    /// Request body for this model, without `extattrs`.
    fn expand(&self) -> Self::Wire;

    /// State model for a server object, without `extattrs`.
    fn flatten(wire: Self::Wire, diags: &mut Diagnostics) -> Self;
}

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a wire enum, reporting (and dropping) values this version
/// doesn't know.
fn parse_enum<E: FromStr>(raw: Option<String>, field: &str, diags: &mut Diagnostics) -> Option<E> {
    let raw = raw?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            diags.push(ReconcileError::MalformedEntry {
                path: field.to_owned(),
                reason: format!("unrecognized value {raw:?}"),
            });
            None
        }
    }
}

fn decode_list<T: FromWireEntry>(
    raw: Option<Vec<Value>>,
    path: &str,
    diags: &mut Diagnostics,
) -> PlanValue<Vec<T>> {
    match raw {
        Some(entries) => PlanValue::Known(decode_entries(path, &entries, diags)),
        None => PlanValue::Null,
    }
}

fn options_to_wire(options: &PlanValue<Vec<DhcpOption>>) -> Option<Vec<Value>> {
    options
        .known()
        .map(|opts| opts.iter().map(DhcpOption::to_wire).collect())
}

// ── Fixed address ──────────────────────────────────────────────────

impl WireConvert for FixedAddress {
    type Wire = api::FixedAddress;

    fn expand(&self) -> api::FixedAddress {
        // An allocated address is sent as-is so updates never re-run the
        // allocation function.
        let ipv4addr = self
            .ipv4addr
            .clone()
            .or_else(|| self.func_call.as_ref().map(|fc| fc.to_wire()));

        api::FixedAddress {
            ipv4addr,
            mac: self.mac.as_deref().map(|m| MacAddress::new(m).to_string()),
            match_client: self.match_client.map(|m| m.to_string()),
            dhcp_client_identifier: self.client_identifier.clone(),
            client_identifier_prepend_zero: self.client_identifier_prepend_zero,
            agent_circuit_id: self.agent_circuit_id.clone(),
            agent_remote_id: self.agent_remote_id.clone(),
            name: self.name.clone(),
            comment: self.comment.clone(),
            disable: self.disable,
            network_view: self.network_view.clone(),
            options: options_to_wire(&self.options),
            use_options: self.use_options,
            cli_credentials: self
                .cli_credentials
                .known()
                .map(|creds| creds.iter().map(CliCredential::to_wire).collect()),
            use_cli_credentials: self.use_cli_credentials,
            ..api::FixedAddress::default()
        }
    }

    fn flatten(wire: api::FixedAddress, diags: &mut Diagnostics) -> Self {
        Self {
            reference: wire.reference,
            ipv4addr: wire.ipv4addr,
            func_call: None,
            mac: wire.mac,
            match_client: parse_enum(wire.match_client, "match_client", diags),
            client_identifier: wire.dhcp_client_identifier,
            client_identifier_prepend_zero: wire.client_identifier_prepend_zero,
            agent_circuit_id: wire.agent_circuit_id,
            agent_remote_id: wire.agent_remote_id,
            name: wire.name,
            comment: wire.comment,
            disable: wire.disable,
            network_view: wire.network_view,
            network: wire.network,
            options: decode_list(wire.options, "options", diags),
            use_options: wire.use_options,
            cli_credentials: decode_list(wire.cli_credentials, "cli_credentials", diags),
            use_cli_credentials: wire.use_cli_credentials,
            extattrs: None,
            extattrs_all: None,
        }
    }
}

// ── Shared network ─────────────────────────────────────────────────

impl WireConvert for SharedNetwork {
    type Wire = api::SharedNetwork;

    fn expand(&self) -> api::SharedNetwork {
        api::SharedNetwork {
            name: self.name.clone(),
            networks: Some(
                self.networks
                    .iter()
                    .map(|r| ObjectRef {
                        reference: r.clone(),
                    })
                    .collect(),
            ),
            comment: self.comment.clone(),
            disable: self.disable,
            network_view: self.network_view.clone(),
            options: options_to_wire(&self.options),
            use_options: self.use_options,
            ..api::SharedNetwork::default()
        }
    }

    fn flatten(wire: api::SharedNetwork, diags: &mut Diagnostics) -> Self {
        Self {
            reference: wire.reference,
            name: wire.name,
            networks: wire
                .networks
                .unwrap_or_default()
                .into_iter()
                .map(|r| r.reference)
                .collect(),
            comment: wire.comment,
            disable: wire.disable,
            network_view: wire.network_view,
            options: decode_list(wire.options, "options", diags),
            use_options: wire.use_options,
            extattrs: None,
            extattrs_all: None,
        }
    }
}

// ── Failover association ───────────────────────────────────────────

impl WireConvert for FailoverAssociation {
    type Wire = api::DhcpFailover;

    fn expand(&self) -> api::DhcpFailover {
        api::DhcpFailover {
            name: self.name.clone(),
            primary: self.primary.clone(),
            primary_server_type: self.primary_server_type.map(|t| t.to_string()),
            secondary: self.secondary.clone(),
            secondary_server_type: self.secondary_server_type.map(|t| t.to_string()),
            max_response_delay: self.max_response_delay,
            max_client_lead_time: self.max_client_lead_time,
            load_balance_split: self.load_balance_split,
            comment: self.comment.clone(),
            ..api::DhcpFailover::default()
        }
    }

    fn flatten(wire: api::DhcpFailover, diags: &mut Diagnostics) -> Self {
        Self {
            reference: wire.reference,
            name: wire.name,
            primary: wire.primary,
            primary_server_type: parse_enum(wire.primary_server_type, "primary_server_type", diags),
            secondary: wire.secondary,
            secondary_server_type: parse_enum(
                wire.secondary_server_type,
                "secondary_server_type",
                diags,
            ),
            max_response_delay: wire.max_response_delay,
            max_client_lead_time: wire.max_client_lead_time,
            load_balance_split: wire.load_balance_split,
            comment: wire.comment,
            extattrs: None,
            extattrs_all: None,
        }
    }
}

// ── Option definition ──────────────────────────────────────────────

impl WireConvert for OptionDefinition {
    type Wire = api::DhcpOptionDefinition;

    fn expand(&self) -> api::DhcpOptionDefinition {
        api::DhcpOptionDefinition {
            name: self.name.clone(),
            code: self.code,
            space: self.space.clone(),
            option_type: self.option_type.clone(),
            ..api::DhcpOptionDefinition::default()
        }
    }

    fn flatten(wire: api::DhcpOptionDefinition, _diags: &mut Diagnostics) -> Self {
        Self {
            reference: wire.reference,
            name: wire.name,
            code: wire.code,
            option_type: wire.option_type,
            space: wire.space,
        }
    }
}

// ── Fixed address template ─────────────────────────────────────────

impl WireConvert for FixedAddressTemplate {
    type Wire = api::FixedAddressTemplate;

    fn expand(&self) -> api::FixedAddressTemplate {
        api::FixedAddressTemplate {
            name: self.name.clone(),
            offset: self.offset,
            number_of_addresses: self.number_of_addresses,
            comment: self.comment.clone(),
            options: options_to_wire(&self.options),
            use_options: self.use_options,
            ..api::FixedAddressTemplate::default()
        }
    }

    fn flatten(wire: api::FixedAddressTemplate, diags: &mut Diagnostics) -> Self {
        Self {
            reference: wire.reference,
            name: wire.name,
            offset: wire.offset,
            number_of_addresses: wire.number_of_addresses,
            comment: wire.comment,
            options: decode_list(wire.options, "options", diags),
            use_options: wire.use_options,
            extattrs: None,
            extattrs_all: None,
        }
    }
}
