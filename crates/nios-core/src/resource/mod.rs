// ── Resource handlers ──
//
// The lifecycle handlers are written once, generically, over `WapiObject`.
// Each managed object type supplies its defaults, validation, attribute
// accessors and list stabilization here; the HTTP choreography lives in
// `lifecycle` and `data_source`.

pub mod data_source;
pub mod lifecycle;

use crate::convert::WireConvert;
use crate::diagnostics::Diagnostics;
use crate::model::credential::PASSWORD;
use crate::model::fixed_address::FUNC_CALL;
use crate::model::{
    AttributeMap, FailoverAssociation, FixedAddress, FixedAddressTemplate, OptionDefinition,
    SharedNetwork,
};
use crate::plan::{Override, PlanValue};
use crate::reconcile::{copy_field_from_plan_to_resp, copy_object_field_from_plan, stabilize_list};

pub use data_source::{DataSourceQuery, ObjectDataSource};
pub use lifecycle::ObjectResource;

/// A NIOS object type the provider manages as a resource.
pub trait WapiObject: WireConvert + Clone + Send + Sync + 'static {
    /// Resource type name as exposed to the declarative engine.
    const TYPE_NAME: &'static str;

    /// Whether the object carries extensible attributes at all.
    const SUPPORTS_EXT_ATTRS: bool = true;

    fn reference(&self) -> Option<&str>;

    fn apply_defaults(&mut self) {}

    /// Before an update: copy server-assigned values the plan cannot know
    /// from `prior` state.
    fn carry_forward(&mut self, _prior: &Self) {}

    fn validate(&self, diags: &mut Diagnostics);

    /// Attributes the user declared (the user-visible snapshot in state).
    fn ext_attrs(&self) -> Option<&AttributeMap> {
        None
    }

    /// Every attribute the server reported at the last read or write.
    fn ext_attrs_all(&self) -> Option<&AttributeMap> {
        None
    }

    fn set_ext_attrs(&mut self, _visible: Option<AttributeMap>, _all: Option<AttributeMap>) {}

    /// Align a freshly flattened model with `planned` (plan or prior state):
    /// nested lists in plan order, write-only fields carried over.
    fn stabilize(&mut self, _planned: &Self) {}
}

/// Result of one handler invocation.
///
/// `value` is `None` whenever `diagnostics` holds an error: the engine
/// must not persist anything for the instance in that case.
#[derive(Debug)]
pub struct Outcome<T> {
    pub value: Option<T>,
    pub diagnostics: Diagnostics,
}

impl<T> Outcome<T> {
    pub(crate) fn new(value: T, diagnostics: Diagnostics) -> Self {
        let value = (!diagnostics.has_errors()).then_some(value);
        Self { value, diagnostics }
    }

    pub(crate) fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            value: None,
            diagnostics,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.value.is_some()
    }
}

/// What a read found.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<M> {
    Present(M),
    /// The object no longer exists; the engine should drop it from state.
    Removed,
}

impl<M> ReadOutcome<M> {
    pub fn present(self) -> Option<M> {
        match self {
            Self::Present(m) => Some(m),
            Self::Removed => None,
        }
    }
}

// ── Fixed address ──────────────────────────────────────────────────

impl WapiObject for FixedAddress {
    const TYPE_NAME: &'static str = "nios_dhcp_fixed_address";

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn apply_defaults(&mut self) {
        FixedAddress::apply_defaults(self);
    }

    /// An address allocated by `func_call` is pinned, so the PUT never
    /// asks for a new one.
    fn carry_forward(&mut self, prior: &Self) {
        if self.ipv4addr.is_none() && self.func_call.is_some() {
            self.ipv4addr.clone_from(&prior.ipv4addr);
        }
    }

    fn validate(&self, diags: &mut Diagnostics) {
        FixedAddress::validate(self, diags);
    }

    fn ext_attrs(&self) -> Option<&AttributeMap> {
        self.extattrs.as_ref()
    }

    fn ext_attrs_all(&self) -> Option<&AttributeMap> {
        self.extattrs_all.as_ref()
    }

    fn set_ext_attrs(&mut self, visible: Option<AttributeMap>, all: Option<AttributeMap>) {
        self.extattrs = visible;
        self.extattrs_all = all;
    }

    fn stabilize(&mut self, planned: &Self) {
        let options = std::mem::take(&mut self.options);
        self.options = stabilize_list(
            &planned.options,
            options,
            &Override::from_companion(planned.use_options, planned.options.known()),
        );

        let creds = std::mem::take(&mut self.cli_credentials);
        let mut creds = stabilize_list(
            &planned.cli_credentials,
            creds,
            &Override::from_companion(
                planned.use_cli_credentials,
                planned.cli_credentials.known(),
            ),
        );
        if let PlanValue::Known(entries) = &mut creds {
            copy_field_from_plan_to_resp(&planned.cli_credentials, entries, &PASSWORD);
        }
        self.cli_credentials = creds;

        copy_object_field_from_plan(PlanValue::Known(planned), self, &FUNC_CALL);
    }
}

// ── Shared network ─────────────────────────────────────────────────

impl WapiObject for SharedNetwork {
    const TYPE_NAME: &'static str = "nios_dhcp_shared_network";

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn apply_defaults(&mut self) {
        SharedNetwork::apply_defaults(self);
    }

    fn validate(&self, diags: &mut Diagnostics) {
        SharedNetwork::validate(self, diags);
    }

    fn ext_attrs(&self) -> Option<&AttributeMap> {
        self.extattrs.as_ref()
    }

    fn ext_attrs_all(&self) -> Option<&AttributeMap> {
        self.extattrs_all.as_ref()
    }

    fn set_ext_attrs(&mut self, visible: Option<AttributeMap>, all: Option<AttributeMap>) {
        self.extattrs = visible;
        self.extattrs_all = all;
    }

    fn stabilize(&mut self, planned: &Self) {
        let options = std::mem::take(&mut self.options);
        self.options = stabilize_list(
            &planned.options,
            options,
            &Override::from_companion(planned.use_options, planned.options.known()),
        );
    }
}

// ── Failover association ───────────────────────────────────────────

impl WapiObject for FailoverAssociation {
    const TYPE_NAME: &'static str = "nios_dhcp_failover_association";

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn apply_defaults(&mut self) {
        FailoverAssociation::apply_defaults(self);
    }

    fn validate(&self, diags: &mut Diagnostics) {
        FailoverAssociation::validate(self, diags);
    }

    fn ext_attrs(&self) -> Option<&AttributeMap> {
        self.extattrs.as_ref()
    }

    fn ext_attrs_all(&self) -> Option<&AttributeMap> {
        self.extattrs_all.as_ref()
    }

    fn set_ext_attrs(&mut self, visible: Option<AttributeMap>, all: Option<AttributeMap>) {
        self.extattrs = visible;
        self.extattrs_all = all;
    }
}

// ── Option definition ──────────────────────────────────────────────

impl WapiObject for OptionDefinition {
    const TYPE_NAME: &'static str = "nios_dhcp_option_definition";
    const SUPPORTS_EXT_ATTRS: bool = false;

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn apply_defaults(&mut self) {
        OptionDefinition::apply_defaults(self);
    }

    fn validate(&self, diags: &mut Diagnostics) {
        OptionDefinition::validate(self, diags);
    }
}

// ── Fixed address template ─────────────────────────────────────────

impl WapiObject for FixedAddressTemplate {
    const TYPE_NAME: &'static str = "nios_dhcp_fixed_address_template";

    fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    fn validate(&self, diags: &mut Diagnostics) {
        FixedAddressTemplate::validate(self, diags);
    }

    fn ext_attrs(&self) -> Option<&AttributeMap> {
        self.extattrs.as_ref()
    }

    fn ext_attrs_all(&self) -> Option<&AttributeMap> {
        self.extattrs_all.as_ref()
    }

    fn set_ext_attrs(&mut self, visible: Option<AttributeMap>, all: Option<AttributeMap>) {
        self.extattrs = visible;
        self.extattrs_all = all;
    }

    fn stabilize(&mut self, planned: &Self) {
        let options = std::mem::take(&mut self.options);
        self.options = stabilize_list(
            &planned.options,
            options,
            &Override::from_companion(planned.use_options, planned.options.known()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CliCredential, DhcpOption, FuncCall};
    use pretty_assertions::assert_eq;

    fn server_option(name: &str, num: u32, value: &str) -> DhcpOption {
        DhcpOption {
            name: Some(name.into()),
            num: Some(num),
            value: Some(value.into()),
            use_option: Some(true),
            vendor_class: None,
        }
    }

    #[test]
    fn fixed_address_stabilizes_options_credentials_and_func_call() {
        let planned = FixedAddress {
            func_call: Some(FuncCall::next_available_ip("10.0.0.0/24", "default")),
            options: PlanValue::Known(vec![
                DhcpOption::named("domain-name", "example.com"),
                DhcpOption::numbered(3, "10.0.0.1"),
            ]),
            cli_credentials: PlanValue::Known(vec![CliCredential {
                credential_type: Some("SSH".into()),
                password: Some("hunter2".into()),
                ..CliCredential::default()
            }]),
            use_cli_credentials: Some(true),
            ..FixedAddress::default()
        };
        let mut read = FixedAddress {
            ipv4addr: Some("10.0.0.9".into()),
            options: PlanValue::Known(vec![
                server_option("routers", 3, "10.0.0.1"),
                server_option("dhcp-lease-time", 51, "43200"),
                server_option("domain-name", 15, "example.com"),
            ]),
            cli_credentials: PlanValue::Known(vec![CliCredential {
                credential_type: Some("SSH".into()),
                user: Some("admin".into()),
                ..CliCredential::default()
            }]),
            ..FixedAddress::default()
        };

        read.stabilize(&planned);

        let names: Vec<_> = read
            .options
            .known()
            .unwrap_or(&Vec::new())
            .iter()
            .map(|o| o.name.clone().unwrap_or_default())
            .collect();
        assert_eq!(names, vec!["domain-name", "routers"]);
        let creds = read.cli_credentials.known().cloned().unwrap_or_default();
        assert_eq!(creds[0].password.as_deref(), Some("hunter2"));
        assert_eq!(read.func_call, planned.func_call);
    }

    #[test]
    fn allocated_address_is_carried_into_update() {
        let mut plan = FixedAddress {
            func_call: Some(FuncCall::next_available_ip("10.0.0.0/24", "default")),
            ..FixedAddress::default()
        };
        let prior = FixedAddress {
            ipv4addr: Some("10.0.0.5".into()),
            ..FixedAddress::default()
        };

        plan.carry_forward(&prior);
        assert_eq!(plan.ipv4addr.as_deref(), Some("10.0.0.5"));

        let mut explicit = FixedAddress {
            ipv4addr: Some("10.0.0.7".into()),
            ..FixedAddress::default()
        };
        explicit.carry_forward(&prior);
        assert_eq!(explicit.ipv4addr.as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn undeclared_options_stay_null() {
        let planned = SharedNetwork::default();
        let mut read = SharedNetwork {
            options: PlanValue::Known(vec![server_option("dhcp-lease-time", 51, "43200")]),
            ..SharedNetwork::default()
        };
        read.stabilize(&planned);
        assert_eq!(read.options, PlanValue::Null);
    }

    #[test]
    fn outcome_drops_value_on_error() {
        let mut diags = Diagnostics::new();
        diags.add_warning("skipped", "options[1]");
        assert!(Outcome::new(1, diags.clone()).is_ok());

        diags.add_error("missing data", "");
        let outcome = Outcome::new(1, diags);
        assert!(!outcome.is_ok());
        assert_eq!(outcome.diagnostics.len(), 2);
    }
}
