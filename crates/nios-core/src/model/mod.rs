// ── Domain model ──
//
// State models handed to and returned by the resource handlers. Every
// field is optional the way the declarative schema is; `PlanValue` marks
// the nested lists a plan may leave unknown.

pub mod common;
pub mod credential;
pub mod dhcp_option;
pub mod ext_attrs;
pub mod failover;
pub mod fixed_address;
pub mod option_definition;
pub mod shared_network;
pub mod template;

pub use common::MacAddress;
pub use credential::{CliCredential, CredentialType};
pub use dhcp_option::DhcpOption;
pub use ext_attrs::{AttrKind, AttrValue, AttributeMap};
pub use failover::{FailoverAssociation, ServerType};
pub use fixed_address::{FixedAddress, FuncCall, MatchClient};
pub use option_definition::OptionDefinition;
pub use shared_network::SharedNetwork;
pub use template::FixedAddressTemplate;
