//! Reconciliation core and resource handlers between `nios-api` and a
//! declarative infrastructure engine.
//!
//! This crate owns the business logic of the NIOS DHCP provider:
//!
//! - **[`reconcile`]**: pure functions run around every REST call:
//!   extensible attribute inheritance ([`reconcile()`](reconcile::reconcile),
//!   [`add_inherited_attrs`](reconcile::add_inherited_attrs)), the internal
//!   correlation id ([`ensure_internal_id`](reconcile::ensure_internal_id)),
//!   and nested list stabilization
//!   ([`reorder_and_filter`](reconcile::reorder_and_filter)).
//!
//! - **[`NiosProvider`]**: facade owning the shared [`nios_api::WapiClient`]
//!   and vending per-type [`ObjectResource`] and [`ObjectDataSource`]
//!   handlers (Create / Read / Update / Delete / ImportState).
//!
//! - **Domain model** ([`model`]): state models for fixed addresses,
//!   shared networks, failover associations, option definitions and
//!   fixed address templates, with their defaults and validation rules.
//!   [`convert`] maps them to and from the WAPI wire structs.
//!
//! Problems are reported as [`Diagnostics`], never panics: a handler
//! returns no state whenever an error diagnostic was recorded.

pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod error;
pub mod model;
pub mod plan;
pub mod provider;
pub mod reconcile;
pub mod resource;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ProviderConfig, TlsVerification};
pub use convert::WireConvert;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::CoreError;
pub use plan::{Override, PlanValue};
pub use provider::NiosProvider;
pub use reconcile::{INTERNAL_ID_KEY, Lookup, ReconcileError};
pub use resource::{
    DataSourceQuery, ObjectDataSource, ObjectResource, Outcome, ReadOutcome, WapiObject,
};

pub use model::{
    AttrValue, AttributeMap, CliCredential, DhcpOption, FailoverAssociation, FixedAddress,
    FixedAddressTemplate, FuncCall, MatchClient, OptionDefinition, ServerType, SharedNetwork,
};
