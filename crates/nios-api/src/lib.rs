// nios-api: Async Rust client for the NIOS Web API (WAPI) DHCP objects

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::{DEFAULT_WAPI_VERSION, ListQuery, ProxySearch, WapiClient};
pub use error::Error;
pub use models::{
    DhcpFailover, DhcpOptionDefinition, FixedAddress, FixedAddressTemplate, ObjectRef,
    SharedNetwork, WireObject,
};
pub use transport::{TlsMode, TransportConfig};
