// ── Runtime connection configuration ──
//
// These types describe *how* to reach a NIOS grid master. They carry
// credential data and connection tuning, but never touch disk: callers
// build a `ProviderConfig` (see nios-config) and hand it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use nios_api::{DEFAULT_WAPI_VERSION, ProxySearch, TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed grid master certificates).
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single grid.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Grid master URL (e.g., `https://gm.example.com`).
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    /// WAPI version, without the leading `v`.
    pub wapi_version: String,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Forward searches from a grid member to the grid master.
    pub proxy_search: Option<ProxySearch>,
}

impl ProviderConfig {
    pub fn new(url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            url,
            username: username.into(),
            password,
            wapi_version: DEFAULT_WAPI_VERSION.to_owned(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(60),
            proxy_search: None,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }
}
