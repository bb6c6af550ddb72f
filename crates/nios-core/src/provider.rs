// ── Provider ──
//
// Entry point for the declarative engine: owns the shared WAPI client and
// hands out per-type resource and data source handlers.

use std::sync::Arc;

use tracing::info;

use nios_api::WapiClient;

use crate::config::ProviderConfig;
use crate::error::CoreError;
use crate::model::{
    FailoverAssociation, FixedAddress, FixedAddressTemplate, OptionDefinition, SharedNetwork,
};
use crate::resource::{ObjectDataSource, ObjectResource, WapiObject};

/// A configured provider instance.
///
/// Cheaply cloneable; every handler it returns shares one connection pool.
#[derive(Clone)]
pub struct NiosProvider {
    client: Arc<WapiClient>,
}

impl NiosProvider {
    /// Build the WAPI client described by `config`.
    ///
    /// No request is sent: credentials are checked on the first call.
    pub fn connect(config: &ProviderConfig) -> Result<Self, CoreError> {
        let mut client = WapiClient::new(
            config.url.as_str(),
            &config.wapi_version,
            config.username.clone(),
            config.password.clone(),
            &config.transport(),
        )?;
        if let Some(proxy) = config.proxy_search {
            client = client.with_proxy_search(proxy);
        }
        info!(base_url = %client.base_url(), "provider configured");

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: WapiClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &WapiClient {
        &self.client
    }

    pub fn resource<O: WapiObject>(&self) -> ObjectResource<O> {
        ObjectResource::new(Arc::clone(&self.client))
    }

    pub fn data_source<O: WapiObject>(&self) -> ObjectDataSource<O> {
        ObjectDataSource::new(Arc::clone(&self.client))
    }

    // ── Typed shortcuts ──────────────────────────────────────────────

    pub fn fixed_addresses(&self) -> ObjectResource<FixedAddress> {
        self.resource()
    }

    pub fn shared_networks(&self) -> ObjectResource<SharedNetwork> {
        self.resource()
    }

    pub fn failover_associations(&self) -> ObjectResource<FailoverAssociation> {
        self.resource()
    }

    pub fn option_definitions(&self) -> ObjectResource<OptionDefinition> {
        self.resource()
    }

    pub fn fixed_address_templates(&self) -> ObjectResource<FixedAddressTemplate> {
        self.resource()
    }

    /// Resource type names this provider serves.
    pub fn resource_types() -> [&'static str; 5] {
        [
            FixedAddress::TYPE_NAME,
            SharedNetwork::TYPE_NAME,
            FailoverAssociation::TYPE_NAME,
            OptionDefinition::TYPE_NAME,
            FixedAddressTemplate::TYPE_NAME,
        ]
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use nios_api::ProxySearch;
    use secrecy::SecretString;

    #[test]
    fn connect_builds_versioned_base_url() {
        let mut cfg = ProviderConfig::new(
            "https://gm.example.com".parse().unwrap(),
            "admin",
            SecretString::from("infoblox".to_owned()),
        );
        cfg.proxy_search = Some(ProxySearch::GridMaster);

        let provider = NiosProvider::connect(&cfg).unwrap();
        assert_eq!(
            provider.client().base_url().as_str(),
            "https://gm.example.com/wapi/v2.13.6/"
        );
    }

    #[test]
    fn resource_type_names_are_unique() {
        let names = NiosProvider::resource_types();
        for (i, name) in names.iter().enumerate() {
            assert!(!names[i + 1..].contains(name));
        }
    }
}
