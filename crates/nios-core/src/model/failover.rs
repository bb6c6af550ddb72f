// ── DHCP failover association ──

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::common::{check_range, require};
use super::ext_attrs::AttributeMap;
use crate::diagnostics::Diagnostics;

pub const DEFAULT_MAX_RESPONSE_DELAY: u32 = 60;
pub const DEFAULT_MAX_CLIENT_LEAD_TIME: u32 = 3600;
pub const DEFAULT_LOAD_BALANCE_SPLIT: u32 = 128;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerType {
    #[default]
    Internal,
    External,
}

/// A pair of DHCP servers sharing leases for the same ranges.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailoverAssociation {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,
    pub name: Option<String>,
    pub primary: Option<String>,
    pub primary_server_type: Option<ServerType>,
    pub secondary: Option<String>,
    pub secondary_server_type: Option<ServerType>,
    pub max_response_delay: Option<u32>,
    pub max_client_lead_time: Option<u32>,
    pub load_balance_split: Option<u32>,
    pub comment: Option<String>,
    pub extattrs: Option<AttributeMap>,
    pub extattrs_all: Option<AttributeMap>,
}

impl FailoverAssociation {
    pub fn apply_defaults(&mut self) {
        self.primary_server_type.get_or_insert_with(ServerType::default);
        self.secondary_server_type.get_or_insert_with(ServerType::default);
        self.max_response_delay.get_or_insert(DEFAULT_MAX_RESPONSE_DELAY);
        self.max_client_lead_time.get_or_insert(DEFAULT_MAX_CLIENT_LEAD_TIME);
        self.load_balance_split.get_or_insert(DEFAULT_LOAD_BALANCE_SPLIT);
    }

    pub fn validate(&self, diags: &mut Diagnostics) {
        const OBJECT: &str = "failover association";
        require(self.name.as_ref(), "name", OBJECT, diags);
        require(self.primary.as_ref(), "primary", OBJECT, diags);
        require(self.secondary.as_ref(), "secondary", OBJECT, diags);
        check_range(self.load_balance_split, 0..=256, "load_balance_split", OBJECT, diags);

        if self.primary.is_some() && self.primary == self.secondary {
            diags.add_error(
                "Invalid failover association",
                "\"primary\" and \"secondary\" must be different servers",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> FailoverAssociation {
        FailoverAssociation {
            name: Some("dc1-pair".into()),
            primary: Some("dhcp1.example.com".into()),
            secondary: Some("dhcp2.example.com".into()),
            ..FailoverAssociation::default()
        }
    }

    #[test]
    fn defaults_match_wapi() {
        let mut fo = pair();
        fo.apply_defaults();
        assert_eq!(fo.max_response_delay, Some(60));
        assert_eq!(fo.max_client_lead_time, Some(3600));
        assert_eq!(fo.load_balance_split, Some(128));
        assert_eq!(fo.secondary_server_type, Some(ServerType::Internal));
    }

    #[test]
    fn split_range_enforced() {
        let mut diags = Diagnostics::new();
        FailoverAssociation {
            load_balance_split: Some(257),
            ..pair()
        }
        .validate(&mut diags);
        assert_eq!(diags.errors().count(), 1);

        let mut diags = Diagnostics::new();
        FailoverAssociation {
            load_balance_split: Some(256),
            ..pair()
        }
        .validate(&mut diags);
        assert!(diags.is_empty());
    }

    #[test]
    fn same_server_twice_rejected() {
        let mut diags = Diagnostics::new();
        FailoverAssociation {
            secondary: Some("dhcp1.example.com".into()),
            ..pair()
        }
        .validate(&mut diags);
        assert!(diags.has_errors());
    }
}
