// ── CLI credentials ──

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::diagnostics::Diagnostics;
use crate::reconcile::{Field, FieldDecoder, FromWireEntry, ListEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialType {
    Ssh,
    Telnet,
    EnableSsh,
    EnableTelnet,
}

/// Device login used by network discovery, attached to a fixed address.
///
/// `password` is write-only: the server never returns it, so reads copy
/// it over from the plan or prior state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliCredential {
    pub credential_type: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub comment: Option<String>,
    pub credential_group: Option<String>,
}

/// Accessors for the write-only password.
pub const PASSWORD: Field<CliCredential, String> = Field {
    name: "password",
    get: |c| c.password.as_ref(),
    set: |c, v| c.password = v,
};

impl CliCredential {
    pub fn validate(&self, path: &str, diags: &mut Diagnostics) {
        match self.credential_type.as_deref() {
            None => diags.add_error(
                "Invalid CLI credential",
                format!("{path}: \"credential_type\" is required"),
            ),
            Some(raw) if raw.parse::<CredentialType>().is_err() => diags.add_error(
                "Invalid CLI credential",
                format!("{path}: unknown credential type {raw:?}"),
            ),
            Some(_) => {}
        }
    }

    pub fn to_wire(&self) -> Value {
        let mut obj = Map::new();
        let fields = [
            ("credential_type", &self.credential_type),
            ("user", &self.user),
            ("password", &self.password),
            ("comment", &self.comment),
            ("credential_group", &self.credential_group),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                obj.insert(key.into(), Value::from(value.as_str()));
            }
        }
        Value::Object(obj)
    }
}

impl ListEntry for CliCredential {
    fn identity_keys(&self) -> Vec<(&'static str, String)> {
        self.credential_type
            .iter()
            .map(|t| ("credential_type", t.clone()))
            .collect()
    }
}

impl FromWireEntry for CliCredential {
    fn decode(fields: &mut FieldDecoder<'_>) -> Option<Self> {
        let Some(credential_type) = fields.string("credential_type") else {
            return fields.missing("credential_type");
        };
        Some(Self {
            credential_type: Some(credential_type),
            user: fields.string("user"),
            password: None,
            comment: fields.string("comment"),
            credential_group: fields.string("credential_group"),
        })
    }
}
