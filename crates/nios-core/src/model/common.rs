// ── Shared value types ──

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;

// ── MacAddress ──────────────────────────────────────────────────────

/// Hardware address in the form WAPI stores it: `aa:bb:cc:dd:ee:ff`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Lowercases and rewrites dashed or bare 12-digit input with colons.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let lower = raw.as_ref().trim().to_lowercase().replace('-', ":");
        if lower.len() == 12 && !lower.contains(':') {
            let octets: Vec<&str> = (0..6).filter_map(|i| lower.get(i * 2..i * 2 + 2)).collect();
            return Self(octets.join(":"));
        }
        Self(lower)
    }

    /// Six hex octets after normalization.
    pub fn is_valid(&self) -> bool {
        let octets: Vec<&str> = self.0.split(':').collect();
        octets.len() == 6
            && octets
                .iter()
                .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

// ── Validation helpers ─────────────────────────────────────────────

pub(crate) fn require<T>(value: Option<&T>, field: &str, object: &str, diags: &mut Diagnostics) {
    if value.is_none() {
        diags.add_error(
            format!("Invalid {object}"),
            format!("\"{field}\" is required"),
        );
    }
}

pub(crate) fn check_range(
    value: Option<u32>,
    range: std::ops::RangeInclusive<u32>,
    field: &str,
    object: &str,
    diags: &mut Diagnostics,
) {
    if let Some(v) = value {
        if !range.contains(&v) {
            diags.add_error(
                format!("Invalid {object}"),
                format!(
                    "\"{field}\" must be between {} and {}, got {v}",
                    range.start(),
                    range.end()
                ),
            );
        }
    }
}
