//! Provider configuration for the NIOS DHCP provider.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! and translation to `nios_core::ProviderConfig`. Also installs the
//! `tracing` subscriber used by hosts embedding the provider.

mod logging;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use nios_api::{DEFAULT_WAPI_VERSION, ProxySearch};
use nios_core::{ProviderConfig, TlsVerification};

pub use logging::{LogFormat, init_tracing};

const KEYRING_SERVICE: &str = "nios-dhcp";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' is not defined")]
    UnknownProfile { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named explicitly.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named grid profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

/// Settings shared by every profile unless the profile overrides them.
#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_wapi_version")]
    pub wapi_version: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            wapi_version: default_wapi_version(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_wapi_version() -> String {
    DEFAULT_WAPI_VERSION.into()
}
fn default_timeout() -> u64 {
    60
}

/// A named grid master profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Grid master URL (e.g., "https://gm.example.com").
    pub url: String,

    pub username: Option<String>,

    /// Plaintext password; prefer keyring or env var.
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Override the WAPI version.
    pub wapi_version: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// "gm" or "local": where a grid member resolves searches.
    pub proxy_search: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "nios-dhcp", "nios-dhcp").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("nios-dhcp");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, overlaid with `NIOS_`-prefixed environment variables.
///
/// Nested keys use a double underscore: `NIOS_DEFAULTS__TIMEOUT=30`.
/// A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NIOS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve username + password for a profile.
///
/// The password is taken from the first source that has one: the
/// profile's `password_env` variable, `NIOS_PASSWORD`, the system
/// keyring (`nios-dhcp` / `<profile>/password`), then the config file.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let no_credentials = || ConfigError::NoCredentials {
        profile: profile_name.into(),
    };
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("NIOS_USERNAME").ok())
        .ok_or_else(no_credentials)?;

    // 1. Profile's password_env
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Ok((username, SecretString::from(pw)));
        }
    }

    // 2. Global env var
    if let Ok(pw) = std::env::var("NIOS_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    // 3. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok((username, SecretString::from(pw)));
        }
    }

    // 4. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(no_credentials())
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── ProviderConfig translation ──────────────────────────────────────

/// Build a `ProviderConfig` from a profile, resolving its credentials.
pub fn profile_to_provider_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ProviderConfig, ConfigError> {
    let (username, password) = resolve_credentials(profile, profile_name)?;
    build_provider_config(profile, defaults, username, password)
}

/// Build a `ProviderConfig` from a profile and already-resolved credentials.
pub fn build_provider_config(
    profile: &Profile,
    defaults: &Defaults,
    username: String,
    password: SecretString,
) -> Result<ProviderConfig, ConfigError> {
    let url: url::Url = profile.url.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {}", profile.url),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let proxy_search = match profile.proxy_search.as_deref() {
        None => None,
        Some(v) if v.eq_ignore_ascii_case("gm") => Some(ProxySearch::GridMaster),
        Some(v) if v.eq_ignore_ascii_case("local") => Some(ProxySearch::Local),
        Some(other) => {
            return Err(ConfigError::Validation {
                field: "proxy_search".into(),
                reason: format!("expected 'gm' or 'local', got '{other}'"),
            });
        }
    };

    let mut cfg = ProviderConfig::new(url, username, password);
    cfg.wapi_version = profile
        .wapi_version
        .clone()
        .unwrap_or_else(|| defaults.wapi_version.clone());
    cfg.tls = tls;
    cfg.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    cfg.proxy_search = proxy_search;
    Ok(cfg)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 30

[profiles.lab]
url = "https://gm.lab.example.com"
username = "admin"
insecure = true
proxy_search = "GM"

[profiles.prod]
url = "https://gm.example.com"
username = "svc-terraform"
wapi_version = "2.12"
ca_cert = "/etc/ssl/grid-ca.pem"
"#;

    fn write_sample() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        (dir, path)
    }

    fn secret() -> SecretString {
        SecretString::from("infoblox".to_owned())
    }

    #[test]
    fn loads_profiles_from_file() {
        let (_dir, path) = write_sample();
        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.defaults.wapi_version, "2.13.6");
        assert_eq!(cfg.profiles.len(), 2);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
        assert!(cfg.profiles.is_empty());
    }

    #[test]
    fn profile_lookup_falls_back_to_default() {
        let (_dir, path) = write_sample();
        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg.profile(None).unwrap().0, "lab");
        assert_eq!(cfg.profile(Some("prod")).unwrap().0, "prod");
        assert!(matches!(
            cfg.profile(Some("staging")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn builds_provider_config_with_overrides() {
        let (_dir, path) = write_sample();
        let cfg = load_config_from(&path).unwrap();

        let (_, lab) = cfg.profile(Some("lab")).unwrap();
        let built = build_provider_config(lab, &cfg.defaults, "admin".into(), secret()).unwrap();
        assert_eq!(built.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(built.timeout, Duration::from_secs(30));
        assert_eq!(built.proxy_search, Some(ProxySearch::GridMaster));

        let (_, prod) = cfg.profile(Some("prod")).unwrap();
        let built = build_provider_config(prod, &cfg.defaults, "svc".into(), secret()).unwrap();
        assert_eq!(built.wapi_version, "2.12");
        assert_eq!(
            built.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/grid-ca.pem"))
        );
        assert_eq!(built.proxy_search, None);
    }

    #[test]
    fn rejects_bad_url_and_proxy_search() {
        let defaults = Defaults::default();
        let bad_url = Profile {
            url: "not a url".into(),
            ..Profile::default()
        };
        assert!(matches!(
            build_provider_config(&bad_url, &defaults, "admin".into(), secret()),
            Err(ConfigError::Validation { ref field, .. }) if field == "url"
        ));

        let bad_proxy = Profile {
            url: "https://gm.example.com".into(),
            proxy_search: Some("everywhere".into()),
            ..Profile::default()
        };
        assert!(matches!(
            build_provider_config(&bad_proxy, &defaults, "admin".into(), secret()),
            Err(ConfigError::Validation { ref field, .. }) if field == "proxy_search"
        ));
    }

    #[test]
    fn save_then_load_preserves_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                url: "https://gm.example.com".into(),
                username: Some("admin".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (_, profile) = loaded.profile(None).unwrap();
        assert_eq!(profile.url, "https://gm.example.com");
        assert_eq!(profile.username.as_deref(), Some("admin"));
    }
}
