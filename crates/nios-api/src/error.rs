use thiserror::Error;

/// Top-level error type for the `nios-api` crate.
///
/// Covers every failure mode of a WAPI call: authentication, transport,
/// structured WAPI errors, and response decoding.
/// `nios-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Basic-auth credentials rejected by the grid master.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── WAPI ────────────────────────────────────────────────────────
    /// Structured error body: `{"Error": "...", "code": "...", "text": "..."}`.
    #[error("WAPI error (HTTP {status}): {message}")]
    Wapi {
        message: String,
        code: Option<String>,
        status: u16,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the referenced object does not exist (anymore).
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Wapi { status: 404, .. } => true,
            Self::Wapi {
                code: Some(code), ..
            } => code.ends_with("Data.NotFound"),
            _ => false,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Wapi { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Extract the WAPI error code (e.g. `Client.Ibap.Proto`), if available.
    pub fn wapi_code(&self) -> Option<&str> {
        match self {
            Self::Wapi { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
