// ── Core error types ──
//
// User-facing errors from nios-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<nios_api::Error>`
// impl translates transport-layer errors into domain variants, and
// every `CoreError` can be rendered as a `Diagnostic`.

use thiserror::Error;

use crate::diagnostics::Diagnostic;
use crate::reconcile::ReconcileError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to grid master: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{object_type} not found: {reference}")]
    NotFound {
        object_type: String,
        reference: String,
    },

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// The WAPI error code (e.g. "Client.Ibap.Proto").
        code: Option<String>,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Render this error as an error diagnostic with a short summary.
    pub fn to_diagnostic(&self, summary: &str) -> Diagnostic {
        Diagnostic::error(summary, self.to_string())
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<nios_api::Error> for CoreError {
    fn from(err: nios_api::Error) -> Self {
        if err.is_not_found() {
            return CoreError::NotFound {
                object_type: "object".into(),
                reference: err.to_string(),
            };
        }

        match err {
            nios_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            nios_api::Error::Transport(ref e) => {
                if e.is_connect() || e.is_timeout() {
                    CoreError::ConnectionFailed {
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            nios_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            nios_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            nios_api::Error::Wapi {
                message,
                code,
                status,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            nios_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
