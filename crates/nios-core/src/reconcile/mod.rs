//! Reconciliation between declared configuration and server responses.
//!
//! Every resource handler runs the same pure steps around its REST calls:
//!
//! - [`inheritance`] splits the server's extensible attributes into the
//!   user-visible subset and the full inherited-aware snapshot, and merges
//!   server-managed attributes back in before updates.
//! - [`internal_id`] tags objects with a provider-generated correlation id
//!   so they can be found again after an out-of-band rename.
//! - [`stabilize`] keeps nested lists (DHCP options, CLI credentials) in
//!   plan order and carries write-only fields across reads.
//! - [`decode`] turns loosely typed nested JSON into typed records field
//!   by field, keeping partial results.
//!
//! None of these functions perform I/O.

pub mod decode;
pub mod inheritance;
pub mod internal_id;
pub mod stabilize;

use thiserror::Error;

use crate::diagnostics::Diagnostic;

pub use decode::{FieldDecoder, FromWireEntry, decode_entries};
pub use inheritance::{Reconciled, add_inherited_attrs, reconcile, verify_applied};
pub use internal_id::{
    INTERNAL_ID_KEY, Lookup, ensure_internal_id, internal_id, regenerate_internal_id,
    resolve_internal_id_lookup,
};
pub use stabilize::{
    Field, ListEntry, copy_field_from_plan_to_resp, copy_object_field_from_plan,
    reorder_and_filter, stabilize_list,
};

/// Everything that can go wrong while reconciling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The server response lacks data reconciliation depends on.
    #[error("missing {what} from server response")]
    MissingServerData { what: String },

    /// One nested entry couldn't be decoded; the rest were kept.
    #[error("malformed entry at {path}: {reason}")]
    MalformedEntry { path: String, reason: String },

    /// More than one live object carries the same internal id.
    #[error("{count} objects share internal id {internal_id}")]
    AmbiguousMatch { internal_id: String, count: usize },

    /// A declared attribute came back with a different value after a write.
    #[error("attribute {key:?} was written as {expected:?} but the server returned {actual:?}")]
    InconsistentResult {
        key: String,
        expected: String,
        actual: String,
    },

    /// The reserved internal id attribute is present but empty.
    #[error("internal id attribute {key:?} is empty")]
    InvalidInternalId { key: String },
}

impl ReconcileError {
    /// Malformed entries degrade a result; everything else fails the operation.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedEntry { .. })
    }
}

impl From<ReconcileError> for Diagnostic {
    fn from(err: ReconcileError) -> Self {
        let summary = match &err {
            ReconcileError::MissingServerData { .. } => "Missing server data",
            ReconcileError::MalformedEntry { .. } => "Skipped malformed entry",
            ReconcileError::AmbiguousMatch { .. } => "Ambiguous internal id",
            ReconcileError::InconsistentResult { .. } => "Provider produced inconsistent result",
            ReconcileError::InvalidInternalId { .. } => "Invalid internal id",
        };
        if err.is_fatal() {
            Diagnostic::error(summary, err.to_string())
        } else {
            Diagnostic::warning(summary, err.to_string())
        }
    }
}
