// ── Internal correlation id ──
//
// Every object the provider creates is tagged with a hidden extensible
// attribute holding a random token. The `_ref` of an object changes when
// its name or address changes; the token does not, so a read that finds
// a different (or no) object at the old `_ref` can search by token.

use tracing::debug;
use uuid::Uuid;

use super::ReconcileError;
use crate::model::ext_attrs::AttributeMap;

/// Reserved extensible attribute holding the correlation token.
pub const INTERNAL_ID_KEY: &str = "Terraform Internal ID";

/// Outcome of a search by internal id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    /// Exactly one live object carries the id.
    Found(T),
    /// No object carries the id: it was deleted out of band.
    Gone,
}

/// Make sure `attrs` carries an internal id, generating one if absent.
///
/// An existing id is never replaced, so calling this again on its own
/// output returns the same map.
pub fn ensure_internal_id(attrs: Option<AttributeMap>) -> Result<AttributeMap, ReconcileError> {
    let mut attrs = attrs.unwrap_or_default();

    match attrs.value(INTERNAL_ID_KEY) {
        Some(existing) if existing.trim().is_empty() => Err(ReconcileError::InvalidInternalId {
            key: INTERNAL_ID_KEY.into(),
        }),
        Some(_) => Ok(attrs),
        None => {
            let id = Uuid::new_v4().to_string();
            debug!(internal_id = %id, "generated internal id");
            attrs.insert(INTERNAL_ID_KEY, id);
            Ok(attrs)
        }
    }
}

/// Replace any internal id with a freshly generated one.
///
/// Only import re-associates an object this way; updates keep the id
/// the object was created with.
pub fn regenerate_internal_id(attrs: Option<AttributeMap>) -> AttributeMap {
    let mut attrs = attrs.unwrap_or_default();
    attrs.remove(INTERNAL_ID_KEY);
    let id = Uuid::new_v4().to_string();
    debug!(internal_id = %id, "assigned internal id on import");
    attrs.insert(INTERNAL_ID_KEY, id);
    attrs
}

/// The internal id stored in an attribute map, if any.
pub fn internal_id(attrs: Option<&AttributeMap>) -> Option<&str> {
    attrs
        .and_then(|a| a.value(INTERNAL_ID_KEY))
        .filter(|v| !v.is_empty())
}

/// Interpret the result of a list call filtered by internal id.
///
/// Zero matches means the object is gone. More than one is refused:
/// picking one would risk binding state to the wrong object.
pub fn resolve_internal_id_lookup<T>(
    internal_id: &str,
    mut matches: Vec<T>,
) -> Result<Lookup<T>, ReconcileError> {
    match matches.len() {
        0 => Ok(Lookup::Gone),
        1 => Ok(matches.pop().map_or(Lookup::Gone, Lookup::Found)),
        count => Err(ReconcileError::AmbiguousMatch {
            internal_id: internal_id.to_owned(),
            count,
        }),
    }
}
