// ── Extensible attribute inheritance ──
//
// The server returns more attributes than the user declares: values
// inherited from parent networks, grid defaults, and the provider's own
// internal id. Only declared keys are shown to the user; the full set is
// kept alongside so updates can carry server-managed values forward.

use tracing::{debug, trace};

use super::ReconcileError;
use crate::model::ext_attrs::{AttrValue, AttributeMap};

/// The two snapshots persisted after every read or write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciled {
    /// Server values restricted to keys the user declared.
    pub user_visible: AttributeMap,
    /// Every server value, flagged `inherited` unless the user declared it.
    pub all: AttributeMap,
}

/// Split the server's attributes into user-visible and full snapshots.
///
/// `user_visible` never holds a key absent from `config`; `all` holds
/// every key the server returned. Values always come from the server.
pub fn reconcile(
    config: Option<&AttributeMap>,
    server: Option<&AttributeMap>,
) -> Result<Reconciled, ReconcileError> {
    let server = server.ok_or_else(|| ReconcileError::MissingServerData {
        what: "extensible attributes".into(),
    })?;

    let mut out = Reconciled::default();
    for (name, attr) in server.iter() {
        let declared = config.is_some_and(|c| c.contains_key(name));
        if declared {
            out.user_visible
                .insert_value(name, AttrValue::declared(attr.value.clone()));
        }
        out.all.insert_value(
            name,
            AttrValue {
                value: attr.value.clone(),
                inherited: attr.inherited || !declared,
                kind: attr.kind,
            },
        );
    }

    debug!(
        declared = config.map_or(0, AttributeMap::len),
        server = server.len(),
        visible = out.user_visible.len(),
        "reconciled extensible attributes"
    );
    Ok(out)
}

/// Merge server-managed attributes from the prior snapshot into `config`.
///
/// Declared keys always win and are never removed. Keys only present in
/// `prior_all` are added when they are flagged inherited, so an attribute
/// the user stops declaring is deleted on the server while defaults and
/// the internal id survive the update. Declared keys the server already
/// knows take the server's value kind, so an integer attribute stays an
/// integer on the wire.
pub fn add_inherited_attrs(
    config: Option<AttributeMap>,
    prior_all: Option<&AttributeMap>,
) -> Option<AttributeMap> {
    let Some(prior_all) = prior_all else {
        return config;
    };

    let mut merged = config.unwrap_or_default();
    for (name, attr) in prior_all.iter() {
        match merged.get_mut(name) {
            Some(declared) => declared.kind = attr.kind,
            None if attr.inherited => {
                trace!(attribute = name, "carrying inherited attribute into update");
                merged.insert_value(name, attr.clone());
            }
            None => {}
        }
    }
    Some(merged)
}

/// Check that every declared attribute the server kept has the declared value.
///
/// Comparison is exact: WAPI stores string attributes verbatim, so any
/// difference means the write did not do what was planned.
pub fn verify_applied(config: Option<&AttributeMap>, server: &AttributeMap) -> Vec<ReconcileError> {
    let Some(config) = config else {
        return Vec::new();
    };

    config
        .iter()
        .filter_map(|(name, declared)| {
            let actual = server.get(name)?;
            (actual.value != declared.value).then(|| ReconcileError::InconsistentResult {
                key: name.to_owned(),
                expected: declared.value.clone(),
                actual: actual.value.clone(),
            })
        })
        .collect()
}
