// ── Nested list stabilization ──
//
// WAPI returns list-valued attributes in its own order, adds entries the
// user never declared, and never echoes write-only fields. Without these
// routines every plan would show the same spurious diff.

use tracing::{debug, trace};

use crate::plan::{Override, PlanValue};

/// A nested record with an identifying subset of fields.
pub trait ListEntry {
    /// Identity keys as `(field, value)` pairs.
    ///
    /// Two entries are the same entry when they share at least one key,
    /// which lets a DHCP option declared by name match a server entry that
    /// carries both name and number.
    fn identity_keys(&self) -> Vec<(&'static str, String)>;

    fn same_entry(&self, other: &Self) -> bool {
        let mine = self.identity_keys();
        other.identity_keys().iter().any(|key| mine.contains(key))
    }
}

/// Accessors for one optional field of a nested record.
pub struct Field<T, V> {
    pub name: &'static str,
    pub get: fn(&T) -> Option<&V>,
    pub set: fn(&mut T, Option<V>),
}

/// Align a freshly read list with the planned one.
///
/// Matched entries take the server payload in plan order. Server entries
/// the plan doesn't mention are appended in server order when the
/// companion flag says the object owns the list, and dropped otherwise.
/// An unknown plan returns the server list untouched.
pub fn reorder_and_filter<T: ListEntry, V>(
    planned: &PlanValue<Vec<T>>,
    server: Vec<T>,
    companion: &Override<V>,
) -> Vec<T> {
    let planned: &[T] = match planned {
        PlanValue::Unknown => {
            trace!("plan unknown, keeping server order");
            return server;
        }
        PlanValue::Null => &[],
        PlanValue::Known(entries) => entries,
    };

    let mut remaining: Vec<Option<T>> = server.into_iter().map(Some).collect();
    let mut result = Vec::with_capacity(remaining.len());

    for want in planned {
        let slot = remaining
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|got| want.same_entry(got)));
        match slot.and_then(Option::take) {
            Some(got) => result.push(got),
            None => trace!(keys = ?want.identity_keys(), "planned entry absent from server"),
        }
    }

    let unplanned = remaining.into_iter().flatten();
    if companion.retains_unplanned() {
        result.extend(unplanned);
    } else {
        let dropped = unplanned.count();
        if dropped > 0 {
            debug!(dropped, "dropped server-added entries not owned by the object");
        }
    }

    result
}

/// Copy a write-only field from planned entries into matching result entries.
///
/// Entries without a planned counterpart end up with the field unset.
/// Nothing is copied while the plan is null or unknown.
pub fn copy_field_from_plan_to_resp<T: ListEntry, V: Clone>(
    planned: &PlanValue<Vec<T>>,
    result: &mut [T],
    field: &Field<T, V>,
) {
    let Some(planned) = planned.known() else {
        return;
    };

    for entry in result.iter_mut() {
        let value = planned
            .iter()
            .find(|p| p.same_entry(entry))
            .and_then(|p| (field.get)(p).cloned());
        trace!(field = field.name, copied = value.is_some(), "write-only field");
        (field.set)(entry, value);
    }
}

/// Single-object form of [`copy_field_from_plan_to_resp`].
pub fn copy_object_field_from_plan<T, V: Clone>(
    planned: PlanValue<&T>,
    result: &mut T,
    field: &Field<T, V>,
) {
    if let PlanValue::Known(planned) = planned {
        (field.set)(result, (field.get)(planned).cloned());
    }
}

/// [`reorder_and_filter`] over the plan-shaped list a flattened model holds.
///
/// A list the plan left null stays null when nothing survives filtering,
/// so an object without declared entries never diffs against `[]`. An
/// unknown plan returns the server list untouched, null included.
pub fn stabilize_list<T: ListEntry, V>(
    planned: &PlanValue<Vec<T>>,
    server: PlanValue<Vec<T>>,
    companion: &Override<V>,
) -> PlanValue<Vec<T>> {
    if planned.is_unknown() {
        return server;
    }
    let server = server.into_known().unwrap_or_default();
    let result = reorder_and_filter(planned, server, companion);
    if planned.is_null() && result.is_empty() {
        PlanValue::Null
    } else {
        PlanValue::Known(result)
    }
}
