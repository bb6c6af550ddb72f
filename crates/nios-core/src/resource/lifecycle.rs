// ── Resource lifecycle ──
//
// Create / Read / Update / Delete / ImportState for any `WapiObject`.
// Each handler accumulates diagnostics and returns them with the new
// state; an error diagnostic means the engine persists nothing.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use nios_api::{ListQuery, WapiClient, WireObject};

use super::{Outcome, ReadOutcome, WapiObject};
use crate::diagnostics::Diagnostics;
use crate::error::CoreError;
use crate::model::AttributeMap;
use crate::reconcile::{
    INTERNAL_ID_KEY, Lookup, ReconcileError, add_inherited_attrs, ensure_internal_id,
    internal_id, reconcile, regenerate_internal_id, resolve_internal_id_lookup, verify_applied,
};

/// Lifecycle handlers for one object type.
pub struct ObjectResource<O> {
    client: Arc<WapiClient>,
    _object: PhantomData<fn() -> O>,
}

impl<O> Clone for ObjectResource<O> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            _object: PhantomData,
        }
    }
}

impl<O: WapiObject> ObjectResource<O> {
    pub fn new(client: Arc<WapiClient>) -> Self {
        Self {
            client,
            _object: PhantomData,
        }
    }

    fn object_type() -> &'static str {
        <O::Wire as WireObject>::OBJECT_TYPE
    }

    // ── Create ───────────────────────────────────────────────────────

    pub async fn create(&self, plan: O) -> Outcome<O> {
        let mut diags = Diagnostics::new();
        let mut plan = plan;
        plan.apply_defaults();
        plan.validate(&mut diags);
        if diags.has_errors() {
            return Outcome::failed(diags);
        }

        let mut body = plan.expand();
        if O::SUPPORTS_EXT_ATTRS {
            match ensure_internal_id(plan.ext_attrs().cloned()) {
                Ok(attrs) => body.set_ext_attrs(attrs.to_wire()),
                Err(e) => {
                    diags.push(e);
                    return Outcome::failed(diags);
                }
            }
        }

        info!(object = Self::object_type(), "creating object");
        let created = match self.client.create(&body).await {
            Ok(created) => created,
            Err(e) => {
                diags.push(CoreError::from(e).to_diagnostic(&format!(
                    "Failed to create {}",
                    O::TYPE_NAME
                )));
                return Outcome::failed(diags);
            }
        };
        debug!(reference = created.reference(), "object created");

        match self.finish(created, &plan, plan.ext_attrs(), true, &mut diags) {
            Some(state) => Outcome::new(state, diags),
            None => Outcome::failed(diags),
        }
    }

    // ── Read ─────────────────────────────────────────────────────────

    /// Refresh `prior` from the server.
    ///
    /// The object is fetched by `_ref` first. When that fails with
    /// not-found, or finds an object carrying a different internal id,
    /// the object is searched by the internal id recorded in state.
    pub async fn read(&self, prior: O) -> Outcome<ReadOutcome<O>> {
        let mut diags = Diagnostics::new();
        let Some(reference) = prior.reference().map(str::to_owned) else {
            diags.add_error(
                format!("Cannot read {}", O::TYPE_NAME),
                "state has no object reference",
            );
            return Outcome::failed(diags);
        };
        let expected_id = if O::SUPPORTS_EXT_ATTRS {
            internal_id(prior.ext_attrs_all()).map(str::to_owned)
        } else {
            None
        };

        let by_ref = match self.client.get::<O::Wire>(&reference).await {
            Ok(wire) => Some(wire),
            Err(e) if e.is_not_found() => {
                debug!(%reference, "object not found by reference");
                None
            }
            Err(e) => {
                diags.push(CoreError::from(e).to_diagnostic(&format!(
                    "Failed to read {}",
                    O::TYPE_NAME
                )));
                return Outcome::failed(diags);
            }
        };

        let wire = match (by_ref, expected_id) {
            (Some(wire), None) => wire,
            (Some(wire), Some(id)) if server_internal_id(&wire) == Some(id.as_str()) => wire,
            (None, None) => {
                info!(%reference, "object removed out of band");
                return Outcome::new(ReadOutcome::Removed, diags);
            }
            (found, Some(id)) => {
                if found.is_some() {
                    warn!(%reference, internal_id = %id, "reference now points at another object");
                }
                match self.find_by_internal_id(&id).await {
                    Ok(Lookup::Found(wire)) => {
                        info!(
                            old = %reference,
                            new = wire.reference(),
                            "re-associated object by internal id"
                        );
                        wire
                    }
                    Ok(Lookup::Gone) => {
                        info!(%reference, "object removed out of band");
                        return Outcome::new(ReadOutcome::Removed, diags);
                    }
                    Err(e) => {
                        diags.push(e.to_diagnostic(&format!("Failed to read {}", O::TYPE_NAME)));
                        return Outcome::failed(diags);
                    }
                }
            }
        };

        match self.finish(wire, &prior, prior.ext_attrs(), false, &mut diags) {
            Some(state) => Outcome::new(ReadOutcome::Present(state), diags),
            None => Outcome::failed(diags),
        }
    }

    /// Search for the single live object tagged with `id`.
    pub async fn find_by_internal_id(&self, id: &str) -> Result<Lookup<O::Wire>, CoreError> {
        let query = ListQuery::new().ext_attr(INTERNAL_ID_KEY, id);
        let matches = self.client.list::<O::Wire>(&query).await?;
        Ok(resolve_internal_id_lookup(id, matches)?)
    }

    // ── Update ───────────────────────────────────────────────────────

    pub async fn update(&self, plan: O, prior: &O) -> Outcome<O> {
        let mut diags = Diagnostics::new();
        let mut plan = plan;
        plan.apply_defaults();
        plan.carry_forward(prior);
        plan.validate(&mut diags);

        let Some(reference) = prior.reference().or(plan.reference()).map(str::to_owned) else {
            diags.add_error(
                format!("Cannot update {}", O::TYPE_NAME),
                "state has no object reference",
            );
            return Outcome::failed(diags);
        };
        if diags.has_errors() {
            return Outcome::failed(diags);
        }

        let mut body = plan.expand();
        if O::SUPPORTS_EXT_ATTRS {
            let merged = add_inherited_attrs(plan.ext_attrs().cloned(), prior.ext_attrs_all());
            match ensure_internal_id(merged) {
                Ok(attrs) => body.set_ext_attrs(attrs.to_wire()),
                Err(e) => {
                    diags.push(e);
                    return Outcome::failed(diags);
                }
            }
        }

        info!(object = Self::object_type(), %reference, "updating object");
        let updated = match self.client.update(&reference, &body).await {
            Ok(updated) => updated,
            Err(e) => {
                diags.push(CoreError::from(e).to_diagnostic(&format!(
                    "Failed to update {}",
                    O::TYPE_NAME
                )));
                return Outcome::failed(diags);
            }
        };

        match self.finish(updated, &plan, plan.ext_attrs(), true, &mut diags) {
            Some(state) => Outcome::new(state, diags),
            None => Outcome::failed(diags),
        }
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// Delete the object. An object that is already gone counts as deleted.
    pub async fn delete(&self, state: &O) -> Outcome<()> {
        let mut diags = Diagnostics::new();
        let Some(reference) = state.reference() else {
            debug!("nothing to delete: state has no reference");
            return Outcome::new((), diags);
        };

        info!(object = Self::object_type(), %reference, "deleting object");
        match self.client.delete(reference).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => debug!(%reference, "object already deleted"),
            Err(e) => diags.push(CoreError::from(e).to_diagnostic(&format!(
                "Failed to delete {}",
                O::TYPE_NAME
            ))),
        }
        Outcome::new((), diags)
    }

    // ── Import ───────────────────────────────────────────────────────

    /// Adopt an existing object by `_ref`.
    ///
    /// The object is tagged with a fresh internal id, and every attribute
    /// it sets itself becomes part of the user-visible snapshot.
    pub async fn import_state(&self, reference: &str) -> Outcome<O> {
        let mut diags = Diagnostics::new();
        let summary = format!("Cannot import {}", O::TYPE_NAME);

        let mut wire = match self.client.get::<O::Wire>(reference).await {
            Ok(wire) => wire,
            Err(e) => {
                diags.push(CoreError::from(e).to_diagnostic(&summary));
                return Outcome::failed(diags);
            }
        };
        info!(object = Self::object_type(), %reference, "importing object");

        let mut declared = None;
        if O::SUPPORTS_EXT_ATTRS {
            let server = match decode_server_attrs(&wire, &mut diags) {
                Ok(server) => server.unwrap_or_default(),
                Err(e) => {
                    diags.push(e);
                    return Outcome::failed(diags);
                }
            };
            let own: AttributeMap = server
                .into_iter()
                .filter(|(name, attr)| !attr.inherited && name != INTERNAL_ID_KEY)
                .collect();

            let mut tag = O::Wire::default();
            tag.set_ext_attrs(regenerate_internal_id(Some(own.clone())).to_wire());
            let target = wire.reference().unwrap_or(reference).to_owned();
            wire = match self.client.update(&target, &tag).await {
                Ok(updated) => updated,
                Err(e) => {
                    diags.push(CoreError::from(e).to_diagnostic(&summary));
                    return Outcome::failed(diags);
                }
            };
            declared = Some(own);
        }

        let mut state = O::flatten(wire.clone(), &mut diags);
        if O::SUPPORTS_EXT_ATTRS {
            let attached =
                self.attach_ext_attrs(&mut state, &wire, declared.as_ref(), false, &mut diags);
            if let Err(e) = attached {
                diags.push(e);
                return Outcome::failed(diags);
            }
        }
        Outcome::new(state, diags)
    }

    // ── Shared tail ──────────────────────────────────────────────────

    /// Flatten a server object into state: reconcile attributes against
    /// `config_attrs`, then align nested lists with `planned`.
    fn finish(
        &self,
        wire: O::Wire,
        planned: &O,
        config_attrs: Option<&AttributeMap>,
        verify: bool,
        diags: &mut Diagnostics,
    ) -> Option<O> {
        let mut state = O::flatten(wire.clone(), diags);
        if O::SUPPORTS_EXT_ATTRS {
            if let Err(e) = self.attach_ext_attrs(&mut state, &wire, config_attrs, verify, diags) {
                diags.push(e);
                return None;
            }
        }
        state.stabilize(planned);
        Some(state)
    }

    fn attach_ext_attrs(
        &self,
        state: &mut O,
        wire: &O::Wire,
        config_attrs: Option<&AttributeMap>,
        verify: bool,
        diags: &mut Diagnostics,
    ) -> Result<(), ReconcileError> {
        let server = decode_server_attrs(wire, diags)?;

        let reconciled = reconcile(config_attrs, server.as_ref())?;
        if verify {
            if let Some(server) = &server {
                for mismatch in verify_applied(config_attrs, server) {
                    diags.push(mismatch);
                }
            }
        }

        // An undeclared attribute block stays null in state.
        let visible = config_attrs.map(|_| reconciled.user_visible);
        state.set_ext_attrs(visible, Some(reconciled.all));
        Ok(())
    }
}

// ── Helpers ────────────────────────────────────────────────────────

fn decode_server_attrs<W: WireObject>(
    wire: &W,
    diags: &mut Diagnostics,
) -> Result<Option<AttributeMap>, ReconcileError> {
    wire.ext_attrs()
        .map(|raw| AttributeMap::from_wire(raw, diags))
        .transpose()
}

/// The internal id as reported in a raw `extattrs` object.
fn server_internal_id<W: WireObject>(wire: &W) -> Option<&str> {
    wire.ext_attrs()?
        .get(INTERNAL_ID_KEY)?
        .get("value")
        .and_then(Value::as_str)
}
