//! The reducer itself: a pure transition function over
//! [`ConfigurationState`].
//!
//! Version-spanning operations (schema version switch, editor mode, raw-text
//! apply, the profile switch) are handled right here; everything else marks
//! the state as changed and runs through the layered chain
//! `restricted -> v2 -> v1`, where each layer applies the operations it owns
//! and forwards the rest to the layer it wraps.
//!
//! Every reduction returns a fresh state value. The previous snapshot is
//! never touched, so callers can keep it around and diff against the result.

use artemis_crd::broker;
use tracing::debug;

use crate::{
    action::{Action, GlobalAction},
    state::{ConfigurationState, EditorMode, SchemaVersion},
};

mod restricted;
mod v1;
mod v2;

/// Applies one action and returns the resulting state.
///
/// User-recoverable conditions (a rename collision, an empty required field)
/// come back as an unchanged state; the rendering layer re-derives validity
/// from the result. Feeding the profile switch into the chain instead of
/// this entry point panics, since that can only happen through a wiring bug.
pub fn reduce(state: &ConfigurationState, action: Action) -> ConfigurationState {
    let mut next = state.clone();

    match action {
        Action::Global(GlobalAction::SetSchemaVersion(version)) => {
            if next.schema_version == SchemaVersion::V2 && version == SchemaVersion::V1 {
                // Downgrading must not leave orphaned second-generation
                // fields behind.
                v2::disable_token_auth(&mut next.resource.spec);
            }
            debug!(version = %version, "switching schema version");
            next.schema_version = version;
            next
        }
        Action::Global(GlobalAction::SetEditorMode(mode)) => {
            if mode == EditorMode::Structured {
                next.has_unsaved_raw_edits = false;
            }
            next.editor_mode = mode;
            next
        }
        Action::Global(GlobalAction::MarkYamlEdited) => {
            next.has_unsaved_raw_edits = true;
            next
        }
        Action::Global(GlobalAction::ReplaceResource { resource, edited }) => {
            next.resource = *resource;
            next.has_unsaved_raw_edits = false;
            next.has_changes = edited;
            next
        }
        Action::Global(GlobalAction::SetRestricted(enabled)) => {
            switch_profile(&mut next, enabled);
            next
        }
        action => {
            // Anything bound for the version chain is a structural edit.
            next.has_changes = true;
            restricted::reduce(next, action)
        }
    }
}

/// The one authoritative transition between the restricted and the normal
/// deployment profile.
///
/// The two profiles disagree on which fields are legal, so the outgoing spec
/// is discarded wholesale; only the resource name and the ingress domain
/// carry over. Accumulated secret watch results describe the outgoing
/// profile's prerequisites and are dropped with it.
fn switch_profile(state: &mut ConfigurationState, enabled: bool) {
    debug!(enabled, "switching deployment profile");

    let ingress_domain = state.resource.spec.ingress_domain.take();
    state.resource.spec = broker::default_spec();
    state.resource.spec.ingress_domain = ingress_domain;
    state.resource.spec.restricted = Some(enabled);

    // The restricted field set only exists in the second generation.
    state.schema_version = SchemaVersion::V2;
    state.secret_validation.clear();
}
