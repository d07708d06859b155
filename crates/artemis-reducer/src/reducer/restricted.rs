//! Restricted-profile reducer: secret watch results and the operator
//! configuration fields that only exist in the restricted deployment
//! profile. Everything else falls through to the second-generation reducer.

use tracing::debug;

use crate::{
    action::{Action, GlobalAction, RestrictedAction},
    state::ConfigurationState,
};

use super::v2;

pub(super) fn reduce(state: ConfigurationState, action: Action) -> ConfigurationState {
    match action {
        Action::Restricted(action) => apply(state, action),
        Action::Global(GlobalAction::SetRestricted(_)) => {
            // Reaching this arm means a caller bypassed the dispatcher;
            // there is no sane way to continue.
            panic!(
                "the deployment profile switch must go through the top-level dispatcher, \
                 not the restricted reducer"
            );
        }
        action => v2::reduce(state, action),
    }
}

fn apply(mut state: ConfigurationState, action: RestrictedAction) -> ConfigurationState {
    match action {
        RestrictedAction::RecordSecretWatch { secret, name } => {
            debug!(secret = %secret, %name, "recording secret watch result");
            state.secret_validation.insert(secret, name);
        }
        RestrictedAction::SetImage(image) => {
            state.resource.spec.deployment_plan.image = Some(image);
        }
        RestrictedAction::SetExtraMounts(mounts) => {
            state.resource.spec.deployment_plan.extra_mounts = Some(mounts);
        }
    }
    state
}
