//! Second-generation reducer: token-based authentication. Everything else
//! falls through to the base reducer.

use artemis_crd::broker::{
    ActiveMQArtemisSpec, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USER, TokenAuth,
};
use tracing::debug;

use crate::{
    action::{Action, V2Action},
    state::ConfigurationState,
};

use super::v1;

pub(super) fn reduce(state: ConfigurationState, action: Action) -> ConfigurationState {
    match action {
        Action::V2(action) => apply(state, action),
        action => v1::reduce(state, action),
    }
}

fn apply(mut state: ConfigurationState, action: V2Action) -> ConfigurationState {
    let spec = &mut state.resource.spec;
    match action {
        V2Action::SetTokenAuthEnabled(true) => enable_token_auth(spec),
        V2Action::SetTokenAuthEnabled(false) => disable_token_auth(spec),
        V2Action::SetServiceAccount(service_account) => {
            if let Some(auth) = spec.token_auth.as_mut() {
                auth.service_account = Some(service_account);
            } else {
                debug!("ignoring service account selection while token authentication is off");
            }
        }
        V2Action::SetJaasSecret(secret) => {
            if let Some(auth) = spec.token_auth.as_mut() {
                auth.jaas_secret = Some(secret);
            } else {
                debug!("ignoring JAAS secret reference while token authentication is off");
            }
        }
        V2Action::SetSecurityRoles(roles) => {
            if let Some(auth) = spec.token_auth.as_mut() {
                auth.roles = roles;
            } else {
                debug!("ignoring security roles while token authentication is off");
            }
        }
    }
    state
}

/// Token authentication replaces the static console credentials. Repeat
/// activations keep whatever has been configured since.
fn enable_token_auth(spec: &mut ActiveMQArtemisSpec) {
    if spec.token_auth.is_some() {
        return;
    }
    spec.token_auth = Some(TokenAuth::default());
    spec.admin_user = None;
    spec.admin_password = None;
}

/// Drops every token-authentication field and restores the default console
/// credentials. Also run when the schema version drops back to the base
/// generation, so a downgrade leaves no orphaned second-generation state.
pub(super) fn disable_token_auth(spec: &mut ActiveMQArtemisSpec) {
    if spec.token_auth.take().is_none() {
        return;
    }
    spec.admin_user = Some(DEFAULT_ADMIN_USER.to_owned());
    spec.admin_password = Some(DEFAULT_ADMIN_PASSWORD.to_owned());
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn enabling_token_auth_clears_static_credentials() {
        let mut state = ConfigurationState::new_configuration("ns");
        state.resource.spec.admin_user = Some("alice".to_owned());
        state.resource.spec.admin_password = Some("hunter2".to_owned());

        let state = apply(state, V2Action::SetTokenAuthEnabled(true));

        assert!(state.resource.spec.token_auth.is_some());
        assert!(state.resource.spec.admin_user.is_none());
        assert!(state.resource.spec.admin_password.is_none());
    }

    #[test]
    fn disabling_token_auth_restores_default_credentials() {
        let state = ConfigurationState::new_configuration("ns");
        let state = apply(state, V2Action::SetTokenAuthEnabled(true));
        let state = apply(
            state,
            V2Action::SetServiceAccount("broker-tokens".to_owned()),
        );

        let state = apply(state, V2Action::SetTokenAuthEnabled(false));

        assert!(state.resource.spec.token_auth.is_none());
        assert_eq!(
            state.resource.spec.admin_user.as_deref(),
            Some(DEFAULT_ADMIN_USER)
        );
        assert_eq!(
            state.resource.spec.admin_password.as_deref(),
            Some(DEFAULT_ADMIN_PASSWORD)
        );
    }

    #[test]
    fn disabling_when_never_enabled_keeps_user_credentials() {
        let mut state = ConfigurationState::new_configuration("ns");
        state.resource.spec.admin_user = Some("alice".to_owned());

        let state = apply(state, V2Action::SetTokenAuthEnabled(false));

        assert_eq!(state.resource.spec.admin_user.as_deref(), Some("alice"));
    }

    #[test]
    fn repeat_activation_keeps_configured_values() {
        let state = ConfigurationState::new_configuration("ns");
        let state = apply(state, V2Action::SetTokenAuthEnabled(true));
        let state = apply(
            state,
            V2Action::SetSecurityRoles(BTreeMap::from([(
                "admins".to_owned(),
                vec!["consume".to_owned(), "send".to_owned()],
            )])),
        );

        let state = apply(state, V2Action::SetTokenAuthEnabled(true));

        let auth = state.resource.spec.token_auth.as_ref().unwrap();
        assert_eq!(auth.roles["admins"], ["consume", "send"]);
    }

    #[test]
    fn role_setters_require_token_auth() {
        let state = ConfigurationState::new_configuration("ns");

        let state = apply(state, V2Action::SetJaasSecret("jaas-config".to_owned()));

        assert!(state.resource.spec.token_auth.is_none());
    }
}
