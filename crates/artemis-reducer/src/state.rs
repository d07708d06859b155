//! The configuration state owned by the reducer.
//!
//! A [`ConfigurationState`] is created once per editing session and from then
//! on only replaced wholesale by [`reduce`](crate::reducer::reduce). Callers
//! treat it as a persistent value: keeping an old snapshot around is the
//! supported way to diff against the current one.

use std::collections::BTreeMap;

use artemis_crd::{broker, broker::ActiveMQArtemis, validation};

/// Generation of the custom resource field set the editor targets.
///
/// [`Self::V2`] is additive over [`Self::V1`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum SchemaVersion {
    V1,
    V2,
}

/// Which editing surface the user is looking at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum EditorMode {
    /// Structured forms and tables.
    Structured,
    /// The raw YAML text editor.
    Yaml,
}

/// Secrets the restricted deployment profile requires before it can be
/// submitted. An external watcher resolves each of these and reports back
/// through the reducer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, strum::Display)]
pub enum WatchedSecret {
    /// Server certificate of the broker itself.
    BrokerCert,
    /// JAAS login configuration consumed by the broker.
    JaasConfig,
    /// Bundle of certificate authorities trusted for client connections.
    CaBundle,
}

/// Root of the editing session: the resource under construction plus the
/// bookkeeping flags of the surrounding editor.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigurationState {
    pub(crate) schema_version: SchemaVersion,
    pub(crate) editor_mode: EditorMode,
    pub(crate) has_unsaved_raw_edits: bool,
    pub(crate) has_changes: bool,
    pub(crate) resource: ActiveMQArtemis,
    /// Watch results of the restricted profile, watched secret to found
    /// secret name. An empty name records "looked for it, not found".
    pub(crate) secret_validation: BTreeMap<WatchedSecret, String>,
}

impl ConfigurationState {
    /// Starts a fresh editing session for a broker in `namespace`.
    pub fn new_configuration(namespace: &str) -> Self {
        Self {
            schema_version: SchemaVersion::V1,
            editor_mode: EditorMode::Structured,
            has_unsaved_raw_edits: false,
            has_changes: false,
            resource: broker::default_resource(namespace),
            secret_validation: BTreeMap::new(),
        }
    }

    /// The resource under construction. The rendering layer reads this to
    /// build its forms and tables; on submit it is serialized and sent to
    /// the cluster by an external collaborator.
    pub fn resource(&self) -> &ActiveMQArtemis {
        &self.resource
    }

    pub fn schema_version(&self) -> SchemaVersion {
        self.schema_version
    }

    pub fn editor_mode(&self) -> EditorMode {
        self.editor_mode
    }

    /// Whether the YAML buffer differs from [`Self::resource`].
    pub fn has_unsaved_raw_edits(&self) -> bool {
        self.has_unsaved_raw_edits
    }

    /// Whether any structural edit happened since the last applied
    /// checkpoint.
    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn is_restricted(&self) -> bool {
        self.resource.spec.restricted.unwrap_or_default()
    }

    /// The name the secret watcher resolved for `secret`, or `None` while
    /// unresolved or not found.
    pub fn watched_secret(&self, secret: WatchedSecret) -> Option<&str> {
        self.secret_validation
            .get(&secret)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Whether everything a submit requires has been filled in.
    ///
    /// Restricted deployments are never reported ready here; their secret
    /// prerequisites are validated externally.
    pub fn mandatory_values_set(&self) -> bool {
        if self.is_restricted() {
            return false;
        }

        let name_valid = self
            .resource
            .metadata
            .name
            .as_deref()
            .is_some_and(|name| validation::is_valid_name(name).is_ok());

        name_valid
            && self
                .resource
                .metadata
                .namespace
                .as_deref()
                .is_some_and(|namespace| !namespace.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_defaults() {
        let state = ConfigurationState::new_configuration("ns");

        assert_eq!(state.schema_version(), SchemaVersion::V1);
        assert_eq!(state.editor_mode(), EditorMode::Structured);
        assert!(!state.has_changes());
        assert!(!state.has_unsaved_raw_edits());
        assert!(!state.is_restricted());
        assert!(state.mandatory_values_set());
    }

    #[test]
    fn restricted_sessions_never_report_ready() {
        let mut state = ConfigurationState::new_configuration("ns");
        state.resource.spec.restricted = Some(true);

        assert!(!state.mandatory_values_set());
    }

    #[test]
    fn empty_watch_result_reads_as_not_found() {
        let mut state = ConfigurationState::new_configuration("ns");
        state
            .secret_validation
            .insert(WatchedSecret::BrokerCert, String::new());
        state
            .secret_validation
            .insert(WatchedSecret::CaBundle, "trust-bundle".to_owned());

        assert_eq!(state.watched_secret(WatchedSecret::BrokerCert), None);
        assert_eq!(state.watched_secret(WatchedSecret::JaasConfig), None);
        assert_eq!(
            state.watched_secret(WatchedSecret::CaBundle),
            Some("trust-bundle")
        );
    }
}
