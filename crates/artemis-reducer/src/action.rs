//! The edit actions understood by the reducer.
//!
//! One enum per owning reducer layer, wrapped in a single [`Action`] so a
//! dispatch site can route without ambiguity: the global dispatcher handles
//! [`GlobalAction`] itself and hands everything else to the layered chain,
//! where each layer matches its own enum and forwards the rest.

use std::collections::BTreeMap;

use artemis_crd::broker::{ActiveMQArtemis, EndpointKind, ExposeMode, ExtraMounts};

use crate::{
    properties::FactoryClass,
    state::{EditorMode, SchemaVersion, WatchedSecret},
};

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    Global(GlobalAction),
    V1(V1Action),
    V2(V2Action),
    Restricted(RestrictedAction),
}

/// Operations spanning schema versions, handled before the reducer chain.
#[derive(Clone, Debug, PartialEq)]
pub enum GlobalAction {
    SetSchemaVersion(SchemaVersion),

    SetEditorMode(EditorMode),

    /// The YAML buffer diverged from the resource.
    MarkYamlEdited,

    /// Replace the resource wholesale with an already-parsed document.
    /// `edited` is true when a human wrote the text, false when the
    /// replacement is system-driven (e.g. reconciling from the cluster).
    ReplaceResource {
        resource: Box<ActiveMQArtemis>,
        edited: bool,
    },

    /// Switch between the restricted and the normal deployment profile.
    SetRestricted(bool),
}

/// Base field set operations, understood by every operator generation.
#[derive(Clone, Debug, PartialEq)]
pub enum V1Action {
    SetBrokerName(String),
    SetNamespace(String),
    SetIngressDomain(String),
    SetReplicas(i32),
    Console(ConsoleAction),
    Endpoint {
        kind: EndpointKind,
        action: EndpointAction,
    },
    /// Expose `acceptor` through a certificate-based ingress, with
    /// certificates issued by `issuer`.
    EnablePemIngress {
        acceptor: String,
        issuer: String,
    },
    DisablePemIngress {
        acceptor: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConsoleAction {
    SetExpose(bool),
    SetExposeMode(ExposeMode),
    SetSslEnabled(bool),
    SetSslSecret(Option<String>),
    SetUseClientAuth(bool),
    SetCredentials { user: String, password: String },
}

/// Operations on one member of an endpoint collection. Acceptors and
/// connectors share these; [`V1Action::Endpoint`] carries the collection.
#[derive(Clone, Debug, PartialEq)]
pub enum EndpointAction {
    /// Append a new member with an allocated name and port.
    Add,
    Delete {
        name: String,
    },
    SetName {
        name: String,
        new_name: String,
    },
    SetPort {
        name: String,
        port: i32,
    },
    SetProtocols {
        name: String,
        protocols: String,
    },
    SetBindToAllInterfaces {
        name: String,
        bind: bool,
    },
    SetFactoryClass {
        name: String,
        class: FactoryClass,
    },
    /// Replace the member's free-form parameters wholesale.
    SetOtherParams {
        name: String,
        params: BTreeMap<String, String>,
    },
    SetSslEnabled {
        name: String,
        enabled: bool,
    },
    SetSslSecret {
        name: String,
        secret: Option<String>,
    },
    SetTrustSecret {
        name: String,
        secret: Option<String>,
    },
    SetExpose {
        name: String,
        expose: bool,
    },
    SetExposeMode {
        name: String,
        mode: ExposeMode,
    },
    SetIngressHost {
        name: String,
        host: String,
    },
}

/// Second-generation operations: token-based authentication.
#[derive(Clone, Debug, PartialEq)]
pub enum V2Action {
    SetTokenAuthEnabled(bool),
    SetServiceAccount(String),
    SetJaasSecret(String),
    /// Replace the security role mapping, role name to granted permissions.
    SetSecurityRoles(BTreeMap<String, Vec<String>>),
}

/// Operations owned by the restricted deployment profile.
#[derive(Clone, Debug, PartialEq)]
pub enum RestrictedAction {
    /// Merge one secret watch result. An empty `name` records "not found".
    RecordSecretWatch {
        secret: WatchedSecret,
        name: String,
    },
    SetImage(String),
    SetExtraMounts(ExtraMounts),
}
