//! Typed model of the `ActiveMQArtemis` custom resource.
//!
//! The structs in this module mirror the fields of the broker CRD that the
//! configuration reducer edits. They are plain data: every mutation goes
//! through the reducer crate, and the rendering layer only ever reads them.
//!
//! Two generations of the field set exist. The base set (acceptors,
//! connectors, console, deployment plan, broker properties) is understood by
//! every operator version; [`TokenAuth`] is the additive second generation
//! and is only serialized when token-based authentication is enabled.

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Name given to a broker deployment before the user picks one.
pub const DEFAULT_CR_NAME: &str = "ex-aao";

/// Replica count of a freshly created deployment plan.
pub const DEFAULT_REPLICAS: i32 = 1;

/// Console credentials the operator falls back to when token-based
/// authentication is turned off again.
pub const DEFAULT_ADMIN_USER: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Protocol list assigned to newly allocated acceptors and connectors.
pub const DEFAULT_PROTOCOLS: &str = "ALL";

/// Declarative configuration of an ActiveMQ Artemis broker deployment.
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[kube(
    group = "broker.amq.io",
    version = "v1beta1",
    kind = "ActiveMQArtemis",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ActiveMQArtemisSpec {
    /// Inbound network endpoints of the broker.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub acceptors: Vec<Endpoint>,

    /// Outbound network endpoints of the broker.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connectors: Vec<Endpoint>,

    /// Management console exposure and TLS settings.
    #[serde(default)]
    pub console: ConsoleConfig,

    #[serde(default)]
    pub deployment_plan: DeploymentPlan,

    /// Flat broker property lines consumed by the operator verbatim, one
    /// `key=value` entry per line. Kept in sync with the structured acceptor
    /// and connector fields; append-only and free of duplicate keys.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub broker_properties: Vec<String>,

    /// Resource patches applied by the operator to generated objects.
    ///
    /// Only present while at least one acceptor has certificate-based ingress
    /// exposure active; fully derived from the owning acceptor's identity and
    /// never edited directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_templates: Option<Vec<ResourceTemplate>>,

    /// Cluster ingress domain used when deriving external host names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_domain: Option<String>,

    /// Selects the reduced, mTLS-oriented deployment profile.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_user: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,

    /// Token-based authentication. Second-generation field set; absent
    /// whenever token authentication is disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_auth: Option<TokenAuth>,
}

/// A named, ported network endpoint of the broker.
///
/// Acceptors and connectors share this shape. Names and ports are unique
/// within their own collection, but an acceptor and a connector may collide.
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub name: String,

    pub port: i32,

    /// Comma separated list of messaging protocols, or `ALL`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocols: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_to_all_interfaces: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_enabled: Option<bool>,

    /// Secret holding the server certificate. Generated and maintained by
    /// the reducer while certificate-based ingress exposure is active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_secret: Option<String>,

    /// Secret holding the trusted client certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trust_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_mode: Option<ExposeMode>,

    /// Host the endpoint is reachable at when exposed through an ingress.
    /// May contain `$(...)` placeholders substituted by the operator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress_host: Option<String>,
}

/// How an endpoint or the console is exposed outside the cluster.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, JsonSchema, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExposeMode {
    Route,
    Ingress,
}

/// The two endpoint collections of a broker spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum EndpointKind {
    Acceptor,
    Connector,
}

impl EndpointKind {
    /// Name of the spec collection, which also stems the auto-allocated
    /// member names (`acceptors0`, `connectors1`, ...).
    pub fn collection_name(&self) -> &'static str {
        match self {
            Self::Acceptor => "acceptors",
            Self::Connector => "connectors",
        }
    }
}

/// Management console settings.
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expose_mode: Option<ExposeMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssl_secret: Option<String>,

    /// Whether the console requires client certificates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_client_auth: Option<bool>,
}

/// Sizing and pod-level settings of the broker deployment.
#[derive(Serialize, Deserialize, Clone, Debug, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentPlan {
    /// Number of broker pods.
    #[serde(default = "default_replicas")]
    pub size: i32,

    /// Broker container image. Left unset to let the operator pick the
    /// image matching its own version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_login: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_security: Option<PodSecurity>,

    /// Extra config maps and secrets mounted into the broker pods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_mounts: Option<ExtraMounts>,
}

impl Default for DeploymentPlan {
    fn default() -> Self {
        Self {
            size: DEFAULT_REPLICAS,
            image: None,
            require_login: None,
            pod_security: None,
            extra_mounts: None,
        }
    }
}

fn default_replicas() -> i32 {
    DEFAULT_REPLICAS
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PodSecurity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_as_user: Option<i64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtraMounts {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config_maps: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secrets: Vec<String>,
}

/// Token-based authentication settings, only understood by second-generation
/// operators.
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TokenAuth {
    /// Service account whose tokens are accepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,

    /// Secret holding the JAAS login configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jaas_secret: Option<String>,

    /// Security role mapping, role name to granted permissions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub roles: BTreeMap<String, Vec<String>>,
}

/// A patch the operator applies to one generated object, selected by name.
///
/// The reducer derives one template per acceptor with certificate-based
/// ingress exposure active, carrying the TLS host list of the generated
/// ingress.
#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    pub selector: TemplateSelector,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    pub patch: TemplatePatch,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSelector {
    /// Name of the generated object the patch applies to.
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatch {
    pub spec: TemplatePatchSpec,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplatePatchSpec {
    pub tls: Vec<TemplateTls>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTls {
    pub hosts: Vec<String>,
}

/// Returns the spec a brand new deployment starts from.
pub fn default_spec() -> ActiveMQArtemisSpec {
    ActiveMQArtemisSpec::default()
}

/// Returns the resource a brand new editing session starts from: default
/// name, the given namespace, one replica, nothing else configured.
pub fn default_resource(namespace: &str) -> ActiveMQArtemis {
    let mut resource = ActiveMQArtemis::new(DEFAULT_CR_NAME, default_spec());
    resource.metadata.namespace = Some(namespace.to_owned());
    resource
}
