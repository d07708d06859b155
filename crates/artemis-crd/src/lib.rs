//! Typed model of the `ActiveMQArtemis` custom resource, plus the name
//! validation and YAML helpers shared by everything that edits it.

pub mod broker;
pub mod validation;
pub mod yaml;

pub use broker::{ActiveMQArtemis, ActiveMQArtemisSpec};

// External re-exports
pub use k8s_openapi;
pub use kube;
pub use schemars;
