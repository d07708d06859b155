//! YAML (de)serialization for the raw-text editor boundary.
//!
//! The text editor widget owns parsing user input; these helpers are the one
//! place where a broker resource crosses between its typed form and the text
//! buffer. The reducer itself never parses anything.

use snafu::{ResultExt, Snafu};

use crate::broker::ActiveMQArtemis;

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize broker resource as YAML"))]
    SerializeResource { source: serde_yaml::Error },

    #[snafu(display("failed to parse broker resource from YAML"))]
    ParseResource { source: serde_yaml::Error },
}

/// Renders the resource the way the text editor displays it.
pub fn to_editor_yaml(resource: &ActiveMQArtemis) -> Result<String> {
    serde_yaml::to_string(resource).context(SerializeResourceSnafu)
}

/// Parses editor text back into a resource. Callers must not hand the result
/// to the reducer when this fails.
pub fn from_editor_yaml(input: &str) -> Result<ActiveMQArtemis> {
    serde_yaml::from_str(input).context(ParseResourceSnafu)
}
