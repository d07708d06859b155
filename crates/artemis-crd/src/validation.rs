// Adapted from the checks Kubernetes itself applies to object names, see
// apimachinery/pkg/util/validation/validation.go in the Kubernetes source.
// Broker and endpoint names end up embedded in DNS host names and generated
// object names, so the stricter label rule (no dots) applies.

use std::sync::LazyLock;

use const_format::concatcp;
use regex::Regex;
use snafu::Snafu;

const RFC_1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const RFC_1123_LABEL_MAX_LENGTH: usize = 63;

static RFC_1123_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concatcp!("^", RFC_1123_LABEL_FMT, "$"))
        .expect("failed to compile RFC 1123 label regex")
});

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("name is {length} characters long but must be no more than {max_length}"))]
    TooLong { length: usize, max_length: usize },

    #[snafu(display(
        "name {name:?} must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character"
    ))]
    InvalidCharacters { name: String },
}

/// Returns [`Ok`] if `value` is usable as the name of a broker resource, an
/// acceptor or a connector.
pub fn is_valid_name(value: &str) -> Result<()> {
    if value.len() > RFC_1123_LABEL_MAX_LENGTH {
        return TooLongSnafu {
            length: value.len(),
            max_length: RFC_1123_LABEL_MAX_LENGTH,
        }
        .fail();
    }

    if !RFC_1123_LABEL_REGEX.is_match(value) {
        return InvalidCharactersSnafu {
            name: value.to_owned(),
        }
        .fail();
    }

    Ok(())
}
