use thiserror::Error;

/// Error when parsing an invalid enum string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} '{invalid}'. Valid values: {expected}")]
pub struct ParseEnumError {
    kind: &'static str,
    invalid: String,
    expected: &'static str,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, invalid: &str, expected: &'static str) -> Self {
        Self {
            kind,
            invalid: invalid.to_string(),
            expected,
        }
    }
}
