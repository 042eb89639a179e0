//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid grid dimensions, malformed UV buffers, invalid configuration, unparsable node keys,
//! IO, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("malformed uv buffer: expected {expected} bytes, got {actual}")]
    MalformedUvBuffer { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid node key '{key}'")]
    InvalidNodeKey { key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_string_uses_other_variant() {
        let err: Error = String::from("boom").into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn malformed_buffer_reports_both_lengths() {
        let err = Error::MalformedUvBuffer {
            expected: 16,
            actual: 12,
        };
        assert_eq!(
            err.to_string(),
            "malformed uv buffer: expected 16 bytes, got 12"
        );
    }

    #[test]
    fn invalid_node_key_quotes_the_key() {
        let err = Error::InvalidNodeKey { key: "abc".into() };
        assert_eq!(err.to_string(), "invalid node key 'abc'");
    }
}
