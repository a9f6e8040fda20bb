//! Error types for query building

use thiserror::Error;

/// Result type alias using the crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while parsing, building or deriving search queries
#[derive(Error, Debug)]
pub enum Error {
    /// The search config cannot supply a value the caller depends on
    #[error("Configuration error: {0}")]
    Config(String),

    /// The profile service has no usable profile for a type/context
    #[error("Profile error: {0}")]
    Profile(String),

    /// A builder or derivation precondition was violated by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Query too long: {length} characters (limit is {limit})")]
    QueryTooLong { length: usize, limit: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_too_long_message() {
        let err = Error::QueryTooLong {
            length: 3000,
            limit: 2048,
        };
        assert_eq!(
            err.to_string(),
            "Query too long: 3000 characters (limit is 2048)"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
