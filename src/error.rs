//! Error types for the CloudSearch client.
//!
//! Every failure is propagated to the caller unchanged. Configuration and
//! parameter errors are raised before any request is sent.

use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or running a search.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A required configuration key is absent or empty.
    #[error("Missing '{0}' configuration parameter")]
    MissingConfiguration(&'static str),

    /// Neither a free-text query nor a boolean query was supplied.
    #[error("Insufficient parameters: a query or a boolean query is required")]
    InsufficientParameters,

    /// Transport error from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body is not the JSON payload we expect.
    #[error("Malformed search response: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_configuration_names_key() {
        let err = Error::MissingConfiguration("domain_id");
        assert_eq!(
            err.to_string(),
            "Missing 'domain_id' configuration parameter"
        );
    }

    #[test]
    fn test_malformed_response_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: Error = parse_err.into();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }
}
