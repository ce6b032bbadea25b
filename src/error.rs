//! Error types for ConvertKit operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned by [`Client`](crate::Client) and
/// [`LegacyClient`](crate::LegacyClient).
///
/// Local validation failures ([`Error::InvalidArgument`]) are raised before
/// any request is sent. A subscriber that does not exist is not an error:
/// lookups report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    ///
    /// The raw body is kept so callers can inspect the API's error message.
    #[error("API returned {status}: {body}")]
    Api {
        /// HTTP status of the response.
        status: StatusCode,
        /// Undecoded response body.
        body: String,
    },

    /// The response body was not valid JSON.
    #[error("failed to decode JSON response: {0}")]
    Json(#[from] serde_json::Error),

    /// An argument was rejected before a request was built.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The response decoded but did not have the expected shape.
    #[error("unexpected response shape: {0}")]
    ResponseParse(String),

    /// The legacy subscriber scan reached its page limit without a match.
    #[error("subscriber scan stopped after {0} pages without a match")]
    PageLimit(u32),
}

impl Error {
    /// HTTP status carried by an [`Error::Api`] or a reqwest status error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Api { status, .. } => Some(*status),
            Error::Request(err) => err.status(),
            _ => None,
        }
    }

    /// `true` for 4xx responses.
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_client_error())
    }

    /// `true` for 5xx responses.
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_classification() {
        let not_found = Error::Api {
            status: StatusCode::NOT_FOUND,
            body: r#"{"errors":["Not Found"]}"#.to_string(),
        };
        assert!(not_found.is_client_error());
        assert!(!not_found.is_server_error());
        assert_eq!(not_found.status(), Some(StatusCode::NOT_FOUND));

        let unavailable = Error::Api {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: String::new(),
        };
        assert!(unavailable.is_server_error());
    }

    #[test]
    fn local_errors_have_no_status() {
        let err = Error::invalid("unsupported resource: posts");
        assert_eq!(err.status(), None);
        assert_eq!(err.to_string(), "invalid argument: unsupported resource: posts");
    }
}
