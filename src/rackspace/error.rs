//! Error types for the Rackspace backend.

use thiserror::Error;

/// Errors raised by the Rackspace backend.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RackspaceBackendError {
    /// Raised when the identity service rejects the credentials.
    #[error("authentication failed: {message}")]
    Authentication {
        /// Message returned by the identity service.
        message: String,
    },
    /// Raised when the service catalog has no compute endpoint for the region.
    #[error("no compute endpoint available in region {region}")]
    RegionUnavailable {
        /// Region requested by the caller.
        region: String,
    },
    /// Wrapper for provider level failures.
    #[error("{message}")]
    Provider {
        /// Message returned by the provider API or the HTTP client.
        message: String,
    },
}

impl From<reqwest::Error> for RackspaceBackendError {
    fn from(value: reqwest::Error) -> Self {
        Self::Provider {
            message: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for RackspaceBackendError {
    fn from(value: serde_json::Error) -> Self {
        Self::Provider {
            message: format!("unexpected response body: {value}"),
        }
    }
}
