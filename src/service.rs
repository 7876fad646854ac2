//! Service selector parsing.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Provider services that `hmara` knows how to manage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Service {
    /// OpenStack-compatible Cloud Servers.
    CloudServers,
}

impl Service {
    /// Returns the selector name accepted on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CloudServers => "cloudservers",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Service {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cloudservers" => Ok(Self::CloudServers),
            _ => Err(ServiceError::Unsupported(value.trim().to_owned())),
        }
    }
}

/// Errors raised when selecting a service.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ServiceError {
    /// Raised for any selector other than `cloudservers`.
    #[error("service '{0}' is not supported")]
    Unsupported(String),
}
