//! API credentials loaded from the credentials file.
//!
//! The file is TOML with a single `[rackspace_cloud]` table holding
//! `username` and `api_key`.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use ortho_config::toml;
use serde::Deserialize;
use thiserror::Error;

use crate::local_fs::read_to_string_ambient;

/// Username and API key used to obtain an auth token.
#[derive(Clone, Eq, PartialEq)]
pub struct Credentials {
    /// Account username.
    pub username: String,
    api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct CredentialsFile {
    rackspace_cloud: Option<CredentialsSection>,
}

#[derive(Deserialize)]
struct CredentialsSection {
    #[serde(default)]
    username: String,
    #[serde(default)]
    api_key: String,
}

/// Errors raised while loading credentials.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CredentialsError {
    /// Raised when the file cannot be read.
    #[error("failed to read credentials file `{path}`: {message}")]
    Read {
        /// Path that could not be read.
        path: Utf8PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// Raised when the file is not valid TOML.
    #[error("failed to parse credentials file `{path}`: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Parser error message.
        message: String,
    },
    /// Raised when a required key is missing or blank.
    #[error("credentials file `{path}` is missing {field} in [rackspace_cloud]")]
    MissingField {
        /// Path of the credentials file.
        path: Utf8PathBuf,
        /// Missing key.
        field: &'static str,
    },
}

impl Credentials {
    /// Builds credentials from explicit values.
    #[must_use]
    pub fn new(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            api_key: api_key.into(),
        }
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Reads and parses the credentials file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialsError`] when the file cannot be read or parsed, or
    /// lacks a username or API key.
    pub fn load(path: &Utf8Path) -> Result<Self, CredentialsError> {
        let contents = read_to_string_ambient(path).map_err(|message| CredentialsError::Read {
            path: path.to_owned(),
            message,
        })?;
        Self::parse(path, &contents)
    }

    fn parse(path: &Utf8Path, contents: &str) -> Result<Self, CredentialsError> {
        let file: CredentialsFile =
            toml::from_str(contents).map_err(|err| CredentialsError::Parse {
                path: path.to_owned(),
                message: err.to_string(),
            })?;
        let section = file
            .rackspace_cloud
            .ok_or_else(|| CredentialsError::MissingField {
                path: path.to_owned(),
                field: "username",
            })?;

        let username = section.username.trim();
        if username.is_empty() {
            return Err(CredentialsError::MissingField {
                path: path.to_owned(),
                field: "username",
            });
        }
        let api_key = section.api_key.trim();
        if api_key.is_empty() {
            return Err(CredentialsError::MissingField {
                path: path.to_owned(),
                field: "api_key",
            });
        }
        Ok(Self::new(username, api_key))
    }
}
