//! Configuration loading via `ortho-config`.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Provider configuration derived from defaults, configuration files, and
/// `RAX_*` environment variables. Command-line values are layered on top
/// with [`ProviderConfig::with_overrides`].
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "RAX")]
pub struct ProviderConfig {
    /// Path to the credentials file holding the API username and key.
    pub creds_file: Option<String>,
    /// Provider region (for example `DFW`, `ORD`, `LON`).
    pub region: Option<String>,
    /// Identity service base URL used to obtain tokens.
    #[ortho_config(default = "https://identity.api.rackspacecloud.com/v2.0".to_owned())]
    pub identity_endpoint: String,
}

/// Validated settings required to talk to the provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProviderSettings {
    /// Credentials file location.
    pub creds_file: Utf8PathBuf,
    /// Region, upper-cased.
    pub region: String,
    /// Identity service base URL without a trailing slash.
    pub identity_endpoint: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    flag: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, flag: &'static str) -> Self {
        Self {
            description,
            env_var,
            flag,
        }
    }
}

const CREDS_FILE_FIELD: FieldMetadata =
    FieldMetadata::new("credentials file path", "RAX_CREDS_FILE", "--creds-file");
const REGION_FIELD: FieldMetadata = FieldMetadata::new("region", "RAX_REGION", "--region");
const IDENTITY_FIELD: FieldMetadata = FieldMetadata::new(
    "identity endpoint",
    "RAX_IDENTITY_ENDPOINT",
    "identity_endpoint in the configuration file",
);

impl ProviderConfig {
    fn require_field<'a>(
        value: Option<&'a str>,
        metadata: &FieldMetadata,
    ) -> Result<&'a str, ConfigError> {
        match value.map(str::trim) {
            Some(trimmed) if !trimmed.is_empty() => Ok(trimmed),
            _ => Err(ConfigError::MissingField(format!(
                "missing {}: set {} or pass {}",
                metadata.description, metadata.env_var, metadata.flag
            ))),
        }
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("hmara")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Applies explicit command-line values over the loaded configuration.
    /// `None` keeps the loaded value.
    #[must_use]
    pub fn with_overrides(mut self, creds_file: Option<String>, region: Option<String>) -> Self {
        if creds_file.is_some() {
            self.creds_file = creds_file;
        }
        if region.is_some() {
            self.region = region;
        }
        self
    }

    /// Performs semantic validation on required fields. Error messages name
    /// both the environment variable and the CLI flag.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.settings().map(drop)
    }

    /// Validates the configuration and returns normalised settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the credentials path,
    /// region, or identity endpoint is missing.
    pub fn settings(&self) -> Result<ProviderSettings, ConfigError> {
        let creds_file = Self::require_field(self.creds_file.as_deref(), &CREDS_FILE_FIELD)?;
        let region = Self::require_field(self.region.as_deref(), &REGION_FIELD)?;
        let identity_endpoint =
            Self::require_field(Some(self.identity_endpoint.as_str()), &IDENTITY_FIELD)?;
        Ok(ProviderSettings {
            creds_file: Utf8PathBuf::from(creds_file),
            region: region.to_ascii_uppercase(),
            identity_endpoint: identity_endpoint.trim_end_matches('/').to_owned(),
        })
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
