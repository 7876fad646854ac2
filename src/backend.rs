//! Backend abstraction for listing, creating, and deleting server instances.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::str::FromStr;

use camino::Utf8PathBuf;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Desired description of an instance. Used both to search for existing
/// matches and to create a new instance when none exists.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstanceSpec {
    /// Server name.
    pub name: String,
    /// Provider flavor identifier (for example `2` or `performance1-1`).
    pub flavor: String,
    /// Provider image identifier.
    pub image: String,
    /// Metadata attached to the server. Compared exactly when matching.
    pub metadata: BTreeMap<String, String>,
    /// Optional key pair injected for SSH access.
    pub key_name: Option<String>,
    /// Files to inject, keyed by remote path, valued by local source path.
    pub files: BTreeMap<String, Utf8PathBuf>,
}

impl InstanceSpec {
    /// Starts a builder for an [`InstanceSpec`].
    #[must_use]
    pub fn builder() -> InstanceSpecBuilder {
        InstanceSpecBuilder::new()
    }

    /// Validates the fields required to create an instance.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Validation`] naming the first empty field.
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.name.is_empty() {
            return Err(BackendError::Validation("name".to_owned()));
        }
        if self.flavor.is_empty() {
            return Err(BackendError::Validation("flavor".to_owned()));
        }
        if self.image.is_empty() {
            return Err(BackendError::Validation("image".to_owned()));
        }
        Ok(())
    }
}

/// Builder for [`InstanceSpec`] that trims scalar inputs on build.
///
/// Building never fails: required fields are only enforced when the spec is
/// used to create an instance.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InstanceSpecBuilder {
    name: String,
    flavor: String,
    image: String,
    metadata: BTreeMap<String, String>,
    key_name: Option<String>,
    files: BTreeMap<String, Utf8PathBuf>,
}

impl InstanceSpecBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server name.
    #[must_use]
    pub fn name(mut self, value: impl Into<String>) -> Self {
        self.name = value.into();
        self
    }

    /// Sets the flavor identifier.
    #[must_use]
    pub fn flavor(mut self, value: impl Into<String>) -> Self {
        self.flavor = value.into();
        self
    }

    /// Sets the image identifier.
    #[must_use]
    pub fn image(mut self, value: impl Into<String>) -> Self {
        self.image = value.into();
        self
    }

    /// Adds one metadata entry, replacing any previous value for the key.
    #[must_use]
    pub fn metadata_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the optional key pair name. Blank names are treated as absent.
    #[must_use]
    pub fn key_name(mut self, value: Option<String>) -> Self {
        self.key_name = value;
        self
    }

    /// Adds a file to inject at `remote` from the local path `local`.
    #[must_use]
    pub fn file(mut self, remote: impl Into<String>, local: impl Into<Utf8PathBuf>) -> Self {
        self.files.insert(remote.into(), local.into());
        self
    }

    /// Builds the [`InstanceSpec`], trimming name, flavor, image, and key
    /// name.
    #[must_use]
    pub fn build(self) -> InstanceSpec {
        InstanceSpec {
            name: self.name.trim().to_owned(),
            flavor: self.flavor.trim().to_owned(),
            image: self.image.trim().to_owned(),
            metadata: self.metadata,
            key_name: self
                .key_name
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            files: self.files,
        }
    }
}

/// Lifecycle status reported by the provider for an instance.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum InstanceStatus {
    /// The instance is still being built.
    Build,
    /// The instance is running.
    Active,
    /// The provider failed to build or operate the instance.
    Error,
    /// A delete request has been accepted for the instance.
    Deleting,
    /// Any other provider status, upper-cased.
    Other(String),
}

impl InstanceStatus {
    /// Returns `true` when the status ends a wait: `ACTIVE` or `ERROR`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Active | Self::Error)
    }

    /// Returns the provider spelling of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Build => "BUILD",
            Self::Active => "ACTIVE",
            Self::Error => "ERROR",
            Self::Deleting => "DELETING",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<&str> for InstanceStatus {
    fn from(value: &str) -> Self {
        let upper = value.trim().to_ascii_uppercase();
        match upper.as_str() {
            "BUILD" | "BUILDING" => Self::Build,
            "ACTIVE" => Self::Active,
            "ERROR" => Self::Error,
            "DELETING" => Self::Deleting,
            _ => Self::Other(upper),
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for InstanceStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Live view of an instance as listed by the provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Instance {
    /// Provider specific identifier.
    pub id: String,
    /// Server name.
    pub name: String,
    /// Flavor identifier the server was built from.
    pub flavor_id: String,
    /// Image identifier the server was built from (empty when volume-backed).
    pub image_id: String,
    /// Metadata currently attached to the server.
    pub metadata: BTreeMap<String, String>,
    /// Current lifecycle status.
    pub status: InstanceStatus,
    /// Primary public IPv4 address once assigned.
    pub address: Option<Ipv4Addr>,
}

impl Instance {
    /// Returns `true` when name, flavor, image, and metadata all equal the
    /// spec exactly.
    #[must_use]
    pub fn matches(&self, spec: &InstanceSpec) -> bool {
        self.name == spec.name
            && self.flavor_id == spec.flavor
            && self.image_id == spec.image
            && self.metadata == spec.metadata
    }

    /// Converts the live view into the record reported to callers.
    #[must_use]
    pub fn into_record(self) -> InstanceRecord {
        InstanceRecord {
            id: self.id,
            address: self.address,
            name: self.name,
            status: self.status,
        }
    }
}

/// Instance details reported back to the caller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct InstanceRecord {
    /// Provider specific identifier.
    pub id: String,
    /// Primary public IPv4 address, `null` while unassigned.
    pub address: Option<Ipv4Addr>,
    /// Server name.
    pub name: String,
    /// Status at the time the record was taken.
    pub status: InstanceStatus,
}

/// A file injected into the instance filesystem at build time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InjectedFile {
    /// Absolute path on the instance.
    pub path: String,
    /// Raw file contents.
    pub contents: Vec<u8>,
}

/// Fully resolved create call: the spec with injected files loaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateRequest {
    /// Server name.
    pub name: String,
    /// Flavor identifier.
    pub flavor: String,
    /// Image identifier.
    pub image: String,
    /// Metadata to attach.
    pub metadata: BTreeMap<String, String>,
    /// Optional key pair name.
    pub key_name: Option<String>,
    /// Files to inject.
    pub files: Vec<InjectedFile>,
}

impl CreateRequest {
    /// Builds a request from a spec and the already-read injected files.
    #[must_use]
    pub fn from_spec(spec: &InstanceSpec, files: Vec<InjectedFile>) -> Self {
        Self {
            name: spec.name.clone(),
            flavor: spec.flavor.clone(),
            image: spec.image.clone(),
            metadata: spec.metadata.clone(),
            key_name: spec.key_name.clone(),
            files,
        }
    }
}

/// Whether an instance matching the spec should exist.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DesiredState {
    /// Ensure a matching instance exists (`present` or `active`).
    Present,
    /// Ensure no matching instance exists (`absent` or `deleted`).
    Absent,
}

impl FromStr for DesiredState {
    type Err = BackendError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" => Err(BackendError::Validation("state".to_owned())),
            "present" | "active" => Ok(Self::Present),
            "absent" | "deleted" => Ok(Self::Absent),
            other => Err(BackendError::InvalidValue {
                field: "state".to_owned(),
                value: other.to_owned(),
            }),
        }
    }
}

/// Errors raised while validating caller input.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum BackendError {
    /// Raised when a required field is missing.
    #[error("missing or empty field: {0}")]
    Validation(String),
    /// Raised when a field holds a value outside its allowed set.
    #[error("invalid value '{value}' for field {field}")]
    InvalidValue {
        /// Field name.
        field: String,
        /// Rejected value.
        value: String,
    },
}

/// Future returned by backend operations.
pub type BackendFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Minimal interface implemented by compute providers.
pub trait Backend {
    /// Provider specific error type returned by the backend.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lists every instance visible to the authenticated account.
    fn list(&self) -> BackendFuture<'_, Vec<Instance>, Self::Error>;

    /// Creates an instance and returns its freshly fetched view.
    fn create<'a>(&'a self, request: &'a CreateRequest) -> BackendFuture<'a, Instance, Self::Error>;

    /// Fetches the current view of one instance.
    fn get<'a>(&'a self, id: &'a str) -> BackendFuture<'a, Instance, Self::Error>;

    /// Requests deletion of one instance. Returns once the provider accepts
    /// the request.
    fn delete<'a>(&'a self, id: &'a str) -> BackendFuture<'a, (), Self::Error>;
}
