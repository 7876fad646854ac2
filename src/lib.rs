//! Core library for the Hmara instance provisioner.
//!
//! The crate exposes a backend abstraction over cloud compute providers, an
//! idempotent [`Provisioner`] that creates or deletes instances matching a
//! spec, and a Rackspace Cloud Servers implementation of the backend.

pub mod backend;
pub mod config;
pub mod credentials;
mod local_fs;
pub mod provision;
pub mod rackspace;
pub mod report;
pub mod service;
#[cfg(test)]
pub mod test_helpers;
pub mod test_support;

pub use backend::{
    Backend, BackendError, BackendFuture, CreateRequest, DesiredState, InjectedFile, Instance,
    InstanceRecord, InstanceSpec, InstanceSpecBuilder, InstanceStatus,
};
pub use config::{ConfigError, ProviderConfig, ProviderSettings};
pub use credentials::{Credentials, CredentialsError};
pub use provision::{DEFAULT_WAIT_TIMEOUT, EnsureOutcome, ProvisionError, Provisioner, WaitPolicy};
pub use rackspace::{RackspaceBackend, RackspaceBackendError};
pub use report::ModuleReport;
pub use service::{Service, ServiceError};
