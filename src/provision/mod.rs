//! Idempotent provisioning of server instances.
//!
//! The provisioner lists the provider's instances, keeps those that exactly
//! match the requested spec, and then creates or deletes so that the
//! requested state holds. After a create it can block until the new
//! instance reaches a terminal status.

mod files;
mod wait;

use std::time::Duration;

use camino::Utf8PathBuf;
use thiserror::Error;
use tracing::info;

use crate::backend::{
    Backend, BackendError, CreateRequest, DesiredState, Instance, InstanceRecord, InstanceSpec,
    InstanceStatus,
};

pub use files::load_injected_files;

const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Default deadline for [`WaitPolicy::UntilActive`].
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(300);

/// Whether to block on a newly created instance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WaitPolicy {
    /// Return as soon as the create call is accepted.
    NoWait,
    /// Poll until the instance reaches `ACTIVE` or `ERROR`, failing once the
    /// timeout elapses.
    UntilActive {
        /// Wall-clock budget for the wait.
        timeout: Duration,
    },
}

impl WaitPolicy {
    /// Builds a policy from the `wait` flag and timeout in seconds.
    #[must_use]
    pub const fn from_flag(wait: bool, timeout_secs: u64) -> Self {
        if wait {
            Self::UntilActive {
                timeout: Duration::from_secs(timeout_secs),
            }
        } else {
            Self::NoWait
        }
    }
}

/// Result of an [`Provisioner::ensure`] call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EnsureOutcome {
    /// Whether any instance was created or deleted.
    pub changed: bool,
    /// Instances matching the spec after the call, in provider order.
    pub instances: Vec<InstanceRecord>,
}

/// Errors surfaced while ensuring the desired state.
#[derive(Debug, Error)]
pub enum ProvisionError<ProviderError>
where
    ProviderError: std::error::Error + 'static,
{
    /// Raised when required input is missing or malformed.
    #[error("invalid request: {0}")]
    Validation(#[from] BackendError),
    /// Raised when a file selected for injection cannot be read.
    #[error("failed to read injected file `{path}`: {message}")]
    Io {
        /// Local path that could not be read.
        path: Utf8PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// Raised when a provider call fails.
    #[error("provider error: {0}")]
    Provider(#[source] ProviderError),
    /// Raised when a waited-on instance reaches the `ERROR` status.
    #[error("provider error: instance {instance_id} entered ERROR state while building")]
    InstanceFailed {
        /// Provider instance identifier.
        instance_id: String,
    },
    /// Raised when a waited-on instance is still transitional at the deadline.
    #[error("timeout waiting for instance {instance_id} to become active after {timeout_secs}s")]
    Timeout {
        /// Provider instance identifier.
        instance_id: String,
        /// Configured wait budget in seconds.
        timeout_secs: u64,
    },
}

/// Drives a [`Backend`] towards the desired state for one spec.
#[derive(Debug)]
pub struct Provisioner<B> {
    backend: B,
    poll_interval: Duration,
}

impl<B> Provisioner<B>
where
    B: Backend,
{
    /// Creates a provisioner polling every five seconds while waiting.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self {
            backend,
            poll_interval: POLL_INTERVAL,
        }
    }

    /// Overrides the status polling interval.
    ///
    /// This is primarily used by tests to keep wait scenarios fast.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Makes the provider agree with `state` for instances matching `spec`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] when validation fails, an injected file
    /// cannot be read, a provider call fails, or a wait ends in `ERROR` or
    /// times out. Instances already created or deleted before the failing
    /// step stay that way.
    pub async fn ensure(
        &self,
        spec: &InstanceSpec,
        state: DesiredState,
        wait: WaitPolicy,
    ) -> Result<EnsureOutcome, ProvisionError<B::Error>> {
        if state == DesiredState::Present {
            spec.validate()?;
        }

        let matches = self.matching_instances(spec).await?;
        match state {
            DesiredState::Present => self.ensure_present(spec, matches, wait).await,
            DesiredState::Absent => self.ensure_absent(matches).await,
        }
    }

    async fn matching_instances(
        &self,
        spec: &InstanceSpec,
    ) -> Result<Vec<Instance>, ProvisionError<B::Error>> {
        let listed = self.backend.list().await.map_err(ProvisionError::Provider)?;
        let total = listed.len();
        let matches: Vec<Instance> = listed
            .into_iter()
            .filter(|instance| instance.matches(spec))
            .collect();
        info!(
            name = %spec.name,
            listed = total,
            matched = matches.len(),
            "listed existing instances"
        );
        Ok(matches)
    }

    async fn ensure_present(
        &self,
        spec: &InstanceSpec,
        matches: Vec<Instance>,
        wait: WaitPolicy,
    ) -> Result<EnsureOutcome, ProvisionError<B::Error>> {
        if !matches.is_empty() {
            info!(name = %spec.name, "matching instance already exists");
            return Ok(EnsureOutcome {
                changed: false,
                instances: matches.into_iter().map(Instance::into_record).collect(),
            });
        }

        let files = load_injected_files(&spec.files)?;
        let request = CreateRequest::from_spec(spec, files);
        let created = self
            .backend
            .create(&request)
            .await
            .map_err(ProvisionError::Provider)?;
        info!(instance_id = %created.id, name = %created.name, "created instance");

        let instance = match wait {
            WaitPolicy::NoWait => created,
            WaitPolicy::UntilActive { timeout } => self.wait_for_active(&created.id, timeout).await?,
        };

        Ok(EnsureOutcome {
            changed: true,
            instances: vec![instance.into_record()],
        })
    }

    async fn ensure_absent(
        &self,
        matches: Vec<Instance>,
    ) -> Result<EnsureOutcome, ProvisionError<B::Error>> {
        let mut instances = Vec::with_capacity(matches.len());
        for instance in matches {
            self.backend
                .delete(&instance.id)
                .await
                .map_err(ProvisionError::Provider)?;
            info!(instance_id = %instance.id, "deleted instance");
            let mut record = instance.into_record();
            record.status = InstanceStatus::Deleting;
            instances.push(record);
        }

        Ok(EnsureOutcome {
            changed: !instances.is_empty(),
            instances,
        })
    }
}
