//! Status polling for newly created instances.

use std::time::{Duration, Instant};

use tokio::time::sleep;
use tracing::{debug, warn};

use super::{ProvisionError, Provisioner};
use crate::backend::{Backend, Instance, InstanceStatus};

impl<B> Provisioner<B>
where
    B: Backend,
{
    /// Refreshes the instance until it is `ACTIVE`, `ERROR`, or the deadline
    /// passes. The status is checked at least once.
    pub(super) async fn wait_for_active(
        &self,
        instance_id: &str,
        timeout: Duration,
    ) -> Result<Instance, ProvisionError<B::Error>> {
        let deadline = Instant::now().checked_add(timeout);
        loop {
            let instance = self
                .backend
                .get(instance_id)
                .await
                .map_err(ProvisionError::Provider)?;
            debug!(instance_id, status = %instance.status, "polled instance status");

            match instance.status {
                InstanceStatus::Active => return Ok(instance),
                InstanceStatus::Error => {
                    warn!(instance_id, "instance entered ERROR state");
                    return Err(ProvisionError::InstanceFailed {
                        instance_id: instance_id.to_owned(),
                    });
                }
                _ => {}
            }

            if deadline.is_some_and(|limit| Instant::now() >= limit) {
                return Err(ProvisionError::Timeout {
                    instance_id: instance_id.to_owned(),
                    timeout_secs: timeout.as_secs(),
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}
