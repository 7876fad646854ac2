//! Test support utilities shared across unit and integration tests.

use std::collections::{BTreeMap, VecDeque};
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;

use crate::backend::{Backend, BackendFuture, CreateRequest, Instance, InstanceStatus};

/// Builds an [`Instance`] with empty metadata and no address.
#[must_use]
pub fn instance(id: &str, name: &str, flavor: &str, image: &str) -> Instance {
    Instance {
        id: id.to_owned(),
        name: name.to_owned(),
        flavor_id: flavor.to_owned(),
        image_id: image.to_owned(),
        metadata: BTreeMap::new(),
        status: InstanceStatus::Active,
        address: None,
    }
}

/// Errors produced by [`ScriptedBackend`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ScriptedBackendError {
    /// Scripted list failure.
    #[error("list failed: {0}")]
    List(String),
    /// Scripted create failure.
    #[error("create failed: {0}")]
    Create(String),
    /// Scripted get failure.
    #[error("get failed: {0}")]
    Get(String),
    /// Scripted delete failure.
    #[error("delete failed: {0}")]
    Delete(String),
    /// Raised when the requested instance id is unknown.
    #[error("instance {0} not found")]
    NotFound(String),
}

#[derive(Debug, Default)]
struct State {
    instances: Vec<Instance>,
    status_script: VecDeque<InstanceStatus>,
    fail_list: Option<String>,
    fail_create: Option<String>,
    fail_get: Option<String>,
    fail_delete: Option<String>,
    create_requests: Vec<CreateRequest>,
    deleted: Vec<String>,
    list_calls: usize,
    get_calls: usize,
}

/// In-memory [`Backend`] with scripted statuses and failures.
///
/// Created instances start in `BUILD`. Each `get` pops the next scripted
/// status, if any, and applies it to the instance before returning it.
#[derive(Clone, Debug, Default)]
pub struct ScriptedBackend {
    state: Arc<Mutex<State>>,
}

impl ScriptedBackend {
    /// Creates a backend with no instances.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds an existing instance to the listing.
    pub fn push_instance(&self, instance: Instance) {
        self.state().instances.push(instance);
    }

    /// Queues statuses returned by subsequent `get` calls, in order.
    pub fn script_statuses(&self, statuses: impl IntoIterator<Item = InstanceStatus>) {
        self.state().status_script.extend(statuses);
    }

    /// Makes `list` fail with `message`.
    pub fn fail_list(&self, message: &str) {
        self.state().fail_list = Some(message.to_owned());
    }

    /// Makes `create` fail with `message`.
    pub fn fail_create(&self, message: &str) {
        self.state().fail_create = Some(message.to_owned());
    }

    /// Makes `get` fail with `message`.
    pub fn fail_get(&self, message: &str) {
        self.state().fail_get = Some(message.to_owned());
    }

    /// Makes `delete` fail with `message`.
    pub fn fail_delete(&self, message: &str) {
        self.state().fail_delete = Some(message.to_owned());
    }

    /// Returns every create request received so far.
    #[must_use]
    pub fn create_requests(&self) -> Vec<CreateRequest> {
        self.state().create_requests.clone()
    }

    /// Returns the ids passed to `delete`, in call order.
    #[must_use]
    pub fn deleted(&self) -> Vec<String> {
        self.state().deleted.clone()
    }

    /// Returns how many times `list` was called.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    /// Returns how many times `get` was called.
    #[must_use]
    pub fn get_calls(&self) -> usize {
        self.state().get_calls
    }
}

impl Backend for ScriptedBackend {
    type Error = ScriptedBackendError;

    fn list(&self) -> BackendFuture<'_, Vec<Instance>, Self::Error> {
        Box::pin(async move {
            let mut state = self.state();
            state.list_calls += 1;
            if let Some(message) = state.fail_list.clone() {
                return Err(ScriptedBackendError::List(message));
            }
            Ok(state.instances.clone())
        })
    }

    fn create<'a>(&'a self, request: &'a CreateRequest) -> BackendFuture<'a, Instance, Self::Error> {
        Box::pin(async move {
            let mut state = self.state();
            if let Some(message) = state.fail_create.clone() {
                return Err(ScriptedBackendError::Create(message));
            }
            state.create_requests.push(request.clone());
            let instance = Instance {
                id: format!("scripted-{}", state.create_requests.len()),
                name: request.name.clone(),
                flavor_id: request.flavor.clone(),
                image_id: request.image.clone(),
                metadata: request.metadata.clone(),
                status: InstanceStatus::Build,
                address: None,
            };
            state.instances.push(instance.clone());
            Ok(instance)
        })
    }

    fn get<'a>(&'a self, id: &'a str) -> BackendFuture<'a, Instance, Self::Error> {
        Box::pin(async move {
            let mut guard = self.state();
            let state = &mut *guard;
            state.get_calls += 1;
            if let Some(message) = state.fail_get.clone() {
                return Err(ScriptedBackendError::Get(message));
            }
            let next_status = state.status_script.pop_front();
            let instance = state
                .instances
                .iter_mut()
                .find(|instance| instance.id == id)
                .ok_or_else(|| ScriptedBackendError::NotFound(id.to_owned()))?;
            if let Some(status) = next_status {
                if status == InstanceStatus::Active {
                    instance.address = Some(Ipv4Addr::new(192, 0, 2, 10));
                }
                instance.status = status;
            }
            Ok(instance.clone())
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BackendFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let mut state = self.state();
            if let Some(message) = state.fail_delete.clone() {
                return Err(ScriptedBackendError::Delete(message));
            }
            state.deleted.push(id.to_owned());
            state.instances.retain(|instance| instance.id != id);
            Ok(())
        })
    }
}
