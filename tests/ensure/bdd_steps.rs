//! BDD step definitions for the ensure workflow.

use std::time::Duration;

use hmara::test_support::instance;
use hmara::{DesiredState, InstanceSpec, InstanceStatus, Provisioner, WaitPolicy};
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{EnsureContext, EnsureResult};
use crate::test_constants::{DEFAULT_FLAVOR, DEFAULT_IMAGE};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("a spec for an instance named \"{name}\"")]
fn spec_named(mut ensure_context: EnsureContext, name: String) -> EnsureContext {
    ensure_context.spec = InstanceSpec::builder()
        .name(name)
        .flavor(DEFAULT_FLAVOR)
        .image(DEFAULT_IMAGE)
        .metadata_entry("role", "web")
        .build();
    ensure_context
}

#[given("a matching instance \"{id}\" exists")]
fn matching_instance_exists(ensure_context: EnsureContext, id: String) -> EnsureContext {
    let spec = &ensure_context.spec;
    let mut existing = instance(&id, &spec.name, &spec.flavor, &spec.image);
    existing.metadata = spec.metadata.clone();
    ensure_context.backend.push_instance(existing);
    ensure_context
}

#[given("a non-matching instance \"{id}\" exists")]
fn non_matching_instance_exists(ensure_context: EnsureContext, id: String) -> EnsureContext {
    let spec = &ensure_context.spec;
    let mut existing = instance(&id, &spec.name, "performance2-120", &spec.image);
    existing.metadata = spec.metadata.clone();
    ensure_context.backend.push_instance(existing);
    ensure_context
}

#[given("waiting is enabled with a timeout of \"{seconds}\" seconds")]
fn waiting_enabled(mut ensure_context: EnsureContext, seconds: u64) -> EnsureContext {
    ensure_context.wait = WaitPolicy::from_flag(true, seconds);
    ensure_context
}

#[given("the instance becomes active after \"{polls}\" polls")]
fn becomes_active_after(ensure_context: EnsureContext, polls: usize) -> EnsureContext {
    let building = std::iter::repeat_n(InstanceStatus::Build, polls);
    ensure_context
        .backend
        .script_statuses(building.chain(std::iter::once(InstanceStatus::Active)));
    ensure_context
}

#[given("the instance enters the error state")]
fn enters_error_state(ensure_context: EnsureContext) -> EnsureContext {
    ensure_context
        .backend
        .script_statuses([InstanceStatus::Build, InstanceStatus::Error]);
    ensure_context
}

#[when("I ensure the instance is \"{state}\"")]
fn ensure_state(mut ensure_context: EnsureContext, state: String) -> Result<EnsureContext, StepError> {
    let desired: DesiredState = state
        .parse()
        .map_err(|err| StepError::Assertion(format!("unknown state {state}: {err}")))?;
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let provisioner = Provisioner::new(ensure_context.backend.clone())
        .with_poll_interval(Duration::from_millis(1));
    let spec = ensure_context.spec.clone();
    let wait = ensure_context.wait;

    let result = runtime.block_on(async move { provisioner.ensure(&spec, desired, wait).await });
    ensure_context.outcome = Some(match result {
        Ok(outcome) => EnsureResult::Success(outcome),
        Err(err) => EnsureResult::Failure(err.to_string()),
    });
    Ok(ensure_context)
}

#[then("the result is changed")]
fn result_changed(ensure_context: &EnsureContext) -> Result<(), StepError> {
    let outcome = ensure_context.success().map_err(StepError::Assertion)?;
    if outcome.changed {
        Ok(())
    } else {
        Err(StepError::Assertion(String::from("expected changed=true")))
    }
}

#[then("the result is unchanged")]
fn result_unchanged(ensure_context: &EnsureContext) -> Result<(), StepError> {
    let outcome = ensure_context.success().map_err(StepError::Assertion)?;
    if outcome.changed {
        Err(StepError::Assertion(String::from("expected changed=false")))
    } else {
        Ok(())
    }
}

#[then("\"{count}\" instance was created")]
fn instances_created(ensure_context: &EnsureContext, count: usize) -> Result<(), StepError> {
    let created = ensure_context.backend.create_requests().len();
    if created == count {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} create calls, got {created}"
        )))
    }
}

#[then("instances \"{first}\" and \"{second}\" were deleted")]
fn instances_deleted(
    ensure_context: &EnsureContext,
    first: String,
    second: String,
) -> Result<(), StepError> {
    let deleted = ensure_context.backend.deleted();
    if deleted == [first.clone(), second.clone()] {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {first} then {second} to be deleted, got {deleted:?}"
        )))
    }
}

#[then("every reported status is \"{status}\"")]
fn every_reported_status(ensure_context: &EnsureContext, status: String) -> Result<(), StepError> {
    let outcome = ensure_context.success().map_err(StepError::Assertion)?;
    let statuses: Vec<&str> = outcome
        .instances
        .iter()
        .map(|record| record.status.as_str())
        .collect();
    if statuses.len() == 2 && statuses.iter().all(|reported| *reported == status) {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected two {status} records, got {statuses:?}"
        )))
    }
}

#[then("the reported status is \"{status}\"")]
fn reported_status(ensure_context: &EnsureContext, status: String) -> Result<(), StepError> {
    let outcome = ensure_context.success().map_err(StepError::Assertion)?;
    let record = outcome
        .instances
        .first()
        .ok_or_else(|| StepError::Assertion(String::from("no instance reported")))?;
    if record.status.as_str() == status {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected status {status}, got {}",
            record.status
        )))
    }
}

#[then("the reported instance is \"{id}\"")]
fn reported_instance(ensure_context: &EnsureContext, id: String) -> Result<(), StepError> {
    let outcome = ensure_context.success().map_err(StepError::Assertion)?;
    let ids: Vec<&str> = outcome
        .instances
        .iter()
        .map(|record| record.id.as_str())
        .collect();
    if ids == [id.as_str()] {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected only {id} to be reported, got {ids:?}"
        )))
    }
}

#[then("no instances are reported")]
fn no_instances(ensure_context: &EnsureContext) -> Result<(), StepError> {
    let outcome = ensure_context.success().map_err(StepError::Assertion)?;
    if outcome.instances.is_empty() {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected no instances, got {:?}",
            outcome.instances
        )))
    }
}

#[then("the ensure fails mentioning \"{fragment}\"")]
fn ensure_fails(ensure_context: &EnsureContext, fragment: String) -> Result<(), StepError> {
    match ensure_context.outcome.as_ref() {
        Some(EnsureResult::Failure(message)) if message.contains(&fragment) => Ok(()),
        Some(EnsureResult::Failure(message)) => Err(StepError::Assertion(format!(
            "expected failure mentioning {fragment}, got: {message}"
        ))),
        Some(EnsureResult::Success(outcome)) => Err(StepError::Assertion(format!(
            "expected failure, got success: {outcome:?}"
        ))),
        None => Err(StepError::Assertion(String::from("missing outcome"))),
    }
}
