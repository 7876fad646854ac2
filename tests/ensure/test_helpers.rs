//! Shared fixtures for ensure BDD scenarios.

use hmara::test_support::ScriptedBackend;
use hmara::{EnsureOutcome, InstanceSpec, WaitPolicy};
use rstest::fixture;

#[derive(Clone, Debug)]
pub enum EnsureResult {
    Success(EnsureOutcome),
    Failure(String),
}

#[derive(Clone, Debug)]
pub struct EnsureContext {
    pub backend: ScriptedBackend,
    pub spec: InstanceSpec,
    pub wait: WaitPolicy,
    pub outcome: Option<EnsureResult>,
}

impl EnsureContext {
    pub fn success(&self) -> Result<&EnsureOutcome, String> {
        match self.outcome.as_ref() {
            Some(EnsureResult::Success(outcome)) => Ok(outcome),
            Some(EnsureResult::Failure(message)) => {
                Err(format!("expected success, got failure: {message}"))
            }
            None => Err(String::from("missing outcome")),
        }
    }
}

#[fixture]
pub fn ensure_context() -> EnsureContext {
    EnsureContext {
        backend: ScriptedBackend::new(),
        spec: InstanceSpec::default(),
        wait: WaitPolicy::NoWait,
        outcome: None,
    }
}
