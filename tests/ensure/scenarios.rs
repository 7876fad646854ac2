//! BDD scenarios for the ensure workflow.

use rstest_bdd_macros::scenario;

use super::test_helpers::{EnsureContext, ensure_context};

#[scenario(
    path = "tests/features/ensure.feature",
    name = "Create an instance when none matches"
)]
fn scenario_create_when_missing(ensure_context: EnsureContext) {
    let _ = ensure_context;
}

#[scenario(
    path = "tests/features/ensure.feature",
    name = "Leave an existing match untouched"
)]
fn scenario_existing_match(ensure_context: EnsureContext) {
    let _ = ensure_context;
}

#[scenario(
    path = "tests/features/ensure.feature",
    name = "Delete every matching instance"
)]
fn scenario_delete_matches(ensure_context: EnsureContext) {
    let _ = ensure_context;
}

#[scenario(path = "tests/features/ensure.feature", name = "Nothing to delete")]
fn scenario_nothing_to_delete(ensure_context: EnsureContext) {
    let _ = ensure_context;
}

#[scenario(
    path = "tests/features/ensure.feature",
    name = "Wait for a new instance to become active"
)]
fn scenario_wait_until_active(ensure_context: EnsureContext) {
    let _ = ensure_context;
}

#[scenario(
    path = "tests/features/ensure.feature",
    name = "Give up when the instance stays in build"
)]
fn scenario_wait_timeout(ensure_context: EnsureContext) {
    let _ = ensure_context;
}

#[scenario(
    path = "tests/features/ensure.feature",
    name = "Fail when the new instance errors"
)]
fn scenario_wait_error(ensure_context: EnsureContext) {
    let _ = ensure_context;
}
