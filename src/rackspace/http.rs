//! Response handling shared by the identity and compute calls.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::Deserialize;

use super::RackspaceBackendError;

#[derive(Deserialize)]
struct Fault {
    message: String,
}

/// Reads the body of `response`, turning non-success statuses into
/// provider errors.
pub(super) async fn read_body(response: reqwest::Response) -> Result<String, RackspaceBackendError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    Err(RackspaceBackendError::Provider {
        message: fault_message(status, &body),
    })
}

/// Extracts the message from a fault envelope such as
/// `{"itemNotFound": {"message": "...", "code": 404}}`, falling back to the
/// raw body.
pub(super) fn fault_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<BTreeMap<String, Fault>>(body)
        .ok()
        .and_then(|faults| faults.into_values().next())
        .map(|fault| fault.message)
        .unwrap_or_else(|| body.trim().to_owned());

    if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("{detail} (HTTP {})", status.as_u16())
    }
}
