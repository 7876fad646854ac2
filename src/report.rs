//! JSON report written to stdout after every invocation.

use std::io::{self, Write};

use serde::Serialize;

use crate::backend::InstanceRecord;
use crate::provision::EnsureOutcome;

/// Result of one `ensure` run as seen by the caller.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ModuleReport {
    /// Whether any instance was created or deleted.
    pub changed: bool,
    /// Whether the run failed.
    pub failed: bool,
    /// Failure message; always present when `failed` is set.
    pub msg: Option<String>,
    /// Instances matching the spec after the run.
    pub instances: Vec<InstanceRecord>,
}

impl ModuleReport {
    /// Builds a successful report from an ensure outcome.
    #[must_use]
    pub fn success(outcome: EnsureOutcome) -> Self {
        Self {
            changed: outcome.changed,
            failed: false,
            msg: None,
            instances: outcome.instances,
        }
    }

    /// Builds a failed report carrying `msg`.
    #[must_use]
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            changed: false,
            failed: true,
            msg: Some(msg.into()),
            instances: Vec::new(),
        }
    }

    /// Writes the report as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when serialisation or the write fails.
    pub fn write_to(&self, mut target: impl Write) -> io::Result<()> {
        serde_json::to_writer(&mut target, self)?;
        writeln!(target)
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use rstest::rstest;

    use super::*;
    use crate::backend::InstanceStatus;

    fn render(report: &ModuleReport) -> serde_json::Value {
        let mut buffer = Vec::new();
        report
            .write_to(&mut buffer)
            .unwrap_or_else(|err| panic!("write report: {err}"));
        serde_json::from_slice(&buffer).unwrap_or_else(|err| panic!("parse report: {err}"))
    }

    #[rstest]
    fn success_report_lists_instances() {
        let report = ModuleReport::success(EnsureOutcome {
            changed: true,
            instances: vec![InstanceRecord {
                id: String::from("a1b2"),
                address: Some(Ipv4Addr::new(203, 0, 113, 7)),
                name: String::from("web-1"),
                status: InstanceStatus::Active,
            }],
        });

        assert_eq!(
            render(&report),
            serde_json::json!({
                "changed": true,
                "failed": false,
                "msg": null,
                "instances": [{
                    "id": "a1b2",
                    "address": "203.0.113.7",
                    "name": "web-1",
                    "status": "ACTIVE"
                }]
            })
        );
    }

    #[rstest]
    fn failure_report_carries_message() {
        let report = ModuleReport::failure("service 'dns' is not supported");

        assert_eq!(
            render(&report),
            serde_json::json!({
                "changed": false,
                "failed": true,
                "msg": "service 'dns' is not supported",
                "instances": []
            })
        );
    }

    #[rstest]
    fn building_instance_reports_null_address() {
        let report = ModuleReport::success(EnsureOutcome {
            changed: true,
            instances: vec![InstanceRecord {
                id: String::from("a1b2"),
                address: None,
                name: String::from("web-1"),
                status: InstanceStatus::Build,
            }],
        });

        let value = render(&report);
        assert_eq!(
            value.pointer("/instances/0/address"),
            Some(&serde_json::Value::Null)
        );
        assert_eq!(
            value.pointer("/instances/0/status"),
            Some(&serde_json::json!("BUILD"))
        );
    }
}
