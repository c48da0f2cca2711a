//! # Check payload types.
//!
//! [`Finding`] is a single named, severity-tagged, optionally-described
//! result item; [`CheckResult`] is the sequence of findings one check call
//! produces.
//!
//! ## Rules
//! - The orchestrator never inspects or validates these fields — pure
//!   pass-through. A configured result list comes back verbatim when the
//!   timer wins; cancellation yields an empty list.
//! - The types serialize with `serde` because they cross the host boundary;
//!   optional fields are omitted from the wire form when absent.

use serde::{Deserialize, Serialize};

/// Outcome status of one finding (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    /// The inspected property holds.
    Success,
    /// The inspected property is violated.
    Failed,
    /// The inspected property holds with reservations.
    Warning,
    /// The inspection did not run.
    Skipped,
}

/// Severity of a failed finding (closed set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

/// A single named, severity-tagged finding within a check outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Name of the inspected property.
    pub name: String,

    /// Outcome status.
    pub status: CheckStatus,

    /// Severity, usually set for non-success statuses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    /// Human-readable markdown description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Finding {
    /// Creates a finding with the given name and status.
    pub fn new(name: impl Into<String>, status: CheckStatus) -> Self {
        Self {
            name: name.into(),
            status,
            severity: None,
            description: None,
        }
    }

    /// Attaches a severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Attaches a markdown description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The findings produced by one check call.
///
/// Produced exactly once per invocation; an empty result is the graceful
/// cancellation outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckResult {
    /// Findings in report order.
    pub findings: Vec<Finding>,
}

impl CheckResult {
    /// Creates a result from a list of findings.
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    /// Creates an empty result (the cancellation outcome).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns `true` when the result carries no findings.
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

impl From<Vec<Finding>> for CheckResult {
    fn from(findings: Vec<Finding>) -> Self {
        Self::new(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_omitted_on_the_wire() {
        let finding = Finding::new("image-size", CheckStatus::Success);
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "image-size", "status": "success" })
        );
    }

    #[test]
    fn test_severity_and_description_serialize() {
        let finding = Finding::new("no-root-user", CheckStatus::Failed)
            .with_severity(Severity::Critical)
            .with_description("Container runs as **root**.");
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["severity"], "critical");
        assert_eq!(json["description"], "Container runs as **root**.");
    }
}
