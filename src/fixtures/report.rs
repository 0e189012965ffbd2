//! Scenario outcome reporting

use std::fmt;

use serde::Serialize;

/// Outcome of one fixture scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

impl ScenarioReport {
    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            detail: detail.into(),
        }
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.passed { "PASS" } else { "FAIL" };
        write!(f, "{} {}: {}", status, self.name, self.detail)
    }
}

/// True if every report passed
pub fn all_passed(reports: &[ScenarioReport]) -> bool {
    reports.iter().all(|report| report.passed)
}
