use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Scan;

/// Immutable snapshot of one orchestration run, published for display even
/// when the run failed partway through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub timestamp: DateTime<Utc>,

    pub project: String,

    pub elapsed: u64,

    pub passed: bool,

    pub errors: Vec<String>,

    pub scans: HashMap<String, Scan>,
}

impl RunReport {
    pub fn new(project: String, scans: HashMap<String, Scan>) -> Self {
        Self {
            timestamp: Utc::now(),
            project,
            elapsed: 0,
            passed: true,
            errors: Vec::new(),
            scans,
        }
    }

    pub fn has_scans(&self) -> bool {
        !self.scans.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Per-project run history, oldest first. Dashboards ask for the most
/// recent run that actually collected scan data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildHistory {
    reports: Vec<RunReport>,
}

impl BuildHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self, report: RunReport) {
        self.reports.push(report);
    }

    pub fn reports(&self) -> &[RunReport] {
        &self.reports
    }

    /// Walk the history backward until a run with scan data is found.
    pub fn latest_with_scans(&self) -> Option<&RunReport> {
        self.reports.iter().rev().find(|report| report.has_scans())
    }
}
