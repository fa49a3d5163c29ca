use serde::{Deserialize, Serialize};

/// Granularity of the vulnerability threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VulnerabilityBreak {
    #[serde(rename = "warningsAndCritical")]
    WarningsAndCritical,
    #[serde(rename = "criticalHitsOnly")]
    CriticalHitsOnly,
}

/// Granularity of the legal threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LegalBreak {
    #[serde(rename = "warningAndViolations")]
    WarningAndViolations,
    #[serde(rename = "violationsOnly")]
    ViolationsOnly,
}

/// Thresholds that decide whether analysis findings fail the build.
///
/// An absent granularity evaluates as the permissive variant of its
/// category. The viability fields are part of the server's options schema
/// and round-trip through configuration, but nothing evaluates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakOptions {
    pub allow_break_build: bool,
    pub break_on_vulnerabilities: bool,
    pub break_on_vulnerabilities_value: Option<VulnerabilityBreak>,
    pub break_on_legal_issues: bool,
    pub break_on_legal_issues_value: Option<LegalBreak>,
    pub break_on_viability_issues: bool,
    pub break_on_viability_issues_value: Option<String>,
}

impl BreakOptions {
    pub fn vulnerabilities_warnings_and_critical(&self) -> bool {
        matches!(
            self.break_on_vulnerabilities_value,
            None | Some(VulnerabilityBreak::WarningsAndCritical)
        )
    }

    pub fn vulnerabilities_critical_hits_only(&self) -> bool {
        matches!(
            self.break_on_vulnerabilities_value,
            Some(VulnerabilityBreak::CriticalHitsOnly)
        )
    }

    pub fn legal_warning_and_violations(&self) -> bool {
        matches!(
            self.break_on_legal_issues_value,
            None | Some(LegalBreak::WarningAndViolations)
        )
    }

    pub fn legal_violations_only(&self) -> bool {
        matches!(
            self.break_on_legal_issues_value,
            Some(LegalBreak::ViolationsOnly)
        )
    }
}
