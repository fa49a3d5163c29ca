use std::collections::HashMap;

use crate::error::{BreakwaterError, Result};
use crate::types::{BreakOptions, Scan};

/// Walks aggregated results against the configured thresholds.
pub struct BreakPolicyEvaluator<'a> {
    options: &'a BreakOptions,
}

impl<'a> BreakPolicyEvaluator<'a> {
    pub fn new(options: &'a BreakOptions) -> Self {
        Self { options }
    }

    /// Decide whether the collected results break the build. Returns an
    /// error at the first scan that exceeds a threshold; never raises while
    /// the master switch is off. Scans without a result are skipped.
    pub fn evaluate(&self, scans: &HashMap<String, Scan>) -> Result<()> {
        if !self.options.allow_break_build {
            return Ok(());
        }

        for scan in scans.values() {
            if scan.result.is_none() {
                continue;
            }

            if self.options.break_on_vulnerabilities {
                let violations = scan.vulnerability_violations();
                let warnings = scan.vulnerability_warnings();
                if self.options.vulnerabilities_warnings_and_critical()
                    && (violations > 0 || warnings > 0)
                {
                    return Err(vulnerability_error(violations, warnings));
                }
                if self.options.vulnerabilities_critical_hits_only() && violations > 0 {
                    return Err(vulnerability_error(violations, warnings));
                }
            }

            if self.options.break_on_legal_issues {
                let violations = scan.legal_violations();
                let warnings = scan.legal_warnings();
                if self.options.legal_warning_and_violations() && (violations > 0 || warnings > 0) {
                    return Err(legal_error(violations, warnings));
                }
                if self.options.legal_violations_only() && violations > 0 {
                    return Err(legal_error(violations, warnings));
                }
            }

            // The viability category exists in the options schema but is
            // not evaluated.
        }
        Ok(())
    }
}

fn vulnerability_error(violations: i64, warnings: i64) -> BreakwaterError {
    BreakwaterError::PolicyViolation {
        message: format!(
            "vulnerabilities found: {} violations, {} warnings",
            violations, warnings
        ),
    }
}

fn legal_error(violations: i64, warnings: i64) -> BreakwaterError {
    BreakwaterError::PolicyViolation {
        message: format!(
            "legal issues found: {} violations, {} warnings",
            violations, warnings
        ),
    }
}
