use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::plugin::ResolvedPlugin;

/// One plugin invocation submitted to the analysis server. The result
/// document arrives later, once the server has finished processing, and may
/// stay absent when polling gives up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub scan_id: String,
    pub project: String,
    pub plugin: ResolvedPlugin,
    pub result: Option<Value>,
}

impl Scan {
    pub fn new(scan_id: String, project: String, plugin: ResolvedPlugin) -> Self {
        Self {
            scan_id,
            project,
            plugin,
            result: None,
        }
    }

    pub fn statistics(&self) -> Option<&Value> {
        self.result.as_ref().and_then(|result| result.get("statistics"))
    }

    fn statistic(&self, field: &str) -> i64 {
        self.statistics()
            .and_then(|statistics| statistics.get(field))
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    fn category_count(&self, category: &str, field: &str) -> i64 {
        self.statistics()
            .and_then(|statistics| statistics.get(category))
            .and_then(|counts| counts.get(field))
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    fn result_str(&self, field: &str) -> Option<&str> {
        self.result
            .as_ref()
            .and_then(|result| result.get(field))
            .and_then(Value::as_str)
    }

    pub fn components(&self) -> i64 {
        self.statistic("components")
    }

    pub fn licenses(&self) -> i64 {
        self.statistic("licenses")
    }

    pub fn vulnerability_violations(&self) -> i64 {
        self.category_count("vulnerability", "violations")
    }

    pub fn vulnerability_warnings(&self) -> i64 {
        self.category_count("vulnerability", "warnings")
    }

    pub fn legal_violations(&self) -> i64 {
        self.category_count("legal", "violations")
    }

    pub fn legal_warnings(&self) -> i64 {
        self.category_count("legal", "warnings")
    }

    pub fn vulnerability_violations_percent(&self) -> f64 {
        ratio(self.vulnerability_violations(), self.components())
    }

    pub fn vulnerability_warnings_percent(&self) -> f64 {
        ratio(self.vulnerability_warnings(), self.components())
    }

    pub fn legal_violations_percent(&self) -> f64 {
        ratio(self.legal_violations(), self.licenses())
    }

    pub fn legal_warnings_percent(&self) -> f64 {
        ratio(self.legal_warnings(), self.licenses())
    }

    pub fn url(&self) -> Option<&str> {
        self.result_str("url")
    }

    pub fn project_name(&self) -> Option<&str> {
        self.result_str("project")
    }

    pub fn module_name(&self) -> Option<&str> {
        self.result_str("module")
    }

    pub fn project_id(&self) -> Option<&str> {
        self.result_str("projectId")
    }

    pub fn module_id(&self) -> Option<&str> {
        self.result_str("moduleId")
    }
}

fn ratio(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::plugin::PluginDescriptor;
    use serde_json::json;

    fn scan_with_result(result: Option<Value>) -> Scan {
        let descriptor = PluginDescriptor {
            name: "bw-composer".to_string(),
            min_version: Some("1.0.1".to_string()),
            marker: Some("composer.json".to_string()),
            command: Some("vendor/bin/bw-composer".to_string()),
            args: "-k {} -u {} --url {} -p {}".to_string(),
        };
        let mut scan = Scan::new(
            "s1".to_string(),
            "demo".to_string(),
            ResolvedPlugin {
                name: descriptor.name.clone(),
                command: "vendor/bin/bw-composer".to_string(),
                installed_version: "1.0.1".to_string(),
                descriptor,
            },
        );
        scan.result = result;
        scan
    }

    #[test]
    fn test_counts_from_result_document() {
        let scan = scan_with_result(Some(json!({
            "url": "https://app.breakwater.io/scans/s1",
            "project": "demo",
            "statistics": {
                "components": 40,
                "licenses": 10,
                "vulnerability": { "violations": 2, "warnings": 3 },
                "legal": { "violations": 0, "warnings": 1 }
            }
        })));

        assert_eq!(scan.vulnerability_violations(), 2);
        assert_eq!(scan.vulnerability_warnings(), 3);
        assert_eq!(scan.legal_violations(), 0);
        assert_eq!(scan.legal_warnings(), 1);
        assert_eq!(scan.components(), 40);
        assert_eq!(scan.vulnerability_violations_percent(), 0.05);
        assert_eq!(scan.legal_warnings_percent(), 0.1);
        assert_eq!(scan.url(), Some("https://app.breakwater.io/scans/s1"));
        assert_eq!(scan.project_name(), Some("demo"));
        assert_eq!(scan.module_id(), None);
    }

    #[test]
    fn test_missing_result_reads_as_zero() {
        let scan = scan_with_result(None);

        assert_eq!(scan.vulnerability_violations(), 0);
        assert_eq!(scan.legal_warnings(), 0);
        assert_eq!(scan.vulnerability_violations_percent(), 0.0);
        assert!(scan.url().is_none());
    }

    #[test]
    fn test_malformed_statistics_read_as_zero() {
        let scan = scan_with_result(Some(json!({ "statistics": "pending" })));

        assert_eq!(scan.vulnerability_violations(), 0);
        assert_eq!(scan.components(), 0);
    }
}
