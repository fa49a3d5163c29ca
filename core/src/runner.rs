use std::collections::HashMap;
use std::path::PathBuf;

use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::catalog::Catalog;
use crate::command::CommandRunner;
use crate::error::{BreakwaterError, Result};
use crate::types::{Credentials, ResolvedPlugin, Scan};

/// Scan id patterns recognized in scanner output, tried in order. The
/// subprocess protocol is an external contract; scraping stays regex-based.
const SCAN_ID_PATTERNS: [&str; 2] = [r#"\{"scanId":"([^"]*)"\}"#, r"scanId => ([^ \n]*)"];

/// Invokes each resolved plugin and records one scan per reported scan id.
pub struct ScanRunner<'a> {
    catalog: &'a Catalog,
    runner: &'a dyn CommandRunner,
    workspace: PathBuf,
    credentials: &'a Credentials,
    project: String,
    patterns: Vec<Regex>,
}

impl<'a> ScanRunner<'a> {
    pub fn new(
        catalog: &'a Catalog,
        runner: &'a dyn CommandRunner,
        workspace: PathBuf,
        credentials: &'a Credentials,
        project: String,
    ) -> Self {
        let patterns = SCAN_ID_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern).expect("scan id pattern is valid"))
            .collect();
        Self {
            catalog,
            runner,
            workspace,
            credentials,
            project,
            patterns,
        }
    }

    /// Run every plugin and collect the reported scans. A plugin whose
    /// output yields no scan id fails the whole run.
    pub async fn run_plugins(
        &self,
        plugins: Vec<ResolvedPlugin>,
        env: &HashMap<String, String>,
        cancel: &CancellationToken,
    ) -> Result<HashMap<String, Scan>> {
        let mut scans = HashMap::new();
        for plugin in plugins {
            let mut args = render_args(
                &plugin.descriptor.args,
                &[
                    self.credentials.api_token.as_str(),
                    self.credentials.user_name.as_str(),
                    self.credentials.url(),
                    self.project.as_str(),
                ],
            );
            args.extend(self.catalog.extra_args(&plugin, &self.workspace));

            info!(command = %plugin.command, plugin = %plugin.name, "running scanner");
            let output = self
                .runner
                .run(&plugin.command, &args, &self.workspace, env, cancel)
                .await?;

            let scan_id = self
                .scan_id(&output)
                .ok_or_else(|| BreakwaterError::ScanIdMissing {
                    command: plugin.command.clone(),
                })?;
            info!(scan_id = %scan_id, "scan submitted");
            // server-issued ids are expected unique; a duplicate overwrites
            scans.insert(
                scan_id.clone(),
                Scan::new(scan_id, self.project.clone(), plugin),
            );
        }
        Ok(scans)
    }

    /// First matching pattern wins.
    fn scan_id(&self, output: &str) -> Option<String> {
        for pattern in &self.patterns {
            if let Some(captures) = pattern.captures(output) {
                return Some(captures[1].to_string());
            }
        }
        None
    }
}

/// Fill the `{}` slots of an argument template in order, then split into
/// argv tokens.
fn render_args(template: &str, values: &[&str]) -> Vec<String> {
    let mut pieces = template.split("{}");
    let mut rendered = String::from(pieces.next().unwrap_or(""));
    let mut values = values.iter();
    for piece in pieces {
        if let Some(value) = values.next() {
            rendered.push_str(value);
        }
        rendered.push_str(piece);
    }
    rendered.split_whitespace().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::testing::ScriptedRunner;
    use std::fs;
    use tempfile::TempDir;

    fn resolved(catalog: &Catalog, name: &str) -> ResolvedPlugin {
        let descriptor = catalog.find(name).unwrap().clone();
        ResolvedPlugin {
            name: descriptor.name.clone(),
            command: descriptor.command.clone().unwrap(),
            installed_version: "1.0.1".to_string(),
            descriptor,
        }
    }

    fn runner_under_test<'a>(
        catalog: &'a Catalog,
        command_runner: &'a ScriptedRunner,
        workspace: PathBuf,
        credentials: &'a Credentials,
    ) -> ScanRunner<'a> {
        ScanRunner::new(
            catalog,
            command_runner,
            workspace,
            credentials,
            "demo".to_string(),
        )
    }

    #[test]
    fn test_render_args_substitutes_in_order() {
        let args = render_args("-k {} -u {} --url {} -p {}", &["key", "user", "url", "proj"]);

        assert_eq!(args, vec!["-k", "key", "-u", "user", "--url", "url", "-p", "proj"]);
    }

    #[tokio::test]
    async fn test_json_scan_id_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::new();
        let credentials = Credentials::new("key", "user", "https://server");
        let command_runner = ScriptedRunner::new()
            .output("vendor/bin/bw-composer", r#"submitting... {"scanId":"abc123"}"#);
        let runner = runner_under_test(
            &catalog,
            &command_runner,
            temp_dir.path().to_path_buf(),
            &credentials,
        );

        let scans = runner
            .run_plugins(
                vec![resolved(&catalog, "bw-composer")],
                &HashMap::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(scans.contains_key("abc123"));
        assert_eq!(scans["abc123"].project, "demo");
    }

    #[tokio::test]
    async fn test_line_scan_id_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::new();
        let credentials = Credentials::new("key", "user", "https://server");
        let command_runner =
            ScriptedRunner::new().output("vendor/bin/bw-composer", "scanId => xyz789\n");
        let runner = runner_under_test(
            &catalog,
            &command_runner,
            temp_dir.path().to_path_buf(),
            &credentials,
        );

        let scans = runner
            .run_plugins(
                vec![resolved(&catalog, "bw-composer")],
                &HashMap::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(scans.contains_key("xyz789"));
    }

    #[tokio::test]
    async fn test_output_without_scan_id_fails_the_run() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::new();
        let credentials = Credentials::new("key", "user", "https://server");
        let command_runner = ScriptedRunner::new().output("vendor/bin/bw-composer", "done");
        let runner = runner_under_test(
            &catalog,
            &command_runner,
            temp_dir.path().to_path_buf(),
            &credentials,
        );

        let error = runner
            .run_plugins(
                vec![resolved(&catalog, "bw-composer")],
                &HashMap::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert!(matches!(error, BreakwaterError::ScanIdMissing { .. }));
    }

    #[tokio::test]
    async fn test_empty_output_fails_the_run() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::new();
        let credentials = Credentials::new("key", "user", "https://server");
        let command_runner = ScriptedRunner::new().output("vendor/bin/bw-composer", "");
        let runner = runner_under_test(
            &catalog,
            &command_runner,
            temp_dir.path().to_path_buf(),
            &credentials,
        );

        let result = runner
            .run_plugins(
                vec![resolved(&catalog, "bw-composer")],
                &HashMap::new(),
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(BreakwaterError::ScanIdMissing { .. })
        ));
    }

    #[tokio::test]
    async fn test_credentials_rendered_into_arguments() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::new();
        let credentials = Credentials::new("key-9", "user-9", "https://server-9");
        let command_runner = ScriptedRunner::new()
            .output("vendor/bin/bw-composer", r#"{"scanId":"s1"}"#);
        let runner = runner_under_test(
            &catalog,
            &command_runner,
            temp_dir.path().to_path_buf(),
            &credentials,
        );

        runner
            .run_plugins(
                vec![resolved(&catalog, "bw-composer")],
                &HashMap::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let calls = command_runner.calls();
        assert_eq!(
            calls[0].1,
            vec!["-k", "key-9", "-u", "user-9", "--url", "https://server-9", "-p", "demo"]
        );
    }

    #[tokio::test]
    async fn test_meteor_flag_appended_for_node_client() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("node_modules/.bin")).unwrap();
        fs::create_dir(temp_dir.path().join(".meteor")).unwrap();
        let catalog = Catalog::new();
        let credentials = Credentials::new("key", "user", "https://server");
        let command_runner = ScriptedRunner::new()
            .output("node_modules/.bin/bw-node-client", r#"{"scanId":"s2"}"#);
        let runner = runner_under_test(
            &catalog,
            &command_runner,
            temp_dir.path().to_path_buf(),
            &credentials,
        );

        runner
            .run_plugins(
                vec![resolved(&catalog, "bw-node-client")],
                &HashMap::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        let calls = command_runner.calls();
        assert_eq!(calls[0].1.last().map(String::as_str), Some("--meteor"));
    }

    #[tokio::test]
    async fn test_duplicate_scan_id_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = Catalog::new();
        let credentials = Credentials::new("key", "user", "https://server");
        let command_runner = ScriptedRunner::new()
            .output("vendor/bin/bw-composer", r#"{"scanId":"same"}"#)
            .output("bw-bundler", r#"{"scanId":"same"}"#);
        let runner = runner_under_test(
            &catalog,
            &command_runner,
            temp_dir.path().to_path_buf(),
            &credentials,
        );

        let scans = runner
            .run_plugins(
                vec![
                    resolved(&catalog, "bw-composer"),
                    resolved(&catalog, "bw-bundler"),
                ],
                &HashMap::new(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(scans.len(), 1);
        assert_eq!(scans["same"].plugin.name, "bw-bundler");
    }
}
