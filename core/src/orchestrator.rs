use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::aggregator::ResultAggregator;
use crate::catalog::Catalog;
use crate::client::ResultClient;
use crate::command::CommandRunner;
use crate::error::{BreakwaterError, Result};
use crate::policy::BreakPolicyEvaluator;
use crate::report::RunReport;
use crate::resolver::PluginResolver;
use crate::runner::ScanRunner;
use crate::types::{BreakOptions, Credentials, Scan};

/// Everything one orchestration run needs from the invoking build system.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub workspace: PathBuf,
    pub project: String,
    /// Explicit scanner executables; non-empty disables auto-detection.
    pub paths: Vec<String>,
    pub credentials: Credentials,
    pub break_options: BreakOptions,
    /// Extra environment passed to scanner processes.
    pub env: HashMap<String, String>,
}

/// Sequences the pipeline: credential check, plugin resolution, scanner
/// execution, result aggregation, threshold evaluation. The first error
/// aborts later steps; the report is always published with whatever scans
/// were collected, and failure is only signalled while `allow_break_build`
/// is set.
pub struct Orchestrator<'a> {
    catalog: &'a Catalog,
    runner: &'a dyn CommandRunner,
    client: ResultClient,
    settings: RunSettings,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        catalog: &'a Catalog,
        runner: &'a dyn CommandRunner,
        client: ResultClient,
        settings: RunSettings,
    ) -> Self {
        Self {
            catalog,
            runner,
            client,
            settings,
        }
    }

    pub async fn run(&self, cancel: &CancellationToken) -> RunReport {
        let start = Instant::now();
        info!(project = %self.settings.project, "starting analysis run");

        let mut scans = HashMap::new();
        let outcome = self.execute(&mut scans, cancel).await;

        let mut report = RunReport::new(self.settings.project.clone(), scans);
        if let Err(e) = outcome {
            error!(error = %e, "analysis run failed");
            report.errors.push(e.to_string());
            if self.settings.break_options.allow_break_build {
                report.passed = false;
            }
        }
        report.elapsed = start.elapsed().as_millis() as u64;
        info!(passed = report.passed, "analysis run finished");
        report
    }

    async fn execute(
        &self,
        scans: &mut HashMap<String, Scan>,
        cancel: &CancellationToken,
    ) -> Result<()> {
        if !self.client.is_authorized().await {
            return Err(BreakwaterError::Unauthorized);
        }

        let resolver =
            PluginResolver::new(self.catalog, self.runner, self.settings.workspace.clone());
        let plugins = resolver.resolve(&self.settings.paths, cancel).await?;

        let scan_runner = ScanRunner::new(
            self.catalog,
            self.runner,
            self.settings.workspace.clone(),
            &self.settings.credentials,
            self.settings.project.clone(),
        );
        *scans = scan_runner
            .run_plugins(plugins, &self.settings.env, cancel)
            .await?;

        ResultAggregator::new(&self.client)
            .fetch_results(scans, cancel)
            .await?;

        BreakPolicyEvaluator::new(&self.settings.break_options).evaluate(scans)
    }
}
