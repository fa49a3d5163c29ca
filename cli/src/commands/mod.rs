use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::display;

use breakwater_core::{
    BreakOptions, Catalog, Config, Credentials, LegalBreak, Orchestrator, ProcessRunner,
    ResultClient, RunSettings, VulnerabilityBreak,
};
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
pub struct Run {
    #[arg(short, long, help = "Project name reported to the analysis server")]
    project: Option<String>,

    #[arg(short, long, help = "Workspace to scan")]
    workspace: Option<PathBuf>,

    #[arg(
        long = "plugin-path",
        help = "Explicit scanner executable; disables auto-detection, repeatable"
    )]
    plugin_paths: Vec<String>,

    #[arg(short = 'k', long, help = "API token for the analysis server")]
    api_token: Option<String>,

    #[arg(short, long, help = "User name for the analysis server")]
    user: Option<String>,

    #[arg(long, help = "Base url of the analysis server")]
    url: Option<String>,

    #[arg(short, long, help = "Path to a breakwater.yml config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Fail the build when thresholds are exceeded")]
    break_build: bool,

    #[arg(long, help = "Break on vulnerability findings")]
    break_on_vulnerabilities: bool,

    #[arg(
        long,
        value_parser = parse_vulnerability_value,
        help = "Vulnerability granularity: warningsAndCritical or criticalHitsOnly"
    )]
    vulnerabilities_value: Option<VulnerabilityBreak>,

    #[arg(long, help = "Break on legal findings")]
    break_on_legal_issues: bool,

    #[arg(
        long,
        value_parser = parse_legal_value,
        help = "Legal granularity: warningAndViolations or violationsOnly"
    )]
    legal_value: Option<LegalBreak>,

    #[arg(short, long, help = "Output the report in JSON format")]
    json: bool,
}

fn parse_vulnerability_value(value: &str) -> Result<VulnerabilityBreak, String> {
    match value {
        "warningsAndCritical" => Ok(VulnerabilityBreak::WarningsAndCritical),
        "criticalHitsOnly" => Ok(VulnerabilityBreak::CriticalHitsOnly),
        other => Err(format!("unknown vulnerability granularity '{}'", other)),
    }
}

fn parse_legal_value(value: &str) -> Result<LegalBreak, String> {
    match value {
        "warningAndViolations" => Ok(LegalBreak::WarningAndViolations),
        "violationsOnly" => Ok(LegalBreak::ViolationsOnly),
        other => Err(format!("unknown legal granularity '{}'", other)),
    }
}

impl Run {
    pub async fn run(&self) -> anyhow::Result<()> {
        let workspace = self.workspace.clone().unwrap_or_else(|| PathBuf::from("."));
        if !workspace.exists() {
            anyhow::bail!("Workspace does not exist: {}", workspace.display());
        }

        let config = match &self.config {
            Some(path) => Some(Config::load(path)?),
            None => Config::discover(&workspace)?,
        };
        let config = config.unwrap_or_default();

        let settings = self.settings(workspace, config)?;
        let catalog = Catalog::new();
        let runner = ProcessRunner;
        let client = ResultClient::new(settings.credentials.clone());

        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });

        let orchestrator = Orchestrator::new(&catalog, &runner, client, settings);
        let report = orchestrator.run(&cancel).await;

        if self.json {
            println!("{}", display::print_json(&report)?);
        } else {
            display::print_report(&report);
        }

        if !report.passed {
            anyhow::bail!("analysis thresholds exceeded, breaking the build");
        }
        Ok(())
    }

    /// Merge config file values with command-line overrides.
    fn settings(&self, workspace: PathBuf, config: Config) -> anyhow::Result<RunSettings> {
        let project = self
            .project
            .clone()
            .or(config.project)
            .ok_or_else(|| anyhow::anyhow!("a project name is required (--project)"))?;

        let file_credentials = config.credentials.unwrap_or_default();
        let credentials = Credentials::new(
            self.api_token.as_deref().unwrap_or(&file_credentials.api_token),
            self.user.as_deref().unwrap_or(&file_credentials.user_name),
            self.url.as_deref().unwrap_or(&file_credentials.base_url),
        );
        if credentials.api_token.is_empty() {
            anyhow::bail!("an API token is required (--api-token)");
        }

        let paths = if self.plugin_paths.is_empty() {
            config.plugin_paths
        } else {
            self.plugin_paths.clone()
        };

        let mut break_options = config.break_options;
        if self.break_build {
            break_options.allow_break_build = true;
        }
        if self.break_on_vulnerabilities {
            break_options.break_on_vulnerabilities = true;
        }
        if let Some(value) = self.vulnerabilities_value {
            break_options.break_on_vulnerabilities_value = Some(value);
        }
        if self.break_on_legal_issues {
            break_options.break_on_legal_issues = true;
        }
        if let Some(value) = self.legal_value {
            break_options.break_on_legal_issues_value = Some(value);
        }

        Ok(RunSettings {
            workspace,
            project,
            paths,
            credentials,
            break_options,
            env: HashMap::new(),
        })
    }
}

#[derive(Parser)]
pub struct Plugins;

impl Plugins {
    pub fn run(&self) {
        let catalog = Catalog::new();
        println!("Known scanner plugins:");
        for plugin in catalog.plugins() {
            let min_version = plugin.min_version.as_deref().unwrap_or("any");
            let marker = plugin.marker.as_deref().unwrap_or("-");
            println!(
                "  - {} (>= {}), detected by {}",
                plugin.name, min_version, marker
            );
        }
    }
}
