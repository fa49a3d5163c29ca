use std::collections::HashMap;
use std::path::PathBuf;

use regex::Regex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::catalog::Catalog;
use crate::command::CommandRunner;
use crate::error::{BreakwaterError, Result};
use crate::types::ResolvedPlugin;

/// Scanner clients report themselves as `<name> version <version>`.
const VERSION_PATTERN: &str = r"(\S+) version (\S+)";

/// Determines which scanner clients apply to a workspace, either from
/// explicitly configured executable paths or by probing the catalog's
/// marker files, and enforces the catalog's minimum versions.
pub struct PluginResolver<'a> {
    catalog: &'a Catalog,
    runner: &'a dyn CommandRunner,
    workspace: PathBuf,
    version_re: Regex,
}

impl<'a> PluginResolver<'a> {
    pub fn new(catalog: &'a Catalog, runner: &'a dyn CommandRunner, workspace: PathBuf) -> Self {
        Self {
            catalog,
            runner,
            workspace,
            version_re: Regex::new(VERSION_PATTERN).expect("version pattern is valid"),
        }
    }

    /// Resolve the plugins for this run. Explicit paths disable marker
    /// auto-detection entirely.
    pub async fn resolve(
        &self,
        paths: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<ResolvedPlugin>> {
        let plugins = if paths.is_empty() {
            self.auto_detect(cancel).await?
        } else {
            info!("plugin auto-detection disabled, using configured paths");
            self.from_paths(paths, cancel).await?
        };
        self.check_versions(&plugins)?;
        Ok(plugins)
    }

    async fn from_paths(
        &self,
        paths: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<ResolvedPlugin>> {
        let mut plugins = Vec::new();
        for path in paths {
            let (name, version) = self.probe_version(path, cancel).await?;
            let descriptor = match self.catalog.find(&name) {
                Some(descriptor) => descriptor.clone(),
                None => {
                    info!(plugin = %name, "not a known plugin, using the generic descriptor");
                    self.catalog.fallback().clone()
                }
            };
            plugins.push(ResolvedPlugin {
                name,
                command: path.clone(),
                installed_version: version,
                descriptor,
            });
        }
        Ok(plugins)
    }

    async fn auto_detect(&self, cancel: &CancellationToken) -> Result<Vec<ResolvedPlugin>> {
        info!("detecting plugins");
        let mut plugins = Vec::new();
        for descriptor in self.catalog.plugins() {
            let (Some(marker), Some(command)) = (&descriptor.marker, &descriptor.command) else {
                continue;
            };
            if !self.workspace.join(marker).exists() {
                continue;
            }
            let (_, version) = self.probe_version(command, cancel).await?;
            plugins.push(ResolvedPlugin {
                name: descriptor.name.clone(),
                command: command.clone(),
                installed_version: version,
                descriptor: descriptor.clone(),
            });
        }
        Ok(plugins)
    }

    /// Run `<path> --version` and parse the reported name and version.
    async fn probe_version(
        &self,
        path: &str,
        cancel: &CancellationToken,
    ) -> Result<(String, String)> {
        let output = self
            .runner
            .run(
                path,
                &["--version".to_string()],
                &self.workspace,
                &HashMap::new(),
                cancel,
            )
            .await?;

        let captures =
            self.version_re
                .captures(&output)
                .ok_or_else(|| BreakwaterError::Resolution {
                    message: format!("'{}' did not return a correct name and version", path),
                })?;
        Ok((captures[1].to_string(), captures[2].to_string()))
    }

    /// Installed versions below the catalog minimum abort the run; every
    /// offender is reported in one message.
    fn check_versions(&self, plugins: &[ResolvedPlugin]) -> Result<()> {
        let mut offending = Vec::new();
        for plugin in plugins {
            let Some(min_version) = &plugin.descriptor.min_version else {
                continue;
            };
            if plugin.installed_version.as_str() < min_version.as_str() {
                offending.push(format!(
                    "please upgrade '{}' to version {} or newer (installed: {})",
                    plugin.name, min_version, plugin.installed_version
                ));
            }
        }
        if offending.is_empty() {
            Ok(())
        } else {
            Err(BreakwaterError::Resolution {
                message: offending.join("\n"),
            })
        }
    }
}
