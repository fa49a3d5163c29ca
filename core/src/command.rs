use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::error::{BreakwaterError, Result};

/// Capability to run an external command and capture its stdout.
///
/// A non-zero exit code and a spawn/IO failure are reported as separate
/// messages; cancellation aborts the wait and kills the child.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        workdir: &Path,
        env: &HashMap<String, String>,
        cancel: &CancellationToken,
    ) -> Result<String>;
}

/// Production runner backed by `tokio::process`.
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        workdir: &Path,
        env: &HashMap<String, String>,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let mut command = Command::new(program);
        command
            .args(args)
            .current_dir(workdir)
            .envs(env)
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|e| BreakwaterError::Execution {
            message: format!("problem with running command '{}': {}", program, e),
        })?;

        let output = tokio::select! {
            _ = cancel.cancelled() => {
                return Err(BreakwaterError::Execution {
                    message: format!("command '{}' was interrupted", program),
                });
            }
            output = child.wait_with_output() => {
                output.map_err(|e| BreakwaterError::Execution {
                    message: format!("problem with running command '{}': {}", program, e),
                })?
            }
        };

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(BreakwaterError::Execution {
                message: format!("command '{}' returned {}", program, code),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
