use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BreakwaterError {
    #[error("API token was rejected by the analysis server")]
    Unauthorized,

    #[error("Plugin resolution failed:\n{message}")]
    Resolution { message: String },

    #[error("Command execution failed: {message}")]
    Execution { message: String },

    #[error("Could not get scan id from the output of '{command}'")]
    ScanIdMissing { command: String },

    #[error("No result for scan(s):\n{}", .scan_ids.iter().map(|id| format!("  - {}", id)).collect::<Vec<_>>().join("\n"))]
    ResultFetch { scan_ids: Vec<String> },

    #[error("Break threshold exceeded: {message}")]
    PolicyViolation { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid YAML in config file '{file}': {message}")]
    Yaml { file: PathBuf, message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BreakwaterError>;
