use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BreakwaterError, Result};
use crate::types::{BreakOptions, Credentials};

/// Default config file name looked up at the workspace root.
pub const CONFIG_FILE: &str = "breakwater.yml";

/// Run configuration, usually loaded from `breakwater.yml`. Command-line
/// flags override file values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project: Option<String>,

    pub credentials: Option<Credentials>,

    /// Explicit scanner executables; a non-empty list disables marker
    /// auto-detection.
    pub plugin_paths: Vec<String>,

    pub break_options: BreakOptions,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(BreakwaterError::ConfigNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|e| BreakwaterError::Yaml {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load the workspace's config file if one is present.
    pub fn discover(workspace: &Path) -> Result<Option<Self>> {
        let candidate = workspace.join(CONFIG_FILE);
        if candidate.exists() {
            Ok(Some(Self::load(&candidate)?))
        } else {
            Ok(None)
        }
    }
}
