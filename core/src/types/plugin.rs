use serde::{Deserialize, Serialize};

/// Catalog entry describing one known scanner client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    pub name: String,
    /// Minimum installed version, compared as a plain string. `None` means
    /// no requirement is enforced.
    pub min_version: Option<String>,
    /// Marker file whose presence at the workspace root triggers
    /// auto-detection. Entries without a marker are never auto-detected.
    pub marker: Option<String>,
    /// Fixed command path, relative to the workspace.
    pub command: Option<String>,
    /// Argument template; `{}` slots are filled with api key, user name,
    /// base url and project name, in that order.
    pub args: String,
}

/// A descriptor bound to the executable that will actually run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPlugin {
    /// Name reported by the executable, or the catalog name when detected
    /// via a marker file.
    pub name: String,
    /// Command to invoke, relative to the workspace or absolute.
    pub command: String,
    /// Version string reported by `<command> --version`.
    pub installed_version: String,
    pub descriptor: PluginDescriptor,
}
