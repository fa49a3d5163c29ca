use std::path::Path;

use crate::types::{PluginDescriptor, ResolvedPlugin};

/// Argument template shared by every known scanner client.
const ARG_TEMPLATE: &str = "-k {} -u {} --url {} -p {}";

/// Extension point for plugin-specific invocation quirks: given the resolved
/// plugin and the workspace, return flags to append to the rendered
/// arguments.
pub type ExtraArgsFn = fn(&ResolvedPlugin, &Path) -> Vec<String>;

/// Immutable table of known scanner clients, built once at startup and
/// passed by reference into resolution and execution.
pub struct Catalog {
    plugins: Vec<PluginDescriptor>,
    fallback: PluginDescriptor,
    hooks: Vec<(String, ExtraArgsFn)>,
}

impl Catalog {
    pub fn new() -> Self {
        let plugins = vec![
            PluginDescriptor {
                name: "bw-composer".to_string(),
                min_version: Some("1.0.1".to_string()),
                marker: Some("composer.json".to_string()),
                command: Some("vendor/bin/bw-composer".to_string()),
                args: ARG_TEMPLATE.to_string(),
            },
            PluginDescriptor {
                name: "bw-bundler".to_string(),
                min_version: Some("1.0.1".to_string()),
                marker: Some("Gemfile".to_string()),
                command: Some("bw-bundler".to_string()),
                args: ARG_TEMPLATE.to_string(),
            },
            PluginDescriptor {
                name: "bw-node-client".to_string(),
                min_version: Some("0.2.0".to_string()),
                marker: Some("package.json".to_string()),
                command: Some("node_modules/.bin/bw-node-client".to_string()),
                args: ARG_TEMPLATE.to_string(),
            },
        ];
        let fallback = PluginDescriptor {
            name: "default".to_string(),
            min_version: None,
            marker: None,
            command: None,
            args: ARG_TEMPLATE.to_string(),
        };

        let mut catalog = Self {
            plugins,
            fallback,
            hooks: Vec::new(),
        };
        catalog.register_hook("bw-node-client", meteor_extra_args);
        catalog
    }

    pub fn register_hook(&mut self, plugin_name: &str, hook: ExtraArgsFn) {
        self.hooks.push((plugin_name.to_string(), hook));
    }

    pub fn plugins(&self) -> &[PluginDescriptor] {
        &self.plugins
    }

    pub fn find(&self, name: &str) -> Option<&PluginDescriptor> {
        self.plugins.iter().find(|plugin| plugin.name == name)
    }

    /// Generic descriptor used for executables that are not in the table.
    pub fn fallback(&self) -> &PluginDescriptor {
        &self.fallback
    }

    /// Flags contributed by hooks registered for this plugin.
    pub fn extra_args(&self, plugin: &ResolvedPlugin, workspace: &Path) -> Vec<String> {
        self.hooks
            .iter()
            .filter(|(name, _)| name == &plugin.name)
            .flat_map(|(_, hook)| hook(plugin, workspace))
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Meteor projects need the node client told about them: the `.meteor`
/// directory sits two levels above the client's bin directory.
fn meteor_extra_args(plugin: &ResolvedPlugin, workspace: &Path) -> Vec<String> {
    let meteor = workspace
        .join(&plugin.command)
        .parent()
        .map(|bin_dir| bin_dir.join("../../.meteor"));
    match meteor {
        Some(path) if path.is_dir() => vec!["--meteor".to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn test_find_known_plugin() {
        let catalog = Catalog::new();

        assert!(catalog.find("bw-composer").is_some());
        assert!(catalog.find("unknown-client").is_none());
        assert!(catalog.fallback().min_version.is_none());
        assert!(catalog.fallback().marker.is_none());
    }

    #[test]
    fn test_only_marker_entries_exist_in_table() {
        let catalog = Catalog::new();

        for plugin in catalog.plugins() {
            assert!(plugin.marker.is_some());
            assert!(plugin.command.is_some());
        }
    }

    #[test]
    fn test_meteor_hook_appends_flag() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("node_modules/.bin")).unwrap();
        fs::create_dir(temp_dir.path().join(".meteor")).unwrap();

        let catalog = Catalog::new();
        let plugin = resolved(&catalog, "bw-node-client");

        assert_eq!(
            catalog.extra_args(&plugin, temp_dir.path()),
            vec!["--meteor".to_string()]
        );
    }

    #[test]
    fn test_meteor_hook_is_silent_without_marker_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("node_modules/.bin")).unwrap();

        let catalog = Catalog::new();
        let plugin = resolved(&catalog, "bw-node-client");

        assert!(catalog.extra_args(&plugin, temp_dir.path()).is_empty());
    }

    #[test]
    fn test_no_hook_for_other_plugins() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".meteor")).unwrap();

        let catalog = Catalog::new();
        let plugin = resolved(&catalog, "bw-composer");

        assert!(catalog.extra_args(&plugin, temp_dir.path()).is_empty());
    }
}
