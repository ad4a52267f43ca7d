//! Configuration system for vkmock.
//!
//! Loads config from:
//! 1. Global: ~/.config/vkmock/config.toml (or `$XDG_CONFIG_HOME/vkmock`)
//! 2. Per-project: .vkmock/config.toml
//! 3. The file passed with `--config`
//!
//! Later layers override scalar settings and whether a command is
//! declare-only or has a body; lists and body maps accumulate.
//!
//! Example config.toml:
//! ```toml
//! [generator]
//! namespace = "mockdrv"
//!
//! [extensions]
//! deny = ["VK_KHR_video_queue"]
//!
//! [overrides]
//! declare_only = ["vkGetPhysicalDeviceVideoCapabilitiesKHR"]
//!
//! [overrides.bodies]
//! vkQueueWaitIdle = "    return VK_SUCCESS;"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use vkmock_codegen::GenerateOptions;

/// Naming of the generated code.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// C++ namespace wrapping the generated code.
    pub namespace: Option<String>,
    pub header_name: Option<String>,
    pub source_name: Option<String>,
}

/// Extension advertisement.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Extensions withheld from the tables, on top of the built-in deny-list.
    pub deny: Vec<String>,
}

/// Additions to the built-in override table.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OverridesConfig {
    /// Commands that get a declaration placeholder instead of a body.
    pub declare_only: Vec<String>,
    /// Literal bodies keyed by exact command name.
    pub bodies: BTreeMap<String, String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct VkmockConfig {
    pub generator: GeneratorConfig,
    pub extensions: ExtensionsConfig,
    pub overrides: OverridesConfig,
}

impl VkmockConfig {
    /// Load configuration for a project.
    ///
    /// Missing global and project files are skipped. A file that exists but
    /// does not parse is an error, as is a missing `explicit` file.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        Self::load_layers(Self::global_config_path().as_deref(), root, explicit)
    }

    fn load_layers(global: Option<&Path>, root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let project = root.join(".vkmock").join("config.toml");
        for path in global.into_iter().chain([project.as_path()]) {
            if let Some(layer) = Self::load_file(path)? {
                tracing::debug!(path = %path.display(), "loaded config layer");
                config = config.merge(layer);
            }
        }

        if let Some(path) = explicit {
            let layer = Self::load_file(path)?
                .with_context(|| format!("config file {} does not exist", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config layer");
            config = config.merge(layer);
        }

        Ok(config)
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("vkmock").join("config.toml"))
    }

    /// Load config from a file path, `None` if there is no such file.
    fn load_file(path: &Path) -> Result<Option<Self>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Some(config))
    }

    /// Merge another config into this one; `other` is the later layer.
    fn merge(self, other: Self) -> Self {
        let mut deny = self.extensions.deny;
        for name in other.extensions.deny {
            if !deny.contains(&name) {
                deny.push(name);
            }
        }

        // A command is either declare-only or has a body; the later layer decides.
        let mut declare_only = self.overrides.declare_only;
        let mut bodies = self.overrides.bodies;
        declare_only.retain(|name| !other.overrides.bodies.contains_key(name));
        for name in other.overrides.declare_only {
            bodies.remove(&name);
            if !declare_only.contains(&name) {
                declare_only.push(name);
            }
        }
        bodies.extend(other.overrides.bodies);

        Self {
            generator: GeneratorConfig {
                namespace: other.generator.namespace.or(self.generator.namespace),
                header_name: other.generator.header_name.or(self.generator.header_name),
                source_name: other.generator.source_name.or(self.generator.source_name),
            },
            extensions: ExtensionsConfig { deny },
            overrides: OverridesConfig {
                declare_only,
                bodies,
            },
        }
    }

    /// Apply the configuration on top of the default generation options.
    pub fn into_options(self) -> GenerateOptions {
        let mut options = GenerateOptions::default();
        let generator = self.generator;
        if let Some(namespace) = generator.namespace {
            options.namespace = namespace;
        }
        if let Some(header) = generator.header_name {
            options.header_name = header;
        }
        if let Some(source) = generator.source_name {
            options.source_name = source;
        }

        options.deny_extensions = self.extensions.deny;

        for name in self.overrides.declare_only {
            options.overrides.declare_only(name);
        }
        for (name, mut body) in self.overrides.bodies {
            if !body.ends_with('\n') {
                body.push('\n');
            }
            options.overrides.set_body(name, body);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;
    use vkmock_codegen::OverrideEntry;

    fn write_config(path: &Path, content: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = std::fs::File::create(path).unwrap();
        writeln!(file, "{}", content).unwrap();
    }

    #[test]
    fn test_no_files_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = VkmockConfig::load_layers(None, dir.path(), None).unwrap();
        assert_eq!(config, VkmockConfig::default());

        let options = config.into_options();
        assert_eq!(options.namespace, "vkmock");
        assert_eq!(options.header_name, "mock_icd.h");
        assert!(options.deny_extensions.is_empty());
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join(".vkmock").join("config.toml"),
            r#"
[generator]
namespace = "mockdrv"

[extensions]
deny = ["VK_KHR_video_queue"]
"#,
        );

        let config = VkmockConfig::load_layers(None, dir.path(), None).unwrap();
        assert_eq!(config.generator.namespace.as_deref(), Some("mockdrv"));
        assert_eq!(config.generator.header_name, None);
        assert_eq!(config.extensions.deny, vec!["VK_KHR_video_queue"]);
    }

    #[test]
    fn test_layers_override_in_order() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global").join("config.toml");
        write_config(
            &global,
            r#"
[generator]
namespace = "from_global"
header_name = "global.h"

[extensions]
deny = ["VK_A"]
"#,
        );
        write_config(
            &dir.path().join(".vkmock").join("config.toml"),
            r#"
[generator]
namespace = "from_project"

[extensions]
deny = ["VK_B", "VK_A"]
"#,
        );
        let explicit = dir.path().join("explicit.toml");
        write_config(
            &explicit,
            r#"
[generator]
source_name = "explicit.cpp"
"#,
        );

        let config =
            VkmockConfig::load_layers(Some(&global), dir.path(), Some(&explicit)).unwrap();
        assert_eq!(config.generator.namespace.as_deref(), Some("from_project"));
        assert_eq!(config.generator.header_name.as_deref(), Some("global.h"));
        assert_eq!(config.generator.source_name.as_deref(), Some("explicit.cpp"));
        assert_eq!(config.extensions.deny, vec!["VK_A", "VK_B"]);
    }

    #[test]
    fn test_later_layer_decides_override_kind() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global").join("config.toml");
        write_config(
            &global,
            r#"
[overrides]
declare_only = ["vkGetWidgetInfo"]

[overrides.bodies]
vkQueueWaitIdle = "    return VK_SUCCESS;"
"#,
        );
        write_config(
            &dir.path().join(".vkmock").join("config.toml"),
            r#"
[overrides]
declare_only = ["vkQueueWaitIdle"]

[overrides.bodies]
vkGetWidgetInfo = "    return VK_SUCCESS;"
"#,
        );

        let options = VkmockConfig::load_layers(Some(&global), dir.path(), None)
            .unwrap()
            .into_options();
        assert_eq!(
            options.overrides.lookup("vkQueueWaitIdle"),
            Some(&OverrideEntry::DeclareOnly)
        );
        assert_eq!(
            options.overrides.lookup("vkGetWidgetInfo"),
            Some(&OverrideEntry::Body("    return VK_SUCCESS;\n".into()))
        );
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = VkmockConfig::load_layers(None, dir.path(), Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join(".vkmock").join("config.toml"),
            "[generator\nnamespace = 1",
        );
        let err = VkmockConfig::load_layers(None, dir.path(), None).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }

    #[test]
    fn test_overrides_reach_the_table() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join(".vkmock").join("config.toml"),
            r#"
[overrides]
declare_only = ["vkGetWidgetInfo"]

[overrides.bodies]
vkQueueWaitIdle = "    return VK_SUCCESS;"
"#,
        );

        let options = VkmockConfig::load_layers(None, dir.path(), None)
            .unwrap()
            .into_options();
        assert_eq!(
            options.overrides.lookup("vkGetWidgetInfo"),
            Some(&OverrideEntry::DeclareOnly)
        );
        assert_eq!(
            options.overrides.lookup("vkQueueWaitIdle"),
            Some(&OverrideEntry::Body("    return VK_SUCCESS;\n".into()))
        );
        // Built-in entries survive.
        assert!(options.overrides.lookup("vkCreateInstance").is_some());
    }
}
