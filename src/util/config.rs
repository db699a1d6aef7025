//! Configuration file support for shimbind.
//!
//! shimbind reads two configuration file locations:
//! - Global: `~/.shimbind/config.toml` - User-wide defaults
//! - Project: `.shimbind/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::emit::RendererKind;

/// Default namespace of generated C# code.
pub const DEFAULT_NAMESPACE: &str = "Shimbind.Generated";

/// Default output directory of `shimbind generate`.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// shimbind configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emission settings
    pub generate: GenerateConfig,

    /// Resolution settings
    pub resolve: ResolveConfig,
}

/// Emission-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    /// Renderer to use (csharp, plan)
    pub renderer: Option<String>,

    /// Namespace of generated code
    pub namespace: Option<String>,

    /// Directory generated files are written to
    pub output_dir: Option<PathBuf>,

    /// Write one file per adapter instead of a single file
    pub file_per_adapter: Option<bool>,
}

/// Resolution-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Treat "interface without shim marker" warnings as errors
    pub strict_unregistered: Option<bool>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.generate.renderer.is_some() {
            self.generate.renderer = other.generate.renderer;
        }
        if other.generate.namespace.is_some() {
            self.generate.namespace = other.generate.namespace;
        }
        if other.generate.output_dir.is_some() {
            self.generate.output_dir = other.generate.output_dir;
        }
        if other.generate.file_per_adapter.is_some() {
            self.generate.file_per_adapter = other.generate.file_per_adapter;
        }

        if other.resolve.strict_unregistered.is_some() {
            self.resolve.strict_unregistered = other.resolve.strict_unregistered;
        }
    }

    /// Parse renderer from config string.
    pub fn renderer(&self) -> Option<RendererKind> {
        self.generate.renderer.as_ref().and_then(|s| s.parse().ok())
    }

    pub fn namespace(&self) -> &str {
        self.generate.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.generate
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
    }

    pub fn file_per_adapter(&self) -> bool {
        self.generate.file_per_adapter.unwrap_or(false)
    }

    pub fn strict_unregistered(&self) -> bool {
        self.resolve.strict_unregistered.unwrap_or(false)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.shimbind/config.toml)
/// 2. Global config (~/.shimbind/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global shimbind config directory (~/.shimbind).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".shimbind"))
}

/// Get the global config path (~/.shimbind/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.shimbind/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".shimbind").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.renderer().is_none());
        assert_eq!(config.namespace(), DEFAULT_NAMESPACE);
        assert_eq!(config.output_dir(), PathBuf::from("generated"));
        assert!(!config.file_per_adapter());
        assert!(!config.strict_unregistered());
    }

    #[test]
    fn test_config_load() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
[generate]
renderer = "plan"
namespace = "Acme.Shims"
output_dir = "out"
file_per_adapter = true

[resolve]
strict_unregistered = true
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        assert_eq!(config.renderer(), Some(RendererKind::Plan));
        assert_eq!(config.namespace(), "Acme.Shims");
        assert_eq!(config.output_dir(), PathBuf::from("out"));
        assert!(config.file_per_adapter());
        assert!(config.strict_unregistered());
    }

    #[test]
    fn test_config_merge() {
        let mut base = Config::default();
        base.generate.namespace = Some("Global.Ns".to_string());
        base.generate.file_per_adapter = Some(true);

        let mut project = Config::default();
        project.generate.namespace = Some("Project.Ns".to_string());
        project.generate.file_per_adapter = Some(false);

        base.merge(project);

        assert_eq!(base.namespace(), "Project.Ns");
        assert!(!base.file_per_adapter());
    }

    #[test]
    fn test_load_config_precedence() {
        let tmp = TempDir::new().unwrap();
        let global_path = tmp.path().join("global.toml");
        let project_path = tmp.path().join("project.toml");

        std::fs::write(
            &global_path,
            "[generate]\nrenderer = \"plan\"\nnamespace = \"Global\"\n",
        )
        .unwrap();
        std::fs::write(&project_path, "[generate]\nnamespace = \"Project\"\n").unwrap();

        let config = load_config(Some(&global_path), &project_path);
        assert_eq!(config.renderer(), Some(RendererKind::Plan));
        assert_eq!(config.namespace(), "Project");
    }

    #[test]
    fn test_invalid_config_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[generate\n").unwrap();

        let config = Config::load_or_default(&path);
        assert!(config.generate.namespace.is_none());
    }
}
