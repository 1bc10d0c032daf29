use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(stripped) = s.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if s == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

/// Configuration for the launcher's package core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LauncherConfig {
    /// Directory holding one subdirectory per installed package
    #[serde(default = "defaults::install_root")]
    pub install_root: PathBuf,
    /// Games manifest (package id -> repo, version, ...)
    #[serde(default = "defaults::catalog_path")]
    pub catalog_path: PathBuf,
    /// git executable used for install/update
    #[serde(default = "defaults::git_binary")]
    pub git_binary: PathBuf,
    /// Branch used when a catalog entry does not name one
    #[serde(default = "defaults::default_branch")]
    pub default_branch: String,
    /// Interpreter that runs a package's entry point
    #[serde(default = "defaults::runner")]
    pub runner: String,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            install_root: defaults::install_root(),
            catalog_path: defaults::catalog_path(),
            git_binary: defaults::git_binary(),
            default_branch: defaults::default_branch(),
            runner: defaults::runner(),
        }
    }
}

impl LauncherConfig {
    /// Load from the default config file (if any), then apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load from `path`, or the default location when `None`.
    ///
    /// An explicitly named file must exist; a missing default file just
    /// means built-in defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let config_path = Self::config_file_path()?;
                tracing::debug!("loading atomic-launcher config from {:?}", config_path);
                if config_path.exists() {
                    Self::load_from_file(&config_path)?
                } else {
                    tracing::debug!("no config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: LauncherConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.install_root = expand_tilde(&config.install_root);
        config.catalog_path = expand_tilde(&config.catalog_path);
        config.git_binary = expand_tilde(&config.git_binary);

        Ok(config)
    }

    /// Apply `ATOMIC_LAUNCHER_*` overrides, looked up through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("ATOMIC_LAUNCHER_ROOT") {
            self.install_root = expand_tilde(&PathBuf::from(path));
        }

        if let Some(path) = lookup("ATOMIC_LAUNCHER_CATALOG") {
            self.catalog_path = expand_tilde(&PathBuf::from(path));
        }

        if let Some(path) = lookup("ATOMIC_LAUNCHER_GIT") {
            self.git_binary = expand_tilde(&PathBuf::from(path));
        }

        if let Some(branch) = lookup("ATOMIC_LAUNCHER_BRANCH") {
            self.default_branch = branch;
        }

        if let Some(runner) = lookup("ATOMIC_LAUNCHER_RUNNER") {
            self.runner = runner;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get default config file path
    pub fn config_file_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("atomic-launcher/config.yaml"))
            .context("Could not determine config directory")
    }
}

mod defaults {
    use std::path::PathBuf;

    fn base(dir: Option<PathBuf>) -> PathBuf {
        dir.unwrap_or_else(|| PathBuf::from(".")).join("atomic-launcher")
    }

    pub(crate) fn install_root() -> PathBuf {
        base(dirs::data_dir()).join("games")
    }

    pub(crate) fn catalog_path() -> PathBuf {
        base(dirs::config_dir()).join("games_manifest.json")
    }

    pub(crate) fn git_binary() -> PathBuf {
        PathBuf::from("git")
    }

    pub(crate) fn default_branch() -> String {
        "main".to_string()
    }

    pub(crate) fn runner() -> String {
        "python3".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");

        let config = LauncherConfig {
            install_root: dir.path().join("games"),
            catalog_path: dir.path().join("games_manifest.json"),
            git_binary: PathBuf::from("/usr/bin/git"),
            default_branch: "stable".to_string(),
            runner: "python".to_string(),
        };
        config.save(&config_path).unwrap();

        let loaded = LauncherConfig::load_from_file(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "default_branch: develop\n").unwrap();

        let loaded = LauncherConfig::load_from(Some(&config_path)).unwrap();
        assert_eq!(loaded.git_binary, PathBuf::from("git"));
        assert!(loaded.install_root.ends_with("atomic-launcher/games"));
        assert_eq!(loaded.runner, "python3");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");
        std::fs::write(&config_path, "theme: dark\n").unwrap();

        assert!(LauncherConfig::load_from_file(&config_path).is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(LauncherConfig::load_from(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ATOMIC_LAUNCHER_ROOT", "/srv/games"),
            ("ATOMIC_LAUNCHER_BRANCH", "release"),
            ("ATOMIC_LAUNCHER_RUNNER", "pypy3"),
        ]
        .into_iter()
        .collect();

        let mut config = LauncherConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.install_root, PathBuf::from("/srv/games"));
        assert_eq!(config.default_branch, "release");
        assert_eq!(config.runner, "pypy3");
        assert_eq!(config.git_binary, PathBuf::from("git"));
    }

    #[test]
    fn test_tilde_expansion() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("config.yaml");

        let config_content = r#"
install_root: ~/games
catalog_path: ~/launcher/games_manifest.json
"#;
        std::fs::write(&config_path, config_content).unwrap();

        let loaded = LauncherConfig::load_from_file(&config_path).unwrap();

        if let Some(home) = dirs::home_dir() {
            assert_eq!(loaded.install_root, home.join("games"));
            assert_eq!(loaded.catalog_path, home.join("launcher/games_manifest.json"));
        }
    }

    #[test]
    fn test_tilde_expansion_overrides() {
        let mut config = LauncherConfig::default();
        config.apply_overrides(|key| match key {
            "ATOMIC_LAUNCHER_ROOT" => Some("~/test/games".to_string()),
            _ => None,
        });

        if let Some(home) = dirs::home_dir() {
            assert_eq!(config.install_root, home.join("test/games"));
        }
    }
}
