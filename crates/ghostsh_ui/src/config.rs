//! Configuration management for ghostsh
//!
//! `config.toml` under the platform config directory. Every section and
//! field is optional; anything missing takes its default.

use crate::suggest::SuggestOptions;
use anyhow::{Context, Result};
use ghostsh_builtins::StorePaths;
use ghostsh_core::HistoryPaths;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Main configuration for ghostsh
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ShellConfig {
    pub editor: EditorConfig,
    pub history: HistoryConfig,
    pub stores: StoreConfig,
    pub prompt: PromptConfig,
}

/// Line editor behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    /// Show inline ghost-text suggestions
    pub suggestions: bool,
    /// In-memory history ring walked before the persistent store
    pub ring_size: usize,
    /// Shortest line that queries frequency suggestions
    pub min_frequency_prefix: usize,
    /// Shortest line that also matches history by substring
    pub min_substring_prefix: usize,
}

impl EditorConfig {
    pub fn suggest_options(&self) -> SuggestOptions {
        SuggestOptions {
            min_frequency_prefix: self.min_frequency_prefix,
            min_substring_prefix: self.min_substring_prefix,
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            suggestions: true,
            ring_size: 50,
            min_frequency_prefix: 2,
            min_substring_prefix: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HistoryConfig {
    pub history_file: Option<PathBuf>,
    pub frequency_file: Option<PathBuf>,
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            history_file: None,
            frequency_file: None,
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub alias_file: Option<PathBuf>,
    pub bookmark_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PromptConfig {
    /// Supports `{cwd}` and `{user}`
    pub template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: "{cwd}> ".to_string(),
        }
    }
}

impl PromptConfig {
    pub fn render(&self, cwd: &Path, user: &str) -> String {
        self.template
            .replace("{cwd}", &cwd.display().to_string())
            .replace("{user}", user)
    }

    /// Prompt for the current directory and login name
    pub fn render_current(&self) -> String {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("?"));
        self.render(&cwd, &whoami::username())
    }
}

impl ShellConfig {
    /// Load configuration from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).context(format!("Failed to parse config file: {}", path.display()))
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).context(format!("Failed to write config file: {}", path.display()))
    }

    /// Get default configuration file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ghostsh").join("config.toml"))
    }

    /// Load from `path`, or the default location when `None`. A missing file
    /// means defaults; a broken one is logged and also falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_config_path) {
            Some(p) => p,
            None => return Self::default(),
        };
        if !path.exists() {
            ghostsh_core::gsh_log_debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match Self::load_from_file(&path) {
            Ok(config) => {
                ghostsh_core::gsh_log_info!(path = %path.display(), "config loaded");
                config
            }
            Err(e) => {
                ghostsh_core::gsh_log_warn!(error = %format!("{e:#}"), "config unusable, using defaults");
                Self::default()
            }
        }
    }

    /// Resolve store locations, filling gaps with `<data_dir>/ghostsh/*`.
    pub fn store_paths(&self) -> StorePaths {
        let defaults = StorePaths::default_location();
        StorePaths {
            history: HistoryPaths {
                history_file: self.history.history_file.clone().or(defaults.history.history_file),
                frequency_file: self.history.frequency_file.clone().or(defaults.history.frequency_file),
            },
            alias_file: self.stores.alias_file.clone().or(defaults.alias_file),
            bookmark_file: self.stores.bookmark_file.clone().or(defaults.bookmark_file),
            max_history: Some(self.history.max_entries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[editor]\nring_size = 5\n\n[prompt]\ntemplate = \"{user}:{cwd}$ \"\n").unwrap();

        let config = ShellConfig::load_from_file(&path).unwrap();
        assert_eq!(config.editor.ring_size, 5);
        assert!(config.editor.suggestions);
        assert_eq!(config.editor.suggest_options(), SuggestOptions::default());
        assert_eq!(config.history.max_entries, 10_000);
        assert_eq!(config.prompt.render(Path::new("/tmp"), "ada"), "ada:/tmp$ ");
    }

    #[test]
    fn broken_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[editor\nring_size = ").unwrap();
        assert!(ShellConfig::load_from_file(&path).is_err());
        assert_eq!(ShellConfig::load_or_default(Some(&path)), ShellConfig::default());
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = ShellConfig::default();
        config.stores.alias_file = Some(dir.path().join("aliases"));
        config.save_to_file(&path).unwrap();
        assert_eq!(ShellConfig::load_from_file(&path).unwrap(), config);
        assert_eq!(config.store_paths().alias_file, Some(dir.path().join("aliases")));
    }
}
