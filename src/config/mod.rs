//! Configuration loading for zkss.

use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

/// Environment variable that points at an explicit config file.
pub const CONFIG_ENV: &str = "ZKSS_CONFIG";

/// Default number of semantic search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 15;

/// Top-level configuration loaded from config.toml.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notes: NotesConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Location of the notes directory and which files count as notes.
#[derive(Debug, Clone, Deserialize)]
pub struct NotesConfig {
    #[serde(default = "default_notes_directory")]
    pub directory: String,
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Where the semantic index lives and how it is shaped.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_index_directory")]
    pub directory: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_dimension")]
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_notes_directory() -> String {
    "~/zettelkasten".to_string()
}

fn default_extension() -> String {
    ".md".to_string()
}

fn default_index_directory() -> String {
    "~/.zkss_index".to_string()
}

fn default_collection() -> String {
    "zettelkasten".to_string()
}

fn default_dimension() -> usize {
    384
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

impl Default for NotesConfig {
    fn default() -> Self {
        Self {
            directory: default_notes_directory(),
            extension: default_extension(),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            directory: default_index_directory(),
            collection: default_collection(),
            dimension: default_dimension(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
        }
    }
}

impl Config {
    /// Load config from `$ZKSS_CONFIG`, then ~/.config/zkss/config.toml,
    /// or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            let contents = std::fs::read_to_string(&path)?;
            return Self::parse(&contents);
        }

        Ok(Config::default())
    }

    /// Parse config from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(contents)?;
        if config.notes.extension.is_empty() {
            anyhow::bail!("notes.extension cannot be empty");
        }
        Ok(config)
    }

    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "zkss").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    #[must_use]
    pub fn notes_dir(&self) -> PathBuf {
        expand_tilde(&self.notes.directory)
    }

    #[must_use]
    pub fn index_dir(&self) -> PathBuf {
        expand_tilde(&self.index.directory)
    }
}

/// Expand ~ to the user's home directory.
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(base_dirs) = BaseDirs::new()
    {
        return base_dirs.home_dir().join(rest);
    }
    PathBuf::from(path)
}
