use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{CandidateField, ViewMode};

/// User settings read from `config.toml`. Every key is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// JSON file replacing the built-in candidates.
    pub seed_file: Option<PathBuf>,
    pub view_mode: ViewMode,
    /// Initial columns, in display order. `None` shows all of them.
    pub visible_columns: Option<Vec<CandidateField>>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log destination. Defaults to stderr.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed_file: None,
            view_mode: ViewMode::Table,
            visible_columns: None,
            log_level: "warn".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) => Self::load_from(&path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "talent")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
