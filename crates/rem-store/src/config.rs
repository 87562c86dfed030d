//! TOML configuration and data-dir resolution.
//!
//! ```toml
//! [forge]
//! tier = "full"
//! language = "es"
//! lexicon_anchor_limit = 8
//!
//! [store]
//! data_dir = "/var/lib/remforge"
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs};

use rem_core::ForgeConfig;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::store::RecordStore;

pub const DATA_DIR_ENV: &str = "REM_DATA_DIR";
pub const CONFIG_FILE: &str = "remforge.toml";
pub const DB_FILE: &str = "records.db";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemConfig {
    pub forge: ForgeConfig,
    pub store: StoreConfig,
}

impl RemConfig {
    /// Data directory: `REM_DATA_DIR`, then `[store] data_dir`, then `~/.remforge`.
    pub fn data_dir(&self) -> PathBuf {
        data_dir_from(env::var(DATA_DIR_ENV).ok(), self.store.data_dir.as_deref())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(DB_FILE)
    }

    /// Open the archive under the resolved data directory, creating it as needed.
    pub fn open_store(&self) -> Result<RecordStore> {
        let dir = self.data_dir();
        fs::create_dir_all(&dir).map_err(|e| {
            StoreError::InvalidData(format!("failed to create {}: {e}", dir.display()))
        })?;
        RecordStore::open(&dir.join(DB_FILE))
    }
}

/// Default base directory for all remforge storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".remforge")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

fn data_dir_from(env_dir: Option<String>, configured: Option<&Path>) -> PathBuf {
    if let Some(dir) = env_dir.filter(|d| !d.trim().is_empty()) {
        return PathBuf::from(dir);
    }
    configured
        .map(PathBuf::from)
        .unwrap_or_else(default_base_dir)
}

/// Where to look for a config file, in priority order.
pub fn config_path_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(path) = explicit {
        candidates.push(path.to_path_buf());
    }
    if let Ok(dir) = env::var(DATA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        candidates.push(PathBuf::from(dir).join(CONFIG_FILE));
    }
    candidates.push(default_base_dir().join(CONFIG_FILE));
    candidates
}

/// Load a config file. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<RemConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(RemConfig::default());
        }
        Err(e) => {
            return Err(StoreError::Config(format!(
                "failed to read {}: {e}",
                path.display()
            )));
        }
    };
    parse_config(&content).map_err(|e| match e {
        StoreError::Config(msg) => StoreError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_config(content: &str) -> Result<RemConfig> {
    let config: RemConfig =
        toml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))?;
    config
        .forge
        .validate()
        .map_err(|e| StoreError::Config(e.to_string()))?;
    Ok(config)
}

/// Load the first existing candidate, or defaults when none exists.
///
/// An explicitly named file that is missing is an error.
pub fn resolve_config(explicit: Option<&Path>) -> Result<RemConfig> {
    if let Some(path) = explicit
        && !path.exists()
    {
        return Err(StoreError::Config(format!(
            "config file not found: {}",
            path.display()
        )));
    }
    for candidate in config_path_candidates(explicit) {
        if candidate.exists() {
            tracing::debug!("loading config from {}", candidate.display());
            return load_config(&candidate);
        }
    }
    Ok(RemConfig::default())
}
