//! Configuration loading and parsing.
//!
//! Parses `fumen.toml` (or an override path provided by the binary):
//!
//! ```toml
//! [history]
//! max_depth = 200
//! [edit]
//! locked_pages = "ignore"   # or "reject"
//! [autosave]
//! enabled = true
//! path = "/optional/override"
//! ```
//!
//! Every table and key is optional. Unknown fields are ignored so older
//! binaries accept newer files. A file that fails to parse is reported with a
//! warning and replaced by defaults; configuration never stops the editor.

use anyhow::Result;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "fumen.toml";
const CONFIG_DIR_NAME: &str = "fumen-editor";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    #[serde(default = "HistoryConfig::default_max_depth")]
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: Self::default_max_depth(),
        }
    }
}

impl HistoryConfig {
    const fn default_max_depth() -> usize {
        200
    }
}

/// How edits aimed at a frozen page are treated.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LockedPages {
    #[default]
    Ignore,
    Reject,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct EditConfig {
    #[serde(default)]
    pub locked_pages: LockedPages,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AutosaveConfig {
    #[serde(default = "AutosaveConfig::default_enabled")]
    pub enabled: bool,
    /// Snapshot file; the platform data dir is used when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            path: None,
        }
    }
}

impl AutosaveConfig {
    const fn default_enabled() -> bool {
        true
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub edit: EditConfig,
    #[serde(default)]
    pub autosave: AutosaveConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>,     // original file string (optional)
    pub source: Option<PathBuf>, // file the values came from
    pub file: ConfigFile,        // parsed (or default) data
}

/// Config path: `./fumen.toml` when present, else the platform config dir
/// (XDG / AppData Roaming), else the bare file name.
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
    }
    local
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        info!(target: "config", path = %path.display(), "config_not_found_using_defaults");
        return Ok(Config::default());
    };
    match parse(&content) {
        Ok(file) => {
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                source: Some(path),
                file,
            })
        }
        Err(e) => {
            warn!(target: "config", path = %path.display(), error = %e, "config_parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

/// Parse file contents without the fallback.
pub fn parse(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str::<ConfigFile>(content)?)
}

impl Config {
    /// History depth to hand to the undo engine. Zero would disable undo
    /// entirely and is raised to one.
    pub fn history_depth(&self) -> usize {
        let raw = self.file.history.max_depth;
        if raw == 0 {
            info!(target: "config", raw, clamped = 1, "history_max_depth_clamped");
            return 1;
        }
        raw
    }

    pub fn locked_pages(&self) -> LockedPages {
        self.file.edit.locked_pages
    }

    /// Where auto-save snapshots go, or `None` when auto-save is off.
    /// `default_location` supplies the platform path when none is configured.
    pub fn autosave_path(&self, default_location: impl FnOnce() -> Option<PathBuf>) -> Option<PathBuf> {
        if !self.file.autosave.enabled {
            return None;
        }
        match &self.file.autosave.path {
            Some(path) => Some(resolve_relative(self.source.as_deref(), path)),
            None => default_location(),
        }
    }
}

/// Relative paths in a config file are taken relative to that file.
fn resolve_relative(source: Option<&Path>, path: &Path) -> PathBuf {
    match source.and_then(Path::parent) {
        Some(dir) if path.is_relative() && !dir.as_os_str().is_empty() => dir.join(path),
        _ => path.to_path_buf(),
    }
}
