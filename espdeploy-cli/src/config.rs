//! Configuration file support for espdeploy.
//!
//! The configuration is a single-key JSON document, `{"port": "<path>"}`,
//! looked up in this order:
//! 1. `--config <PATH>` if given
//! 2. Local `.espdeploy.json` in the working directory
//! 3. Global config dir (`~/.config/espdeploy/config.json` on Linux)

use directories::ProjectDirs;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Local per-project config file name.
pub(crate) const LOCAL_FILE: &str = ".espdeploy.json";

/// Persistent tool configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Config {
    /// Selected serial port (e.g. "/dev/ttyACM0" or "COM3").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// Where this config was loaded from; None for defaults. Saving reuses
    /// this location.
    #[serde(skip)]
    pub(crate) source: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    pub fn load() -> Self {
        let local = Path::new(LOCAL_FILE);
        if let Some(config) = Self::load_from_file(local) {
            debug!("loaded config from {LOCAL_FILE}");
            return config;
        }

        if let Some(global_path) = Self::global_config_path() {
            if let Some(config) = Self::load_from_file(&global_path) {
                debug!("loaded config from {}", global_path.display());
                return config;
            }
        }

        Self::default()
    }

    /// Load configuration from a specific file path (`--config` flag).
    pub fn load_from_path(path: &Path) -> Self {
        if let Some(config) = Self::load_from_file(path) {
            debug!("loaded config from {}", path.display());
            config
        } else {
            warn!(
                "could not load config from {}, using defaults",
                path.display()
            );
            let mut config = Self::default();
            config.source = Some(path.to_path_buf());
            config
        }
    }

    /// Load and parse one file; a corrupted file warns and is skipped.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Self>(&content) {
                Ok(mut config) => {
                    config.source = Some(path.to_path_buf());
                    Some(config)
                }
                Err(e) => {
                    warn!("config file {} is corrupted ({e}), using defaults", path.display());
                    None
                }
            },
            Err(e) => {
                warn!("failed to read config file {}: {e}", path.display());
                None
            }
        }
    }

    /// The global configuration directory.
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "espdeploy").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// The global configuration file path.
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_config_dir().map(|dir| dir.join("config.json"))
    }

    /// Where a save will write: the file this config came from, else a local
    /// file if one exists, else the global location.
    fn save_path(&self) -> PathBuf {
        if let Some(source) = &self.source {
            return source.clone();
        }
        let local = Path::new(LOCAL_FILE);
        if local.exists() {
            return local.to_path_buf();
        }
        Self::global_config_path().unwrap_or_else(|| local.to_path_buf())
    }

    /// Persist the selected port.
    pub fn save_port(&mut self, port: &str) -> anyhow::Result<()> {
        self.port = Some(port.to_string());

        let path = self.save_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content)?;
        self.source = Some(path.clone());
        info!("saved configuration to {}", path.display());
        Ok(())
    }
}
