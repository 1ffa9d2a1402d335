// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::errors::{Error, Result};
use crate::persistence::{BundledDefaults, Persistence};
use crate::storage::{HomeDirStorage, SandboxStorage, StoragePort};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const ENV_BACKEND: &str = "SALESREPORT_BACKEND";
pub const ENV_DATA_DIR: &str = "SALESREPORT_DATA_DIR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// `~/.salesreport`
    #[default]
    Home,
    /// `<platform app data>/data`
    Sandbox,
}

impl std::str::FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "home" => Ok(Backend::Home),
            "sandbox" => Ok(Backend::Sandbox),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}' (use home|sandbox)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: Backend,
    /// Overrides the backend's root directory.
    pub data_dir: Option<PathBuf>,
    /// Directory holding replacement `people.json`/`services.json`/`goals.json`.
    pub defaults_dir: Option<PathBuf>,
    pub backup_on_write: bool,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            backend: Backend::Home,
            data_dir: None,
            defaults_dir: None,
            backup_on_write: true,
            log_level: "warn".to_string(),
        }
    }
}

impl AppConfig {
    /// Opens the configured storage backend wrapped in the persistence layer.
    pub fn open_persistence(&self) -> Result<Persistence> {
        let storage: Box<dyn StoragePort> = match (self.backend, &self.data_dir) {
            (Backend::Home, Some(dir)) => Box::new(HomeDirStorage::at(dir)?),
            (Backend::Home, None) => Box::new(HomeDirStorage::new()?),
            (Backend::Sandbox, Some(dir)) => Box::new(SandboxStorage::under(dir)),
            (Backend::Sandbox, None) => Box::new(SandboxStorage::new()?),
        };
        let defaults = match &self.defaults_dir {
            Some(dir) => BundledDefaults::from_dir(dir)?,
            None => BundledDefaults::builtin(),
        };
        debug!(backend = ?self.backend, root = %storage.location().display(), "storage opened");
        Ok(Persistence::new(storage, defaults).with_backups(self.backup_on_write))
    }

    fn apply_env(mut self) -> Result<Self> {
        if let Ok(v) = std::env::var(ENV_BACKEND) {
            self.backend = v.parse()?;
        }
        if let Ok(v) = std::env::var(ENV_DATA_DIR) {
            if !v.trim().is_empty() {
                self.data_dir = Some(PathBuf::from(v));
            }
        }
        Ok(self)
    }
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com.alphavelocity", "Salesreport", "salesreport")
        .map(|p| p.config_dir().join("config.toml"))
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref)
        .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path_ref, e)))?;
    toml::from_str(&contents).map_err(|e| {
        Error::Config(format!(
            "Failed to parse TOML from config file {:?}: {}",
            path_ref, e
        ))
    })
}

/// Loads `path` (or the platform config file) when it exists, falls back to
/// defaults otherwise, then applies environment overrides.
pub fn load_app_configuration(path: Option<&Path>) -> Result<AppConfig> {
    let explicit = path.map(Path::to_path_buf);
    let candidate = explicit.clone().or_else(config_path);
    let cfg = match candidate {
        Some(p) if p.exists() => load_config(&p)?,
        Some(p) if explicit.is_some() => {
            return Err(Error::Config(format!(
                "Config file {:?} does not exist",
                p
            )))
        }
        _ => AppConfig::default(),
    };
    cfg.apply_env()
}
