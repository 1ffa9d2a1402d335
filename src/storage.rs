// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Key/value document storage: one `<key>.json` file per key.

use crate::errors::{Error, Result};
use crate::models::BudgetYearId;
use directories::{BaseDirs, ProjectDirs};
use once_cell::sync::Lazy;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Salesreport", "salesreport"));

const HOME_FOLDER: &str = ".salesreport";
const SANDBOX_FOLDER: &str = "data";
const EXT: &str = "json";

pub mod keys {
    use super::BudgetYearId;

    pub const PEOPLE: &str = "people";
    pub const SERVICES: &str = "services";
    pub const GOALS: &str = "goals";
    pub const SETTINGS: &str = "settings";

    const BUDGET_YEAR_PREFIX: &str = "budget-year-";
    const BUDGET_YEAR_SETTINGS_PREFIX: &str = "budget-year-settings-";
    const BACKUP_SUFFIX: &str = ".bak";

    pub fn budget_year(id: BudgetYearId) -> String {
        format!("{}{}", BUDGET_YEAR_PREFIX, id.0)
    }

    pub fn budget_year_settings(id: BudgetYearId) -> String {
        format!("{}{}", BUDGET_YEAR_SETTINGS_PREFIX, id.0)
    }

    pub fn backup(key: &str) -> String {
        format!("{}{}", key, BACKUP_SUFFIX)
    }

    pub fn is_backup(key: &str) -> bool {
        key.ends_with(BACKUP_SUFFIX)
    }

    pub fn parse_budget_year_settings(key: &str) -> Option<BudgetYearId> {
        if is_backup(key) {
            return None;
        }
        key.strip_prefix(BUDGET_YEAR_SETTINGS_PREFIX)?
            .parse()
            .ok()
            .map(BudgetYearId)
    }

    /// Inverse of [`budget_year`]; settings and backup keys do not match.
    pub fn parse_budget_year(key: &str) -> Option<BudgetYearId> {
        if key.starts_with(BUDGET_YEAR_SETTINGS_PREFIX) || is_backup(key) {
            return None;
        }
        key.strip_prefix(BUDGET_YEAR_PREFIX)?
            .parse()
            .ok()
            .map(BudgetYearId)
    }
}

/// Raw document storage the persistence layer is written against.
pub trait StoragePort {
    /// `Ok(None)` when no document exists for `key`.
    fn read(&self, key: &str) -> Result<Option<String>>;
    /// Overwrites the whole document.
    fn write(&self, key: &str, contents: &str) -> Result<()>;
    fn exists(&self, key: &str) -> bool;
    /// Keys of all stored documents, sorted.
    fn keys(&self) -> Result<Vec<String>>;
    fn location(&self) -> &Path;

    /// Copies the document under `from` to `to` as-is. `Ok(false)` when
    /// `from` does not exist.
    fn copy(&self, from: &str, to: &str) -> Result<bool> {
        match self.read(from)? {
            Some(contents) => {
                self.write(to, &contents)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Desktop layout: a dot-folder directly under the user's home directory,
/// created up front.
#[derive(Debug, Clone)]
pub struct HomeDirStorage {
    root: PathBuf,
}

impl HomeDirStorage {
    pub fn new() -> Result<Self> {
        let base = BaseDirs::new()
            .ok_or_else(|| Error::Config("Could not determine home directory".into()))?;
        Self::at(base.home_dir().join(HOME_FOLDER))
    }

    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| Error::io(root.display().to_string(), e))?;
        Ok(HomeDirStorage { root })
    }
}

impl StoragePort for HomeDirStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        read_file(&file_for(&self.root, key), key)
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let path = file_for(&self.root, key);
        debug!(path = %path.display(), "writing document");
        fs::write(&path, contents).map_err(|e| Error::io(key, e))
    }

    fn exists(&self, key: &str) -> bool {
        file_for(&self.root, key).exists()
    }

    fn keys(&self) -> Result<Vec<String>> {
        list_keys(&self.root)
    }

    fn location(&self) -> &Path {
        &self.root
    }

    fn copy(&self, from: &str, to: &str) -> Result<bool> {
        copy_file(&file_for(&self.root, from), &file_for(&self.root, to), to)
    }
}

/// Packaged-app layout: a `data/` folder under the runtime's application data
/// root. Keys are confined to that folder and the folder is (re)created on
/// demand, since the runtime may hand out a fresh root.
#[derive(Debug, Clone)]
pub struct SandboxStorage {
    root: PathBuf,
}

impl SandboxStorage {
    pub fn new() -> Result<Self> {
        let proj = ProjectDirs::from(APP.0, APP.1, APP.2).ok_or_else(|| {
            Error::Config("Could not determine platform-specific data dir".into())
        })?;
        Ok(Self::under(proj.data_dir()))
    }

    /// Storage rooted at `<app_data>/data`.
    pub fn under(app_data: impl AsRef<Path>) -> Self {
        SandboxStorage {
            root: app_data.as_ref().join(SANDBOX_FOLDER),
        }
    }

    fn ensure_root(&self) -> Result<()> {
        if !self.root.exists() {
            debug!(path = %self.root.display(), "creating sandbox data directory");
            fs::create_dir_all(&self.root)
                .map_err(|e| Error::io(self.root.display().to_string(), e))?;
        }
        Ok(())
    }

    fn checked_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(Error::Validation(format!(
                "Key '{}' escapes the sandbox",
                key
            )));
        }
        Ok(file_for(&self.root, key))
    }
}

impl StoragePort for SandboxStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.checked_path(key)?;
        read_file(&path, key)
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        let path = self.checked_path(key)?;
        self.ensure_root()?;
        debug!(path = %path.display(), "writing document");
        fs::write(&path, contents).map_err(|e| Error::io(key, e))
    }

    fn exists(&self, key: &str) -> bool {
        self.checked_path(key).map(|p| p.exists()).unwrap_or(false)
    }

    fn keys(&self) -> Result<Vec<String>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        list_keys(&self.root)
    }

    fn location(&self) -> &Path {
        &self.root
    }

    fn copy(&self, from: &str, to: &str) -> Result<bool> {
        let (src, dst) = (self.checked_path(from)?, self.checked_path(to)?);
        self.ensure_root()?;
        copy_file(&src, &dst, to)
    }
}

fn file_for(root: &Path, key: &str) -> PathBuf {
    root.join(format!("{}.{}", key, EXT))
}

fn read_file(path: &Path, key: &str) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(s) => {
            debug!(path = %path.display(), bytes = s.len(), "read document");
            Ok(Some(s))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(key, e)),
    }
}

/// Byte-for-byte copy, so unreadable documents can still be backed up.
fn copy_file(src: &Path, dst: &Path, key: &str) -> Result<bool> {
    match fs::copy(src, dst) {
        Ok(bytes) => {
            debug!(from = %src.display(), to = %dst.display(), bytes, "copied document");
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(key, e)),
    }
}

fn list_keys(root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(root).map_err(|e| Error::io(root.display().to_string(), e))?;
    let mut keys = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| Error::io(root.display().to_string(), e))?
            .path();
        if path.extension().and_then(|e| e.to_str()) != Some(EXT) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            keys.push(stem.to_string());
        }
    }
    keys.sort();
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn home_storage_round_trips_and_lists_keys() {
        let dir = tempdir().unwrap();
        let storage = HomeDirStorage::at(dir.path().join("home")).unwrap();
        assert!(!storage.exists("people"));
        assert_eq!(storage.read("people").unwrap(), None);

        storage.write("people", "[]").unwrap();
        storage.write("budget-year-2024", "{}").unwrap();
        std::fs::write(storage.location().join("notes.txt"), "x").unwrap();

        assert!(storage.exists("people"));
        assert_eq!(storage.read("people").unwrap().as_deref(), Some("[]"));
        assert_eq!(
            storage.keys().unwrap(),
            vec!["budget-year-2024".to_string(), "people".to_string()]
        );
    }

    #[test]
    fn sandbox_storage_creates_data_dir_lazily() {
        let dir = tempdir().unwrap();
        let storage = SandboxStorage::under(dir.path());
        assert!(!dir.path().join("data").exists());
        assert!(storage.keys().unwrap().is_empty());

        storage.write("goals", "[]").unwrap();
        assert!(dir.path().join("data").join("goals.json").exists());
    }

    #[test]
    fn sandbox_storage_rejects_escaping_keys() {
        let dir = tempdir().unwrap();
        let storage = SandboxStorage::under(dir.path());
        assert!(storage.write("../outside", "{}").is_err());
        assert!(storage.read("a/b").is_err());
        assert!(!storage.exists("../outside"));
    }

    #[test]
    fn copy_preserves_raw_bytes() {
        let dir = tempdir().unwrap();
        let storage = HomeDirStorage::at(dir.path()).unwrap();
        let raw = [0xff, 0xfe, 0x00, 0x7b];
        std::fs::write(dir.path().join("settings.json"), raw).unwrap();

        assert!(storage.copy("settings", "settings.bak").unwrap());
        assert_eq!(
            std::fs::read(dir.path().join("settings.bak.json")).unwrap(),
            raw
        );
        assert!(!storage.copy("absent", "absent.bak").unwrap());
    }

    #[test]
    fn budget_year_keys_parse_back() {
        let id = BudgetYearId(2024);
        assert_eq!(keys::budget_year(id), "budget-year-2024");
        assert_eq!(keys::parse_budget_year("budget-year-2024"), Some(id));
        assert_eq!(keys::parse_budget_year("budget-year-settings-2024"), None);
        assert_eq!(keys::parse_budget_year("budget-year-2024.bak"), None);
        assert_eq!(keys::parse_budget_year("people"), None);
        assert_eq!(
            keys::parse_budget_year_settings("budget-year-settings-2024"),
            Some(id)
        );
        assert_eq!(keys::parse_budget_year_settings("budget-year-2024"), None);
    }
}
