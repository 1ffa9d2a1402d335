// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Typed JSON documents over a [`StoragePort`], with first-run seeding from
//! bundled defaults.

use crate::errors::{Error, Result};
use crate::storage::{keys, StoragePort};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

const BUILTIN: [(&str, &str); 3] = [
    (keys::PEOPLE, include_str!("../data/people.json")),
    (keys::SERVICES, include_str!("../data/services.json")),
    (keys::GOALS, include_str!("../data/goals.json")),
];

/// Documents copied verbatim into storage the first time their key is read.
#[derive(Debug, Clone, Default)]
pub struct BundledDefaults {
    docs: BTreeMap<String, String>,
}

impl BundledDefaults {
    pub fn builtin() -> Self {
        let docs = BUILTIN
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BundledDefaults { docs }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Built-in defaults, overridden by any `<key>.json` present in `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut defaults = Self::builtin();
        for (key, _) in BUILTIN {
            let path = dir.join(format!("{}.json", key));
            match fs::read_to_string(&path) {
                Ok(contents) => {
                    debug!(path = %path.display(), "using default from defaults dir");
                    defaults.docs.insert(key.to_string(), contents);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(Error::io(path.display().to_string(), e)),
            }
        }
        Ok(defaults)
    }

    pub fn with(mut self, key: &str, contents: &str) -> Self {
        self.docs.insert(key.to_string(), contents.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.docs.get(key).map(String::as_str)
    }
}

pub struct Persistence {
    storage: Box<dyn StoragePort>,
    defaults: BundledDefaults,
    backup_on_write: bool,
}

impl Persistence {
    pub fn new(storage: Box<dyn StoragePort>, defaults: BundledDefaults) -> Self {
        Persistence {
            storage,
            defaults,
            backup_on_write: true,
        }
    }

    pub fn with_backups(mut self, enabled: bool) -> Self {
        self.backup_on_write = enabled;
        self
    }

    pub fn storage(&self) -> &dyn StoragePort {
        self.storage.as_ref()
    }

    /// Copies the bundled default for `key` into storage when no document
    /// exists yet. Returns whether a copy happened.
    pub fn seed_if_missing(&self, key: &str) -> Result<bool> {
        if self.storage.exists(key) {
            return Ok(false);
        }
        let Some(default) = self.defaults.get(key) else {
            return Ok(false);
        };
        self.storage.write(key, default)?;
        info!(
            key,
            location = %self.storage.location().display(),
            "seeded document from bundled default"
        );
        Ok(true)
    }

    /// Overwrites `key` with its bundled default. Returns `false`, writing
    /// nothing, when the key has no default.
    pub fn restore_default(&self, key: &str) -> Result<bool> {
        let Some(default) = self.defaults.get(key) else {
            return Ok(false);
        };
        if self.backup_on_write {
            if let Err(e) = self.storage.copy(key, &keys::backup(key)) {
                warn!(key, error = %e, "could not back up previous version");
            }
        }
        self.storage.write(key, default)?;
        info!(key, "restored bundled default");
        Ok(true)
    }

    /// Reads `key`, substituting `T::default()` when the document is absent,
    /// unreadable or unparsable. Failures are logged, never returned.
    pub fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read_checked(key) {
            Ok(Some(value)) => value,
            Ok(None) => {
                debug!(key, "no document, using empty default");
                T::default()
            }
            Err(e) => {
                warn!(key, error = %e, "could not load document, using empty default");
                T::default()
            }
        }
    }

    /// Like [`Persistence::read`] but tells "absent" (`Ok(None)`) apart from
    /// I/O and corruption errors.
    pub fn read_checked<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.seed_if_missing(key)?;
        let Some(raw) = self.storage.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| Error::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    /// Serializes `value` as pretty JSON and overwrites the document in full.
    /// With backups enabled the previous contents go to `<key>.bak` first.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(|source| Error::Serialize {
            key: key.to_string(),
            source,
        })?;
        if self.backup_on_write {
            // A failed backup must not block the overwrite.
            if let Err(e) = self.storage.copy(key, &keys::backup(key)) {
                warn!(key, error = %e, "could not back up previous version");
            }
        }
        self.storage.write(key, &json)?;
        debug!(key, bytes = json.len(), "document written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Person, Service};
    use crate::storage::HomeDirStorage;
    use tempfile::tempdir;

    fn persistence(dir: &Path) -> Persistence {
        let storage = HomeDirStorage::at(dir).unwrap();
        Persistence::new(Box::new(storage), BundledDefaults::builtin())
    }

    #[test]
    fn builtin_defaults_parse() {
        let defaults = BundledDefaults::builtin();
        let people: Vec<Person> =
            serde_json::from_str(defaults.get(keys::PEOPLE).unwrap()).unwrap();
        let services: Vec<Service> =
            serde_json::from_str(defaults.get(keys::SERVICES).unwrap()).unwrap();
        assert!(!people.is_empty());
        assert!(!services.is_empty());
    }

    #[test]
    fn seeds_once_then_reads_stored_file() {
        let dir = tempdir().unwrap();
        let p = persistence(dir.path());

        let people: Vec<Person> = p.read(keys::PEOPLE);
        assert_eq!(people.len(), 4);
        assert!(dir.path().join("people.json").exists());

        // A second read must use the stored copy, not the bundled one.
        std::fs::write(dir.path().join("people.json"), "[]").unwrap();
        let people: Vec<Person> = p.read(keys::PEOPLE);
        assert!(people.is_empty());
        assert!(!p.seed_if_missing(keys::PEOPLE).unwrap());
    }

    #[test]
    fn missing_without_default_is_not_seeded() {
        let dir = tempdir().unwrap();
        let p = persistence(dir.path());
        let v: Vec<Person> = p.read("budget-year-2024");
        assert!(v.is_empty());
        assert!(!dir.path().join("budget-year-2024.json").exists());
    }

    #[test]
    fn checked_read_reports_corruption() {
        let dir = tempdir().unwrap();
        let p = persistence(dir.path());
        std::fs::write(dir.path().join("settings.json"), "{ nope").unwrap();
        let err = p.read_checked::<serde_json::Value>("settings").unwrap_err();
        assert!(matches!(err, Error::Corrupt { .. }));
        assert_eq!(p.read_checked::<serde_json::Value>("absent").unwrap(), None);
    }

    #[test]
    fn write_keeps_previous_version() {
        let dir = tempdir().unwrap();
        let p = persistence(dir.path());
        p.write("settings", &vec![1]).unwrap();
        assert!(!dir.path().join("settings.bak.json").exists());
        p.write("settings", &vec![2]).unwrap();

        let current: Vec<i32> = p.read("settings");
        let backup: Vec<i32> = p.read("settings.bak");
        assert_eq!(current, vec![2]);
        assert_eq!(backup, vec![1]);
    }

    #[test]
    fn write_replaces_undecodable_document() {
        let dir = tempdir().unwrap();
        let p = persistence(dir.path());
        let raw = [0xff, 0xfe, 0x00, 0x7b];
        std::fs::write(dir.path().join("settings.json"), raw).unwrap();

        let masked: Vec<i32> = p.read("settings");
        assert!(masked.is_empty());
        p.write("settings", &vec![3]).unwrap();

        let current: Vec<i32> = p.read("settings");
        assert_eq!(current, vec![3]);
        assert_eq!(std::fs::read(dir.path().join("settings.bak.json")).unwrap(), raw);
    }

    #[test]
    fn restore_default_overwrites_stored_copy() {
        let dir = tempdir().unwrap();
        let p = persistence(dir.path());
        p.write(keys::PEOPLE, &Vec::<Person>::new()).unwrap();
        assert!(p.restore_default(keys::PEOPLE).unwrap());
        let people: Vec<Person> = p.read(keys::PEOPLE);
        assert_eq!(people.len(), 4);
        assert!(!p.restore_default(keys::SETTINGS).unwrap());
    }

    #[test]
    fn backups_can_be_disabled() {
        let dir = tempdir().unwrap();
        let p = persistence(dir.path()).with_backups(false);
        p.write("settings", &vec![1]).unwrap();
        p.write("settings", &vec![2]).unwrap();
        assert!(!dir.path().join("settings.bak.json").exists());
    }
}
