// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Whole-document backup, restore and reset.

use crate::models::{ConfigSnapshot, RecordsSnapshot};
use crate::store::RecordStore;
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;

pub fn handle(store: &mut RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("export", sub)) => export(store, sub),
        Some(("import", sub)) => import(store, sub),
        Some(("reset", sub)) => reset(store, sub),
        _ => Ok(()),
    }
}

fn export(store: &RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").unwrap();
    let body = match sub.get_one::<String>("what").unwrap().as_str() {
        "config" => serde_json::to_string_pretty(&store.config_snapshot())?,
        _ => serde_json::to_string_pretty(&store.records_snapshot())?,
    };
    fs::write(out, body).with_context(|| format!("Could not write {}", out))?;
    println!("Exported to {}", out);
    Ok(())
}

fn load<T: DeserializeOwned>(path: &str) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("Could not read {}", path))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not a valid backup", path))
}

fn import(store: &mut RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let file = sub.get_one::<String>("file").unwrap();
    match sub.get_one::<String>("what").unwrap().as_str() {
        "config" => {
            let snapshot: ConfigSnapshot = load(file)?;
            let (people, services) = (snapshot.people.len(), snapshot.services.len());
            store
                .import_config(snapshot)
                .context("Configuration import rejected")?;
            println!("Imported {} people and {} services", people, services);
        }
        _ => {
            let snapshot: RecordsSnapshot = load(file)?;
            let year = store
                .import_records(snapshot)
                .context("Records import rejected")?;
            println!("Imported records for {}", year);
        }
    }
    Ok(())
}

fn reset(store: &mut RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    if !sub.get_flag("yes") {
        bail!("Reset deletes stored data; pass --yes to confirm");
    }
    if sub.get_flag("all") {
        store.reset_all_data()?;
        println!("All data reset to defaults");
    } else {
        let years = store.reset_user_data()?;
        println!("Cleared records of {} budget year(s)", years);
    }
    Ok(())
}
