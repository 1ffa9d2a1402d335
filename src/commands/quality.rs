// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::week_or_current;
use crate::store::RecordStore;
use crate::utils::parse_day;
use anyhow::{Context, Result};

pub fn handle(store: &mut RecordStore, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("set", sub)) = m.subcommand() {
        let week = week_or_current(store, sub)?;
        let day = parse_day(sub.get_one::<String>("day").unwrap())?;
        let count = *sub.get_one::<u32>("count").unwrap();
        store
            .set_quality_inspection(week, day, count)
            .context("Could not set quality inspections")?;
        println!(
            "Quality inspections for {} (week {}) set to {}",
            day, week, count
        );
    }
    Ok(())
}
