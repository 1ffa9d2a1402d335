// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod avs;
pub mod counts;
pub mod quality;
pub mod people;
pub mod services;
pub mod goals;
pub mod years;
pub mod reports;
pub mod exporter;
pub mod data;
pub mod settings;
pub mod doctor;

use crate::models::{Day, RecordId, Section};
use crate::store::RecordStore;
use crate::utils::{parse_day, week_of};
use anyhow::{Context, Result};

/// `--week`, or the current week when the active budget year is this one.
pub(crate) fn week_or_current(store: &RecordStore, sub: &clap::ArgMatches) -> Result<u8> {
    if let Some(w) = sub.get_one::<u8>("week") {
        return Ok(*w);
    }
    let today = chrono::Local::now().date_naive();
    match week_of(today) {
        Some((year, week)) if year == store.year() => Ok(week),
        _ => Err(anyhow::anyhow!(
            "--week is required for budget year {}",
            store.year()
        )),
    }
}

pub(crate) fn day_opt(sub: &clap::ArgMatches, name: &str) -> Result<Option<Day>> {
    sub.get_one::<String>(name).map(|s| parse_day(s)).transpose()
}

/// Resolves `--id` or `--day/--index` to a record id.
pub(crate) fn target_id(
    store: &RecordStore,
    section: Section,
    sub: &clap::ArgMatches,
) -> Result<RecordId> {
    if let Some(id) = sub.get_one::<u64>("id") {
        return Ok(RecordId(*id));
    }
    let week = week_or_current(store, sub)?;
    let day = day_opt(sub, "day")?.context("--index needs --day")?;
    let index = *sub.get_one::<usize>("index").context("--id or --index is required")?;
    store
        .day_record_id(section, week, day, index)
        .with_context(|| {
            format!(
                "No {} entry at row {} for {} in week {}",
                section, index, day, week
            )
        })
}
