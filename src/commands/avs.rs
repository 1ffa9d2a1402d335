// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{day_opt, target_id, week_or_current};
use crate::models::{AvsAssignment, Section};
use crate::store::{AvsEntry, RecordStore};
use crate::utils::{
    fmt_money, maybe_print_json, parse_day, parse_decimal, person_code, pretty_table,
};
use anyhow::{Context, Result};
use serde::Serialize;

pub fn handle(store: &mut RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("edit", sub)) => edit(store, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(store: &mut RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let week = week_or_current(store, sub)?;
    let day = parse_day(sub.get_one::<String>("day").unwrap())?;
    let person = person_code(sub.get_one::<String>("person").unwrap());
    let service_id = sub.get_one::<String>("service").unwrap().trim().to_string();
    let sold = *sub.get_one::<u32>("sold").unwrap_or(&1);
    let price_override = sub
        .get_one::<String>("price")
        .map(|s| parse_decimal(s))
        .transpose()?;

    let id = store
        .set_avs_assignment(AvsEntry {
            week,
            day,
            person: person.clone(),
            service_id: service_id.clone(),
            sold,
            price_override,
        })
        .context("Could not record AVS sale")?;
    let gm = store
        .data()
        .avs_assignments
        .iter()
        .find(|a| a.id == id)
        .map(|a| a.gm)
        .unwrap_or_default();
    println!(
        "Recorded AVS #{}: {} x {} by {} on {} (week {}), GM {}",
        id,
        sold,
        service_id,
        person,
        day,
        week,
        fmt_money(&gm)
    );
    Ok(())
}

#[derive(Serialize)]
pub struct AvsRow {
    pub index: Option<usize>,
    pub id: u64,
    pub day: String,
    pub person: String,
    pub service: String,
    pub sold: u32,
    pub price: String,
    pub gm: String,
}

/// Rows for a week, or for one day with their day-view index.
pub fn query_rows(store: &RecordStore, sub: &clap::ArgMatches) -> Result<Vec<AvsRow>> {
    let week = week_or_current(store, sub)?;
    let to_row = |index: Option<usize>, a: &AvsAssignment| AvsRow {
        index,
        id: a.id.0,
        day: a.day.to_string(),
        person: a.person.clone(),
        service: a.service_id.clone(),
        sold: a.sold,
        price: fmt_money(&a.price),
        gm: fmt_money(&a.gm),
    };
    let rows = match day_opt(sub, "day")? {
        Some(day) => store
            .day_view::<AvsAssignment>(week, day)
            .into_iter()
            .enumerate()
            .map(|(i, a)| to_row(Some(i), a))
            .collect(),
        None => store
            .data()
            .avs_assignments
            .iter()
            .filter(|a| a.week == week)
            .map(|a| to_row(None, a))
            .collect(),
    };
    Ok(rows)
}

fn list(store: &RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, sub)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.index.map(|i| i.to_string()).unwrap_or_default(),
                    r.id.to_string(),
                    r.day.clone(),
                    r.person.clone(),
                    r.service.clone(),
                    r.sold.to_string(),
                    r.price.clone(),
                    r.gm.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["#", "Id", "Day", "Person", "Service", "Sold", "Price", "GM"],
                rows
            )
        );
    }
    Ok(())
}

fn edit(store: &mut RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = target_id(store, Section::Avs, sub)?;
    let existing = store
        .data()
        .avs_assignments
        .iter()
        .find(|a| a.id == id)
        .cloned()
        .with_context(|| format!("No AVS entry with id {}", id))?;

    let service_id = sub
        .get_one::<String>("service")
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| existing.service_id.clone());
    let price_override = sub
        .get_one::<String>("price")
        .map(|p| parse_decimal(p))
        .transpose()?;
    let entry = AvsEntry {
        week: existing.week,
        day: day_opt(sub, "to-day")?.unwrap_or(existing.day),
        person: sub
            .get_one::<String>("person")
            .map(|s| person_code(s))
            .unwrap_or(existing.person),
        service_id,
        sold: sub.get_one::<u32>("sold").copied().unwrap_or(existing.sold),
        price_override,
    };
    store
        .edit_avs_assignment(id, entry)
        .context("Could not edit AVS sale")?;
    println!("Updated AVS #{}", id);
    Ok(())
}
