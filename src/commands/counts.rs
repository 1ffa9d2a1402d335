// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Handlers shared by the three count-only sections: insurance agreements,
//! precalibrated TVs and repair tickets.

use super::{day_opt, target_id, week_or_current};
use crate::models::{
    BudgetYearData, DayRecord, InsuranceAgreementSale, PrecalibratedTvCompletion, RecordId,
    RepairTicket, Section,
};
use crate::store::{CountEntry, RecordStore};
use crate::utils::{maybe_print_json, parse_day, person_code, pretty_table};
use anyhow::{anyhow, Context, Result};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CountRow {
    pub index: Option<usize>,
    pub id: u64,
    pub day: String,
    pub person: String,
    pub quantity: u32,
}

/// Name of the quantity argument for a section.
fn qty_arg(section: Section) -> &'static str {
    match section {
        Section::InsuranceAgreements => "sold",
        _ => "completed",
    }
}

pub fn handle(store: &mut RecordStore, section: Section, m: &clap::ArgMatches) -> Result<()> {
    if section == Section::Avs {
        return Err(anyhow!("AVS sales are not a count-only section"));
    }
    match m.subcommand() {
        Some(("add", sub)) => add(store, section, sub)?,
        Some(("list", sub)) => list(store, section, sub)?,
        Some(("edit", sub)) => edit(store, section, sub)?,
        _ => {}
    }
    Ok(())
}

fn submit(store: &mut RecordStore, section: Section, entry: CountEntry) -> Result<RecordId> {
    let id = match section {
        Section::InsuranceAgreements => store.set_insurance_agreement(entry),
        Section::PrecalibratedTvs => store.set_precalibrated_tv(entry),
        Section::RepairTickets => store.set_repair_ticket(entry),
        Section::Avs => unreachable!("rejected in handle"),
    }?;
    Ok(id)
}

fn add(store: &mut RecordStore, section: Section, sub: &clap::ArgMatches) -> Result<()> {
    let entry = CountEntry {
        week: week_or_current(store, sub)?,
        day: parse_day(sub.get_one::<String>("day").unwrap())?,
        person: person_code(sub.get_one::<String>("person").unwrap()),
        quantity: *sub.get_one::<u32>(qty_arg(section)).unwrap_or(&1),
    };
    let summary = format!(
        "{} x {} by {} on {} (week {})",
        entry.quantity, section, entry.person, entry.day, entry.week
    );
    let id = submit(store, section, entry)
        .with_context(|| format!("Could not record {}", section))?;
    println!("Recorded #{}: {}", id, summary);
    Ok(())
}

fn rows_of<R: DayRecord>(
    store: &RecordStore,
    week: u8,
    day: Option<crate::models::Day>,
) -> Vec<CountRow> {
    let to_row = |index: Option<usize>, r: &R| CountRow {
        index,
        id: r.id().0,
        day: r.day().to_string(),
        person: r.person().to_string(),
        quantity: r.quantity(),
    };
    match day {
        Some(day) => store
            .day_view::<R>(week, day)
            .into_iter()
            .enumerate()
            .map(|(i, r)| to_row(Some(i), r))
            .collect(),
        None => R::list(store.data())
            .iter()
            .filter(|r| r.week() == week)
            .map(|r| to_row(None, r))
            .collect(),
    }
}

pub fn query_rows(
    store: &RecordStore,
    section: Section,
    sub: &clap::ArgMatches,
) -> Result<Vec<CountRow>> {
    let week = week_or_current(store, sub)?;
    let day = day_opt(sub, "day")?;
    Ok(match section {
        Section::InsuranceAgreements => rows_of::<InsuranceAgreementSale>(store, week, day),
        Section::PrecalibratedTvs => rows_of::<PrecalibratedTvCompletion>(store, week, day),
        Section::RepairTickets => rows_of::<RepairTicket>(store, week, day),
        Section::Avs => Vec::new(),
    })
}

fn list(store: &RecordStore, section: Section, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, section, sub)?;
    if !maybe_print_json(sub.get_flag("json"), &data)? {
        let rows = data
            .iter()
            .map(|r| {
                vec![
                    r.index.map(|i| i.to_string()).unwrap_or_default(),
                    r.id.to_string(),
                    r.day.clone(),
                    r.person.clone(),
                    r.quantity.to_string(),
                ]
            })
            .collect();
        let qty = if section == Section::InsuranceAgreements {
            "Sold"
        } else {
            "Completed"
        };
        println!("{}", pretty_table(&["#", "Id", "Day", "Person", qty], rows));
    }
    Ok(())
}

fn lookup<R: DayRecord>(data: &BudgetYearData, id: RecordId) -> Option<CountEntry> {
    R::list(data).iter().find(|r| r.id() == id).map(|r| CountEntry {
        week: r.week(),
        day: r.day(),
        person: r.person().to_string(),
        quantity: r.quantity(),
    })
}

fn edit(store: &mut RecordStore, section: Section, sub: &clap::ArgMatches) -> Result<()> {
    let id = target_id(store, section, sub)?;
    let existing = match section {
        Section::InsuranceAgreements => lookup::<InsuranceAgreementSale>(store.data(), id),
        Section::PrecalibratedTvs => lookup::<PrecalibratedTvCompletion>(store.data(), id),
        Section::RepairTickets => lookup::<RepairTicket>(store.data(), id),
        Section::Avs => None,
    }
    .with_context(|| format!("No {} entry with id {}", section, id))?;

    let entry = CountEntry {
        week: existing.week,
        day: day_opt(sub, "to-day")?.unwrap_or(existing.day),
        person: sub
            .get_one::<String>("person")
            .map(|s| person_code(s))
            .unwrap_or(existing.person),
        quantity: sub
            .get_one::<u32>(qty_arg(section))
            .copied()
            .unwrap_or(existing.quantity),
    };
    match section {
        Section::InsuranceAgreements => store.edit_insurance_agreement(id, entry),
        Section::PrecalibratedTvs => store.edit_precalibrated_tv(id, entry),
        Section::RepairTickets => store.edit_repair_ticket(id, entry),
        Section::Avs => unreachable!("rejected in handle"),
    }
    .with_context(|| format!("Could not edit {} #{}", section, id))?;
    println!("Updated {} #{}", section, id);
    Ok(())
}
