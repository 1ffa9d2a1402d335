// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::BudgetYearData;
use crate::storage::keys;
use crate::store::RecordStore;
use crate::utils::{fmt_money, maybe_print_json, parse_decimal, pretty_table};
use anyhow::Result;
use serde::Serialize;

#[derive(Serialize)]
struct YearRow {
    year: String,
    active: bool,
    records: usize,
    weeks: usize,
}

pub fn handle(store: &mut RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let mut out = Vec::new();
            for year in store.budget_years()? {
                let data: BudgetYearData = if year == store.year() {
                    store.data().clone()
                } else {
                    store.persistence().read(&keys::budget_year(year))
                };
                out.push(YearRow {
                    year: year.to_string(),
                    active: year == store.year(),
                    records: data.avs_assignments.len()
                        + data.insurance_agreements.len()
                        + data.precalibrated_tvs.len()
                        + data.repair_tickets.len(),
                    weeks: data.week_dates.len(),
                });
            }
            if !maybe_print_json(sub.get_flag("json"), &out)? {
                let rows = out
                    .iter()
                    .map(|r| {
                        vec![
                            format!("{}{}", r.year, if r.active { " *" } else { "" }),
                            r.records.to_string(),
                            r.weeks.to_string(),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Budget year", "Records", "Weeks"], rows));
            }
        }
        Some(("settings", sub)) => {
            if let Some(gm) = sub.get_one::<String>("last-year-gm") {
                store.set_last_year_gm(parse_decimal(gm)?)?;
            }
            let settings = store.year_settings();
            if !maybe_print_json(sub.get_flag("json"), settings)? {
                println!("Budget year {}", store.year());
                println!("  last year GM: {}", fmt_money(&settings.last_year_gm));
                println!("  own goals:    {}", settings.goals.len());
            }
        }
        _ => {}
    }
    Ok(())
}
