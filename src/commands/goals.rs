// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Day, Goal, Section};
use crate::store::{GoalScope, RecordStore};
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};
use anyhow::{anyhow, Result};
use rust_decimal::Decimal;

/// Parses `"10,20,30"` into Monday-first cumulative targets.
pub fn parse_values(s: &str) -> Result<Vec<Decimal>> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(parse_decimal)
        .collect()
}

pub fn handle(store: &mut RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let scope = if store.year_settings().goals.is_empty() {
                "global"
            } else {
                "budget year"
            };
            let goals = store.goals();
            if !maybe_print_json(sub.get_flag("json"), &goals)? {
                let mut headers = vec!["Section"];
                headers.extend(Day::TRADING.iter().map(|d| &d.name()[..3]));
                let rows = goals
                    .iter()
                    .map(|g| {
                        let mut row = vec![g.section.to_string()];
                        row.extend(
                            (0..Day::TRADING.len())
                                .map(|i| g.goals.get(i).map(|v| v.to_string()).unwrap_or_default()),
                        );
                        row
                    })
                    .collect();
                println!("Goals for {} ({})", store.year(), scope);
                println!("{}", pretty_table(&headers, rows));
            }
        }
        Some(("set", sub)) => {
            let section: Section = sub
                .get_one::<String>("section")
                .unwrap()
                .parse()
                .map_err(|e: String| anyhow!(e))?;
            let goals = parse_values(sub.get_one::<String>("values").unwrap())?;
            let scope = if sub.get_flag("year-only") {
                GoalScope::BudgetYear
            } else {
                GoalScope::Global
            };
            store.set_goal(scope, Goal { section, goals })?;
            println!("Goals for {} updated", section);
        }
        _ => {}
    }
    Ok(())
}
