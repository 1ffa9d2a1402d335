// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::week_or_current;
use crate::store::RecordStore;
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, parse_day, pretty_table, week_range};
use crate::views::{day_summary, week_summary, SectionProgress, Totals};
use anyhow::Result;

fn totals_cells(t: &Totals) -> Vec<String> {
    vec![
        t.avs_sold.to_string(),
        fmt_money(&t.gm),
        t.insurance_sold.to_string(),
        t.tvs_completed.to_string(),
        t.repairs_completed.to_string(),
    ]
}

fn progress_table(progress: &[SectionProgress]) -> comfy_table::Table {
    let rows = progress
        .iter()
        .map(|p| {
            vec![
                p.section.to_string(),
                p.actual.round_dp(2).to_string(),
                p.target.round_dp(2).to_string(),
                fmt_percent(&p.ratio),
            ]
        })
        .collect();
    pretty_table(&["Section", "Actual", "Target", "Progress"], rows)
}

pub fn handle(store: &RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("day", sub)) => {
            let week = week_or_current(store, sub)?;
            let day = parse_day(sub.get_one::<String>("day").unwrap())?;
            let summary = day_summary(store.data(), store.goals(), week, day);
            if !maybe_print_json(sub.get_flag("json"), &summary)? {
                println!("{} of week {} ({})", day, week, store.year());
                let mut cells = vec!["Day".to_string()];
                cells.extend(totals_cells(&summary.totals));
                let mut cumulative = vec!["Mon..".to_string() + &day.name()[..3]];
                cumulative.extend(totals_cells(&summary.cumulative));
                println!(
                    "{}",
                    pretty_table(
                        &["", "AVS sold", "GM", "Insurance", "TVs", "Repairs"],
                        vec![cells, cumulative]
                    )
                );
                println!("{}", progress_table(&summary.progress));
                println!(
                    "People: {}  Quality inspections: {}  Daily progress: {}{}",
                    summary.people,
                    summary.quality_inspections,
                    fmt_percent(&summary.daily_progress),
                    if summary.all_goals_met {
                        "  (all goals met)"
                    } else {
                        ""
                    }
                );
            }
        }
        Some(("week", sub)) => {
            let week = week_or_current(store, sub)?;
            let summary = week_summary(
                store.data(),
                store.goals(),
                week,
                week_range(store.year(), week),
            );
            if !maybe_print_json(sub.get_flag("json"), &summary)? {
                match summary.range {
                    Some(r) => println!(
                        "Week {} ({}): {} .. {}",
                        week,
                        store.year(),
                        r.start,
                        r.end
                    ),
                    None => println!("Week {} ({})", week, store.year()),
                }
                let mut rows: Vec<Vec<String>> = summary
                    .days
                    .iter()
                    .map(|l| {
                        let mut row = vec![l.day.to_string()];
                        row.extend(totals_cells(&l.totals));
                        row
                    })
                    .collect();
                let mut total = vec!["Total".to_string()];
                total.extend(totals_cells(&summary.totals));
                rows.push(total);
                println!(
                    "{}",
                    pretty_table(
                        &["Day", "AVS sold", "GM", "Insurance", "TVs", "Repairs"],
                        rows
                    )
                );
                println!("{}", progress_table(&summary.progress));

                let people = summary
                    .people
                    .iter()
                    .map(|p| {
                        let name = store
                            .person(&p.person)
                            .map(|x| x.full_name())
                            .unwrap_or_else(|| p.person.clone());
                        let mut row = vec![name];
                        row.extend(totals_cells(&p.totals));
                        row
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["Person", "AVS sold", "GM", "Insurance", "TVs", "Repairs"],
                        people
                    )
                );
                println!(
                    "Quality inspections: {}  Overall progress: {}",
                    summary.quality_inspections,
                    fmt_percent(&summary.overall_progress)
                );
            }
        }
        _ => {}
    }
    Ok(())
}
