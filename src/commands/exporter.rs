// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::week_or_current;
use crate::store::RecordStore;
use crate::utils::{date_of, fmt_money, week_key, week_range};
use crate::views::{week_summary, Totals};
use anyhow::{bail, Result};
use serde_json::json;

pub fn handle(store: &RecordStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("week", sub)) => export_week(store, sub),
        _ => Ok(()),
    }
}

fn totals_record(t: &Totals) -> [String; 5] {
    [
        t.avs_sold.to_string(),
        fmt_money(&t.gm),
        t.insurance_sold.to_string(),
        t.tvs_completed.to_string(),
        t.repairs_completed.to_string(),
    ]
}

fn export_week(store: &RecordStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let year = store.year();
    let week = week_or_current(store, sub)?;
    let key = week_key(year, week);
    let summary = week_summary(store.data(), store.goals(), week, week_range(year, week));

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "week", "day", "date", "avs_sold", "gm", "insurance_sold", "tvs_completed",
                "repairs_completed",
            ])?;
            for line in &summary.days {
                let date = date_of(year, week, line.day)
                    .map(|d| d.to_string())
                    .unwrap_or_default();
                let mut record = vec![key.clone(), line.day.to_string(), date];
                record.extend(totals_record(&line.totals));
                wtr.write_record(&record)?;
            }
            let mut total = vec![key.clone(), "Total".to_string(), String::new()];
            total.extend(totals_record(&summary.totals));
            wtr.write_record(&total)?;
            wtr.flush()?;
        }
        _ => {
            let doc = json!({
                "budgetYear": year.to_string(),
                "weekKey": key,
                "summary": summary,
            });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
    }
    println!("Exported week {} to {}", key, out);
    Ok(())
}
