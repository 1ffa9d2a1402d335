// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{BudgetYearId, DayRecord};
use crate::storage::keys;
use crate::store::RecordStore;
use crate::utils::{parse_date, pretty_table, week_of, MAX_WEEK};
use crate::views::missing_days;
use anyhow::Result;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// `(issue tag, detail)`
pub type Finding = (String, String);

/// Documents that fail to load or parse.
pub fn check_documents(store: &RecordStore) -> Result<Vec<Finding>> {
    let mut rows = Vec::new();
    for key in store.persistence().storage().keys()? {
        if keys::is_backup(&key) {
            continue;
        }
        if let Err(e) = store.persistence().read_checked::<serde_json::Value>(&key) {
            rows.push(("unreadable_document".into(), format!("{}: {}", key, e)));
        }
    }
    Ok(rows)
}

fn unknown_refs<R: DayRecord>(store: &RecordStore, rows: &mut Vec<Finding>) {
    let mut seen = BTreeSet::new();
    for r in R::list(store.data()) {
        if store.person(r.person()).is_none() && seen.insert(r.person().to_string()) {
            let section = R::SECTION;
            rows.push((
                "unknown_person".into(),
                format!("{} ({} #{})", r.person(), section, r.id()),
            ));
        }
    }
}

/// Records pointing at people or services no longer in the catalogues.
pub fn check_references(store: &RecordStore) -> Vec<Finding> {
    let mut rows = Vec::new();
    unknown_refs::<crate::models::AvsAssignment>(store, &mut rows);
    unknown_refs::<crate::models::InsuranceAgreementSale>(store, &mut rows);
    unknown_refs::<crate::models::PrecalibratedTvCompletion>(store, &mut rows);
    unknown_refs::<crate::models::RepairTicket>(store, &mut rows);

    let mut services = BTreeSet::new();
    for a in &store.data().avs_assignments {
        if store.service(&a.service_id).is_none() && services.insert(a.service_id.clone()) {
            rows.push((
                "unknown_service".into(),
                format!("{} (AVS #{})", a.service_id, a.id),
            ));
        }
    }
    rows
}

/// Trading days in the last `weeks` weeks up to `through` with a section left
/// blank.
pub fn check_missing(
    store: &RecordStore,
    through: NaiveDate,
    weeks: u8,
) -> Vec<Finding> {
    let year: BudgetYearId = store.year();
    // A date in a later budget year checks through the end of this one.
    let last = match week_of(through) {
        Some((y, w)) if y == year => w,
        Some((y, _)) if y > year => MAX_WEEK,
        _ => return Vec::new(),
    };
    let first = last.saturating_sub(weeks.saturating_sub(1)).max(1);
    let mut rows = Vec::new();
    for week in first..=last {
        for m in missing_days(store.data(), year, week, through) {
            let sections: Vec<String> = m.missing.iter().map(|s| s.to_string()).collect();
            rows.push((
                if m.has_any_data {
                    "incomplete_day".into()
                } else {
                    "empty_day".into()
                },
                format!(
                    "week {} {} {}: {}",
                    week,
                    m.day,
                    m.date,
                    sections.join(", ")
                ),
            ));
        }
    }
    rows
}

pub fn handle(store: &RecordStore, m: &clap::ArgMatches) -> Result<()> {
    let through = match m.get_one::<String>("through") {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let weeks = *m.get_one::<u8>("weeks").unwrap_or(&8);

    let mut rows = check_documents(store)?;
    rows.extend(check_references(store));
    rows.extend(check_missing(store, through, weeks));

    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = rows.into_iter().map(|(a, b)| vec![a, b]).collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
