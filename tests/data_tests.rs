// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use salesreport::errors::Error;
use salesreport::models::{BudgetYearId, Day, FontSize, Person, RecordId, RecordsSnapshot};
use salesreport::persistence::{BundledDefaults, Persistence};
use salesreport::storage::HomeDirStorage;
use salesreport::store::{CountEntry, RecordStore};
use salesreport::{cli, commands};
use std::path::Path;
use tempfile::tempdir;

const YEAR: BudgetYearId = BudgetYearId(2024);

fn open(dir: &Path) -> RecordStore {
    let storage = HomeDirStorage::at(dir).unwrap();
    RecordStore::open(
        Persistence::new(Box::new(storage), BundledDefaults::builtin()),
        YEAR,
    )
}

fn repair(week: u8, person: &str, quantity: u32) -> CountEntry {
    CountEntry {
        week,
        day: Day::Monday,
        person: person.into(),
        quantity,
    }
}

fn data(store: &mut RecordStore, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["salesreport", "data"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    match matches.subcommand() {
        Some(("data", sub)) => commands::data::handle(store, sub),
        _ => panic!("no data subcommand"),
    }
}

#[test]
fn config_export_imports_into_a_fresh_store() {
    let dir = tempdir().unwrap();
    let mut store = open(&dir.path().join("a"));
    store
        .add_person(Person {
            code: "ZZ".into(),
            first_name: "Zed".into(),
            last_name: "Zulu".into(),
        })
        .unwrap();
    store.remove_service("setup-tv").unwrap();
    let out = dir.path().join("config.json");
    data(&mut store, &["export", "--what", "config", "--out", out.to_str().unwrap()]).unwrap();

    let mut other = open(&dir.path().join("b"));
    data(&mut other, &["import", "--what", "config", "--file", out.to_str().unwrap()]).unwrap();
    assert_eq!(other.config_snapshot(), store.config_snapshot());
    drop(other);

    let reopened = open(&dir.path().join("b"));
    assert!(reopened.person("ZZ").is_some());
    assert!(reopened.service("setup-tv").is_none());
}

#[test]
fn invalid_config_import_changes_nothing() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    let before = store.config_snapshot();

    let mut snapshot = before.clone();
    snapshot.people.push(snapshot.people[0].clone());
    snapshot.services.clear();
    assert!(matches!(
        store.import_config(snapshot),
        Err(Error::Duplicate { what: "Person", .. })
    ));

    let mut snapshot = before.clone();
    snapshot.services[0].cost = Decimal::from(-1);
    assert!(matches!(
        store.import_config(snapshot),
        Err(Error::Validation(_))
    ));
    assert_eq!(store.config_snapshot(), before);
    drop(store);
    assert_eq!(open(dir.path()).config_snapshot(), before);
}

#[test]
fn malformed_backup_file_is_rejected() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    let file = dir.path().join("broken.json");
    std::fs::write(&file, "{ \"people\": [ {\"code\": 1} ").unwrap();

    let err = data(&mut store, &["import", "--what", "config", "--file", file.to_str().unwrap()])
        .unwrap_err();
    assert!(err.to_string().contains("not a valid backup"));
    let err = data(&mut store, &["import", "--what", "records", "--file", file.to_str().unwrap()])
        .unwrap_err();
    assert!(err.to_string().contains("not a valid backup"));
    assert_eq!(store.people().len(), 4);
}

#[test]
fn records_import_repairs_next_id_and_week_dates() {
    let dir = tempdir().unwrap();
    let mut store = open(&dir.path().join("a"));
    store.set_repair_ticket(repair(3, "ALH", 2)).unwrap();
    store.set_repair_ticket(repair(5, "KBO", 1)).unwrap();
    let mut snapshot = store.records_snapshot();
    snapshot.data.next_id = 0;
    snapshot.data.week_dates.clear();

    let mut other = open(&dir.path().join("b"));
    assert_eq!(other.import_records(snapshot).unwrap(), YEAR);
    assert_eq!(other.data().next_id, 2);
    assert_eq!(
        other.data().week_dates.get(&5).unwrap().start.to_string(),
        "2024-05-29"
    );
    let id = other.set_repair_ticket(repair(5, "MNE", 1)).unwrap();
    assert_eq!(id, RecordId(3));
}

#[test]
fn records_import_rejects_duplicate_ids() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store.set_repair_ticket(repair(1, "ALH", 1)).unwrap();
    let mut snapshot = store.records_snapshot();
    let copy = snapshot.data.repair_tickets[0].clone();
    snapshot.data.repair_tickets.push(copy);
    assert!(matches!(
        store.import_records(snapshot),
        Err(Error::Validation(_))
    ));

    let mut snapshot = store.records_snapshot();
    snapshot.data.repair_tickets[0].week = 60;
    assert!(store.import_records(snapshot).is_err());
    assert_eq!(store.data().repair_tickets[0].week, 1);
}

#[test]
fn records_import_for_another_year_leaves_active_year_alone() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store.set_repair_ticket(repair(1, "ALH", 1)).unwrap();
    let snapshot = RecordsSnapshot {
        budget_year: BudgetYearId(2023),
        ..store.records_snapshot()
    };
    store.reset_user_data().unwrap();

    store.import_records(snapshot).unwrap();
    assert!(store.data().is_empty());
    store.switch_budget_year(BudgetYearId(2023));
    assert_eq!(store.data().repair_tickets.len(), 1);
}

#[test]
fn reset_user_data_keeps_catalogues() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store.set_repair_ticket(repair(1, "ALH", 1)).unwrap();
    store.switch_budget_year(BudgetYearId(2025));
    store.set_repair_ticket(repair(1, "KBO", 1)).unwrap();
    store.remove_person("TJO").unwrap();

    data(&mut store, &["reset", "--yes"]).unwrap();
    assert!(store.data().is_empty());
    assert_eq!(store.people().len(), 3);
    store.switch_budget_year(YEAR);
    assert!(store.data().is_empty());
}

#[test]
fn reset_all_restores_defaults() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store.set_repair_ticket(repair(1, "ALH", 1)).unwrap();
    store.remove_person("TJO").unwrap();
    store
        .update_settings(|s| s.theme.font_size = FontSize::Large)
        .unwrap();

    data(&mut store, &["reset", "--all", "--yes"]).unwrap();
    drop(store);

    let store = open(dir.path());
    assert!(store.data().is_empty());
    assert_eq!(store.people().len(), 4);
    assert!(store.person("TJO").is_some());
    assert_eq!(store.settings().theme.font_size, FontSize::Medium);
}

#[test]
fn reset_requires_confirmation() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store.set_repair_ticket(repair(1, "ALH", 1)).unwrap();
    assert!(data(&mut store, &["reset", "--all"]).is_err());
    assert_eq!(store.data().repair_tickets.len(), 1);
}
