// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use salesreport::errors::{Error, Result};
use salesreport::models::{BudgetYearId, Day, Goal, RecordId, Section};
use salesreport::persistence::{BundledDefaults, Persistence};
use salesreport::storage::{keys, HomeDirStorage, StoragePort};
use salesreport::store::{AvsEntry, CountEntry, GoalScope, RecordStore};
use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;
use tempfile::tempdir;

const YEAR: BudgetYearId = BudgetYearId(2024);

fn open(dir: &Path) -> RecordStore {
    let storage = HomeDirStorage::at(dir).unwrap();
    RecordStore::open(
        Persistence::new(Box::new(storage), BundledDefaults::builtin()),
        YEAR,
    )
}

fn avs(day: Day, person: &str, service: &str, sold: u32) -> AvsEntry {
    AvsEntry {
        week: 1,
        day,
        person: person.into(),
        service_id: service.into(),
        sold,
        price_override: None,
    }
}

fn count(day: Day, person: &str, quantity: u32) -> CountEntry {
    CountEntry {
        week: 1,
        day,
        person: person.into(),
        quantity,
    }
}

#[test]
fn first_open_seeds_catalogues() {
    let dir = tempdir().unwrap();
    let store = open(dir.path());
    assert_eq!(store.people().len(), 4);
    assert!(store.service("avs-tv-3y").is_some());
    assert_eq!(store.goals().len(), 4);
    assert!(dir.path().join("people.json").exists());
    assert!(store.data().is_empty());
}

#[test]
fn seeding_happens_only_once() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store.remove_person("TJO").unwrap();
    drop(store);

    let store = open(dir.path());
    assert_eq!(store.people().len(), 3);
    assert!(store.person("TJO").is_none());
}

#[test]
fn avs_gm_is_frozen_at_submission() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    let id = store
        .set_avs_assignment(avs(Day::Monday, "ALH", "avs-tv-3y", 1))
        .unwrap();

    let mut service = store.service("avs-tv-3y").unwrap().clone();
    service.price = Decimal::from(1500);
    store.update_service(service).unwrap();
    drop(store);

    let store = open(dir.path());
    let sale = store
        .data()
        .avs_assignments
        .iter()
        .find(|a| a.id == id)
        .unwrap();
    assert_eq!(sale.price, Decimal::from(1290));
    assert_eq!(sale.gm, Decimal::from(980));
    assert_eq!(store.service("avs-tv-3y").unwrap().price, Decimal::from(1500));
}

#[test]
fn price_override_changes_gm() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    let mut entry = avs(Day::Tuesday, "KBO", "avs-pc-3y", 2);
    entry.price_override = Some(Decimal::from(900));
    store.set_avs_assignment(entry).unwrap();
    let sale = &store.data().avs_assignments[0];
    assert_eq!(sale.gm, Decimal::from(655));
    assert_eq!(sale.sold, 2);
}

#[test]
fn records_survive_reopen() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store
        .set_insurance_agreement(count(Day::Monday, "ALH", 2))
        .unwrap();
    store
        .set_precalibrated_tv(count(Day::Friday, "MNE", 1))
        .unwrap();
    store
        .set_avs_assignment(avs(Day::Monday, "ALH", "avs-tv-3y", 1))
        .unwrap();
    store.set_repair_ticket(count(Day::Tuesday, "KBO", 2)).unwrap();
    store.set_quality_inspection(1, Day::Friday, 4).unwrap();
    let before = store.data().clone();
    drop(store);

    let store = open(dir.path());
    assert_eq!(store.data(), &before);
    assert_eq!(store.data().next_id, 4);
    assert_eq!(store.data().avs_assignments[0].gm, Decimal::from(980));
    assert_eq!(store.data().repair_tickets[0].completed, 2);
    let week = store.data().week_dates.get(&1).unwrap();
    assert_eq!(week.start.to_string(), "2024-05-01");
    assert_eq!(week.end.to_string(), "2024-05-07");
}

#[test]
fn edit_by_day_index_touches_only_that_record() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store.set_repair_ticket(count(Day::Monday, "ALH", 1)).unwrap();
    store.set_repair_ticket(count(Day::Tuesday, "KBO", 2)).unwrap();
    store.set_repair_ticket(count(Day::Monday, "MNE", 3)).unwrap();

    let id = store
        .day_record_id(Section::RepairTickets, 1, Day::Monday, 1)
        .unwrap();
    store
        .edit_repair_ticket(id, count(Day::Monday, "MNE", 5))
        .unwrap();

    let monday = store.day_view::<salesreport::models::RepairTicket>(1, Day::Monday);
    assert_eq!(monday.len(), 2);
    assert_eq!((monday[0].person.as_str(), monday[0].completed), ("ALH", 1));
    assert_eq!((monday[1].person.as_str(), monday[1].completed), ("MNE", 5));
    let tuesday = store.day_view::<salesreport::models::RepairTicket>(1, Day::Tuesday);
    assert_eq!(tuesday[0].completed, 2);
    assert!(store
        .day_record_id(Section::RepairTickets, 1, Day::Monday, 2)
        .is_none());
}

#[test]
fn edit_can_move_a_record_to_another_day() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    let id = store
        .set_avs_assignment(avs(Day::Monday, "ALH", "setup-tv", 1))
        .unwrap();
    store
        .edit_avs_assignment(id, avs(Day::Wednesday, "ALH", "setup-tv", 3))
        .unwrap();
    assert!(store
        .day_view::<salesreport::models::AvsAssignment>(1, Day::Monday)
        .is_empty());
    let wed = store.day_view::<salesreport::models::AvsAssignment>(1, Day::Wednesday);
    assert_eq!(wed[0].id, id);
    assert_eq!(wed[0].gm, Decimal::from(379));
}

#[test]
fn unknown_references_are_rejected() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    assert!(matches!(
        store.set_avs_assignment(avs(Day::Monday, "ZZZ", "avs-tv-3y", 1)),
        Err(Error::UnknownPerson(p)) if p == "ZZZ"
    ));
    assert!(matches!(
        store.set_avs_assignment(avs(Day::Monday, "ALH", "nope", 1)),
        Err(Error::UnknownService(_))
    ));
    assert!(matches!(
        store.set_insurance_agreement(count(Day::Monday, "ALH", 0)),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        store.edit_repair_ticket(RecordId(99), count(Day::Monday, "ALH", 1)),
        Err(Error::RecordNotFound { .. })
    ));
    assert!(store.data().is_empty());
    assert!(!dir.path().join("budget-year-2024.json").exists());
}

#[test]
fn duplicate_catalogue_entries_are_rejected() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    let dup = store.people()[0].clone();
    assert!(matches!(
        store.add_person(dup),
        Err(Error::Duplicate { what: "Person", .. })
    ));
    assert!(matches!(
        store.remove_service("missing"),
        Err(Error::UnknownService(_))
    ));
}

#[test]
fn year_goals_override_global_goals() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    let goal = Goal {
        section: Section::RepairTickets,
        goals: vec![Decimal::from(1); 6],
    };
    store.set_goal(GoalScope::BudgetYear, goal.clone()).unwrap();
    assert_eq!(store.goals(), &[goal]);
    assert_eq!(store.global_goals().len(), 4);

    let too_many = Goal {
        section: Section::Avs,
        goals: vec![Decimal::ONE; 7],
    };
    assert!(store.set_goal(GoalScope::Global, too_many).is_err());
}

#[test]
fn corrupt_year_document_opens_empty() {
    let dir = tempdir().unwrap();
    let storage = HomeDirStorage::at(dir.path()).unwrap();
    storage
        .write(&keys::budget_year(YEAR), "{ \"avsAssignments\": [")
        .unwrap();

    let store = open(dir.path());
    assert!(store.data().is_empty());
    assert!(matches!(
        store
            .persistence()
            .read_checked::<serde_json::Value>(&keys::budget_year(YEAR)),
        Err(Error::Corrupt { .. })
    ));
}

#[test]
fn undecodable_year_document_does_not_block_writes() {
    let dir = tempdir().unwrap();
    let raw: [u8; 4] = [0xff, 0xfe, 0x00, 0x7b];
    std::fs::write(dir.path().join("budget-year-2024.json"), raw).unwrap();

    let mut store = open(dir.path());
    assert!(store.data().is_empty());
    store.set_repair_ticket(count(Day::Monday, "ALH", 1)).unwrap();
    drop(store);

    let store = open(dir.path());
    assert_eq!(store.data().repair_tickets.len(), 1);
    let backup = std::fs::read(dir.path().join("budget-year-2024.bak.json")).unwrap();
    assert_eq!(backup, raw);
}

#[test]
fn switching_years_loads_the_other_document() {
    let dir = tempdir().unwrap();
    let mut store = open(dir.path());
    store.set_repair_ticket(count(Day::Monday, "ALH", 1)).unwrap();
    store.switch_budget_year(BudgetYearId(2025));
    assert!(store.data().is_empty());
    store.set_repair_ticket(count(Day::Monday, "ALH", 2)).unwrap();

    assert_eq!(
        store.budget_years().unwrap(),
        vec![BudgetYearId(2024), BudgetYearId(2025)]
    );
    store.switch_budget_year(YEAR);
    assert_eq!(store.data().repair_tickets[0].completed, 1);
}

/// Storage that can be told to refuse writes.
struct FlakyStorage {
    inner: HomeDirStorage,
    fail: Rc<Cell<bool>>,
}

impl StoragePort for FlakyStorage {
    fn read(&self, key: &str) -> Result<Option<String>> {
        self.inner.read(key)
    }

    fn write(&self, key: &str, contents: &str) -> Result<()> {
        if self.fail.get() {
            return Err(Error::io(
                key,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ));
        }
        self.inner.write(key, contents)
    }

    fn exists(&self, key: &str) -> bool {
        self.inner.exists(key)
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys()
    }

    fn location(&self) -> &Path {
        self.inner.location()
    }
}

#[test]
fn failed_write_leaves_memory_unchanged() {
    let dir = tempdir().unwrap();
    let fail = Rc::new(Cell::new(false));
    let storage = FlakyStorage {
        inner: HomeDirStorage::at(dir.path()).unwrap(),
        fail: fail.clone(),
    };
    let mut store = RecordStore::open(
        Persistence::new(Box::new(storage), BundledDefaults::builtin()),
        YEAR,
    );
    store.set_repair_ticket(count(Day::Monday, "ALH", 1)).unwrap();
    let before = store.data().clone();

    fail.set(true);
    assert!(matches!(
        store.set_repair_ticket(count(Day::Monday, "KBO", 2)),
        Err(Error::Io { .. })
    ));
    assert!(store.remove_person("ALH").is_err());
    assert_eq!(store.data(), &before);
    assert!(store.person("ALH").is_some());
}
