// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The record store: in-memory state for the active budget year plus the
//! people/services/goals catalogues and settings. Every mutation is written
//! through to storage before the in-memory copy changes.

use crate::errors::{Error, Result};
use crate::models::{
    AvsAssignment, BudgetYearData, BudgetYearId, BudgetYearSettings, ConfigSnapshot, Day,
    DayRecord, Goal, InsuranceAgreementSale, Person, PrecalibratedTvCompletion,
    QualityInspection, RecordId, RecordsSnapshot, RepairTicket, Section, Service, Settings,
};
use crate::persistence::Persistence;
use crate::storage::keys;
use crate::utils::{week_range, MAX_WEEK};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// An AVS sale as submitted; price and GM are derived from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvsEntry {
    pub week: u8,
    pub day: Day,
    pub person: String,
    pub service_id: String,
    pub sold: u32,
    /// Replaces the catalogue price for this sale only.
    pub price_override: Option<Decimal>,
}

/// A count-only entry: insurance agreements sold, TVs or repairs completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountEntry {
    pub week: u8,
    pub day: Day,
    pub person: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalScope {
    Global,
    BudgetYear,
}

pub struct RecordStore {
    persistence: Persistence,
    year: BudgetYearId,
    data: BudgetYearData,
    year_settings: BudgetYearSettings,
    people: Vec<Person>,
    services: Vec<Service>,
    goals: Vec<Goal>,
    settings: Settings,
}

impl RecordStore {
    pub fn open(persistence: Persistence, year: BudgetYearId) -> Self {
        let people = persistence.read(keys::PEOPLE);
        let services = persistence.read(keys::SERVICES);
        let goals = persistence.read(keys::GOALS);
        let settings = persistence.read(keys::SETTINGS);
        let data: BudgetYearData = persistence.read(&keys::budget_year(year));
        let year_settings = persistence.read(&keys::budget_year_settings(year));
        info!(
            year = %year,
            avs = data.avs_assignments.len(),
            insurance = data.insurance_agreements.len(),
            tvs = data.precalibrated_tvs.len(),
            repairs = data.repair_tickets.len(),
            "record store opened"
        );
        RecordStore {
            persistence,
            year,
            data,
            year_settings,
            people,
            services,
            goals,
            settings,
        }
    }

    pub fn year(&self) -> BudgetYearId {
        self.year
    }

    pub fn data(&self) -> &BudgetYearData {
        &self.data
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn year_settings(&self) -> &BudgetYearSettings {
        &self.year_settings
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Goals in force for the active year: the year's own list when it has
    /// one, the global list otherwise.
    pub fn goals(&self) -> &[Goal] {
        if self.year_settings.goals.is_empty() {
            &self.goals
        } else {
            &self.year_settings.goals
        }
    }

    pub fn global_goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn person(&self, code: &str) -> Option<&Person> {
        self.people.iter().find(|p| p.code == code)
    }

    pub fn service(&self, id: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }

    pub fn switch_budget_year(&mut self, year: BudgetYearId) {
        self.data = self.persistence.read(&keys::budget_year(year));
        self.year_settings = self.persistence.read(&keys::budget_year_settings(year));
        self.year = year;
        info!(year = %year, "switched budget year");
    }

    /// Years with a stored data document, plus the active one.
    pub fn budget_years(&self) -> Result<Vec<BudgetYearId>> {
        let mut years: Vec<BudgetYearId> = self
            .persistence
            .storage()
            .keys()?
            .iter()
            .filter_map(|k| keys::parse_budget_year(k))
            .collect();
        if !years.contains(&self.year) {
            years.push(self.year);
        }
        years.sort();
        Ok(years)
    }

    // ----- transaction records -------------------------------------------

    pub fn set_avs_assignment(&mut self, entry: AvsEntry) -> Result<RecordId> {
        let (price, gm) = self.price_and_gm(&entry)?;
        self.append(|id| AvsAssignment {
            id,
            week: entry.week,
            day: entry.day,
            person: entry.person,
            service_id: entry.service_id,
            sold: entry.sold,
            price,
            gm,
        })
    }

    pub fn set_insurance_agreement(&mut self, entry: CountEntry) -> Result<RecordId> {
        self.check_count(&entry)?;
        self.append(|id| InsuranceAgreementSale {
            id,
            week: entry.week,
            day: entry.day,
            person: entry.person,
            sold: entry.quantity,
        })
    }

    pub fn set_precalibrated_tv(&mut self, entry: CountEntry) -> Result<RecordId> {
        self.check_count(&entry)?;
        self.append(|id| PrecalibratedTvCompletion {
            id,
            week: entry.week,
            day: entry.day,
            person: entry.person,
            completed: entry.quantity,
        })
    }

    pub fn set_repair_ticket(&mut self, entry: CountEntry) -> Result<RecordId> {
        self.check_count(&entry)?;
        self.append(|id| RepairTicket {
            id,
            week: entry.week,
            day: entry.day,
            person: entry.person,
            completed: entry.quantity,
        })
    }

    /// Replaces the AVS record `id`. Price and GM stay frozen while the
    /// service and price are unchanged; a new service or price derives them
    /// again from the current catalogue, as for a fresh submission.
    pub fn edit_avs_assignment(&mut self, id: RecordId, entry: AvsEntry) -> Result<()> {
        let existing = self
            .data
            .avs_assignments
            .iter()
            .find(|a| a.id == id)
            .ok_or(Error::RecordNotFound {
                kind: Section::Avs.label(),
                id,
            })?;
        let unchanged = entry.service_id == existing.service_id
            && entry.price_override.is_none_or(|p| p == existing.price);
        let (price, gm) = if unchanged {
            check_week(entry.week)?;
            check_quantity(entry.sold, "sold")?;
            self.check_person(&entry.person)?;
            (existing.price, existing.gm)
        } else {
            self.price_and_gm(&entry)?
        };
        self.replace(AvsAssignment {
            id,
            week: entry.week,
            day: entry.day,
            person: entry.person,
            service_id: entry.service_id,
            sold: entry.sold,
            price,
            gm,
        })
    }

    pub fn edit_insurance_agreement(&mut self, id: RecordId, entry: CountEntry) -> Result<()> {
        self.check_count(&entry)?;
        self.replace(InsuranceAgreementSale {
            id,
            week: entry.week,
            day: entry.day,
            person: entry.person,
            sold: entry.quantity,
        })
    }

    pub fn edit_precalibrated_tv(&mut self, id: RecordId, entry: CountEntry) -> Result<()> {
        self.check_count(&entry)?;
        self.replace(PrecalibratedTvCompletion {
            id,
            week: entry.week,
            day: entry.day,
            person: entry.person,
            completed: entry.quantity,
        })
    }

    pub fn edit_repair_ticket(&mut self, id: RecordId, entry: CountEntry) -> Result<()> {
        self.check_count(&entry)?;
        self.replace(RepairTicket {
            id,
            week: entry.week,
            day: entry.day,
            person: entry.person,
            completed: entry.quantity,
        })
    }

    /// Records of one kind logged on `day` of `week`, in entry order.
    pub fn day_view<R: DayRecord>(&self, week: u8, day: Day) -> Vec<&R> {
        R::list(&self.data)
            .iter()
            .filter(|r| r.week() == week && r.day() == day)
            .collect()
    }

    /// Maps a row of the day view to the record's stable id.
    pub fn day_record_id(
        &self,
        section: Section,
        week: u8,
        day: Day,
        index: usize,
    ) -> Option<RecordId> {
        fn nth<R: DayRecord>(
            s: &RecordStore,
            week: u8,
            day: Day,
            index: usize,
        ) -> Option<RecordId> {
            s.day_view::<R>(week, day).get(index).map(|r| r.id())
        }
        match section {
            Section::Avs => nth::<AvsAssignment>(self, week, day, index),
            Section::InsuranceAgreements => nth::<InsuranceAgreementSale>(self, week, day, index),
            Section::PrecalibratedTvs => nth::<PrecalibratedTvCompletion>(self, week, day, index),
            Section::RepairTickets => nth::<RepairTicket>(self, week, day, index),
        }
    }

    pub fn set_quality_inspection(&mut self, week: u8, day: Day, count: u32) -> Result<()> {
        check_week(week)?;
        let mut next = self.data.clone();
        next.quality_inspections
            .retain(|qi| !(qi.week == week && qi.day == day));
        next.quality_inspections
            .push(QualityInspection { week, day, count });
        self.note_week(&mut next, week);
        self.commit_data(next)?;
        info!(week, day = %day, count, "quality inspections set");
        Ok(())
    }

    // ----- catalogues ------------------------------------------------------

    pub fn add_person(&mut self, person: Person) -> Result<()> {
        if person.code.trim().is_empty() {
            return Err(Error::Validation("person code is required".into()));
        }
        if self.person(&person.code).is_some() {
            return Err(Error::Duplicate {
                what: "Person",
                key: person.code,
            });
        }
        let mut next = self.people.clone();
        next.push(person);
        self.persistence.write(keys::PEOPLE, &next)?;
        self.people = next;
        Ok(())
    }

    /// Removes a person from the catalogue; their logged records stay.
    pub fn remove_person(&mut self, code: &str) -> Result<Person> {
        let pos = self
            .people
            .iter()
            .position(|p| p.code == code)
            .ok_or_else(|| Error::UnknownPerson(code.to_string()))?;
        let mut next = self.people.clone();
        let removed = next.remove(pos);
        self.persistence.write(keys::PEOPLE, &next)?;
        self.people = next;
        Ok(removed)
    }

    pub fn add_service(&mut self, service: Service) -> Result<()> {
        if service.id.trim().is_empty() {
            return Err(Error::Validation("service id is required".into()));
        }
        if self.service(&service.id).is_some() {
            return Err(Error::Duplicate {
                what: "Service",
                key: service.id,
            });
        }
        check_amounts(&service)?;
        let mut next = self.services.clone();
        next.push(service);
        self.persistence.write(keys::SERVICES, &next)?;
        self.services = next;
        Ok(())
    }

    /// Replaces a catalogue entry. Already logged AVS sales keep their
    /// price and GM.
    pub fn update_service(&mut self, service: Service) -> Result<()> {
        check_amounts(&service)?;
        let mut next = self.services.clone();
        let slot = next
            .iter_mut()
            .find(|s| s.id == service.id)
            .ok_or_else(|| Error::UnknownService(service.id.clone()))?;
        *slot = service;
        self.persistence.write(keys::SERVICES, &next)?;
        self.services = next;
        Ok(())
    }

    pub fn remove_service(&mut self, id: &str) -> Result<Service> {
        let pos = self
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::UnknownService(id.to_string()))?;
        let mut next = self.services.clone();
        let removed = next.remove(pos);
        self.persistence.write(keys::SERVICES, &next)?;
        self.services = next;
        Ok(removed)
    }

    /// Sets the cumulative Monday..Saturday targets for one section.
    pub fn set_goal(&mut self, scope: GoalScope, goal: Goal) -> Result<()> {
        check_goal(&goal)?;
        match scope {
            GoalScope::Global => {
                let mut next = self.goals.clone();
                upsert_goal(&mut next, goal);
                self.persistence.write(keys::GOALS, &next)?;
                self.goals = next;
            }
            GoalScope::BudgetYear => {
                let mut next = self.year_settings.clone();
                upsert_goal(&mut next.goals, goal);
                self.write_year_settings(next)?;
            }
        }
        Ok(())
    }

    pub fn set_last_year_gm(&mut self, gm: Decimal) -> Result<()> {
        let mut next = self.year_settings.clone();
        next.last_year_gm = gm;
        self.write_year_settings(next)
    }

    pub fn update_settings(&mut self, change: impl FnOnce(&mut Settings)) -> Result<()> {
        let mut next = self.settings.clone();
        change(&mut next);
        self.persistence.write(keys::SETTINGS, &next)?;
        self.settings = next;
        Ok(())
    }

    // ----- data management -------------------------------------------------

    pub fn config_snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot {
            people: self.people.clone(),
            services: self.services.clone(),
            goals: self.goals.clone(),
        }
    }

    /// Replaces the people, services and global goals documents. Nothing is
    /// written unless the whole snapshot validates.
    pub fn import_config(&mut self, snapshot: ConfigSnapshot) -> Result<()> {
        check_config(&snapshot)?;
        let ConfigSnapshot {
            people,
            services,
            goals,
        } = snapshot;
        info!(
            people = people.len(),
            services = services.len(),
            goals = goals.len(),
            "importing configuration"
        );
        self.persistence.write(keys::PEOPLE, &people)?;
        self.people = people;
        self.persistence.write(keys::SERVICES, &services)?;
        self.services = services;
        self.persistence.write(keys::GOALS, &goals)?;
        self.goals = goals;
        Ok(())
    }

    pub fn records_snapshot(&self) -> RecordsSnapshot {
        RecordsSnapshot {
            budget_year: self.year,
            data: self.data.clone(),
            settings: self.year_settings.clone(),
        }
    }

    /// Replaces the records and settings of the snapshot's budget year, which
    /// need not be the active one. Record ids must be unique; `nextId` and
    /// `weekDates` are brought in line with the imported records.
    pub fn import_records(&mut self, snapshot: RecordsSnapshot) -> Result<BudgetYearId> {
        let RecordsSnapshot {
            budget_year,
            mut data,
            settings,
        } = snapshot;
        check_year_data(budget_year, &mut data)?;
        for goal in &settings.goals {
            check_goal(goal)?;
        }
        let active = budget_year == self.year;
        self.persistence
            .write(&keys::budget_year(budget_year), &data)?;
        info!(year = %budget_year, records = record_count(&data), "records imported");
        if active {
            self.data = data;
        }
        self.persistence
            .write(&keys::budget_year_settings(budget_year), &settings)?;
        if active {
            self.year_settings = settings;
        }
        Ok(budget_year)
    }

    /// Empties the records of every stored budget year. Catalogues, goals and
    /// settings are kept. Returns the number of years reset.
    pub fn reset_user_data(&mut self) -> Result<usize> {
        let years = self.budget_years()?;
        for &year in &years {
            self.persistence
                .write(&keys::budget_year(year), &BudgetYearData::default())?;
            if year == self.year {
                self.data = BudgetYearData::default();
            }
        }
        info!(years = years.len(), "user data reset");
        Ok(years.len())
    }

    /// Resets records, year settings and settings, and restores the bundled
    /// people, services and goals.
    pub fn reset_all_data(&mut self) -> Result<()> {
        self.reset_user_data()?;
        let stored = self.persistence.storage().keys()?;
        for year in stored
            .iter()
            .filter_map(|k| keys::parse_budget_year_settings(k))
        {
            self.persistence.write(
                &keys::budget_year_settings(year),
                &BudgetYearSettings::default(),
            )?;
            if year == self.year {
                self.year_settings = BudgetYearSettings::default();
            }
        }
        self.people = self.restore_catalogue(keys::PEOPLE)?;
        self.services = self.restore_catalogue(keys::SERVICES)?;
        self.goals = self.restore_catalogue(keys::GOALS)?;
        self.persistence.write(keys::SETTINGS, &Settings::default())?;
        self.settings = Settings::default();
        info!("all data reset to defaults");
        Ok(())
    }

    fn restore_catalogue<T>(&self, key: &str) -> Result<T>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        if self.persistence.restore_default(key)? {
            return Ok(self.persistence.read(key));
        }
        let empty = T::default();
        self.persistence.write(key, &empty)?;
        Ok(empty)
    }

    // ----- internals -------------------------------------------------------

    fn price_and_gm(&self, entry: &AvsEntry) -> Result<(Decimal, Decimal)> {
        check_week(entry.week)?;
        check_quantity(entry.sold, "sold")?;
        self.check_person(&entry.person)?;
        let service = self
            .service(&entry.service_id)
            .ok_or_else(|| Error::UnknownService(entry.service_id.clone()))?;
        let price = entry.price_override.unwrap_or(service.price);
        if price.is_sign_negative() {
            return Err(Error::Validation("price cannot be negative".into()));
        }
        Ok((price, price - service.cost))
    }

    fn check_count(&self, entry: &CountEntry) -> Result<()> {
        check_week(entry.week)?;
        check_quantity(entry.quantity, "quantity")?;
        self.check_person(&entry.person)
    }

    fn check_person(&self, code: &str) -> Result<()> {
        if code.trim().is_empty() {
            return Err(Error::Validation("person is required".into()));
        }
        if self.person(code).is_none() {
            return Err(Error::UnknownPerson(code.to_string()));
        }
        Ok(())
    }

    fn note_week(&self, data: &mut BudgetYearData, week: u8) {
        if let Some(range) = week_range(self.year, week) {
            data.week_dates.entry(week).or_insert(range);
        }
    }

    fn append<R: DayRecord>(&mut self, build: impl FnOnce(RecordId) -> R) -> Result<RecordId> {
        let mut next = self.data.clone();
        let id = next.allocate_id();
        let record = build(id);
        let (week, day) = (record.week(), record.day());
        self.note_week(&mut next, week);
        R::list_mut(&mut next).push(record);
        self.commit_data(next)?;
        let section = R::SECTION;
        info!(section = %section, id = %id, week, day = %day, "record added");
        Ok(id)
    }

    fn replace<R: DayRecord>(&mut self, record: R) -> Result<()> {
        let id = record.id();
        let week = record.week();
        let mut next = self.data.clone();
        let slot = R::list_mut(&mut next)
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or(Error::RecordNotFound {
                kind: R::SECTION.label(),
                id,
            })?;
        *slot = record;
        self.note_week(&mut next, week);
        self.commit_data(next)?;
        let section = R::SECTION;
        info!(section = %section, id = %id, "record edited");
        Ok(())
    }

    fn commit_data(&mut self, next: BudgetYearData) -> Result<()> {
        self.persistence
            .write(&keys::budget_year(self.year), &next)?;
        self.data = next;
        Ok(())
    }

    fn write_year_settings(&mut self, next: BudgetYearSettings) -> Result<()> {
        self.persistence
            .write(&keys::budget_year_settings(self.year), &next)?;
        self.year_settings = next;
        Ok(())
    }
}

fn check_week(week: u8) -> Result<()> {
    if (1..=MAX_WEEK).contains(&week) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "week must be 1..={}, got {}",
            MAX_WEEK, week
        )))
    }
}

fn check_quantity(n: u32, field: &str) -> Result<()> {
    if n == 0 {
        return Err(Error::Validation(format!("{} must be at least 1", field)));
    }
    Ok(())
}

fn check_amounts(service: &Service) -> Result<()> {
    if service.price.is_sign_negative() || service.cost.is_sign_negative() {
        return Err(Error::Validation(format!(
            "service '{}' price and cost cannot be negative",
            service.id
        )));
    }
    Ok(())
}

fn check_goal(goal: &Goal) -> Result<()> {
    if goal.goals.len() > Day::TRADING.len() {
        return Err(Error::Validation(format!(
            "at most {} daily goals, got {}",
            Day::TRADING.len(),
            goal.goals.len()
        )));
    }
    if goal.goals.iter().any(|g| g.is_sign_negative()) {
        return Err(Error::Validation("goals cannot be negative".into()));
    }
    Ok(())
}

fn check_config(snapshot: &ConfigSnapshot) -> Result<()> {
    let mut codes = BTreeSet::new();
    for person in &snapshot.people {
        if person.code.trim().is_empty() {
            return Err(Error::Validation("person code is required".into()));
        }
        if !codes.insert(person.code.as_str()) {
            return Err(Error::Duplicate {
                what: "Person",
                key: person.code.clone(),
            });
        }
    }
    let mut ids = BTreeSet::new();
    for service in &snapshot.services {
        if service.id.trim().is_empty() {
            return Err(Error::Validation("service id is required".into()));
        }
        if !ids.insert(service.id.as_str()) {
            return Err(Error::Duplicate {
                what: "Service",
                key: service.id.clone(),
            });
        }
        check_amounts(service)?;
    }
    let mut sections = BTreeSet::new();
    for goal in &snapshot.goals {
        if !sections.insert(goal.section) {
            return Err(Error::Duplicate {
                what: "Goal",
                key: goal.section.to_string(),
            });
        }
        check_goal(goal)?;
    }
    Ok(())
}

fn scan_records<R: DayRecord>(
    list: &[R],
    ids: &mut BTreeSet<RecordId>,
    weeks: &mut BTreeSet<u8>,
) -> Result<()> {
    for r in list {
        check_week(r.week())?;
        check_quantity(r.quantity(), R::SECTION.label())?;
        if !ids.insert(r.id()) {
            return Err(Error::Validation(format!("duplicate record id {}", r.id())));
        }
        weeks.insert(r.week());
    }
    Ok(())
}

/// Validates an imported year and repairs its derived fields.
fn check_year_data(year: BudgetYearId, data: &mut BudgetYearData) -> Result<()> {
    let mut ids = BTreeSet::new();
    let mut weeks = BTreeSet::new();
    scan_records(&data.avs_assignments, &mut ids, &mut weeks)?;
    scan_records(&data.insurance_agreements, &mut ids, &mut weeks)?;
    scan_records(&data.precalibrated_tvs, &mut ids, &mut weeks)?;
    scan_records(&data.repair_tickets, &mut ids, &mut weeks)?;
    if let Some(a) = data.avs_assignments.iter().find(|a| a.price.is_sign_negative()) {
        return Err(Error::Validation(format!(
            "AVS record {} has a negative price",
            a.id
        )));
    }
    let mut slots = BTreeSet::new();
    for qi in &data.quality_inspections {
        check_week(qi.week)?;
        if !slots.insert((qi.week, qi.day)) {
            return Err(Error::Validation(format!(
                "two quality inspection counts for {} of week {}",
                qi.day, qi.week
            )));
        }
        weeks.insert(qi.week);
    }

    let max_id = ids.last().map_or(0, |id| id.0);
    data.next_id = data.next_id.max(max_id);
    data.week_dates = weeks
        .into_iter()
        .filter_map(|week| week_range(year, week).map(|range| (week, range)))
        .collect();
    Ok(())
}

fn record_count(data: &BudgetYearData) -> usize {
    data.avs_assignments.len()
        + data.insurance_agreements.len()
        + data.precalibrated_tvs.len()
        + data.repair_tickets.len()
}

fn upsert_goal(goals: &mut Vec<Goal>, goal: Goal) {
    match goals.iter_mut().find(|g| g.section == goal.section) {
        Some(slot) => *slot = goal,
        None => goals.push(goal),
    }
}
