// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-only rollups over a budget year's records. Nothing here is stored;
//! every view is recomputed from the record lists on each call.

use crate::models::{BudgetYearData, BudgetYearId, Day, DayRecord, Goal, Section, WeekRange};
use crate::utils::date_of;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub avs_sold: u32,
    pub gm: Decimal,
    pub insurance_sold: u32,
    pub tvs_completed: u32,
    pub repairs_completed: u32,
}

impl Totals {
    /// The figure a section's goal is measured against: GM for AVS, counts
    /// for the rest.
    pub fn goal_value(&self, section: Section) -> Decimal {
        match section {
            Section::Avs => self.gm,
            Section::InsuranceAgreements => Decimal::from(self.insurance_sold),
            Section::PrecalibratedTvs => Decimal::from(self.tvs_completed),
            Section::RepairTickets => Decimal::from(self.repairs_completed),
        }
    }

    pub fn count(&self, section: Section) -> u32 {
        match section {
            Section::Avs => self.avs_sold,
            Section::InsuranceAgreements => self.insurance_sold,
            Section::PrecalibratedTvs => self.tvs_completed,
            Section::RepairTickets => self.repairs_completed,
        }
    }

    pub fn is_empty(&self) -> bool {
        Section::ALL.iter().all(|s| self.count(*s) == 0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionProgress {
    pub section: Section,
    pub actual: Decimal,
    pub target: Decimal,
    /// `actual / target`; zero when there is no target.
    pub ratio: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub week: u8,
    pub day: Day,
    /// This day only.
    pub totals: Totals,
    /// Monday through this day.
    pub cumulative: Totals,
    pub people: usize,
    pub quality_inspections: u32,
    pub progress: Vec<SectionProgress>,
    /// Mean of the section ratios, each capped at 1 unless every goal is met.
    pub daily_progress: Decimal,
    pub all_goals_met: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayLine {
    pub day: Day,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonTotals {
    pub person: String,
    pub totals: Totals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekSummary {
    pub week: u8,
    pub range: Option<WeekRange>,
    pub days: Vec<DayLine>,
    pub totals: Totals,
    pub quality_inspections: u32,
    pub progress: Vec<SectionProgress>,
    pub overall_progress: Decimal,
    pub people: Vec<PersonTotals>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingDay {
    pub day: Day,
    pub date: NaiveDate,
    pub missing: Vec<Section>,
    pub has_any_data: bool,
}

fn sum_quantity<R: DayRecord>(list: &[R], keep: &impl Fn(u8, Day, &str) -> bool) -> u32 {
    list.iter()
        .filter(|r| keep(r.week(), r.day(), r.person()))
        .map(|r| r.quantity())
        .sum()
}

/// Sums every record accepted by `keep(week, day, person)`.
pub fn totals_where(data: &BudgetYearData, keep: impl Fn(u8, Day, &str) -> bool) -> Totals {
    Totals {
        avs_sold: sum_quantity(&data.avs_assignments, &keep),
        gm: data
            .avs_assignments
            .iter()
            .filter(|a| keep(a.week, a.day, &a.person))
            .map(|a| a.gm)
            .sum(),
        insurance_sold: sum_quantity(&data.insurance_agreements, &keep),
        tvs_completed: sum_quantity(&data.precalibrated_tvs, &keep),
        repairs_completed: sum_quantity(&data.repair_tickets, &keep),
    }
}

pub fn day_totals(data: &BudgetYearData, week: u8, day: Day) -> Totals {
    totals_where(data, |w, d, _| w == week && d == day)
}

/// Cumulative target for `section` at `day`. Sunday shares Saturday's target.
pub fn goal_target(goals: &[Goal], section: Section, day: Day) -> Decimal {
    let idx = day.index().min(Day::Saturday.index());
    goals
        .iter()
        .find(|g| g.section == section)
        .and_then(|g| g.goals.get(idx))
        .copied()
        .unwrap_or(Decimal::ZERO)
}

fn progress_for(totals: &Totals, goals: &[Goal], day: Day) -> Vec<SectionProgress> {
    Section::ALL
        .iter()
        .map(|&section| {
            let actual = totals.goal_value(section);
            let target = goal_target(goals, section, day);
            let ratio = if target.is_zero() {
                Decimal::ZERO
            } else {
                actual / target
            };
            SectionProgress {
                section,
                actual,
                target,
                ratio,
            }
        })
        .collect()
}

/// Returns (mean ratio, all goals met).
fn overall(progress: &[SectionProgress]) -> (Decimal, bool) {
    if progress.is_empty() {
        return (Decimal::ZERO, false);
    }
    let all_met = progress.iter().all(|p| p.ratio >= Decimal::ONE);
    let sum: Decimal = progress
        .iter()
        .map(|p| if all_met { p.ratio } else { p.ratio.min(Decimal::ONE) })
        .sum();
    (sum / Decimal::from(progress.len() as u32), all_met)
}

fn distinct_people(data: &BudgetYearData, keep: impl Fn(u8, Day) -> bool) -> BTreeSet<&str> {
    fn collect<'a, R: DayRecord>(
        list: &'a [R],
        keep: &impl Fn(u8, Day) -> bool,
        out: &mut BTreeSet<&'a str>,
    ) {
        out.extend(
            list.iter()
                .filter(|r| keep(r.week(), r.day()))
                .map(|r| r.person()),
        );
    }
    let mut out = BTreeSet::new();
    collect(&data.avs_assignments, &keep, &mut out);
    collect(&data.insurance_agreements, &keep, &mut out);
    collect(&data.precalibrated_tvs, &keep, &mut out);
    collect(&data.repair_tickets, &keep, &mut out);
    out
}

fn quality_inspections(data: &BudgetYearData, keep: impl Fn(u8, Day) -> bool) -> u32 {
    data.quality_inspections
        .iter()
        .filter(|qi| keep(qi.week, qi.day))
        .map(|qi| qi.count)
        .sum()
}

pub fn day_summary(data: &BudgetYearData, goals: &[Goal], week: u8, day: Day) -> DaySummary {
    let up_to = |w: u8, d: Day| w == week && d <= day;
    let cumulative = totals_where(data, |w, d, _| up_to(w, d));
    let progress = progress_for(&cumulative, goals, day);
    let (daily_progress, all_goals_met) = overall(&progress);
    DaySummary {
        week,
        day,
        totals: day_totals(data, week, day),
        people: distinct_people(data, up_to).len(),
        quality_inspections: quality_inspections(data, |w, d| w == week && d == day),
        cumulative,
        progress,
        daily_progress,
        all_goals_met,
    }
}

pub fn week_summary(
    data: &BudgetYearData,
    goals: &[Goal],
    week: u8,
    range: Option<WeekRange>,
) -> WeekSummary {
    let days = Day::ALL
        .iter()
        .map(|&day| DayLine {
            day,
            totals: day_totals(data, week, day),
        })
        .collect();
    let totals = totals_where(data, |w, _, _| w == week);
    let progress = progress_for(&totals, goals, Day::Saturday);
    let (overall_progress, _) = overall(&progress);

    let mut per_person: BTreeMap<&str, Totals> = BTreeMap::new();
    for person in distinct_people(data, |w, _| w == week) {
        per_person.insert(
            person,
            totals_where(data, |w, _, p| w == week && p == person),
        );
    }
    let mut people: Vec<PersonTotals> = per_person
        .into_iter()
        .map(|(person, totals)| PersonTotals {
            person: person.to_string(),
            totals,
        })
        .collect();
    people.sort_by(|a, b| {
        b.totals
            .gm
            .cmp(&a.totals.gm)
            .then_with(|| a.person.cmp(&b.person))
    });

    WeekSummary {
        week,
        range: range.or_else(|| data.week_dates.get(&week).copied()),
        days,
        totals,
        quality_inspections: quality_inspections(data, |w, _| w == week),
        progress,
        overall_progress,
        people,
    }
}

/// Trading days of `week` dated on or before `through` that lack records in
/// at least one section.
pub fn missing_days(
    data: &BudgetYearData,
    year: BudgetYearId,
    week: u8,
    through: NaiveDate,
) -> Vec<MissingDay> {
    Day::TRADING
        .iter()
        .filter_map(|&day| {
            let date = date_of(year, week, day)?;
            if date > through {
                return None;
            }
            let totals = day_totals(data, week, day);
            let missing: Vec<Section> = Section::ALL
                .iter()
                .copied()
                .filter(|s| totals.count(*s) == 0)
                .collect();
            if missing.is_empty() {
                return None;
            }
            Some(MissingDay {
                day,
                date,
                has_any_data: !totals.is_empty(),
                missing,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvsAssignment, RecordId, RepairTicket};

    fn avs(id: u64, day: Day, person: &str, sold: u32, gm: i64) -> AvsAssignment {
        AvsAssignment {
            id: RecordId(id),
            week: 1,
            day,
            person: person.into(),
            service_id: "svc".into(),
            sold,
            price: Decimal::from(gm + 5),
            gm: Decimal::from(gm),
        }
    }

    fn repair(id: u64, day: Day, person: &str, completed: u32) -> RepairTicket {
        RepairTicket {
            id: RecordId(id),
            week: 1,
            day,
            person: person.into(),
            completed,
        }
    }

    fn goal(section: Section, goals: &[i64]) -> Goal {
        Goal {
            section,
            goals: goals.iter().map(|g| Decimal::from(*g)).collect(),
        }
    }

    #[test]
    fn day_totals_sum_sold_and_gm() {
        let data = BudgetYearData {
            avs_assignments: vec![
                avs(1, Day::Monday, "A", 2, 10),
                avs(2, Day::Monday, "B", 3, 15),
                avs(3, Day::Tuesday, "A", 7, 99),
            ],
            ..Default::default()
        };
        let t = day_totals(&data, 1, Day::Monday);
        assert_eq!(t.avs_sold, 5);
        assert_eq!(t.gm, Decimal::from(25));
        assert!(day_totals(&data, 2, Day::Monday).is_empty());
    }

    #[test]
    fn day_summary_is_cumulative_and_caps_progress() {
        let data = BudgetYearData {
            avs_assignments: vec![
                avs(1, Day::Monday, "A", 1, 100),
                avs(2, Day::Tuesday, "B", 1, 300),
            ],
            repair_tickets: vec![repair(3, Day::Wednesday, "A", 2)],
            ..Default::default()
        };
        let goals = vec![
            goal(Section::Avs, &[100, 200, 300]),
            goal(Section::RepairTickets, &[1, 2, 4]),
        ];
        let s = day_summary(&data, &goals, 1, Day::Tuesday);
        assert_eq!(s.cumulative.gm, Decimal::from(400));
        assert_eq!(s.totals.gm, Decimal::from(300));
        assert_eq!(s.people, 2);
        // AVS 400/200 = 2 capped to 1, repairs 0/2, no targets for the rest.
        assert!(!s.all_goals_met);
        assert_eq!(s.daily_progress, Decimal::new(25, 2));
    }

    #[test]
    fn progress_uncapped_when_every_goal_met() {
        let data = BudgetYearData {
            avs_assignments: vec![avs(1, Day::Monday, "A", 1, 200)],
            ..Default::default()
        };
        let goals = vec![goal(Section::Avs, &[100])];
        let progress = progress_for(&day_totals(&data, 1, Day::Monday), &goals, Day::Monday);
        let only_avs: Vec<_> = progress
            .into_iter()
            .filter(|p| p.section == Section::Avs)
            .collect();
        let (mean, met) = overall(&only_avs);
        assert!(met);
        assert_eq!(mean, Decimal::from(2));
    }

    #[test]
    fn week_summary_ranks_people_by_gm() {
        let data = BudgetYearData {
            avs_assignments: vec![
                avs(1, Day::Monday, "A", 1, 10),
                avs(2, Day::Friday, "B", 2, 50),
            ],
            repair_tickets: vec![repair(3, Day::Saturday, "C", 4)],
            ..Default::default()
        };
        let goals = vec![goal(Section::RepairTickets, &[1, 2, 3, 4, 5, 8])];
        let w = week_summary(&data, &goals, 1, None);
        assert_eq!(w.totals.avs_sold, 3);
        assert_eq!(w.totals.repairs_completed, 4);
        assert_eq!(w.days.len(), 7);
        let order: Vec<&str> = w.people.iter().map(|p| p.person.as_str()).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        let repairs = w
            .progress
            .iter()
            .find(|p| p.section == Section::RepairTickets)
            .unwrap();
        assert_eq!(repairs.target, Decimal::from(8));
        assert_eq!(repairs.ratio, Decimal::new(5, 1));
    }

    #[test]
    fn missing_days_stop_at_cutoff() {
        let data = BudgetYearData {
            avs_assignments: vec![avs(1, Day::Monday, "A", 1, 10)],
            ..Default::default()
        };
        let year = BudgetYearId(2024);
        // Week 1 starts 2024-05-01; cut off on its third day.
        let through = NaiveDate::from_ymd_opt(2024, 5, 3).unwrap();
        let missing = missing_days(&data, year, 1, through);
        assert_eq!(missing.len(), 3);
        assert_eq!(missing[0].day, Day::Monday);
        assert!(missing[0].has_any_data);
        assert_eq!(missing[0].missing.len(), 3);
        assert_eq!(missing[2].day, Day::Wednesday);
        assert!(!missing[2].has_any_data);
    }
}
