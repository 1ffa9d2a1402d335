// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::{BudgetYearId, Day, WeekRange};

/// Budget years start on the first of this month.
pub const BUDGET_YEAR_START_MONTH: u32 = 5;
pub const MAX_WEEK: u8 = 53;

static BUDGET_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:/(\d{4}))?$").expect("static regex"));
static WEEK_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})(?:/\d{4})?-(\d{1,2})$").expect("static regex"));

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Person codes are stored upper-case.
pub fn person_code(s: &str) -> String {
    s.trim().to_uppercase()
}

pub fn parse_day(s: &str) -> Result<Day> {
    s.parse::<Day>().map_err(anyhow::Error::msg)
}

/// Accepts `2024` or `2024/2025`.
pub fn parse_budget_year(s: &str) -> Result<BudgetYearId> {
    let caps = BUDGET_YEAR_RE
        .captures(s.trim())
        .with_context(|| format!("Invalid budget year '{}', expected YYYY or YYYY/YYYY", s))?;
    let start: i32 = caps[1].parse()?;
    if let Some(end) = caps.get(2) {
        let end: i32 = end.as_str().parse()?;
        if end != start + 1 {
            return Err(anyhow::anyhow!(
                "Invalid budget year '{}': years must be consecutive",
                s
            ));
        }
    }
    Ok(BudgetYearId(start))
}

/// Parses a week key such as `2024/2025-07` or `2024-7`.
pub fn parse_week_key(s: &str) -> Result<(BudgetYearId, u8)> {
    let caps = WEEK_KEY_RE
        .captures(s.trim())
        .with_context(|| format!("Invalid week key '{}', expected YYYY/YYYY-WW", s))?;
    let year = BudgetYearId(caps[1].parse()?);
    let week = validate_week(caps[2].parse()?)?;
    Ok((year, week))
}

pub fn week_key(year: BudgetYearId, week: u8) -> String {
    format!("{}-{:02}", year, week)
}

pub fn validate_week(week: u8) -> Result<u8> {
    if (1..=MAX_WEEK).contains(&week) {
        Ok(week)
    } else {
        Err(anyhow::anyhow!(
            "Invalid week {}, expected 1..={}",
            week,
            MAX_WEEK
        ))
    }
}

pub fn budget_year_of(date: NaiveDate) -> BudgetYearId {
    if date.month() < BUDGET_YEAR_START_MONTH {
        BudgetYearId(date.year() - 1)
    } else {
        BudgetYearId(date.year())
    }
}

pub fn budget_year_start(year: BudgetYearId) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.0, BUDGET_YEAR_START_MONTH, 1)
}

/// Week `n` starts `7 * (n - 1)` days after the budget year start.
pub fn week_range(year: BudgetYearId, week: u8) -> Option<WeekRange> {
    let start = budget_year_start(year)? + Duration::days(7 * (i64::from(week) - 1));
    Some(WeekRange {
        start,
        end: start + Duration::days(6),
    })
}

/// Budget year and week number containing `date`.
pub fn week_of(date: NaiveDate) -> Option<(BudgetYearId, u8)> {
    let year = budget_year_of(date);
    let days = (date - budget_year_start(year)?).num_days();
    let week = u8::try_from(days / 7 + 1).ok()?;
    Some((year, week))
}

pub fn date_of(year: BudgetYearId, week: u8, day: Day) -> Option<NaiveDate> {
    let range = week_range(year, week)?;
    Some(range.start + Duration::days(day.index() as i64))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn fmt_percent(d: &Decimal) -> String {
    format!("{:.1}%", (d * Decimal::ONE_HUNDRED).round_dp(1))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}
