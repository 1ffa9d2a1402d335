// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Weekday a record was logged on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Days that carry goals.
    pub const TRADING: [Day; 6] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
    ];

    /// Zero-based offset from Monday.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Day::ALL
            .into_iter()
            .find(|d| {
                let name = d.name().to_lowercase();
                lower.len() >= 3 && name.starts_with(&lower)
            })
            .ok_or_else(|| format!("Invalid day '{}', expected Monday..Sunday", s))
    }
}

/// Stable identifier of a stored record, unique within one budget year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The calendar year a budget year starts in. Budget years run May..April.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetYearId(pub i32);

impl fmt::Display for BudgetYearId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, self.0 + 1)
    }
}

/// The four tracked report sections. Serialized names match the goals file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Section {
    #[serde(rename = "AVS")]
    Avs,
    #[serde(rename = "Insurance Agreements")]
    InsuranceAgreements,
    #[serde(rename = "Precalibrated TVs")]
    PrecalibratedTvs,
    #[serde(rename = "RepairTickets")]
    RepairTickets,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Avs,
        Section::InsuranceAgreements,
        Section::PrecalibratedTvs,
        Section::RepairTickets,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Avs => "AVS",
            Section::InsuranceAgreements => "Insurance Agreements",
            Section::PrecalibratedTvs => "Precalibrated TVs",
            Section::RepairTickets => "RepairTickets",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "avs" => Ok(Section::Avs),
            "insurance" | "insurance agreements" => Ok(Section::InsuranceAgreements),
            "tv" | "tvs" | "precalibrated tvs" => Ok(Section::PrecalibratedTvs),
            "repair" | "repairs" | "repairtickets" => Ok(Section::RepairTickets),
            _ => Err(format!(
                "Invalid section '{}', expected avs|insurance|tv|repair",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub code: String,
    pub first_name: String,
    pub last_name: String,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvsAssignment {
    pub id: RecordId,
    pub week: u8,
    pub day: Day,
    pub person: String,
    pub service_id: String,
    pub sold: u32,
    pub price: Decimal,
    pub gm: Decimal, // price - cost, frozen at submission
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceAgreementSale {
    pub id: RecordId,
    pub week: u8,
    pub day: Day,
    pub person: String,
    pub sold: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecalibratedTvCompletion {
    pub id: RecordId,
    pub week: u8,
    pub day: Day,
    pub person: String,
    pub completed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairTicket {
    pub id: RecordId,
    pub week: u8,
    pub day: Day,
    pub person: String,
    pub completed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityInspection {
    pub week: u8,
    pub day: Day,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Cumulative per-day targets for one section, Monday first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub section: Section,
    pub goals: Vec<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetYearSettings {
    pub goals: Vec<Goal>,
    #[serde(rename = "lastYearGM")]
    pub last_year_gm: Decimal,
}

/// Everything logged during one budget year; persisted as a single document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetYearData {
    pub avs_assignments: Vec<AvsAssignment>,
    pub insurance_agreements: Vec<InsuranceAgreementSale>,
    #[serde(rename = "precalibratedTVs")]
    pub precalibrated_tvs: Vec<PrecalibratedTvCompletion>,
    pub repair_tickets: Vec<RepairTicket>,
    pub quality_inspections: Vec<QualityInspection>,
    pub week_dates: BTreeMap<u8, WeekRange>,
    pub next_id: u64,
}

impl BudgetYearData {
    pub fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId(self.next_id)
    }

    pub fn is_empty(&self) -> bool {
        self.avs_assignments.is_empty()
            && self.insurance_agreements.is_empty()
            && self.precalibrated_tvs.is_empty()
            && self.repair_tickets.is_empty()
    }
}

/// Portable copy of the people, services and goals catalogues.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigSnapshot {
    pub people: Vec<Person>,
    pub services: Vec<Service>,
    pub goals: Vec<Goal>,
}

/// Portable copy of one budget year's records and settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordsSnapshot {
    pub budget_year: BudgetYearId,
    pub data: BudgetYearData,
    #[serde(default)]
    pub settings: BudgetYearSettings,
}

/// Common shape of the four per-person, per-day record kinds.
pub trait DayRecord: Clone {
    const SECTION: Section;

    fn id(&self) -> RecordId;
    fn week(&self) -> u8;
    fn day(&self) -> Day;
    fn person(&self) -> &str;
    /// Units sold or completed.
    fn quantity(&self) -> u32;

    fn list(data: &BudgetYearData) -> &Vec<Self>;
    fn list_mut(data: &mut BudgetYearData) -> &mut Vec<Self>;
}

macro_rules! day_record {
    ($ty:ty, $section:expr, $qty:ident, $field:ident) => {
        impl DayRecord for $ty {
            const SECTION: Section = $section;

            fn id(&self) -> RecordId {
                self.id
            }
            fn week(&self) -> u8 {
                self.week
            }
            fn day(&self) -> Day {
                self.day
            }
            fn person(&self) -> &str {
                &self.person
            }
            fn quantity(&self) -> u32 {
                self.$qty
            }
            fn list(data: &BudgetYearData) -> &Vec<Self> {
                &data.$field
            }
            fn list_mut(data: &mut BudgetYearData) -> &mut Vec<Self> {
                &mut data.$field
            }
        }
    };
}

day_record!(AvsAssignment, Section::Avs, sold, avs_assignments);
day_record!(
    InsuranceAgreementSale,
    Section::InsuranceAgreements,
    sold,
    insurance_agreements
);
day_record!(
    PrecalibratedTvCompletion,
    Section::PrecalibratedTvs,
    completed,
    precalibrated_tvs
);
day_record!(RepairTicket, Section::RepairTickets, completed, repair_tickets);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationSpeed {
    Slow,
    Normal,
    Fast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccentColor {
    Blue,
    Green,
    Purple,
    Orange,
    Indigo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeSettings {
    pub font_size: FontSize,
    pub animation_speed: AnimationSpeed,
    pub accent_colors: BTreeMap<String, AccentColor>,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        let accent_colors = [
            ("avs", AccentColor::Blue),
            ("insurance", AccentColor::Green),
            ("precalibrated", AccentColor::Purple),
            ("repair", AccentColor::Orange),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        ThemeSettings {
            font_size: FontSize::Medium,
            animation_speed: AnimationSpeed::Normal,
            accent_colors,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    TopRight,
    TopLeft,
    BottomRight,
    BottomLeft,
    TopCenter,
    BottomCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastTheme {
    Light,
    Dark,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastAnimation {
    Slide,
    Fade,
    Scale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToastStyle {
    pub theme: ToastTheme,
    pub animation: ToastAnimation,
    pub show_progress: bool,
}

impl Default for ToastStyle {
    fn default() -> Self {
        ToastStyle {
            theme: ToastTheme::System,
            animation: ToastAnimation::Slide,
            show_progress: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToastBehavior {
    pub stack: bool,
    pub max_visible: u32,
    pub pause_on_hover: bool,
    pub close_on_click: bool,
    pub group_similar: bool,
}

impl Default for ToastBehavior {
    fn default() -> Self {
        ToastBehavior {
            stack: true,
            max_visible: 3,
            pause_on_hover: true,
            close_on_click: true,
            group_similar: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub sound: bool,
    /// Milliseconds a toast stays visible.
    pub duration: u32,
    pub goals_achievement: bool,
    pub position: ToastPosition,
    pub style: ToastStyle,
    pub behavior: ToastBehavior,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        NotificationSettings {
            enabled: true,
            sound: false,
            duration: 3000,
            goals_achievement: true,
            position: ToastPosition::TopRight,
            style: ToastStyle::default(),
            behavior: ToastBehavior::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: ThemeSettings,
    pub notifications: NotificationSettings,
}
