//! Calendar rules: ISO weekday numbering, weekday admission, fixed national
//! holidays, and localized weekday names.
//!
//! Weekdays are numbered the ISO way throughout: Monday = 1 .. Sunday = 7.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Fixed-date national holidays as (month, day). No moveable feasts.
pub const FIXED_HOLIDAYS: [(u32, u32); 8] = [
    (1, 1),
    (4, 21),
    (5, 1),
    (9, 7),
    (10, 12),
    (11, 2),
    (11, 15),
    (12, 25),
];

/// ISO weekday number of `date` (Monday = 1 .. Sunday = 7).
pub fn iso_weekday(date: NaiveDate) -> u8 {
    // number_from_monday() is always 1..=7
    date.weekday().number_from_monday() as u8
}

/// Which weekdays a professional takes appointments on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeekdayPolicy {
    /// An explicit set of ISO weekday numbers. Overrides the weekend flags.
    Explicit(BTreeSet<u8>),
    /// Monday to Friday always, plus Saturday/Sunday when flagged.
    Weekend { saturday: bool, sunday: bool },
}

impl Default for WeekdayPolicy {
    fn default() -> Self {
        WeekdayPolicy::Weekend {
            saturday: false,
            sunday: false,
        }
    }
}

impl WeekdayPolicy {
    /// Build an explicit policy, dropping numbers outside 1..=7.
    pub fn explicit<I: IntoIterator<Item = u8>>(days: I) -> Self {
        WeekdayPolicy::Explicit(days.into_iter().filter(|d| (1..=7).contains(d)).collect())
    }

    /// Parse the comma-separated form stored on professional records
    /// (e.g. `"1,2,3,4,5"`). Non-numeric tokens are ignored. Returns `None`
    /// for a blank string so the caller can fall back to the weekend flags.
    pub fn parse_list(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let days = trimmed
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
            .filter_map(|token| token.parse::<u8>().ok());
        Some(Self::explicit(days))
    }

    /// Whether `date` falls on an admitted weekday.
    pub fn allows(&self, date: NaiveDate) -> bool {
        let weekday = iso_weekday(date);
        match self {
            WeekdayPolicy::Explicit(days) => days.contains(&weekday),
            WeekdayPolicy::Weekend { saturday, sunday } => match weekday {
                6 => *saturday,
                7 => *sunday,
                _ => true,
            },
        }
    }
}

/// Fixed national holidays for one calendar year.
pub fn fixed_holidays(year: i32) -> impl Iterator<Item = NaiveDate> {
    FIXED_HOLIDAYS
        .iter()
        .filter_map(move |&(month, day)| NaiveDate::from_ymd_opt(year, month, day))
}

/// The set of holiday dates relevant to a date range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
}

impl HolidayCalendar {
    /// Holidays for every calendar year touched by `start..=end`.
    ///
    /// An inverted range yields an empty calendar.
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        if end < start {
            return Self::default();
        }
        let dates = (start.year()..=end.year()).flat_map(fixed_holidays).collect();
        Self { dates }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.dates.iter()
    }
}

/// Every date from `start` to `end` inclusive, ascending.
pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// Language used for weekday names in slot rows and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "pt-BR")]
    PtBr,
}

const WEEKDAYS_EN: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const WEEKDAYS_PT_BR: [&str; 7] = [
    "Segunda", "Terça", "Quarta", "Quinta", "Sexta", "Sábado", "Domingo",
];

impl Locale {
    /// Monday-first weekday name.
    pub fn weekday_name(self, weekday: Weekday) -> &'static str {
        let table = match self {
            Locale::En => &WEEKDAYS_EN,
            Locale::PtBr => &WEEKDAYS_PT_BR,
        };
        table[weekday.num_days_from_monday() as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::PtBr => "pt-BR",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            "pt" | "pt-br" | "pt_br" => Ok(Locale::PtBr),
            other => Err(format!("unsupported locale: '{}' (expected en or pt-BR)", other)),
        }
    }
}

/// Parse a wall-clock time written as `HH:MM`, `HH:MM:SS`, or
/// `HH:MM:SS.ffffff`.
pub fn parse_clock(raw: &str) -> Option<chrono::NaiveTime> {
    let raw = raw.trim();
    chrono::NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| chrono::NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Render a wall-clock time as `HH:MM`.
pub fn format_clock(time: chrono::NaiveTime) -> String {
    time.format("%H:%M").to_string()
}
