//! Per-professional scheduling policy and per-query overrides.
//!
//! A [`ProfessionalPolicy`] is parsed once from the professional's record and
//! then treated as plain data. Record fields that are missing or unparseable
//! fall back to the defaults below, the same way the booking screens did.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::calendar::{format_clock, parse_clock, Locale, WeekdayPolicy};
use crate::error::{GridError, Result, StoreError};
use crate::store::Record;

/// Default slot length in minutes.
pub const DEFAULT_SLOT_MINUTES: i64 = 30;
/// Default gap after each slot in minutes.
pub const DEFAULT_BUFFER_MINUTES: i64 = 0;
/// Default number of simultaneous appointments per slot.
pub const DEFAULT_CAPACITY: u32 = 1;

fn default_workday_start() -> NaiveTime {
    NaiveTime::from_hms_opt(8, 0, 0).unwrap_or_default()
}

fn default_workday_end() -> NaiveTime {
    NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default()
}

/// A daily break during which no slot may be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchBreak {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl LunchBreak {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }
}

/// Everything the grid builder needs to know about a professional's calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalPolicy {
    pub weekdays: WeekdayPolicy,
    pub workday_start: NaiveTime,
    pub workday_end: NaiveTime,
    pub lunch: Option<LunchBreak>,
    /// Signed so that bad values from a record survive until [`validate`](Self::validate).
    pub slot_minutes: i64,
    pub buffer_minutes: i64,
    pub capacity: u32,
    pub observe_holidays: bool,
    pub locale: Locale,
}

impl Default for ProfessionalPolicy {
    fn default() -> Self {
        Self {
            weekdays: WeekdayPolicy::default(),
            workday_start: default_workday_start(),
            workday_end: default_workday_end(),
            lunch: None,
            slot_minutes: DEFAULT_SLOT_MINUTES,
            buffer_minutes: DEFAULT_BUFFER_MINUTES,
            capacity: DEFAULT_CAPACITY,
            observe_holidays: false,
            locale: Locale::default(),
        }
    }
}

impl ProfessionalPolicy {
    /// Check every invariant the slot walk relies on for termination and
    /// meaningful output.
    ///
    /// # Errors
    /// Returns `GridError::Configuration` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.slot_minutes <= 0 {
            return Err(GridError::Configuration(format!(
                "slot duration must be positive, got {} minutes",
                self.slot_minutes
            )));
        }
        if self.buffer_minutes < 0 {
            return Err(GridError::Configuration(format!(
                "buffer must not be negative, got {} minutes",
                self.buffer_minutes
            )));
        }
        if self.capacity == 0 {
            return Err(GridError::Configuration(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.workday_end <= self.workday_start {
            return Err(GridError::Configuration(format!(
                "workday end ({}) must be after workday start ({})",
                format_clock(self.workday_end),
                format_clock(self.workday_start)
            )));
        }
        if let Some(lunch) = &self.lunch {
            if lunch.end <= lunch.start {
                return Err(GridError::Configuration(format!(
                    "lunch end ({}) must be after lunch start ({})",
                    format_clock(lunch.end),
                    format_clock(lunch.start)
                )));
            }
        }
        Ok(())
    }

    /// Parse a professional record from the store.
    ///
    /// # Errors
    /// Returns `StoreError::InvalidRecord` when a field has an impossible JSON
    /// type (for example an object where a number is expected).
    pub fn from_record(record: &Record) -> std::result::Result<Self, StoreError> {
        let raw: ProfessionalRecord =
            serde_json::from_value(serde_json::Value::Object(record.clone()))
                .map_err(|e| StoreError::InvalidRecord(format!("professional: {}", e)))?;
        Ok(raw.into_policy())
    }

    /// Return a copy of this policy with `overrides` applied.
    pub fn with_overrides(&self, overrides: &GridOverrides) -> Self {
        overrides.apply(self)
    }
}

/// Per-query adjustments made on top of the stored policy.
///
/// `lunch` distinguishes "keep the stored break" (`None`), "no break this
/// time" (`Some(None)`), and "use this break" (`Some(Some(..))`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridOverrides {
    pub workday_start: Option<NaiveTime>,
    pub workday_end: Option<NaiveTime>,
    pub slot_minutes: Option<i64>,
    pub buffer_minutes: Option<i64>,
    pub capacity: Option<u32>,
    pub lunch: Option<Option<LunchBreak>>,
    pub observe_holidays: Option<bool>,
    pub locale: Option<Locale>,
}

impl GridOverrides {
    pub fn is_empty(&self) -> bool {
        *self == GridOverrides::default()
    }

    pub fn apply(&self, policy: &ProfessionalPolicy) -> ProfessionalPolicy {
        let mut out = policy.clone();
        if let Some(start) = self.workday_start {
            out.workday_start = start;
        }
        if let Some(end) = self.workday_end {
            out.workday_end = end;
        }
        if let Some(slot) = self.slot_minutes {
            out.slot_minutes = slot;
        }
        if let Some(buffer) = self.buffer_minutes {
            out.buffer_minutes = buffer;
        }
        if let Some(capacity) = self.capacity {
            out.capacity = capacity;
        }
        if let Some(lunch) = self.lunch {
            out.lunch = lunch;
        }
        if let Some(holidays) = self.observe_holidays {
            out.observe_holidays = holidays;
        }
        if let Some(locale) = self.locale {
            out.locale = locale;
        }
        out
    }
}

// ── Record boundary ─────────────────────────────────────────────────────────

/// Weekday list as stored: either `"1,2,3"` or `[1, 2, 3]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WeekdayField {
    Text(String),
    Days(Vec<u8>),
}

/// Integer that may have been stored as a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IntField {
    Int(i64),
    Float(f64),
    Text(String),
}

impl IntField {
    fn value(&self) -> Option<i64> {
        match self {
            IntField::Int(n) => Some(*n),
            // Stored floats are whole minutes in practice; truncate.
            IntField::Float(f) if f.is_finite() => Some(f.trunc() as i64),
            IntField::Float(_) => None,
            IntField::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Loosely typed professional row. Field names follow the store's English
/// schema; the legacy Portuguese column names are accepted as aliases.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProfessionalRecord {
    #[serde(alias = "dias_semana")]
    allowed_weekdays: Option<WeekdayField>,
    #[serde(alias = "aceita_sabado")]
    accepts_saturday: Option<bool>,
    #[serde(alias = "aceita_domingo")]
    accepts_sunday: Option<bool>,
    #[serde(alias = "hora_inicio_jornada")]
    workday_start: Option<String>,
    #[serde(alias = "hora_fim_jornada")]
    workday_end: Option<String>,
    #[serde(alias = "almoco_inicio")]
    lunch_start: Option<String>,
    #[serde(alias = "almoco_fim")]
    lunch_end: Option<String>,
    #[serde(alias = "slot_minutos")]
    slot_minutes: Option<IntField>,
    #[serde(alias = "buffer_minutos")]
    buffer_minutes: Option<IntField>,
    #[serde(alias = "capacidade_simultanea")]
    capacity: Option<IntField>,
    #[serde(alias = "considerar_feriados")]
    observe_holidays: Option<bool>,
    locale: Option<String>,
}

fn clock_or(raw: Option<&str>, default: NaiveTime) -> NaiveTime {
    raw.and_then(parse_clock).unwrap_or(default)
}

/// Zero and missing both mean "use the default", matching how the stored
/// professional forms were read.
fn nonzero_or(raw: Option<&IntField>, default: i64) -> i64 {
    match raw.and_then(IntField::value) {
        Some(0) | None => default,
        Some(n) => n,
    }
}

impl ProfessionalRecord {
    fn into_policy(self) -> ProfessionalPolicy {
        let defaults = ProfessionalPolicy::default();

        let explicit = match self.allowed_weekdays {
            Some(WeekdayField::Text(text)) => WeekdayPolicy::parse_list(&text),
            Some(WeekdayField::Days(days)) if !days.is_empty() => {
                Some(WeekdayPolicy::explicit(days))
            }
            _ => None,
        };
        let weekdays = explicit.unwrap_or(WeekdayPolicy::Weekend {
            saturday: self.accepts_saturday.unwrap_or(false),
            sunday: self.accepts_sunday.unwrap_or(false),
        });

        let lunch = match (
            self.lunch_start.as_deref().and_then(parse_clock),
            self.lunch_end.as_deref().and_then(parse_clock),
        ) {
            (Some(start), Some(end)) => Some(LunchBreak::new(start, end)),
            _ => None,
        };

        let capacity = nonzero_or(self.capacity.as_ref(), i64::from(DEFAULT_CAPACITY));

        ProfessionalPolicy {
            weekdays,
            workday_start: clock_or(self.workday_start.as_deref(), defaults.workday_start),
            workday_end: clock_or(self.workday_end.as_deref(), defaults.workday_end),
            lunch,
            slot_minutes: nonzero_or(self.slot_minutes.as_ref(), DEFAULT_SLOT_MINUTES),
            buffer_minutes: self
                .buffer_minutes
                .as_ref()
                .and_then(IntField::value)
                .unwrap_or(DEFAULT_BUFFER_MINUTES),
            // Negative stored capacities become 0 and are rejected by validate().
            capacity: u32::try_from(capacity).unwrap_or(0),
            observe_holidays: self.observe_holidays.unwrap_or(false),
            locale: self
                .locale
                .as_deref()
                .and_then(|l| l.parse().ok())
                .unwrap_or(defaults.locale),
        }
    }
}
