//! The availability grid builder.
//!
//! Walks every admitted day of a query window, carves fixed-length slots out of
//! the workday, skips the lunch break, and classifies each slot against the
//! professional's existing bookings and simultaneous capacity.
//!
//! The builder is a pure function of its arguments: identical inputs always
//! produce an identical, ordered slot list.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::appointment::{overlaps, Appointment, AppointmentRecord, AppointmentStatus};
use crate::calendar::{days_inclusive, format_clock, HolidayCalendar};
use crate::error::{GridError, Result, SkipReason};
use crate::policy::ProfessionalPolicy;

/// Inclusive date range a grid is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QueryWindow {
    /// # Errors
    /// Returns `GridError::Configuration` when `end` precedes `start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.end < self.start {
            return Err(GridError::Configuration(format!(
                "window end ({}) must not precede window start ({})",
                self.end, self.start
            )));
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered, both ends included.
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        days_inclusive(self.start, self.end)
    }

    /// Move the start forward to `today` if it lies in the past, dragging the
    /// end along when it would otherwise precede the new start.
    pub fn clamp_not_before(self, today: NaiveDate) -> Self {
        if self.start >= today {
            return self;
        }
        Self {
            start: today,
            end: self.end.max(today),
        }
    }
}

/// Whether a slot can still take a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    Available,
    Occupied,
}

impl SlotStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SlotStatus::Available => "Available",
            SlotStatus::Occupied => "Occupied",
        }
    }
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Details of the booking that fills an occupied slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub client: String,
    pub status: AppointmentStatus,
    pub notes: String,
}

/// One row of the availability grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: NaiveDate,
    pub weekday_name: String,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub status: SlotStatus,
    /// Only set on occupied slots: the first overlapping booking.
    pub conflict: Option<Conflict>,
}

impl Slot {
    /// `"HH:MM - HH:MM"`.
    pub fn time_range(&self) -> String {
        format!("{} - {}", format_clock(self.start), format_clock(self.end))
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }

    pub fn start_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    pub fn end_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end)
    }
}

/// An appointment row left out of the index, by its position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub index: usize,
    pub reason: SkipReason,
}

/// Why a whole day produced no slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayExclusion {
    Weekday,
    Holiday,
}

/// Slots plus the diagnostics gathered while building them.
#[derive(Debug, Clone, Default)]
pub struct GridReport {
    pub slots: Vec<Slot>,
    pub skipped: Vec<SkippedRow>,
    pub excluded_days: Vec<(NaiveDate, DayExclusion)>,
}

/// Parsed bookings grouped by day, in input order within each day.
#[derive(Debug, Clone, Default)]
pub struct AppointmentIndex {
    by_day: BTreeMap<NaiveDate, Vec<Appointment>>,
}

impl AppointmentIndex {
    /// Index the rows belonging to `professional_id` inside `window`.
    ///
    /// Rows for other professionals, outside the window, or that fail to parse
    /// are returned as skips instead of aborting.
    pub fn build(
        records: &[AppointmentRecord],
        professional_id: &str,
        window: &QueryWindow,
    ) -> (Self, Vec<SkippedRow>) {
        let mut by_day: BTreeMap<NaiveDate, Vec<Appointment>> = BTreeMap::new();
        let mut skipped = Vec::new();

        for (index, record) in records.iter().enumerate() {
            if let Some(owner) = record.professional_id.as_deref() {
                if owner != professional_id {
                    skipped.push(SkippedRow {
                        index,
                        reason: SkipReason::OtherProfessional(owner.to_string()),
                    });
                    continue;
                }
            }
            match record.parse() {
                Ok(appointment) if window.contains(appointment.date) => {
                    by_day.entry(appointment.date).or_default().push(appointment);
                }
                Ok(appointment) => skipped.push(SkippedRow {
                    index,
                    reason: SkipReason::OutsideWindow(appointment.date.to_string()),
                }),
                Err(reason) => {
                    tracing::debug!(index, %reason, "skipping malformed appointment row");
                    skipped.push(SkippedRow { index, reason });
                }
            }
        }

        (Self { by_day }, skipped)
    }

    pub fn for_day(&self, date: NaiveDate) -> &[Appointment] {
        self.by_day.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total number of indexed bookings.
    pub fn len(&self) -> usize {
        self.by_day.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}

/// Build the ordered availability grid.
///
/// See [`build_grid_with_report`] for the algorithm; this variant drops the
/// diagnostics.
///
/// # Errors
/// Returns `GridError::Configuration` if the policy or window is invalid.
pub fn build_grid(
    appointments: &[AppointmentRecord],
    policy: &ProfessionalPolicy,
    professional_id: &str,
    window: &QueryWindow,
    holidays_enabled: bool,
) -> Result<Vec<Slot>> {
    build_grid_with_report(appointments, policy, professional_id, window, holidays_enabled)
        .map(|report| report.slots)
}

/// Build the ordered availability grid and report what was left out.
///
/// For every admitted day in `window` (weekday allowed by the policy, and not a
/// fixed holiday when `holidays_enabled`), slots of `policy.slot_minutes` are
/// carved from the workday start. A slot whose end would pass the workday end
/// stops the day. A slot overlapping lunch is not emitted and the cursor jumps
/// to `max(slot_end, lunch_end)` without a buffer; every emitted slot is
/// followed by `policy.buffer_minutes` of gap. A slot is `Occupied` when the
/// number of overlapping bookings reaches `policy.capacity`, and then carries
/// the first overlapping booking as its conflict.
///
/// # Errors
/// Returns `GridError::Configuration` if the policy or window is invalid; this
/// is checked before any day is walked.
pub fn build_grid_with_report(
    appointments: &[AppointmentRecord],
    policy: &ProfessionalPolicy,
    professional_id: &str,
    window: &QueryWindow,
    holidays_enabled: bool,
) -> Result<GridReport> {
    policy.validate()?;
    window.validate()?;
    let slot_len = minutes("slot duration", policy.slot_minutes)?;
    let buffer = minutes("buffer", policy.buffer_minutes)?;

    let (index, skipped) = AppointmentIndex::build(appointments, professional_id, window);

    let holidays = if holidays_enabled {
        HolidayCalendar::for_range(window.start, window.end)
    } else {
        HolidayCalendar::default()
    };

    let mut slots = Vec::new();
    let mut excluded_days = Vec::new();

    for day in window.days() {
        if !policy.weekdays.allows(day) {
            excluded_days.push((day, DayExclusion::Weekday));
            continue;
        }
        if holidays_enabled && holidays.contains(day) {
            tracing::debug!(%day, "holiday, no slots");
            excluded_days.push((day, DayExclusion::Holiday));
            continue;
        }
        walk_day(day, policy, slot_len, buffer, index.for_day(day), &mut slots);
    }

    slots.sort_by_key(|slot| (slot.date, slot.start));

    tracing::info!(
        professional_id,
        slots = slots.len(),
        occupied = slots.iter().filter(|s| !s.is_available()).count(),
        skipped = skipped.len(),
        "availability grid built"
    );

    Ok(GridReport {
        slots,
        skipped,
        excluded_days,
    })
}

fn minutes(what: &str, value: i64) -> Result<TimeDelta> {
    TimeDelta::try_minutes(value)
        .ok_or_else(|| GridError::Configuration(format!("{} out of range: {} minutes", what, value)))
}

/// Carve one day's slots into `out`.
fn walk_day(
    day: NaiveDate,
    policy: &ProfessionalPolicy,
    slot_len: TimeDelta,
    buffer: TimeDelta,
    bookings: &[Appointment],
    out: &mut Vec<Slot>,
) {
    let weekday_name = policy.locale.weekday_name(day.weekday());
    let day_end = day.and_time(policy.workday_end);
    let lunch = policy
        .lunch
        .map(|lunch| (day.and_time(lunch.start), day.and_time(lunch.end)));

    let mut cursor = day.and_time(policy.workday_start);
    while cursor < day_end {
        let Some(slot_end) = cursor.checked_add_signed(slot_len) else {
            break;
        };
        if slot_end > day_end {
            break;
        }

        if let Some((lunch_start, lunch_end)) = lunch {
            if overlaps(cursor, slot_end, lunch_start, lunch_end) {
                cursor = slot_end.max(lunch_end);
                continue;
            }
        }

        let mut overlapping = bookings.iter().filter(|a| a.overlaps(cursor, slot_end));
        let first = overlapping.next();
        let count = first.map_or(0, |_| 1 + overlapping.count());

        let (status, conflict) = if count < policy.capacity as usize {
            (SlotStatus::Available, None)
        } else {
            let conflict = first.map(|a| Conflict {
                client: a.client_name.clone(),
                status: a.status.clone(),
                notes: a.notes.clone(),
            });
            (SlotStatus::Occupied, conflict)
        };

        out.push(Slot {
            date: day,
            weekday_name: weekday_name.to_string(),
            start: cursor.time(),
            end: slot_end.time(),
            status,
            conflict,
        });

        match slot_end.checked_add_signed(buffer) {
            Some(next) => cursor = next,
            None => break,
        }
    }
}
