//! # slot-engine
//!
//! Deterministic availability-slot generation for a professional's
//! appointment calendar.
//!
//! Given a date window, a working-hours / lunch-break / weekday policy, a slot
//! length, a buffer, a simultaneous capacity, and the existing bookings, the
//! engine produces the ordered list of bookable and occupied slots. It reads no
//! global state and performs no I/O of its own; every input is an argument.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::{NaiveDate, NaiveTime};
//! use slot_engine::{build_grid, AppointmentRecord, ProfessionalPolicy, QueryWindow};
//!
//! let day = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(); // a Monday
//! let policy = ProfessionalPolicy {
//!     workday_start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
//!     workday_end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
//!     slot_minutes: 60,
//!     ..ProfessionalPolicy::default()
//! };
//! let bookings = vec![
//!     AppointmentRecord::new("7", "2026-03-16", "09:00", "10:00").client("Ana"),
//! ];
//!
//! let slots = build_grid(&bookings, &policy, "7", &QueryWindow::single_day(day), false).unwrap();
//! assert_eq!(slots.len(), 4);
//! assert!(!slots[1].is_available());
//! ```
//!
//! ## Modules
//!
//! - [`calendar`]: ISO weekdays, weekday admission, fixed holidays, weekday names
//! - [`policy`]: Per-professional policy, per-query overrides, validation
//! - [`appointment`]: Raw appointment rows and their typed, parsed form
//! - [`grid`]: The grid builder
//! - [`summary`]: Per-day and per-period roll-ups
//! - [`export`]: CSV exports
//! - [`store`]: Record-store boundary and an in-memory implementation
//! - [`error`]: Error types

pub mod appointment;
pub mod calendar;
pub mod error;
pub mod export;
pub mod grid;
pub mod policy;
pub mod store;
pub mod summary;

pub use appointment::{Appointment, AppointmentRecord, AppointmentStatus};
pub use calendar::{HolidayCalendar, Locale, WeekdayPolicy};
pub use error::{ExportError, GridError, SkipReason, StoreError};
pub use grid::{build_grid, build_grid_with_report, GridReport, QueryWindow, Slot, SlotStatus};
pub use policy::{GridOverrides, LunchBreak, ProfessionalPolicy};
pub use store::{load_grid_inputs, GridInputs, MemoryStore, RecordStore};
pub use summary::{summarize_by_day, summarize_period, DaySummary, PeriodSummary};
