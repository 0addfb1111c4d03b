//! CSV exports of a grid and of its per-day summary.

use std::io::Write;

use csv::WriterBuilder;

use crate::error::ExportError;
use crate::grid::{QueryWindow, Slot};
use crate::summary::DaySummary;

/// Column headers of the slot export.
pub const SLOT_HEADERS: [&str; 7] = [
    "Date",
    "Weekday",
    "Time range",
    "Status",
    "Client",
    "Appointment Status",
    "Notes",
];

/// Column headers of the per-day summary export.
pub const SUMMARY_HEADERS: [&str; 5] = [
    "Date",
    "total_slots",
    "available",
    "occupied",
    "occupancy_rate_%",
];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Output switches shared by both exports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// Prefix the file with a UTF-8 byte-order mark so spreadsheet tools pick
    /// the right encoding.
    pub bom: bool,
}

/// Write one row per slot.
///
/// # Errors
/// Returns `ExportError` if the underlying writer fails.
pub fn write_slots_csv<W: Write>(
    mut writer: W,
    slots: &[Slot],
    options: CsvOptions,
) -> Result<(), ExportError> {
    if options.bom {
        writer.write_all(UTF8_BOM)?;
    }
    let mut csv = WriterBuilder::new().from_writer(writer);
    csv.write_record(SLOT_HEADERS)?;
    for slot in slots {
        let (client, status, notes) = match &slot.conflict {
            Some(c) => (c.client.as_str(), c.status.as_str(), c.notes.as_str()),
            None => ("", "", ""),
        };
        csv.write_record([
            slot.date.format("%Y-%m-%d").to_string().as_str(),
            slot.weekday_name.as_str(),
            slot.time_range().as_str(),
            slot.status.as_str(),
            client,
            status,
            notes,
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write one row per day summary.
///
/// # Errors
/// Returns `ExportError` if the underlying writer fails.
pub fn write_summary_csv<W: Write>(
    mut writer: W,
    days: &[DaySummary],
    options: CsvOptions,
) -> Result<(), ExportError> {
    if options.bom {
        writer.write_all(UTF8_BOM)?;
    }
    let mut csv = WriterBuilder::new().from_writer(writer);
    csv.write_record(SUMMARY_HEADERS)?;
    for day in days {
        csv.write_record([
            day.date.format("%Y-%m-%d").to_string(),
            day.total_slots.to_string(),
            day.available.to_string(),
            day.occupied.to_string(),
            format!("{:.1}", day.occupancy_rate),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// `availability_<start>_<end>.csv` with dates as `YYYYMMDD`.
pub fn slots_file_name(window: &QueryWindow) -> String {
    format!(
        "availability_{}_{}.csv",
        window.start.format("%Y%m%d"),
        window.end.format("%Y%m%d")
    )
}

/// `availability_summary_<start>_<end>.csv` with dates as `YYYYMMDD`.
pub fn summary_file_name(window: &QueryWindow) -> String {
    format!(
        "availability_summary_{}_{}.csv",
        window.start.format("%Y%m%d"),
        window.end.format("%Y%m%d")
    )
}
