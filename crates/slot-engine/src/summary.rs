//! Roll-ups over a built grid: per-day occupancy and a period total.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grid::{Slot, SlotStatus};

/// Slot counts for one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    pub total_slots: usize,
    pub available: usize,
    pub occupied: usize,
    /// `occupied / total_slots * 100`, rounded to one decimal.
    pub occupancy_rate: f64,
}

/// Slot counts for the whole query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodSummary {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
}

impl PeriodSummary {
    /// Occupied share of all slots in percent, rounded to one decimal.
    /// Zero when there are no slots.
    pub fn occupancy_rate(&self) -> f64 {
        occupancy_rate(self.occupied, self.total)
    }
}

fn occupancy_rate(occupied: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round1(occupied as f64 / total as f64 * 100.0)
}

/// Round half away from zero to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// One summary per date that has slots, in date order.
///
/// Input order does not matter; days without slots are not listed.
pub fn summarize_by_day(slots: &[Slot]) -> Vec<DaySummary> {
    let mut days: BTreeMap<NaiveDate, (usize, usize)> = BTreeMap::new();
    for slot in slots {
        let entry = days.entry(slot.date).or_default();
        match slot.status {
            SlotStatus::Available => entry.0 += 1,
            SlotStatus::Occupied => entry.1 += 1,
        }
    }

    days.into_iter()
        .map(|(date, (available, occupied))| {
            let total_slots = available + occupied;
            DaySummary {
                date,
                total_slots,
                available,
                occupied,
                occupancy_rate: occupancy_rate(occupied, total_slots),
            }
        })
        .collect()
}

/// Totals across every slot.
pub fn summarize_period(slots: &[Slot]) -> PeriodSummary {
    let available = slots.iter().filter(|s| s.is_available()).count();
    PeriodSummary {
        total: slots.len(),
        available,
        occupied: slots.len() - available,
    }
}
