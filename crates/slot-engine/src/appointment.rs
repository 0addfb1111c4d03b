//! Appointment rows: the loosely typed record as it comes out of the store,
//! and the strictly typed value the grid builder indexes.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::calendar::parse_clock;
use crate::error::SkipReason;

/// Lifecycle state of a booking.
///
/// Labels outside the known set are kept verbatim in [`Other`](Self::Other);
/// such bookings still occupy their time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    /// The known states, in lifecycle order.
    pub const ALL: [AppointmentStatus; 4] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AppointmentStatus::Other(_))
    }

    /// Accepts the English labels and the legacy Portuguese ones, ignoring
    /// case. Anything else becomes `Other` with the trimmed label.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        match label.to_lowercase().as_str() {
            "pending" | "pendente" => AppointmentStatus::Pending,
            "confirmed" | "confirmado" => AppointmentStatus::Confirmed,
            "completed" | "concluído" | "concluido" => AppointmentStatus::Completed,
            "cancelled" | "canceled" | "cancelado" => AppointmentStatus::Cancelled,
            _ => AppointmentStatus::Other(label.to_string()),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

impl From<String> for AppointmentStatus {
    fn from(label: String) -> Self {
        Self::from_label(&label)
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        match status {
            AppointmentStatus::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// Accept ids stored either as JSON numbers or strings.
fn id_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// An appointment row exactly as the record store hands it over.
///
/// Every field is optional and unvalidated; call [`parse`](Self::parse) to
/// obtain an [`Appointment`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppointmentRecord {
    #[serde(deserialize_with = "id_as_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(alias = "profissional_id", deserialize_with = "id_as_string")]
    pub professional_id: Option<String>,
    #[serde(alias = "cliente_nome")]
    pub client_name: Option<String>,
    #[serde(alias = "cliente_telefone")]
    pub client_phone: Option<String>,
    #[serde(alias = "data_atendimento")]
    pub date: Option<String>,
    #[serde(alias = "hora_inicio")]
    pub start_time: Option<String>,
    #[serde(alias = "hora_fim")]
    pub end_time: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "observacoes")]
    pub notes: Option<String>,
}

impl AppointmentRecord {
    /// Start a record for `professional_id` on `date` from `start` to `end`.
    pub fn new(professional_id: &str, date: &str, start: &str, end: &str) -> Self {
        Self {
            professional_id: Some(professional_id.to_string()),
            date: Some(date.to_string()),
            start_time: Some(start.to_string()),
            end_time: Some(end.to_string()),
            ..Self::default()
        }
    }

    pub fn client(mut self, name: &str) -> Self {
        self.client_name = Some(name.to_string());
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Validate and convert this row.
    ///
    /// # Errors
    /// Returns the first [`SkipReason`] that makes the row unusable.
    pub fn parse(&self) -> Result<Appointment, SkipReason> {
        let professional_id = self
            .professional_id
            .clone()
            .ok_or(SkipReason::MissingField("professional_id"))?;

        let raw_date = self.date.as_deref().ok_or(SkipReason::MissingField("date"))?;
        let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y-%m-%d")
            .map_err(|_| SkipReason::InvalidDate(raw_date.to_string()))?;

        let start = parse_time_field("start_time", self.start_time.as_deref())?;
        let end = parse_time_field("end_time", self.end_time.as_deref())?;
        // Inverted rows are dropped rather than kept as negative intervals;
        // half-open overlap would still let them match a wide slot.
        if end < start {
            return Err(SkipReason::EndBeforeStart {
                start: start.format("%H:%M").to_string(),
                end: end.format("%H:%M").to_string(),
            });
        }

        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => AppointmentStatus::default(),
            Some(label) => AppointmentStatus::from_label(label),
        };

        Ok(Appointment {
            professional_id,
            client_name: self.client_name.clone().unwrap_or_default(),
            client_phone: self.client_phone.clone().unwrap_or_default(),
            date,
            start,
            end,
            status,
            notes: self.notes.clone().unwrap_or_default(),
        })
    }
}

fn parse_time_field(field: &'static str, raw: Option<&str>) -> Result<NaiveTime, SkipReason> {
    let raw = raw.ok_or(SkipReason::MissingField(field))?;
    parse_clock(raw).ok_or_else(|| SkipReason::InvalidTime {
        field,
        value: raw.to_string(),
    })
}

/// A validated booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub professional_id: String,
    pub client_name: String,
    pub client_phone: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub status: AppointmentStatus,
    pub notes: String,
}

impl Appointment {
    pub fn start_at(&self) -> NaiveDateTime {
        self.date.and_time(self.start)
    }

    pub fn end_at(&self) -> NaiveDateTime {
        self.date.and_time(self.end)
    }

    /// Half-open overlap with `[start, end)`. Touching intervals do not overlap.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        overlaps(start, end, self.start_at(), self.end_at())
    }
}

/// Two half-open intervals overlap iff `a_start < b_end && a_end > b_start`.
pub fn overlaps(
    a_start: NaiveDateTime,
    a_end: NaiveDateTime,
    b_start: NaiveDateTime,
    b_end: NaiveDateTime,
) -> bool {
    a_start < b_end && a_end > b_start
}
