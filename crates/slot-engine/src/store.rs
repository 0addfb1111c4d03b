//! The record-store boundary.
//!
//! The application keeps its data in a remote table store that only offers
//! key-filtered CRUD. [`RecordStore`] captures that surface; [`MemoryStore`] is
//! an in-process implementation backed by a JSON document, used by the CLI and
//! the tests. [`load_grid_inputs`] pulls everything a grid build needs for one
//! professional and converts it to typed values once, at the boundary.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::appointment::AppointmentRecord;
use crate::error::{Result, SkipReason, StoreError};
use crate::grid::SkippedRow;
use crate::policy::ProfessionalPolicy;

/// A single row: a JSON object keyed by column name.
pub type Record = serde_json::Map<String, Value>;

pub const APPOINTMENTS: &str = "appointments";
pub const CLIENTS: &str = "clients";
pub const PROFESSIONALS: &str = "professionals";
pub const SERVICE_TYPES: &str = "service_types";
pub const SERVICE_ENTRIES: &str = "service_entries";

/// Every table the application reads or writes.
pub const TABLES: [&str; 5] = [
    APPOINTMENTS,
    CLIENTS,
    PROFESSIONALS,
    SERVICE_TYPES,
    SERVICE_ENTRIES,
];

/// Equality filters on record fields. A filter whose value is `None` is
/// ignored, so optional criteria can be passed straight through.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    terms: Vec<(Vec<String>, Option<Value>)>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.terms.push((vec![field.to_string()], Some(value.into())));
        self
    }

    pub fn eq_opt(mut self, field: &str, value: Option<impl Into<Value>>) -> Self {
        self.terms.push((vec![field.to_string()], value.map(Into::into)));
        self
    }

    /// Match when any of `fields` equals `value`. Used for columns that also
    /// exist under a legacy name.
    pub fn eq_any(mut self, fields: &[&str], value: impl Into<Value>) -> Self {
        let fields = fields.iter().map(|f| f.to_string()).collect();
        self.terms.push((fields, Some(value.into())));
        self
    }

    /// Values compare by their string form, so `7` matches `"7"`.
    pub fn matches(&self, record: &Record) -> bool {
        self.terms.iter().all(|(fields, expected)| match expected {
            None => true,
            Some(expected) => fields.iter().any(|field| {
                record
                    .get(field)
                    .is_some_and(|actual| key_string(actual) == key_string(expected))
            }),
        })
    }
}

fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Orders numbers numerically and everything else by string form; records
/// missing the field sort last.
fn compare_field(a: &Record, b: &Record, field: &str) -> Ordering {
    match (a.get(field), b.get(field)) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x), Some(y)) => key_string(x).cmp(&key_string(y)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Generic key-filtered CRUD over named tables.
pub trait RecordStore {
    /// List the records of `table` matching `filters`, optionally sorted by
    /// the `order` field.
    fn list_records(
        &self,
        table: &str,
        filters: &Filters,
        order: Option<&str>,
    ) -> std::result::Result<Vec<Record>, StoreError>;

    /// Insert `record` and return it as stored (with its id).
    fn insert_record(
        &mut self,
        table: &str,
        record: Record,
    ) -> std::result::Result<Record, StoreError>;

    /// Merge `fields` into the record whose id is `id` and return the result.
    fn update_record(
        &mut self,
        table: &str,
        id: &str,
        fields: Record,
    ) -> std::result::Result<Record, StoreError>;

    /// Delete the record whose id is `id`. Deleting a missing id is not an error.
    fn delete_record(&mut self, table: &str, id: &str) -> std::result::Result<(), StoreError>;
}

/// In-memory [`RecordStore`] loaded from a `{ "<table>": [ ... ] }` document.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryStore {
    tables: BTreeMap<String, Vec<Record>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store with every known table present.
    pub fn new() -> Self {
        let tables = TABLES
            .iter()
            .map(|name| (name.to_string(), Vec::new()))
            .collect();
        Self { tables }
    }

    /// Parse a store document.
    ///
    /// # Errors
    /// `StoreError::Json` for invalid JSON, `StoreError::UnknownTable` for a
    /// top-level key that is not a known table, and `StoreError::InvalidRecord`
    /// when a table is not an array of objects.
    pub fn from_json_str(json: &str) -> std::result::Result<Self, StoreError> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(doc) = value else {
            return Err(StoreError::InvalidRecord(
                "store document must be a JSON object of tables".to_string(),
            ));
        };

        let mut store = Self::new();
        for (name, rows) in doc {
            let table = store
                .tables
                .get_mut(&name)
                .ok_or_else(|| StoreError::UnknownTable(name.clone()))?;
            let Value::Array(rows) = rows else {
                return Err(StoreError::InvalidRecord(format!(
                    "table '{}' must be an array",
                    name
                )));
            };
            for (i, row) in rows.into_iter().enumerate() {
                match row {
                    Value::Object(record) => table.push(record),
                    _ => {
                        return Err(StoreError::InvalidRecord(format!(
                            "{}[{}] is not an object",
                            name, i
                        )))
                    }
                }
            }
        }
        Ok(store)
    }

    /// Read and parse a store document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> std::result::Result<Self, StoreError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Serialize the whole store back to its document form.
    pub fn to_value(&self) -> Value {
        Value::Object(
            self.tables
                .iter()
                .map(|(name, rows)| {
                    let rows = rows.iter().cloned().map(Value::Object).collect();
                    (name.clone(), Value::Array(rows))
                })
                .collect(),
        )
    }

    fn table(&self, table: &str) -> std::result::Result<&Vec<Record>, StoreError> {
        self.tables
            .get(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }

    fn table_mut(&mut self, table: &str) -> std::result::Result<&mut Vec<Record>, StoreError> {
        self.tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable(table.to_string()))
    }
}

fn has_id(record: &Record, id: &str) -> bool {
    record.get("id").is_some_and(|v| key_string(v) == id)
}

impl RecordStore for MemoryStore {
    fn list_records(
        &self,
        table: &str,
        filters: &Filters,
        order: Option<&str>,
    ) -> std::result::Result<Vec<Record>, StoreError> {
        let mut rows: Vec<Record> = self
            .table(table)?
            .iter()
            .filter(|r| filters.matches(r))
            .cloned()
            .collect();
        if let Some(field) = order {
            rows.sort_by(|a, b| compare_field(a, b, field));
        }
        Ok(rows)
    }

    fn insert_record(
        &mut self,
        table: &str,
        mut record: Record,
    ) -> std::result::Result<Record, StoreError> {
        let rows = self.table_mut(table)?;
        if !record.contains_key("id") {
            let next = rows
                .iter()
                .filter_map(|r| r.get("id").and_then(Value::as_u64))
                .max()
                .map_or(1, |max| max + 1);
            record.insert("id".to_string(), Value::from(next));
        }
        rows.push(record.clone());
        Ok(record)
    }

    fn update_record(
        &mut self,
        table: &str,
        id: &str,
        fields: Record,
    ) -> std::result::Result<Record, StoreError> {
        let rows = self.table_mut(table)?;
        let row = rows
            .iter_mut()
            .find(|r| has_id(r, id))
            .ok_or_else(|| StoreError::NotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;
        for (key, value) in fields {
            if key != "id" {
                row.insert(key, value);
            }
        }
        Ok(row.clone())
    }

    fn delete_record(&mut self, table: &str, id: &str) -> std::result::Result<(), StoreError> {
        self.table_mut(table)?.retain(|r| !has_id(r, id));
        Ok(())
    }
}

/// Everything needed to build one professional's grid.
#[derive(Debug, Clone)]
pub struct GridInputs {
    pub professional_id: String,
    pub professional_name: Option<String>,
    pub policy: ProfessionalPolicy,
    pub appointments: Vec<AppointmentRecord>,
    /// Appointment rows whose JSON shape could not even be read.
    pub rejected: Vec<SkippedRow>,
}

/// Read the professional's record and appointments from `store`.
///
/// # Errors
/// `GridError::Store` when the professional does not exist, a table is
/// missing, or the professional record is unreadable.
pub fn load_grid_inputs<S: RecordStore + ?Sized>(
    store: &S,
    professional_id: &str,
) -> Result<GridInputs> {
    let professional = store
        .list_records(PROFESSIONALS, &Filters::new().eq("id", professional_id), None)?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::NotFound {
            table: PROFESSIONALS.to_string(),
            id: professional_id.to_string(),
        })?;
    let policy = ProfessionalPolicy::from_record(&professional)?;
    let professional_name = professional
        .get("name")
        .or_else(|| professional.get("nome"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let rows = store.list_records(
        APPOINTMENTS,
        &Filters::new().eq_any(&["professional_id", "profissional_id"], professional_id),
        None,
    )?;

    let mut appointments = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<AppointmentRecord>(Value::Object(row)) {
            Ok(record) => appointments.push(record),
            Err(e) => {
                tracing::debug!(index, error = %e, "unreadable appointment record");
                rejected.push(SkippedRow {
                    index,
                    reason: SkipReason::Malformed(e.to_string()),
                });
            }
        }
    }

    tracing::debug!(
        professional_id,
        appointments = appointments.len(),
        rejected = rejected.len(),
        "loaded grid inputs"
    );

    Ok(GridInputs {
        professional_id: professional_id.to_string(),
        professional_name,
        policy,
        appointments,
        rejected,
    })
}

