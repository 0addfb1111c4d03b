//! Tests for appointment row parsing.

use chrono::{NaiveDate, NaiveTime};
use serde_json::json;
use slot_engine::{AppointmentRecord, AppointmentStatus, SkipReason};

#[test]
fn complete_row_parses() {
    let row = AppointmentRecord::new("7", "2026-03-16", "09:00:00", "09:45:00")
        .client("Ana")
        .status("Confirmado")
        .notes("first visit");

    let appt = row.parse().unwrap();

    assert_eq!(appt.professional_id, "7");
    assert_eq!(appt.date, NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
    assert_eq!(appt.start, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    assert_eq!(appt.end, NaiveTime::from_hms_opt(9, 45, 0).unwrap());
    assert_eq!(appt.status, AppointmentStatus::Confirmed);
    assert_eq!(appt.client_name, "Ana");
    assert_eq!(appt.notes, "first visit");
    assert_eq!(appt.client_phone, "");
}

#[test]
fn missing_status_defaults_to_pending() {
    let appt = AppointmentRecord::new("7", "2026-03-16", "09:00", "10:00")
        .parse()
        .unwrap();
    assert_eq!(appt.status, AppointmentStatus::Pending);

    let appt = AppointmentRecord::new("7", "2026-03-16", "09:00", "10:00")
        .status("  ")
        .parse()
        .unwrap();
    assert_eq!(appt.status, AppointmentStatus::Pending);
}

#[test]
fn status_labels_in_both_languages() {
    for (label, expected) in [
        ("Pending", AppointmentStatus::Pending),
        ("pendente", AppointmentStatus::Pending),
        ("CONFIRMED", AppointmentStatus::Confirmed),
        ("Concluído", AppointmentStatus::Completed),
        ("completed", AppointmentStatus::Completed),
        ("Canceled", AppointmentStatus::Cancelled),
        ("Cancelado", AppointmentStatus::Cancelled),
    ] {
        assert_eq!(label.parse::<AppointmentStatus>().unwrap(), expected, "{}", label);
    }
}

#[test]
fn unrecognised_status_is_kept_verbatim() {
    let status: AppointmentStatus = " Remarcado ".parse().unwrap();
    assert_eq!(status, AppointmentStatus::Other("Remarcado".to_string()));
    assert!(!status.is_known());
    assert_eq!(status.to_string(), "Remarcado");

    let appt = AppointmentRecord::new("7", "2026-03-16", "09:00", "10:00")
        .status("Rescheduled")
        .parse()
        .unwrap();
    assert_eq!(appt.status.as_str(), "Rescheduled");
}

#[test]
fn status_serializes_as_its_label() {
    assert_eq!(
        serde_json::to_value(AppointmentStatus::Confirmed).unwrap(),
        json!("Confirmed")
    );
    assert_eq!(
        serde_json::to_value(AppointmentStatus::Other("Remarcado".to_string())).unwrap(),
        json!("Remarcado")
    );
    let back: AppointmentStatus = serde_json::from_value(json!("cancelado")).unwrap();
    assert_eq!(back, AppointmentStatus::Cancelled);
}

#[test]
fn status_display_is_english() {
    let labels: Vec<String> = AppointmentStatus::ALL.iter().map(|s| s.to_string()).collect();
    assert_eq!(labels, vec!["Pending", "Confirmed", "Completed", "Cancelled"]);
}

#[test]
fn missing_fields_are_reported() {
    let mut row = AppointmentRecord::new("7", "2026-03-16", "09:00", "10:00");
    row.end_time = None;
    assert_eq!(row.parse(), Err(SkipReason::MissingField("end_time")));

    let mut row = AppointmentRecord::new("7", "2026-03-16", "09:00", "10:00");
    row.date = None;
    assert_eq!(row.parse(), Err(SkipReason::MissingField("date")));

    let mut row = AppointmentRecord::new("7", "2026-03-16", "09:00", "10:00");
    row.professional_id = None;
    assert_eq!(row.parse(), Err(SkipReason::MissingField("professional_id")));
}

#[test]
fn end_before_start_is_rejected() {
    let row = AppointmentRecord::new("7", "2026-03-16", "23:00", "00:30");
    assert!(matches!(row.parse(), Err(SkipReason::EndBeforeStart { .. })));
}

#[test]
fn zero_length_booking_is_kept() {
    let appt = AppointmentRecord::new("7", "2026-03-16", "09:30", "09:30")
        .parse()
        .unwrap();
    let day = appt.date;
    // Strictly inside 09:00-10:00, so it overlaps.
    assert!(appt.overlaps(
        day.and_hms_opt(9, 0, 0).unwrap(),
        day.and_hms_opt(10, 0, 0).unwrap()
    ));
    // Touching the start of 09:30-10:00 does not.
    assert!(!appt.overlaps(
        day.and_hms_opt(9, 30, 0).unwrap(),
        day.and_hms_opt(10, 0, 0).unwrap()
    ));
}

#[test]
fn record_deserializes_from_store_json() {
    let row: AppointmentRecord = serde_json::from_value(json!({
        "id": 12,
        "professional_id": 7,
        "client_name": "Ana",
        "client_phone": "(11) 91234-5678",
        "date": "2026-03-16",
        "start_time": "09:00:00",
        "end_time": "10:00:00",
        "status": "Confirmed",
        "notes": null,
        "client_id": 3
    }))
    .unwrap();

    assert_eq!(row.id.as_deref(), Some("12"));
    assert_eq!(row.professional_id.as_deref(), Some("7"));
    let appt = row.parse().unwrap();
    assert_eq!(appt.client_phone, "(11) 91234-5678");
    assert_eq!(appt.notes, "");
}

#[test]
fn record_accepts_legacy_column_names() {
    let row: AppointmentRecord = serde_json::from_value(json!({
        "profissional_id": "7",
        "cliente_nome": "Bia",
        "data_atendimento": "2026-03-16",
        "hora_inicio": "14:00:00",
        "hora_fim": "14:30:00",
        "status": "Pendente",
        "observacoes": "retorno"
    }))
    .unwrap();

    let appt = row.parse().unwrap();
    assert_eq!(appt.client_name, "Bia");
    assert_eq!(appt.notes, "retorno");
    assert_eq!(appt.status, AppointmentStatus::Pending);
}
