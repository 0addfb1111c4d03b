//! Tests for policy parsing, defaults, overrides, and validation.

use chrono::NaiveTime;
use serde_json::json;
use slot_engine::calendar::WeekdayPolicy;
use slot_engine::store::Record;
use slot_engine::{GridError, GridOverrides, Locale, LunchBreak, ProfessionalPolicy, StoreError};

fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn record(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("fixture must be an object"),
    }
}

#[test]
fn empty_record_gives_defaults() {
    let policy = ProfessionalPolicy::from_record(&Record::new()).unwrap();
    assert_eq!(policy, ProfessionalPolicy::default());
    assert_eq!(policy.workday_start, t(8, 0));
    assert_eq!(policy.workday_end, t(18, 0));
    assert_eq!(policy.slot_minutes, 30);
    assert_eq!(policy.buffer_minutes, 0);
    assert_eq!(policy.capacity, 1);
    assert!(policy.lunch.is_none());
    assert!(!policy.observe_holidays);
}

#[test]
fn full_record_is_parsed() {
    let policy = ProfessionalPolicy::from_record(&record(json!({
        "id": 7,
        "allowed_weekdays": "1,2,3",
        "workday_start": "09:00:00",
        "workday_end": "17:30",
        "lunch_start": "12:00",
        "lunch_end": "13:00",
        "slot_minutes": 45,
        "buffer_minutes": "10",
        "capacity": 2,
        "observe_holidays": true,
        "locale": "pt-BR"
    })))
    .unwrap();

    assert_eq!(policy.weekdays, WeekdayPolicy::explicit([1, 2, 3]));
    assert_eq!(policy.workday_start, t(9, 0));
    assert_eq!(policy.workday_end, t(17, 30));
    assert_eq!(policy.lunch, Some(LunchBreak::new(t(12, 0), t(13, 0))));
    assert_eq!(policy.slot_minutes, 45);
    assert_eq!(policy.buffer_minutes, 10);
    assert_eq!(policy.capacity, 2);
    assert!(policy.observe_holidays);
    assert_eq!(policy.locale, Locale::PtBr);
}

#[test]
fn legacy_column_names_are_accepted() {
    let policy = ProfessionalPolicy::from_record(&record(json!({
        "dias_semana": "",
        "aceita_sabado": true,
        "aceita_domingo": false,
        "hora_inicio_jornada": "07:00:00",
        "hora_fim_jornada": "11:00:00",
        "slot_minutos": 20,
        "buffer_minutos": 5,
        "capacidade_simultanea": 3,
        "considerar_feriados": true
    })))
    .unwrap();

    assert_eq!(
        policy.weekdays,
        WeekdayPolicy::Weekend {
            saturday: true,
            sunday: false
        }
    );
    assert_eq!(policy.workday_start, t(7, 0));
    assert_eq!(policy.slot_minutes, 20);
    assert_eq!(policy.buffer_minutes, 5);
    assert_eq!(policy.capacity, 3);
    assert!(policy.observe_holidays);
}

#[test]
fn weekday_array_is_accepted() {
    let policy =
        ProfessionalPolicy::from_record(&record(json!({ "allowed_weekdays": [6, 7] }))).unwrap();
    assert_eq!(policy.weekdays, WeekdayPolicy::explicit([6, 7]));
}

#[test]
fn zero_or_null_slot_and_capacity_fall_back_to_defaults() {
    let policy = ProfessionalPolicy::from_record(&record(json!({
        "slot_minutes": 0,
        "capacity": null,
        "buffer_minutes": null
    })))
    .unwrap();
    assert_eq!(policy.slot_minutes, 30);
    assert_eq!(policy.capacity, 1);
    assert_eq!(policy.buffer_minutes, 0);
}

#[test]
fn unparseable_times_fall_back_and_half_lunch_is_dropped() {
    let policy = ProfessionalPolicy::from_record(&record(json!({
        "workday_start": "eight",
        "lunch_start": "12:00",
        "lunch_end": ""
    })))
    .unwrap();
    assert_eq!(policy.workday_start, t(8, 0));
    assert!(policy.lunch.is_none());
}

#[test]
fn negative_values_survive_parsing_and_fail_validation() {
    let policy =
        ProfessionalPolicy::from_record(&record(json!({ "slot_minutes": -15 }))).unwrap();
    assert_eq!(policy.slot_minutes, -15);
    assert!(matches!(policy.validate(), Err(GridError::Configuration(_))));

    let policy = ProfessionalPolicy::from_record(&record(json!({ "capacity": -1 }))).unwrap();
    assert_eq!(policy.capacity, 0);
    assert!(policy.validate().is_err());
}

#[test]
fn wrong_json_type_is_an_invalid_record() {
    let err = ProfessionalPolicy::from_record(&record(json!({ "slot_minutes": {"a": 1} })))
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidRecord(_)));
}

#[test]
fn default_policy_is_valid() {
    ProfessionalPolicy::default().validate().unwrap();
}

#[test]
fn validation_messages_name_the_problem() {
    let policy = ProfessionalPolicy {
        workday_start: t(18, 0),
        workday_end: t(8, 0),
        ..ProfessionalPolicy::default()
    };
    let msg = policy.validate().unwrap_err().to_string();
    assert!(msg.contains("workday end (08:00)"), "{}", msg);

    let policy = ProfessionalPolicy {
        lunch: Some(LunchBreak::new(t(12, 0), t(12, 0))),
        ..ProfessionalPolicy::default()
    };
    let msg = policy.validate().unwrap_err().to_string();
    assert!(msg.contains("lunch end"), "{}", msg);
}

#[test]
fn overrides_replace_only_what_they_set() {
    let base = ProfessionalPolicy {
        lunch: Some(LunchBreak::new(t(12, 0), t(13, 0))),
        ..ProfessionalPolicy::default()
    };
    let overrides = GridOverrides {
        slot_minutes: Some(60),
        capacity: Some(4),
        ..GridOverrides::default()
    };

    let merged = base.with_overrides(&overrides);
    assert_eq!(merged.slot_minutes, 60);
    assert_eq!(merged.capacity, 4);
    assert_eq!(merged.lunch, base.lunch);
    assert_eq!(merged.workday_start, base.workday_start);
}

#[test]
fn overrides_can_disable_or_replace_lunch() {
    let base = ProfessionalPolicy {
        lunch: Some(LunchBreak::new(t(12, 0), t(13, 0))),
        ..ProfessionalPolicy::default()
    };

    let off = GridOverrides {
        lunch: Some(None),
        ..GridOverrides::default()
    };
    assert!(off.apply(&base).lunch.is_none());

    let moved = GridOverrides {
        lunch: Some(Some(LunchBreak::new(t(11, 30), t(12, 30)))),
        observe_holidays: Some(true),
        locale: Some(Locale::PtBr),
        workday_start: Some(t(7, 0)),
        workday_end: Some(t(19, 0)),
        buffer_minutes: Some(5),
        ..GridOverrides::default()
    };
    let merged = moved.apply(&base);
    assert_eq!(merged.lunch, Some(LunchBreak::new(t(11, 30), t(12, 30))));
    assert!(merged.observe_holidays);
    assert_eq!(merged.locale, Locale::PtBr);
    assert_eq!(merged.workday_start, t(7, 0));
    assert_eq!(merged.workday_end, t(19, 0));
    assert_eq!(merged.buffer_minutes, 5);
}

#[test]
fn empty_overrides_are_a_no_op() {
    let overrides = GridOverrides::default();
    assert!(overrides.is_empty());
    let base = ProfessionalPolicy::default();
    assert_eq!(overrides.apply(&base), base);
}
