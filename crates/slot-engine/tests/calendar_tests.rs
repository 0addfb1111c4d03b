//! Tests for weekday admission, holidays, weekday names, and clock parsing.

use chrono::{NaiveDate, NaiveTime, Weekday};
use slot_engine::calendar::{
    days_inclusive, fixed_holidays, format_clock, iso_weekday, parse_clock, HolidayCalendar,
    Locale, WeekdayPolicy,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

#[test]
fn iso_weekday_numbers_monday_first() {
    assert_eq!(iso_weekday(date("2026-03-16")), 1);
    assert_eq!(iso_weekday(date("2026-03-21")), 6);
    assert_eq!(iso_weekday(date("2026-03-22")), 7);
}

#[test]
fn default_policy_is_monday_to_friday() {
    let policy = WeekdayPolicy::default();
    let allowed: Vec<bool> = days_inclusive(date("2026-03-16"), date("2026-03-22"))
        .map(|d| policy.allows(d))
        .collect();
    assert_eq!(allowed, vec![true, true, true, true, true, false, false]);
}

#[test]
fn sunday_flag_admits_sunday() {
    let policy = WeekdayPolicy::Weekend {
        saturday: false,
        sunday: true,
    };
    assert!(!policy.allows(date("2026-03-21")));
    assert!(policy.allows(date("2026-03-22")));
}

#[test]
fn parse_list_reads_comma_separated_days() {
    let policy = WeekdayPolicy::parse_list("1, 3,5").unwrap();
    assert_eq!(policy, WeekdayPolicy::explicit([1, 3, 5]));
    assert!(policy.allows(date("2026-03-18")));
    assert!(!policy.allows(date("2026-03-17")));
}

#[test]
fn parse_list_ignores_junk_and_out_of_range() {
    let policy = WeekdayPolicy::parse_list("1,x,9,0,6").unwrap();
    assert_eq!(policy, WeekdayPolicy::explicit([1, 6]));
}

#[test]
fn parse_list_blank_means_no_explicit_set() {
    assert_eq!(WeekdayPolicy::parse_list(""), None);
    assert_eq!(WeekdayPolicy::parse_list("   "), None);
}

#[test]
fn explicit_set_with_only_junk_admits_nothing() {
    let policy = WeekdayPolicy::parse_list("mon,tue").unwrap();
    assert!(days_inclusive(date("2026-03-16"), date("2026-03-22")).all(|d| !policy.allows(d)));
}

#[test]
fn eight_fixed_holidays_per_year() {
    let dates: Vec<NaiveDate> = fixed_holidays(2026).collect();
    assert_eq!(dates.len(), 8);
    assert_eq!(dates[0], date("2026-01-01"));
    assert_eq!(dates[1], date("2026-04-21"));
    assert_eq!(dates[7], date("2026-12-25"));
}

#[test]
fn holiday_calendar_covers_every_year_in_range() {
    let cal = HolidayCalendar::for_range(date("2025-12-01"), date("2027-02-01"));
    assert_eq!(cal.len(), 24);
    assert!(cal.contains(date("2025-12-25")));
    assert!(cal.contains(date("2026-11-02")));
    assert!(cal.contains(date("2027-01-01")));
    assert!(!cal.contains(date("2026-11-03")));
}

#[test]
fn inverted_range_has_no_holidays() {
    let cal = HolidayCalendar::for_range(date("2027-01-01"), date("2026-01-01"));
    assert!(cal.is_empty());

    let cal = HolidayCalendar::for_range(date("2026-12-31"), date("2026-01-02"));
    assert!(cal.is_empty());
}

#[test]
fn days_inclusive_includes_both_ends() {
    let days: Vec<NaiveDate> = days_inclusive(date("2026-02-27"), date("2026-03-01")).collect();
    assert_eq!(
        days,
        vec![date("2026-02-27"), date("2026-02-28"), date("2026-03-01")]
    );
    assert_eq!(days_inclusive(date("2026-03-02"), date("2026-03-01")).count(), 0);
}

#[test]
fn weekday_names_are_localized() {
    assert_eq!(Locale::En.weekday_name(Weekday::Mon), "Monday");
    assert_eq!(Locale::En.weekday_name(Weekday::Sun), "Sunday");
    assert_eq!(Locale::PtBr.weekday_name(Weekday::Tue), "Terça");
    assert_eq!(Locale::PtBr.weekday_name(Weekday::Sat), "Sábado");
}

#[test]
fn locale_parses_common_spellings() {
    assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
    assert_eq!("pt-BR".parse::<Locale>().unwrap(), Locale::PtBr);
    assert_eq!("pt_br".parse::<Locale>().unwrap(), Locale::PtBr);
    assert!("fr".parse::<Locale>().is_err());
    assert_eq!(Locale::PtBr.to_string(), "pt-BR");
}

#[test]
fn clock_accepts_minutes_seconds_and_fractions() {
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    assert_eq!(parse_clock("09:00"), Some(nine));
    assert_eq!(parse_clock("09:00:00"), Some(nine));
    assert_eq!(
        parse_clock("09:00:30.250000"),
        NaiveTime::from_hms_milli_opt(9, 0, 30, 250)
    );
    assert_eq!(parse_clock("25:00"), None);
    assert_eq!(parse_clock("noon"), None);
    assert_eq!(format_clock(nine), "09:00");
}
