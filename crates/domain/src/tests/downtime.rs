// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::{date, datetime};
use time::{Duration, OffsetDateTime};

use crate::{
    DomainError, Downtime, DowntimeStatus, format_duration, format_timestamp, parse_timestamp,
    parse_timezone, shift_day_of_timestamp,
};

fn open_downtime() -> Downtime {
    Downtime {
        start: datetime!(2026-03-05 08:15 UTC),
        end: None,
        plant_category: String::from("Processing"),
        plant_section: String::from("Crushing"),
        discipline: String::from("Mechanical"),
        plant_equipment: String::from("Primary crusher"),
        breakdown_description: String::from("Bearing failure"),
        notes: None,
    }
}

#[test]
fn test_open_downtime_is_down() {
    let downtime: Downtime = open_downtime();
    assert_eq!(downtime.status(), DowntimeStatus::Down);
    assert_eq!(downtime.duration(), None);
    assert_eq!(downtime.duration_label(), "N/A");
}

#[test]
fn test_resolved_downtime_reports_duration() {
    let downtime: Downtime = open_downtime()
        .resolve(datetime!(2026-03-05 10:45 UTC), Some(String::from("Replaced")))
        .unwrap();
    assert_eq!(downtime.status(), DowntimeStatus::Up);
    assert_eq!(downtime.status().to_string(), "up");
    assert_eq!(downtime.duration_label(), "2h 30m");
    assert_eq!(downtime.notes.as_deref(), Some("Replaced"));
}

#[test]
fn test_resolve_rejects_already_resolved() {
    let resolved: Downtime = open_downtime()
        .resolve(datetime!(2026-03-05 09:00 UTC), None)
        .unwrap();
    let result: Result<Downtime, DomainError> =
        resolved.resolve(datetime!(2026-03-05 11:00 UTC), None);
    assert_eq!(result, Err(DomainError::AlreadyResolved));
}

#[test]
fn test_resolve_rejects_end_before_start() {
    let result: Result<Downtime, DomainError> =
        open_downtime().resolve(datetime!(2026-03-05 08:00 UTC), None);
    assert!(matches!(result, Err(DomainError::EndBeforeStart { .. })));
}

#[test]
fn test_validate_trims_and_requires_fields() {
    let mut downtime: Downtime = open_downtime();
    downtime.plant_section = String::from("  Crushing  ");
    downtime.notes = Some(String::from("   "));
    let validated: Downtime = downtime.validate().unwrap();
    assert_eq!(validated.plant_section, "Crushing");
    assert_eq!(validated.notes, None);

    let mut missing: Downtime = open_downtime();
    missing.discipline = String::from(" ");
    assert_eq!(
        missing.validate(),
        Err(DomainError::MissingField {
            field: "discipline"
        })
    );
}

#[test]
fn test_validate_rejects_end_before_start() {
    let mut downtime: Downtime = open_downtime();
    downtime.end = Some(datetime!(2026-03-05 07:00 UTC));
    assert!(matches!(
        downtime.validate(),
        Err(DomainError::EndBeforeStart { .. })
    ));
}

#[test]
fn test_format_duration_carries_minutes() {
    assert_eq!(format_duration(Duration::minutes(59)), "0h 59m");
    assert_eq!(format_duration(Duration::minutes(125)), "2h 5m");
    assert_eq!(format_duration(Duration::hours(26)), "26h 0m");
}

#[test]
fn test_timestamps_are_rfc3339() {
    let parsed: OffsetDateTime = parse_timestamp("2026-03-05T08:15:00Z").unwrap();
    assert_eq!(parsed, datetime!(2026-03-05 08:15 UTC));
    assert_eq!(format_timestamp(parsed).unwrap(), "2026-03-05T08:15:00Z");
    assert!(matches!(
        parse_timestamp("05/03/2026 08:15"),
        Err(DomainError::InvalidTimestamp { .. })
    ));
}

#[test]
fn test_shift_day_of_timestamp_uses_plant_timezone() {
    let tz = parse_timezone("Africa/Johannesburg").unwrap();
    // 03:30 UTC is 05:30 in Johannesburg, still the previous shift.
    let early: OffsetDateTime = datetime!(2026-03-05 03:30 UTC);
    assert_eq!(shift_day_of_timestamp(early, tz), date!(2026 - 03 - 04));

    // 04:30 UTC is 06:30 local.
    let after: OffsetDateTime = datetime!(2026-03-05 04:30 UTC);
    assert_eq!(shift_day_of_timestamp(after, tz), date!(2026 - 03 - 05));
}

#[test]
fn test_parse_timezone_rejects_unknown_names() {
    assert!(parse_timezone("UTC").is_ok());
    assert_eq!(
        parse_timezone("Mars/Olympus"),
        Err(DomainError::InvalidTimezone(String::from("Mars/Olympus")))
    );
}
