// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::macros::date;

use crate::{
    AssayField, AssayReadings, DomainError, EntryDefaults, Hour, Plant, SAMPLE_DESCRIPTIONS,
    SampleType, catalog_position, format_date, normalize_sample_description, parse_date,
};

#[test]
fn test_plant_round_trips_through_display() {
    for plant in Plant::ALL {
        let parsed: Plant = plant.to_string().parse().unwrap();
        assert_eq!(parsed, plant);
    }
    assert_eq!(" SAOB ".parse::<Plant>().unwrap(), Plant::Saob);
}

#[test]
fn test_plant_rejects_unknown_name() {
    let result: Result<Plant, DomainError> = "mp2".parse();
    assert!(matches!(result, Err(DomainError::InvalidPlant(_))));
}

#[test]
fn test_sample_type_uses_exact_labels() {
    assert_eq!(
        "NS - No Sample".parse::<SampleType>().unwrap(),
        SampleType::NoSample
    );
    assert_eq!(SampleType::Special.as_str(), "Special Sample");
    assert!(matches!(
        "Special".parse::<SampleType>(),
        Err(DomainError::InvalidSampleType(_))
    ));
}

#[test]
fn test_hour_parses_even_slots() {
    let hour: Hour = "06h00".parse().unwrap();
    assert_eq!(hour.value(), 6);
    assert_eq!(hour.to_string(), "06h00");
    assert_eq!("22h00".parse::<Hour>().unwrap().value(), 22);
    assert_eq!("00h00".parse::<Hour>().unwrap().value(), 0);
}

#[test]
fn test_hour_rejects_invalid_slots() {
    for raw in ["07h00", "24h00", "06h30", "6h00", "06:00", "", "xxh00"] {
        assert!(
            matches!(raw.parse::<Hour>(), Err(DomainError::InvalidHour(_))),
            "{raw} should be rejected"
        );
    }
}

#[test]
fn test_shift_order_starts_at_six() {
    let labels: Vec<String> = Hour::SHIFT_ORDER.iter().map(ToString::to_string).collect();
    assert_eq!(labels.first().map(String::as_str), Some("06h00"));
    assert_eq!(labels.last().map(String::as_str), Some("04h00"));
    for (index, hour) in Hour::SHIFT_ORDER.iter().enumerate() {
        assert_eq!(hour.shift_index(), index);
    }
}

#[test]
fn test_hours_before_shift_start_roll_back() {
    assert!(Hour::new(0).unwrap().rolls_back());
    assert!(Hour::new(4).unwrap().rolls_back());
    assert!(!Hour::new(6).unwrap().rolls_back());
    assert!(!Hour::new(22).unwrap().rolls_back());
}

#[test]
fn test_hour_serializes_as_label() {
    let hour: Hour = Hour::new(8).unwrap();
    let json: String = serde_json::to_string(&hour).unwrap();
    assert_eq!(json, "\"08h00\"");
    let back: Hour = serde_json::from_str(&json).unwrap();
    assert_eq!(back, hour);
}

#[test]
fn test_sample_description_catalog_positions() {
    assert_eq!(catalog_position(SAMPLE_DESCRIPTIONS[0]), Some(0));
    assert_eq!(catalog_position("Final Concentrate"), Some(5));
    assert_eq!(catalog_position("Grab sample"), None);
}

#[test]
fn test_sample_description_is_trimmed_and_required() {
    assert_eq!(
        normalize_sample_description("  Tailings ").unwrap(),
        "Tailings"
    );
    assert!(matches!(
        normalize_sample_description("   "),
        Err(DomainError::InvalidSampleDescription(_))
    ));
}

#[test]
fn test_assay_field_keys_and_groups() {
    assert_eq!(AssayField::ALL.len(), 21);
    assert_eq!(AssayField::REPORT_METRICS.len(), 13);
    assert!(AssayField::Pan.is_screen());
    assert!(!AssayField::Moisture.is_screen());
    assert_eq!("aa_fe_perc".parse::<AssayField>().unwrap(), AssayField::AaFePerc);
    assert_eq!(AssayField::Screen212.label(), "+212µ");
    assert!(matches!(
        "gold".parse::<AssayField>(),
        Err(DomainError::UnknownField(_))
    ));
}

#[test]
fn test_readings_default_to_zero() {
    let readings: AssayReadings = AssayReadings::new().with(AssayField::FePerc, "61.5");
    assert_eq!(readings.get(AssayField::FePerc), "61.5");
    assert_eq!(readings.get(AssayField::CuPerc), "0");
    assert_eq!(readings.numeric(AssayField::FePerc), Some(61.5));
    assert_eq!(readings.numeric(AssayField::CuPerc), None);
}

#[test]
fn test_readings_from_pairs_rejects_unknown_keys() {
    let readings: AssayReadings =
        AssayReadings::from_pairs([("fe_perc", "60"), ("moisture", "8.1")]).unwrap();
    assert_eq!(readings.get(AssayField::Moisture), "8.1");

    let result: Result<AssayReadings, DomainError> = AssayReadings::from_pairs([("zn_perc", "1")]);
    assert!(matches!(result, Err(DomainError::UnknownField(_))));
}

#[test]
fn test_entry_defaults() {
    let today = date!(2026 - 03 - 05);
    let defaults: EntryDefaults = EntryDefaults::for_date(today);
    assert_eq!(defaults.date, today);
    assert_eq!(defaults.hour.to_string(), "06h00");
    assert_eq!(defaults.plant, Plant::Mp2);
    assert_eq!(defaults.sample_type, SampleType::Normal);
    assert_eq!(defaults.sample_description, "Plant Feed - Frm CNV -2");
}

#[test]
fn test_date_parse_and_format() {
    let parsed = parse_date("2026-03-05").unwrap();
    assert_eq!(parsed, date!(2026 - 03 - 05));
    assert_eq!(format_date(parsed), "2026-03-05");
    assert!(matches!(
        parse_date("2026-02-30"),
        Err(DomainError::InvalidDate { .. })
    ));
}
