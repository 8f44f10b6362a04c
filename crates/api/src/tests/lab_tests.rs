// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use time::macros::date;

use super::helpers::{
    create_batch_request, create_lab_request, create_test_admin, create_test_member,
    create_test_persistence,
};
use crate::{
    ApiError, LabFilterQuery, LabInspectionRequest, batch_create_lab_inspections,
    create_lab_inspection, delete_lab_inspection, get_lab_report, get_shift_summaries,
    list_audit_logs, list_lab_inspections, update_lab_inspection,
};

#[test]
fn test_create_zeroes_hidden_fields() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);

    let response = create_lab_inspection(
        &mut persistence,
        &create_lab_request("2026-03-02", "08h00", "Tailings", "31.25"),
        &actor,
        &member,
    )
    .unwrap();

    let readings: &BTreeMap<String, String> = &response.entry.entry.readings;
    assert_eq!(readings.len(), 21);
    assert_eq!(readings["fe_perc"], "31.25");
    assert_eq!(readings["cu_perc"], "10.5");
    assert_eq!(readings["al2o3_perc"], "0");
    assert_eq!(readings["s_perc"], "0");
    assert_eq!(readings["aa_fe_perc"], "0");
    assert_eq!(readings["screen212"], "0");
    assert_eq!(response.entry.shift_day, "2026-03-02");
    assert_eq!(response.message, "Lab result created");
}

#[test]
fn test_night_slot_belongs_to_previous_shift_day() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);

    let response = create_lab_inspection(
        &mut persistence,
        &create_lab_request("2026-03-03", "02h00", "Tailings", "31.25"),
        &actor,
        &member,
    )
    .unwrap();

    assert_eq!(response.entry.entry.date, "2026-03-03");
    assert_eq!(response.entry.shift_day, "2026-03-02");
}

#[test]
fn test_missing_visible_reading_names_the_field() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);
    let mut request = create_lab_request("2026-03-02", "08h00", "Tailings", "31.25");
    request.readings.remove("fe_perc");

    let err = create_lab_inspection(&mut persistence, &request, &actor, &member).unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "fe_perc"));
}

#[test]
fn test_malformed_reading_is_rejected() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);

    let err = create_lab_inspection(
        &mut persistence,
        &create_lab_request("2026-03-02", "08h00", "Tailings", "123.456"),
        &actor,
        &member,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "fe_perc"));
}

#[test]
fn test_unknown_reading_key_is_rejected() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);
    let mut request = create_lab_request("2026-03-02", "08h00", "Tailings", "31.25");
    request
        .readings
        .insert(String::from("gold_ppm"), String::from("1.5"));

    let err = create_lab_inspection(&mut persistence, &request, &actor, &member).unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "readings"));
}

#[test]
fn test_odd_hour_is_rejected() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);

    let err = create_lab_inspection(
        &mut persistence,
        &create_lab_request("2026-03-02", "07h00", "Tailings", "31.25"),
        &actor,
        &member,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "hour"));
}

#[test]
fn test_no_sample_stores_zeros() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);
    let request = LabInspectionRequest {
        date: String::from("2026-03-02"),
        hour: String::from("14h00"),
        plant: String::from("LIO"),
        sample_type: String::from("NS - No Sample"),
        sample_description: String::from("Middlings"),
        readings: BTreeMap::new(),
    };

    let response = create_lab_inspection(&mut persistence, &request, &actor, &member).unwrap();

    assert!(response.entry.entry.readings.values().all(|v| v == "0"));
    assert_eq!(response.entry.entry.sample_type, "NS - No Sample");
}

#[test]
fn test_batch_creates_one_result_per_description() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);

    let response =
        batch_create_lab_inspections(&mut persistence, &create_batch_request(), &actor, &member)
            .unwrap();

    assert_eq!(response.ids.len(), 6);
    assert_eq!(response.message, "6 lab results created");

    let listed = list_lab_inspections(&mut persistence, &LabFilterQuery::default(), &actor)
        .unwrap()
        .entries;
    assert_eq!(listed.len(), 6);
    assert!(listed.iter().all(|entry| entry.entry.hour == "10h00"));

    let mags = listed
        .iter()
        .find(|entry| entry.entry.sample_description == "Product 1 ( Mags)")
        .unwrap();
    assert_eq!(mags.entry.readings["aa_fe_perc"], "20.25");
}

#[test]
fn test_failed_batch_step_writes_nothing() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);
    let mut request = create_batch_request();
    request.steps[3].readings.remove("cu_perc");

    let err =
        batch_create_lab_inspections(&mut persistence, &request, &actor, &member).unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "batch_step"));
    assert!(
        list_lab_inspections(&mut persistence, &LabFilterQuery::default(), &actor)
            .unwrap()
            .entries
            .is_empty()
    );
}

#[test]
fn test_empty_batch_is_rejected() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);
    let mut request = create_batch_request();
    request.steps.clear();

    let err =
        batch_create_lab_inspections(&mut persistence, &request, &actor, &member).unwrap_err();

    assert!(
        matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "non_empty_batch")
    );
}

#[test]
fn test_filter_by_plant_hours_and_dates() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);
    for (date, hour, plant) in [
        ("2026-03-02", "08h00", "MP2"),
        ("2026-03-02", "10h00", "SAOB"),
        ("2026-03-03", "12h00", "MP2"),
        ("2026-03-05", "08h00", "SAOB"),
    ] {
        let mut request = create_lab_request(date, hour, "Tailings", "30");
        request.plant = plant.to_string();
        create_lab_inspection(&mut persistence, &request, &actor, &member).unwrap();
    }

    let by_plant = LabFilterQuery {
        plant: Some(String::from("SAOB")),
        ..LabFilterQuery::default()
    };
    let by_hours = LabFilterQuery {
        hours: Some(String::from("08h00, 12h00")),
        ..LabFilterQuery::default()
    };
    let by_dates = LabFilterQuery {
        start_date: Some(String::from("2026-03-02")),
        end_date: Some(String::from("2026-03-03")),
        plant: Some(String::from("MP2")),
        hours: None,
    };

    for (query, expected) in [(by_plant, 2), (by_hours, 3), (by_dates, 2)] {
        let entries = list_lab_inspections(&mut persistence, &query, &actor)
            .unwrap()
            .entries;
        assert_eq!(entries.len(), expected, "{query:?}");
    }
}

#[test]
fn test_reversed_date_range_is_rejected() {
    let mut persistence = create_test_persistence();
    let (actor, _) = create_test_member(&mut persistence);
    let query = LabFilterQuery {
        start_date: Some(String::from("2026-03-05")),
        end_date: Some(String::from("2026-03-01")),
        ..LabFilterQuery::default()
    };

    let err = list_lab_inspections(&mut persistence, &query, &actor).unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "end_date"));
}

#[test]
fn test_summaries_default_to_current_week() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);
    for (date, hour, fe) in [
        ("2026-03-02", "08h00", "30"),
        ("2026-03-02", "10h00", "40"),
        ("2026-03-10", "08h00", "55"),
    ] {
        create_lab_inspection(
            &mut persistence,
            &create_lab_request(date, hour, "Tailings", fe),
            &actor,
            &member,
        )
        .unwrap();
    }

    let response = get_shift_summaries(
        &mut persistence,
        &LabFilterQuery::default(),
        &actor,
        date!(2026 - 03 - 04),
    )
    .unwrap();

    assert_eq!(response.start_date.as_deref(), Some("2026-03-01"));
    assert_eq!(response.end_date.as_deref(), Some("2026-03-07"));
    assert_eq!(response.shifts.len(), 1);

    let shift = &response.shifts[0];
    assert_eq!(shift.shift_day, "2026-03-02");
    assert_eq!(shift.label, "2 March 2026");
    assert_eq!(shift.entries.len(), 2);
    assert_eq!(shift.averages["fe_perc"], "35.00");
    assert_eq!(shift.averages["al2o3_perc"], "");
}

#[test]
fn test_report_groups_by_shift_day_and_dedupes() {
    let mut persistence = create_test_persistence();
    let (actor, member) = create_test_member(&mut persistence);
    for (date, hour, description, fe) in [
        ("2026-03-02", "08h00", "Tailings", "30"),
        ("2026-03-02", "08h00", "Tailings", "44"),
        ("2026-03-03", "02h00", "Plant Feed - Frm CNV -2", "50"),
        ("2026-03-03", "08h00", "Tailings", "36"),
    ] {
        create_lab_inspection(
            &mut persistence,
            &create_lab_request(date, hour, description, fe),
            &actor,
            &member,
        )
        .unwrap();
    }

    let report = get_lab_report(&mut persistence, &LabFilterQuery::default(), &actor).unwrap();

    assert_eq!(
        report.descriptions,
        vec!["Plant Feed - Frm CNV -2", "Tailings"]
    );
    assert_eq!(report.metrics.len(), 13);
    let shift_days: Vec<&str> = report.days.iter().map(|d| d.shift_day.as_str()).collect();
    assert_eq!(shift_days, vec!["2026-03-03", "2026-03-02"]);

    let earlier = &report.days[1];
    assert_eq!(earlier.rows.len(), 12);
    assert_eq!(earlier.rows[0].hour, "06h00");

    let night = &earlier.rows[10];
    assert_eq!(night.hour, "02h00");
    assert_eq!(night.date, "2026-03-03");
    assert_eq!(night.cells[0].as_ref().unwrap()[0], "50");

    let morning = &earlier.rows[1];
    let kept_fe: &str = &morning.cells[1].as_ref().unwrap()[0];
    assert!(kept_fe == "30" || kept_fe == "44");
    assert_eq!(earlier.averages[1][0], format!("{:.2}", kept_fe.parse::<f64>().unwrap()));
}

#[test]
fn test_admin_update_is_audited_with_both_states() {
    let mut persistence = create_test_persistence();
    let (member_actor, member) = create_test_member(&mut persistence);
    let (admin_actor, admin) = create_test_admin(&mut persistence);
    let created = create_lab_inspection(
        &mut persistence,
        &create_lab_request("2026-03-02", "08h00", "Tailings", "30"),
        &member_actor,
        &member,
    )
    .unwrap();

    let updated = update_lab_inspection(
        &mut persistence,
        created.entry.id,
        &create_lab_request("2026-03-02", "08h00", "Tailings", "33.5"),
        &admin_actor,
        &admin,
    )
    .unwrap();
    assert_eq!(updated.entry.entry.readings["fe_perc"], "33.5");

    let log = list_audit_logs(&mut persistence, &admin_actor).unwrap();
    let latest = &log.entries[0];
    assert_eq!(latest.action, "update");
    assert_eq!(latest.entity_type, "lab_inspection");
    let metadata = latest.metadata.as_ref().unwrap();
    assert!(metadata.get("old").is_some());
    assert!(metadata.get("new").is_some());
}

#[test]
fn test_admin_delete_removes_result() {
    let mut persistence = create_test_persistence();
    let (admin_actor, admin) = create_test_admin(&mut persistence);
    let created = create_lab_inspection(
        &mut persistence,
        &create_lab_request("2026-03-02", "08h00", "Tailings", "30"),
        &admin_actor,
        &admin,
    )
    .unwrap();

    delete_lab_inspection(&mut persistence, created.entry.id, &admin_actor, &admin).unwrap();

    assert!(
        persistence
            .get_lab_inspection(created.entry.id)
            .unwrap()
            .is_none()
    );
    let err = delete_lab_inspection(&mut persistence, created.entry.id, &admin_actor, &admin)
        .unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}
