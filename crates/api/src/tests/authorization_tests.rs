// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    create_downtime_request, create_lab_request, create_test_admin, create_test_member,
    create_test_persistence, plant_tz,
};
use crate::{
    ApiError, AuthenticatedActor, AuthorizationService, ExportFormat, LabFilterQuery, Role,
    create_downtime, create_lab_inspection, delete_downtime, delete_lab_inspection,
    export_downtime, get_downtime_report, list_audit_logs, list_downtime, list_users,
    resolve_downtime, update_downtime, update_lab_inspection,
};

fn assert_unauthorized<T: std::fmt::Debug>(result: Result<T, ApiError>) {
    match result {
        Err(ApiError::Unauthorized { required_role, .. }) => assert_eq!(required_role, "Admin"),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[test]
fn test_member_can_log_and_resolve_downtime() {
    let mut persistence = create_test_persistence();
    let (member_actor, member) = create_test_member(&mut persistence);

    let created = create_downtime(
        &mut persistence,
        &create_downtime_request("Ball mill 1"),
        &member_actor,
        &member,
        plant_tz(),
    )
    .unwrap();

    let resolved = resolve_downtime(
        &mut persistence,
        created.entry.id,
        &crate::ResolveDowntimeRequest {
            end_date: String::from("2026-03-02T09:30:00Z"),
            notes: None,
        },
        &member_actor,
        &member,
        plant_tz(),
    )
    .unwrap();

    assert_eq!(resolved.entry.status, "up");
    assert_eq!(list_downtime(&mut persistence, &member_actor, plant_tz()).unwrap().entries.len(), 1);
}

#[test]
fn test_member_cannot_edit_or_delete_downtime() {
    let mut persistence = create_test_persistence();
    let (member_actor, member) = create_test_member(&mut persistence);
    let created = create_downtime(
        &mut persistence,
        &create_downtime_request("Ball mill 1"),
        &member_actor,
        &member,
        plant_tz(),
    )
    .unwrap();

    assert_unauthorized(update_downtime(
        &mut persistence,
        created.entry.id,
        &create_downtime_request("Ball mill 2"),
        &member_actor,
        &member,
        plant_tz(),
    ));
    assert_unauthorized(delete_downtime(
        &mut persistence,
        created.entry.id,
        &member_actor,
        &member,
    ));
    assert_unauthorized(get_downtime_report(
        &mut persistence,
        created.entry.id,
        &member_actor,
        plant_tz(),
    ));

    assert_eq!(persistence.list_downtime().unwrap().len(), 1);
}

#[test]
fn test_member_cannot_edit_or_delete_lab_results() {
    let mut persistence = create_test_persistence();
    let (member_actor, member) = create_test_member(&mut persistence);
    let created = create_lab_inspection(
        &mut persistence,
        &create_lab_request("2026-03-02", "08h00", "Tailings", "30.1"),
        &member_actor,
        &member,
    )
    .unwrap();

    assert_unauthorized(update_lab_inspection(
        &mut persistence,
        created.entry.id,
        &create_lab_request("2026-03-02", "08h00", "Tailings", "31.0"),
        &member_actor,
        &member,
    ));
    assert_unauthorized(delete_lab_inspection(
        &mut persistence,
        created.entry.id,
        &member_actor,
        &member,
    ));
}

#[test]
fn test_member_cannot_manage_users_or_read_audit_log() {
    let mut persistence = create_test_persistence();
    let (member_actor, _) = create_test_member(&mut persistence);

    assert_unauthorized(list_users(&mut persistence, &member_actor));
    assert_unauthorized(list_audit_logs(&mut persistence, &member_actor));
}

#[test]
fn test_member_can_export_reports() {
    let mut persistence = create_test_persistence();
    let (member_actor, _) = create_test_member(&mut persistence);

    assert!(export_downtime(&mut persistence, ExportFormat::Csv, &member_actor, plant_tz()).is_ok());
    assert!(
        crate::get_lab_report(&mut persistence, &LabFilterQuery::default(), &member_actor).is_ok()
    );
}

#[test]
fn test_admin_passes_every_check() {
    let mut persistence = create_test_persistence();
    let (admin_actor, _) = create_test_admin(&mut persistence);

    assert!(AuthorizationService::authorize_update_downtime(&admin_actor).is_ok());
    assert!(AuthorizationService::authorize_delete_downtime(&admin_actor).is_ok());
    assert!(AuthorizationService::authorize_downtime_report(&admin_actor).is_ok());
    assert!(AuthorizationService::authorize_update_lab(&admin_actor).is_ok());
    assert!(AuthorizationService::authorize_delete_lab(&admin_actor).is_ok());
    assert!(AuthorizationService::authorize_view_audit_log(&admin_actor).is_ok());
    assert!(AuthorizationService::authorize_manage_users(&admin_actor).is_ok());
}

#[test]
fn test_unauthorized_error_names_the_action() {
    let actor = AuthenticatedActor::new(7, String::from("crew@plant.example"), Role::Member);

    let err = AuthorizationService::authorize_update_lab(&actor).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Unauthorized: 'update_lab_inspection' requires Admin role"
    );
}
