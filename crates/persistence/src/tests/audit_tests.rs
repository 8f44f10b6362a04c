// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plantlog::Command;
use plantlog_audit::{AuditAction, AuditEvent, EntityType, ban_description};

use crate::tests::{create_test_actor, create_test_downtime, create_test_persistence, run};

#[test]
fn test_standalone_event_has_no_metadata() {
    let mut persistence = create_test_persistence();
    let admin = create_test_actor(&mut persistence, "admin@plant.example", true);

    let event = AuditEvent::new(
        admin.clone(),
        AuditAction::Ban,
        EntityType::User,
        Some(String::from("12")),
        ban_description("bob@plant.example", "left company"),
        None,
        None,
    );
    let id = persistence.persist_audit_event(&event).unwrap();

    let log = persistence.get_audit_log(id).unwrap().unwrap();
    assert_eq!(log.action, "ban");
    assert_eq!(log.entity_type, "user");
    assert_eq!(log.metadata, None);
    assert_eq!(log.performed_by_name, admin.name);
    assert_eq!(log.user_id, Some(admin.user_id));
}

#[test]
fn test_list_is_newest_first() {
    let mut persistence = create_test_persistence();
    let admin = create_test_actor(&mut persistence, "admin@plant.example", true);

    for equipment in ["Crusher", "Conveyor"] {
        run(
            &mut persistence,
            Command::CreateDowntime {
                draft: create_test_downtime(equipment),
            },
            &admin,
        );
    }

    let descriptions: Vec<String> = persistence
        .list_audit_logs()
        .unwrap()
        .into_iter()
        .map(|log| log.description)
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "Downtime entry created for Conveyor",
            "Downtime entry created for Crusher"
        ]
    );
}

#[test]
fn test_missing_audit_entry_is_none() {
    let mut persistence = create_test_persistence();
    assert!(persistence.get_audit_log(1).unwrap().is_none());
}

#[test]
fn test_audit_survives_user_deletion() {
    let mut persistence = create_test_persistence();
    let admin = create_test_actor(&mut persistence, "admin@plant.example", true);
    let member = create_test_actor(&mut persistence, "ops@plant.example", false);

    run(
        &mut persistence,
        Command::CreateDowntime {
            draft: create_test_downtime("Crusher"),
        },
        &member,
    );
    persistence.delete_user(member.user_id, admin.user_id).unwrap();

    let logs = persistence.list_audit_logs().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].user_id, None);
    assert_eq!(logs[0].performed_by_identifier, "ops@plant.example");

    let entries = persistence.list_downtime().unwrap();
    assert_eq!(entries[0].user_id, None);
}
