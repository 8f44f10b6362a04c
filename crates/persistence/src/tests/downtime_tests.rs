// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plantlog::{Command, Mutation, TransitionResult, apply};
use plantlog_audit::AuditEvent;
use plantlog_domain::DowntimeStatus;
use time::macros::datetime;

use crate::tests::{create_test_actor, create_test_downtime, create_test_persistence, run};
use crate::{AuditLogRecord, PersistenceError};

#[test]
fn test_create_downtime_fills_audit_entity_id() {
    let mut persistence = create_test_persistence();
    let actor = create_test_actor(&mut persistence, "ops@plant.example", false);

    let written = run(
        &mut persistence,
        Command::CreateDowntime {
            draft: create_test_downtime("Ball mill 2"),
        },
        &actor,
    );

    let downtime_id = written.row_ids[0];
    let record = persistence.get_downtime(downtime_id).unwrap().unwrap();
    assert_eq!(record.downtime.plant_equipment, "Ball mill 2");
    assert_eq!(record.downtime.status(), DowntimeStatus::Down);
    assert_eq!(record.user_id, Some(actor.user_id));
    assert_eq!(record.created_at, record.updated_at);

    let log = persistence
        .get_audit_log(written.audit_log_ids[0])
        .unwrap()
        .unwrap();
    assert_eq!(log.action, "create");
    assert_eq!(log.entity_type, "downtime");
    assert_eq!(log.entity_id, Some(downtime_id.to_string()));
    assert_eq!(log.description, "Downtime entry created for Ball mill 2");
    assert_eq!(log.performed_by_identifier, "ops@plant.example");
}

#[test]
fn test_list_downtime_is_newest_first() {
    let mut persistence = create_test_persistence();
    let actor = create_test_actor(&mut persistence, "ops@plant.example", false);

    for equipment in ["Crusher", "Conveyor", "Thickener"] {
        run(
            &mut persistence,
            Command::CreateDowntime {
                draft: create_test_downtime(equipment),
            },
            &actor,
        );
    }

    let equipment: Vec<String> = persistence
        .list_downtime()
        .unwrap()
        .into_iter()
        .map(|record| record.downtime.plant_equipment)
        .collect();
    assert_eq!(equipment, vec!["Thickener", "Conveyor", "Crusher"]);
}

#[test]
fn test_resolve_keeps_owner_and_records_before_and_after() {
    let mut persistence = create_test_persistence();
    let member = create_test_actor(&mut persistence, "ops@plant.example", false);
    let other = create_test_actor(&mut persistence, "night@plant.example", false);

    let created = run(
        &mut persistence,
        Command::CreateDowntime {
            draft: create_test_downtime("Crusher"),
        },
        &member,
    );
    let id = created.row_ids[0];
    let current = persistence.get_downtime(id).unwrap().unwrap().downtime;

    let resolved = run(
        &mut persistence,
        Command::ResolveDowntime {
            id,
            current,
            end: datetime!(2026-03-05 10:30 UTC),
            notes: Some(String::from("Replaced bearing")),
        },
        &other,
    );

    let record = persistence.get_downtime(id).unwrap().unwrap();
    assert_eq!(record.downtime.status(), DowntimeStatus::Up);
    assert_eq!(record.downtime.duration_label(), "2h 30m");
    assert_eq!(record.downtime.notes.as_deref(), Some("Replaced bearing"));
    assert_eq!(record.user_id, Some(member.user_id));

    let log = persistence
        .get_audit_log(resolved.audit_log_ids[0])
        .unwrap()
        .unwrap();
    assert_eq!(log.action, "resolve");
    let metadata: serde_json::Value = serde_json::from_str(&log.metadata.unwrap()).unwrap();
    assert_eq!(metadata["old"]["end_date"], serde_json::Value::Null);
    assert_eq!(metadata["new"]["end_date"], "2026-03-05T10:30:00Z");
}

#[test]
fn test_update_can_clear_notes() {
    let mut persistence = create_test_persistence();
    let admin = create_test_actor(&mut persistence, "admin@plant.example", true);

    let mut draft = create_test_downtime("Crusher");
    draft.notes = Some(String::from("Waiting on parts"));
    let id = run(&mut persistence, Command::CreateDowntime { draft }, &admin).row_ids[0];
    let current = persistence.get_downtime(id).unwrap().unwrap().downtime;

    let mut edited = current.clone();
    edited.notes = None;
    edited.discipline = String::from("Electrical");
    run(
        &mut persistence,
        Command::UpdateDowntime {
            id,
            current,
            draft: edited,
        },
        &admin,
    );

    let record = persistence.get_downtime(id).unwrap().unwrap();
    assert_eq!(record.downtime.notes, None);
    assert_eq!(record.downtime.discipline, "Electrical");
}

#[test]
fn test_delete_archives_and_keeps_audit_trail() {
    let mut persistence = create_test_persistence();
    let admin = create_test_actor(&mut persistence, "admin@plant.example", true);

    let id = run(
        &mut persistence,
        Command::CreateDowntime {
            draft: create_test_downtime("Crusher"),
        },
        &admin,
    )
    .row_ids[0];
    let current = persistence.get_downtime(id).unwrap().unwrap().downtime;

    run(
        &mut persistence,
        Command::DeleteDowntime { id, current },
        &admin,
    );

    assert!(persistence.get_downtime(id).unwrap().is_none());
    let trail: Vec<AuditLogRecord> = persistence
        .list_audit_logs_for_entity("downtime", &id.to_string())
        .unwrap();
    let actions: Vec<&str> = trail.iter().map(|log| log.action.as_str()).collect();
    assert_eq!(actions, vec!["delete", "create"]);
}

#[test]
fn test_failed_transition_writes_nothing() {
    let mut persistence = create_test_persistence();
    let admin = create_test_actor(&mut persistence, "admin@plant.example", true);

    let ghost = apply(
        Command::DeleteDowntime {
            id: 404,
            current: create_test_downtime("Ghost"),
        },
        admin,
    )
    .unwrap();

    assert_eq!(
        persistence.persist_transition(&ghost),
        Err(PersistenceError::DowntimeNotFound(404))
    );
    assert!(persistence.list_audit_logs().unwrap().is_empty());
}

#[test]
fn test_audit_rows_roll_back_with_mutation() {
    let mut persistence = create_test_persistence();
    let admin = create_test_actor(&mut persistence, "admin@plant.example", true);

    // An event from a user that does not exist violates the audit foreign key.
    let mut result: TransitionResult = apply(
        Command::CreateDowntime {
            draft: create_test_downtime("Crusher"),
        },
        admin.clone(),
    )
    .unwrap();
    let mut stray: AuditEvent = result.audit_events[0].clone();
    stray.actor.user_id = 9_999;
    result.audit_events.push(stray);

    assert!(matches!(result.mutation, Mutation::InsertDowntime(_)));
    assert!(persistence.persist_transition(&result).is_err());
    assert!(persistence.list_downtime().unwrap().is_empty());
    assert!(persistence.list_audit_logs().unwrap().is_empty());
}
