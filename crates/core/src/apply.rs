// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{Mutation, TransitionResult, downtime_snapshot, lab_snapshot};
use plantlog_audit::{
    Actor, AuditAction, AuditEvent, EntityType, downtime_description, lab_description,
};
use plantlog_domain::{Downtime, LabInspection, build_batch, build_inspection};

/// Applies a command, producing the row change and its audit events.
///
/// Nothing is written here; the caller hands the result to persistence.
///
/// # Errors
///
/// Returns an error if the command violates an entry rule: a missing
/// downtime field, an end before the start, resolving twice, or readings
/// that do not satisfy the lab form.
#[allow(clippy::too_many_lines)]
pub fn apply(command: Command, actor: Actor) -> Result<TransitionResult, CoreError> {
    match command {
        Command::CreateDowntime { draft } => {
            let downtime: Downtime = draft.validate()?;
            let after = downtime_snapshot(None, &downtime)?;
            let event: AuditEvent = AuditEvent::new(
                actor.clone(),
                AuditAction::Create,
                EntityType::Downtime,
                None,
                downtime_description(AuditAction::Create, &downtime.plant_equipment),
                None,
                Some(after),
            );

            Ok(TransitionResult {
                actor,
                mutation: Mutation::InsertDowntime(downtime),
                audit_events: vec![event],
            })
        }
        Command::UpdateDowntime { id, current, draft } => {
            let downtime: Downtime = draft.validate()?;
            let before = downtime_snapshot(Some(id), &current)?;
            let after = downtime_snapshot(Some(id), &downtime)?;
            let event: AuditEvent = AuditEvent::new(
                actor.clone(),
                AuditAction::Update,
                EntityType::Downtime,
                Some(id.to_string()),
                downtime_description(AuditAction::Update, &current.plant_equipment),
                Some(before),
                Some(after),
            );

            Ok(TransitionResult {
                actor,
                mutation: Mutation::UpdateDowntime { id, downtime },
                audit_events: vec![event],
            })
        }
        Command::ResolveDowntime {
            id,
            current,
            end,
            notes,
        } => {
            let downtime: Downtime = current.resolve(end, notes)?;
            let before = downtime_snapshot(Some(id), &current)?;
            let after = downtime_snapshot(Some(id), &downtime)?;
            let event: AuditEvent = AuditEvent::new(
                actor.clone(),
                AuditAction::Resolve,
                EntityType::Downtime,
                Some(id.to_string()),
                downtime_description(AuditAction::Resolve, &current.plant_equipment),
                Some(before),
                Some(after),
            );

            Ok(TransitionResult {
                actor,
                mutation: Mutation::UpdateDowntime { id, downtime },
                audit_events: vec![event],
            })
        }
        Command::DeleteDowntime { id, current } => {
            let before = downtime_snapshot(Some(id), &current)?;
            let event: AuditEvent = AuditEvent::new(
                actor.clone(),
                AuditAction::Delete,
                EntityType::Downtime,
                Some(id.to_string()),
                downtime_description(AuditAction::Delete, &current.plant_equipment),
                Some(before),
                None,
            );

            Ok(TransitionResult {
                actor,
                mutation: Mutation::ArchiveDowntime {
                    id,
                    downtime: current,
                },
                audit_events: vec![event],
            })
        }
        Command::CreateLabInspection { draft } => {
            let inspection: LabInspection = normalize(&draft)?;
            let event: AuditEvent = lab_create_event(&actor, &inspection);

            Ok(TransitionResult {
                actor,
                mutation: Mutation::InsertLabInspections(vec![inspection]),
                audit_events: vec![event],
            })
        }
        Command::BatchCreateLabInspections {
            date,
            hour,
            plant,
            steps,
        } => {
            let inspections: Vec<LabInspection> = build_batch(date, hour, plant, &steps)?;
            let audit_events: Vec<AuditEvent> = inspections
                .iter()
                .map(|inspection| lab_create_event(&actor, inspection))
                .collect();

            Ok(TransitionResult {
                actor,
                mutation: Mutation::InsertLabInspections(inspections),
                audit_events,
            })
        }
        Command::UpdateLabInspection { id, current, draft } => {
            let inspection: LabInspection = normalize(&draft)?;
            let event: AuditEvent = AuditEvent::new(
                actor.clone(),
                AuditAction::Update,
                EntityType::LabInspection,
                Some(id.to_string()),
                lab_description(AuditAction::Update, &current.sample_description),
                Some(lab_snapshot(Some(id), &current)),
                Some(lab_snapshot(Some(id), &inspection)),
            );

            Ok(TransitionResult {
                actor,
                mutation: Mutation::UpdateLabInspection { id, inspection },
                audit_events: vec![event],
            })
        }
        Command::DeleteLabInspection { id, current } => {
            let event: AuditEvent = AuditEvent::new(
                actor.clone(),
                AuditAction::Delete,
                EntityType::LabInspection,
                Some(id.to_string()),
                lab_description(AuditAction::Delete, &current.sample_description),
                Some(lab_snapshot(Some(id), &current)),
                None,
            );

            Ok(TransitionResult {
                actor,
                mutation: Mutation::ArchiveLabInspection {
                    id,
                    inspection: current,
                },
                audit_events: vec![event],
            })
        }
    }
}

fn normalize(draft: &LabInspection) -> Result<LabInspection, CoreError> {
    Ok(build_inspection(
        draft.date,
        draft.hour,
        draft.plant,
        draft.sample_type,
        &draft.sample_description,
        &draft.readings,
    )?)
}

fn lab_create_event(actor: &Actor, inspection: &LabInspection) -> AuditEvent {
    AuditEvent::new(
        actor.clone(),
        AuditAction::Create,
        EntityType::LabInspection,
        None,
        lab_description(AuditAction::Create, &inspection.sample_description),
        None,
        Some(lab_snapshot(None, inspection)),
    )
}
