// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plantlog_audit::{Actor, AuditEvent, StateSnapshot};
use plantlog_domain::{
    AssayField, DomainError, Downtime, LabInspection, format_date, format_timestamp,
};
use serde_json::{Map, Value, json};

/// The row change a transition asks persistence to make.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    InsertDowntime(Downtime),
    UpdateDowntime { id: i64, downtime: Downtime },
    /// Copy the row to the archive table, then remove it.
    ArchiveDowntime { id: i64, downtime: Downtime },
    /// Insert one or more rows atomically.
    InsertLabInspections(Vec<LabInspection>),
    UpdateLabInspection { id: i64, inspection: LabInspection },
    ArchiveLabInspection { id: i64, inspection: LabInspection },
}

/// The result of a successful transition.
///
/// Transitions are atomic: persistence writes the mutation and every audit
/// event together or not at all. For inserts, events are in row order and
/// their entity ids are filled in once the rows exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The user who issued the command.
    pub actor: Actor,
    pub mutation: Mutation,
    pub audit_events: Vec<AuditEvent>,
}

/// JSON image of a downtime entry for the audit trail.
///
/// # Errors
///
/// Returns an error if a timestamp cannot be formatted.
pub fn downtime_snapshot(id: Option<i64>, downtime: &Downtime) -> Result<StateSnapshot, DomainError> {
    let end_date: Option<String> = downtime.end.map(format_timestamp).transpose()?;
    let mut data: Value = json!({
        "start_date": format_timestamp(downtime.start)?,
        "end_date": end_date,
        "plant_category": downtime.plant_category,
        "plant_section": downtime.plant_section,
        "discipline": downtime.discipline,
        "plant_equipment": downtime.plant_equipment,
        "breakdown_description": downtime.breakdown_description,
        "notes": downtime.notes,
    });
    if let (Some(id), Some(object)) = (id, data.as_object_mut()) {
        object.insert(String::from("id"), Value::from(id));
    }
    Ok(StateSnapshot::new(data))
}

/// JSON image of a lab result for the audit trail.
#[must_use]
pub fn lab_snapshot(id: Option<i64>, inspection: &LabInspection) -> StateSnapshot {
    let mut object: Map<String, Value> = Map::new();
    if let Some(id) = id {
        object.insert(String::from("id"), Value::from(id));
    }
    object.insert(String::from("date"), Value::from(format_date(inspection.date)));
    object.insert(String::from("hour"), Value::from(inspection.hour.to_string()));
    object.insert(String::from("plant"), Value::from(inspection.plant.as_str()));
    object.insert(
        String::from("sample_type"),
        Value::from(inspection.sample_type.as_str()),
    );
    object.insert(
        String::from("sample_description"),
        Value::from(inspection.sample_description.as_str()),
    );
    for field in AssayField::ALL {
        object.insert(
            String::from(field.key()),
            Value::from(inspection.readings.get(field)),
        );
    }
    StateSnapshot::new(Value::Object(object))
}
