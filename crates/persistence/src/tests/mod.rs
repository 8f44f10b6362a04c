// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod audit_tests;
mod downtime_tests;

use plantlog::{Command, TransitionResult, apply};
use plantlog_audit::Actor;
use plantlog_domain::{AssayReadings, Downtime, FormSchema, Hour, LabInspection, Plant, SampleType};
use time::Date;
use time::macros::{date, datetime};

use crate::{PersistTransitionResult, Persistence, ROLE_ADMIN, ROLE_MEMBER, SqlitePersistence};

pub fn create_test_persistence() -> Persistence {
    SqlitePersistence::new_in_memory().expect("in-memory database")
}

/// Creates a user and returns it as an audit actor.
pub fn create_test_actor(persistence: &mut Persistence, email: &str, admin: bool) -> Actor {
    let role: &str = if admin { ROLE_ADMIN } else { ROLE_MEMBER };
    let user_id: i64 = persistence
        .create_user(email, "Test User", "Sup3r-secret", role)
        .unwrap();
    Actor::new(user_id, String::from("Test User"), email.to_lowercase())
}

pub fn create_test_downtime(equipment: &str) -> Downtime {
    Downtime {
        start: datetime!(2026-03-05 08:00 UTC),
        end: None,
        plant_category: String::from("Processing"),
        plant_section: String::from("Milling"),
        discipline: String::from("Mechanical"),
        plant_equipment: equipment.to_string(),
        breakdown_description: String::from("Bearing failure"),
        notes: None,
    }
}

pub fn create_test_lab(date: Date, hour: u8, plant: Plant, description: &str) -> LabInspection {
    let schema: FormSchema = FormSchema::for_selection(plant, SampleType::Normal, description);
    let mut readings: AssayReadings = AssayReadings::new();
    for field in schema.visible_fields() {
        readings.set(*field, "12.5");
    }
    LabInspection::new(
        date,
        Hour::new(hour).unwrap(),
        plant,
        SampleType::Normal,
        description.to_string(),
        readings,
    )
}

pub fn default_test_lab() -> LabInspection {
    create_test_lab(date!(2026 - 03 - 05), 8, Plant::Mp2, "Tailings")
}

/// Applies a command and persists the transition.
pub fn run(persistence: &mut Persistence, command: Command, actor: &Actor) -> PersistTransitionResult {
    let result: TransitionResult = apply(command, actor.clone()).unwrap();
    persistence.persist_transition(&result).unwrap()
}
