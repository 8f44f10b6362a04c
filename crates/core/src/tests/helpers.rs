// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plantlog_audit::Actor;
use plantlog_domain::{AssayReadings, Downtime, FormSchema, Hour, LabInspection, Plant, SampleType};
use time::macros::{date, datetime};

pub fn create_test_actor() -> Actor {
    Actor::new(
        1,
        String::from("Shift Supervisor"),
        String::from("supervisor@plant.example"),
    )
}

pub fn create_test_downtime() -> Downtime {
    Downtime {
        start: datetime!(2026-03-05 08:00 UTC),
        end: None,
        plant_category: String::from("Processing"),
        plant_section: String::from("Milling"),
        discipline: String::from("Electrical"),
        plant_equipment: String::from("Ball mill 2"),
        breakdown_description: String::from("Motor trip"),
        notes: None,
    }
}

/// A draft with every visible field filled with `value`.
pub fn create_test_lab_draft(
    plant: Plant,
    sample_type: SampleType,
    description: &str,
    value: &str,
) -> LabInspection {
    let schema: FormSchema = FormSchema::for_selection(plant, sample_type, description);
    let mut readings: AssayReadings = AssayReadings::new();
    for field in schema.visible_fields() {
        readings.set(*field, value);
    }
    LabInspection::new(
        date!(2026 - 03 - 05),
        Hour::new(6).unwrap(),
        plant,
        sample_type,
        description.to_string(),
        readings,
    )
}
