// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use plantlog_persistence::{ROLE_ADMIN, ROLE_MEMBER, SqlitePersistence, UserData};

use crate::{
    AuthenticatedActor, BatchLabRequest, BatchStepRequest, DowntimeRequest, LabInspectionRequest,
    Role,
};

pub const TEST_PASSWORD: &str = "Sup3r-secret";

pub fn create_test_persistence() -> SqlitePersistence {
    SqlitePersistence::new_in_memory().expect("in-memory database")
}

pub fn plant_tz() -> Tz {
    chrono_tz::UTC
}

fn create_user(
    persistence: &mut SqlitePersistence,
    email: &str,
    name: &str,
    role: Role,
) -> (AuthenticatedActor, UserData) {
    let stored: &str = match role {
        Role::Admin => ROLE_ADMIN,
        Role::Member => ROLE_MEMBER,
    };
    let user_id: i64 = persistence
        .create_user(email, name, TEST_PASSWORD, stored)
        .expect("create user");
    let user: UserData = persistence
        .get_user_by_id(user_id)
        .expect("load user")
        .expect("user exists");
    (
        AuthenticatedActor::new(user_id, user.email.clone(), role),
        user,
    )
}

pub fn create_test_admin(persistence: &mut SqlitePersistence) -> (AuthenticatedActor, UserData) {
    create_user(persistence, "admin@plant.example", "Ada Admin", Role::Admin)
}

pub fn create_test_member(persistence: &mut SqlitePersistence) -> (AuthenticatedActor, UserData) {
    create_user(persistence, "member@plant.example", "Max Member", Role::Member)
}

pub fn create_named_member(
    persistence: &mut SqlitePersistence,
    email: &str,
) -> (AuthenticatedActor, UserData) {
    create_user(persistence, email, "Other Member", Role::Member)
}

pub fn create_downtime_request(equipment: &str) -> DowntimeRequest {
    DowntimeRequest {
        start_date: String::from("2026-03-02T08:00:00Z"),
        end_date: None,
        plant_category: String::from("Processing"),
        plant_section: String::from("Milling"),
        discipline: String::from("Mechanical"),
        plant_equipment: equipment.to_string(),
        breakdown_description: String::from("Bearing failure"),
        notes: None,
    }
}

/// A value for every chemistry field; hidden ones are zeroed on save.
pub fn chemistry_readings(value: &str) -> BTreeMap<String, String> {
    [
        "fe_perc",
        "sio_perc",
        "al2o3_perc",
        "p_perc",
        "tio_perc",
        "mgo_perc",
        "cao_perc",
        "p2o5_perc",
        "cu_perc",
        "s_perc",
        "aa_fe_perc",
        "moisture",
    ]
    .iter()
    .map(|key| ((*key).to_string(), value.to_string()))
    .collect()
}

pub fn create_lab_request(date: &str, hour: &str, description: &str, fe: &str) -> LabInspectionRequest {
    let mut readings: BTreeMap<String, String> = chemistry_readings("10.5");
    readings.insert(String::from("fe_perc"), fe.to_string());
    LabInspectionRequest {
        date: date.to_string(),
        hour: hour.to_string(),
        plant: String::from("MP2"),
        sample_type: String::from("Normal Sample"),
        sample_description: description.to_string(),
        readings,
    }
}

pub fn create_batch_request() -> BatchLabRequest {
    let steps: Vec<BatchStepRequest> = plantlog_domain::SAMPLE_DESCRIPTIONS
        .iter()
        .map(|description| BatchStepRequest {
            sample_type: String::from("Normal Sample"),
            sample_description: (*description).to_string(),
            readings: chemistry_readings("20.25"),
        })
        .collect();

    BatchLabRequest {
        date: String::from("2026-03-02"),
        hour: String::from("10h00"),
        plant: String::from("MP2"),
        steps,
    }
}
