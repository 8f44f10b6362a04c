// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use plantlog_domain::LabInspection;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{LabRow, LabValues, NewDeletedLabInspection, now_timestamp};
use crate::diesel_schema::{deleted_lab_inspections, lab_inspections};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a lab result owned by `user_id`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_lab_inspection(
    conn: &mut _,
    inspection: &LabInspection,
    user_id: i64,
) -> Result<i64, PersistenceError> {
    let values: LabValues =
        LabValues::from_domain(inspection, now_timestamp()?).created_by(user_id);

    diesel::insert_into(lab_inspections::table)
        .values(&values)
        .execute(conn)?;

    let lab_inspection_id: i64 = conn.get_last_insert_rowid()?;

    info!(
        lab_inspection_id,
        user_id,
        plant = inspection.plant.as_str(),
        hour = %inspection.hour,
        "Lab result created"
    );
    Ok(lab_inspection_id)
}
}

backend_fn! {
/// Overwrites a lab result, keeping its owner and creation time.
///
/// # Errors
///
/// Returns `LabInspectionNotFound` if the result does not exist.
pub fn update_lab_inspection(
    conn: &mut _,
    lab_inspection_id: i64,
    inspection: &LabInspection,
) -> Result<(), PersistenceError> {
    let values: LabValues = LabValues::from_domain(inspection, now_timestamp()?);

    let rows_affected: usize = diesel::update(lab_inspections::table)
        .filter(lab_inspections::lab_inspection_id.eq(lab_inspection_id))
        .set(&values)
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::LabInspectionNotFound(lab_inspection_id));
    }

    info!(lab_inspection_id, "Lab result updated");
    Ok(())
}
}

backend_fn! {
/// Copies a lab result into `deleted_lab_inspections` and removes it.
///
/// # Errors
///
/// Returns `LabInspectionNotFound` if the result does not exist.
pub fn archive_lab_inspection(
    conn: &mut _,
    lab_inspection_id: i64,
    deleted_by: i64,
) -> Result<(), PersistenceError> {
    let found: Result<LabRow, diesel::result::Error> = lab_inspections::table
        .filter(lab_inspections::lab_inspection_id.eq(lab_inspection_id))
        .select(LabRow::as_select())
        .first(conn);

    let row: LabRow = match found {
        Ok(row) => row,
        Err(diesel::result::Error::NotFound) => {
            return Err(PersistenceError::LabInspectionNotFound(lab_inspection_id));
        }
        Err(e) => return Err(PersistenceError::from(e)),
    };

    diesel::insert_into(deleted_lab_inspections::table)
        .values(&NewDeletedLabInspection::from_row(row, deleted_by, now_timestamp()?))
        .execute(conn)?;

    diesel::delete(lab_inspections::table)
        .filter(lab_inspections::lab_inspection_id.eq(lab_inspection_id))
        .execute(conn)?;

    info!(lab_inspection_id, deleted_by, "Lab result archived");
    Ok(())
}
}
