// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Downtime row writes.
//!
//! These are the building blocks of `persist_transition`; they do not open
//! transactions of their own.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use plantlog_domain::Downtime;
use tracing::info;

use crate::backend::PersistenceBackend;
use crate::data_models::{DowntimeRow, DowntimeValues, NewDeletedDowntime, now_timestamp};
use crate::diesel_schema::{deleted_downtime, downtime};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a downtime entry owned by `user_id`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_downtime(
    conn: &mut _,
    entry: &Downtime,
    user_id: i64,
) -> Result<i64, PersistenceError> {
    let values: DowntimeValues =
        DowntimeValues::from_domain(entry, now_timestamp()?)?.created_by(user_id);

    diesel::insert_into(downtime::table)
        .values(&values)
        .execute(conn)?;

    let downtime_id: i64 = conn.get_last_insert_rowid()?;

    info!(downtime_id, user_id, equipment = %entry.plant_equipment, "Downtime entry created");
    Ok(downtime_id)
}
}

backend_fn! {
/// Overwrites a downtime entry, keeping its owner and creation time.
///
/// # Errors
///
/// Returns `DowntimeNotFound` if the entry does not exist.
pub fn update_downtime(
    conn: &mut _,
    downtime_id: i64,
    entry: &Downtime,
) -> Result<(), PersistenceError> {
    let values: DowntimeValues = DowntimeValues::from_domain(entry, now_timestamp()?)?;

    let rows_affected: usize = diesel::update(downtime::table)
        .filter(downtime::downtime_id.eq(downtime_id))
        .set(&values)
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::DowntimeNotFound(downtime_id));
    }

    info!(downtime_id, status = %entry.status(), "Downtime entry updated");
    Ok(())
}
}

backend_fn! {
/// Copies a downtime entry into `deleted_downtime` and removes it.
///
/// # Errors
///
/// Returns `DowntimeNotFound` if the entry does not exist.
pub fn archive_downtime(
    conn: &mut _,
    downtime_id: i64,
    deleted_by: i64,
) -> Result<(), PersistenceError> {
    let found: Result<DowntimeRow, diesel::result::Error> = downtime::table
        .filter(downtime::downtime_id.eq(downtime_id))
        .select(DowntimeRow::as_select())
        .first(conn);

    let row: DowntimeRow = match found {
        Ok(row) => row,
        Err(diesel::result::Error::NotFound) => {
            return Err(PersistenceError::DowntimeNotFound(downtime_id));
        }
        Err(e) => return Err(PersistenceError::from(e)),
    };

    diesel::insert_into(deleted_downtime::table)
        .values(&NewDeletedDowntime::from_row(row, deleted_by, now_timestamp()?))
        .execute(conn)?;

    diesel::delete(downtime::table)
        .filter(downtime::downtime_id.eq(downtime_id))
        .execute(conn)?;

    info!(downtime_id, deleted_by, "Downtime entry archived");
    Ok(())
}
}
