// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::{DowntimeRecord, DowntimeRow};
use crate::diesel_schema::downtime;
use crate::error::PersistenceError;

backend_fn! {
/// Lists downtime entries, most recently logged first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored timestamp is unreadable.
pub fn list_downtime(conn: &mut _) -> Result<Vec<DowntimeRecord>, PersistenceError> {
    let rows: Vec<DowntimeRow> = downtime::table
        .order((downtime::created_at.desc(), downtime::downtime_id.desc()))
        .select(DowntimeRow::as_select())
        .load(conn)?;

    debug!(count = rows.len(), "Loaded downtime entries");

    rows.into_iter().map(DowntimeRow::into_record).collect()
}
}

backend_fn! {
/// Fetches one downtime entry.
///
/// # Errors
///
/// Returns an error if the query fails or a stored timestamp is unreadable.
/// Returns `Ok(None)` if the entry does not exist.
pub fn get_downtime(
    conn: &mut _,
    downtime_id: i64,
) -> Result<Option<DowntimeRecord>, PersistenceError> {
    debug!(downtime_id, "Looking up downtime entry");

    let result: Result<DowntimeRow, diesel::result::Error> = downtime::table
        .filter(downtime::downtime_id.eq(downtime_id))
        .select(DowntimeRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_record().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}
