// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Lab result queries.
//!
//! Dates are stored as `YYYY-MM-DD` text, so range filters compare strings.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use plantlog_domain::format_date;
use tracing::debug;

use crate::data_models::{LabFilter, LabInspectionRecord, LabRow};
use crate::diesel_schema::lab_inspections;
use crate::error::PersistenceError;

backend_fn! {
/// Lists lab results matching `filter`, most recently logged first.
///
/// An empty filter lists everything.
///
/// # Errors
///
/// Returns an error if the query fails or a stored row is unreadable.
pub fn list_lab_inspections(
    conn: &mut _,
    filter: &LabFilter,
) -> Result<Vec<LabInspectionRecord>, PersistenceError> {
    let mut query = lab_inspections::table
        .select(LabRow::as_select())
        .into_boxed();

    if let Some(start_date) = filter.start_date {
        query = query.filter(lab_inspections::date.ge(format_date(start_date)));
    }
    if let Some(end_date) = filter.end_date {
        query = query.filter(lab_inspections::date.le(format_date(end_date)));
    }
    if let Some(plant) = filter.plant {
        query = query.filter(lab_inspections::plant.eq(plant.as_str()));
    }
    if !filter.hours.is_empty() {
        let hours: Vec<String> = filter.hours.iter().map(ToString::to_string).collect();
        query = query.filter(lab_inspections::hour.eq_any(hours));
    }

    let rows: Vec<LabRow> = query
        .order((
            lab_inspections::created_at.desc(),
            lab_inspections::lab_inspection_id.desc(),
        ))
        .load(conn)?;

    debug!(count = rows.len(), "Loaded lab results");

    rows.into_iter().map(LabRow::into_record).collect()
}
}

backend_fn! {
/// Fetches one lab result.
///
/// # Errors
///
/// Returns an error if the query fails or the stored row is unreadable.
/// Returns `Ok(None)` if the result does not exist.
pub fn get_lab_inspection(
    conn: &mut _,
    lab_inspection_id: i64,
) -> Result<Option<LabInspectionRecord>, PersistenceError> {
    debug!(lab_inspection_id, "Looking up lab result");

    let result: Result<LabRow, diesel::result::Error> = lab_inspections::table
        .filter(lab_inspections::lab_inspection_id.eq(lab_inspection_id))
        .select(LabRow::as_select())
        .first(conn);

    match result {
        Ok(row) => row.into_record().map(Some),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}
