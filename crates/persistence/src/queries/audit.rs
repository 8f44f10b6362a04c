// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit log queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::AuditLogRecord;
use crate::diesel_schema::audit_logs;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_logs)]
struct AuditLogRow {
    audit_log_id: i64,
    action: String,
    entity_type: String,
    entity_id: Option<String>,
    description: String,
    metadata: Option<String>,
    performed_by_name: String,
    performed_by_identifier: String,
    user_id: Option<i64>,
    created_at: String,
}

impl From<AuditLogRow> for AuditLogRecord {
    fn from(row: AuditLogRow) -> Self {
        Self {
            audit_log_id: row.audit_log_id,
            action: row.action,
            entity_type: row.entity_type,
            entity_id: row.entity_id,
            description: row.description,
            metadata: row.metadata,
            performed_by_name: row.performed_by_name,
            performed_by_identifier: row.performed_by_identifier,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

backend_fn! {
/// Lists the audit log, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_audit_logs(conn: &mut _) -> Result<Vec<AuditLogRecord>, PersistenceError> {
    let rows: Vec<AuditLogRow> = audit_logs::table
        .order((audit_logs::created_at.desc(), audit_logs::audit_log_id.desc()))
        .select(AuditLogRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(AuditLogRecord::from).collect())
}
}

backend_fn! {
/// Fetches one audit entry.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the entry does not exist.
pub fn get_audit_log(
    conn: &mut _,
    audit_log_id: i64,
) -> Result<Option<AuditLogRecord>, PersistenceError> {
    debug!(audit_log_id, "Looking up audit entry");

    let result: Result<AuditLogRow, diesel::result::Error> = audit_logs::table
        .filter(audit_logs::audit_log_id.eq(audit_log_id))
        .select(AuditLogRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(AuditLogRecord::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Lists the trail of one entity, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_audit_logs_for_entity(
    conn: &mut _,
    entity_type: &str,
    entity_id: &str,
) -> Result<Vec<AuditLogRecord>, PersistenceError> {
    let rows: Vec<AuditLogRow> = audit_logs::table
        .filter(audit_logs::entity_type.eq(entity_type))
        .filter(audit_logs::entity_id.eq(entity_id))
        .order((audit_logs::created_at.desc(), audit_logs::audit_log_id.desc()))
        .select(AuditLogRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(AuditLogRecord::from).collect())
}
}
