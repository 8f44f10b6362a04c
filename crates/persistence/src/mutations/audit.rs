// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use plantlog_audit::AuditEvent;
use tracing::debug;

use crate::backend::PersistenceBackend;
use crate::data_models::now_timestamp;
use crate::diesel_schema::audit_logs;
use crate::error::PersistenceError;

backend_fn! {
/// Appends an audit event.
///
/// The actor's name and e-mail are copied into the row.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn persist_audit_event(conn: &mut _, event: &AuditEvent) -> Result<i64, PersistenceError> {
    let metadata: Option<String> = event.metadata();

    diesel::insert_into(audit_logs::table)
        .values((
            audit_logs::action.eq(event.action.as_str()),
            audit_logs::entity_type.eq(event.entity_type.as_str()),
            audit_logs::entity_id.eq(event.entity_id.as_deref()),
            audit_logs::description.eq(&event.description),
            audit_logs::metadata.eq(metadata.as_deref()),
            audit_logs::performed_by_name.eq(&event.actor.name),
            audit_logs::performed_by_identifier.eq(&event.actor.identifier),
            audit_logs::user_id.eq(Some(event.actor.user_id)),
            audit_logs::created_at.eq(now_timestamp()?),
        ))
        .execute(conn)?;

    let audit_log_id: i64 = conn.get_last_insert_rowid()?;

    debug!(
        audit_log_id,
        action = event.action.as_str(),
        entity_type = event.entity_type.as_str(),
        "Persisted audit event"
    );
    Ok(audit_log_id)
}
}
