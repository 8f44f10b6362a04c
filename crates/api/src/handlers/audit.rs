// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plantlog_persistence::{AuditLogRecord, SqlitePersistence};
use tracing::debug;

use super::audit_log_info;
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, not_found, translate_persistence_error};
use crate::request_response::{AuditLogInfo, ListAuditLogsResponse};

/// Lists the audit log, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an admin.
pub fn list_audit_logs(
    persistence: &mut SqlitePersistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListAuditLogsResponse, ApiError> {
    AuthorizationService::authorize_view_audit_log(authenticated_actor)?;

    let records: Vec<AuditLogRecord> = persistence
        .list_audit_logs()
        .map_err(|e| translate_persistence_error(e, "Failed to list audit log"))?;

    debug!(count = records.len(), "Listed audit log");

    Ok(ListAuditLogsResponse {
        entries: records.into_iter().map(audit_log_info).collect(),
    })
}

/// Returns one audit entry with its parsed metadata.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the entry does not exist.
pub fn get_audit_log(
    persistence: &mut SqlitePersistence,
    audit_log_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<AuditLogInfo, ApiError> {
    AuthorizationService::authorize_view_audit_log(authenticated_actor)?;

    persistence
        .get_audit_log(audit_log_id)
        .map_err(|e| translate_persistence_error(e, "Failed to load audit entry"))?
        .map(audit_log_info)
        .ok_or_else(|| {
            not_found(
                "Audit entry",
                format!("Audit entry {audit_log_id} does not exist"),
            )
        })
}
