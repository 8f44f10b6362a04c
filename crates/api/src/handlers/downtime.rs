// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono_tz::Tz;
use plantlog::Command;
use plantlog_audit::EntityType;
use plantlog_domain::{Downtime, format_date, format_timestamp, parse_timestamp};
use plantlog_persistence::{
    AuditLogRecord, DowntimeRecord, PersistTransitionResult, SqlitePersistence, UserData,
};
use time::OffsetDateTime;
use tracing::{debug, info};

use super::{audit_log_info, first_row_id, invalid_field, run_command};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, not_found, translate_persistence_error};
use crate::export::{ExportFile, ExportFormat, downtime_sheet, render};
use crate::request_response::{
    DeleteResponse, DowntimeInfo, DowntimeReportResponse, DowntimeRequest, DowntimeResponse,
    ListDowntimeResponse, ReporterInfo, ResolveDowntimeRequest,
};

fn load_downtime(
    persistence: &mut SqlitePersistence,
    downtime_id: i64,
) -> Result<DowntimeRecord, ApiError> {
    persistence
        .get_downtime(downtime_id)
        .map_err(|e| translate_persistence_error(e, "Failed to load downtime entry"))?
        .ok_or_else(|| {
            not_found(
                "Downtime entry",
                format!("Downtime entry {downtime_id} does not exist"),
            )
        })
}

fn downtime_from_request(request: &DowntimeRequest) -> Result<Downtime, ApiError> {
    let start: OffsetDateTime =
        parse_timestamp(&request.start_date).map_err(invalid_field("start_date"))?;
    let end: Option<OffsetDateTime> = request
        .end_date
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_timestamp(v).map_err(invalid_field("end_date")))
        .transpose()?;

    Ok(Downtime {
        start,
        end,
        plant_category: request.plant_category.clone(),
        plant_section: request.plant_section.clone(),
        discipline: request.discipline.clone(),
        plant_equipment: request.plant_equipment.clone(),
        breakdown_description: request.breakdown_description.clone(),
        notes: request.notes.clone(),
    })
}

fn downtime_info(record: &DowntimeRecord, tz: Tz) -> Result<DowntimeInfo, ApiError> {
    let entry: &Downtime = &record.downtime;
    let internal = |e: plantlog_domain::DomainError| ApiError::Internal {
        message: format!("Failed to format downtime entry {}: {e}", record.downtime_id),
    };

    Ok(DowntimeInfo {
        id: record.downtime_id,
        start_date: format_timestamp(entry.start).map_err(internal)?,
        end_date: entry.end.map(format_timestamp).transpose().map_err(internal)?,
        status: entry.status().to_string(),
        duration: entry.duration_label(),
        plant_category: entry.plant_category.clone(),
        plant_section: entry.plant_section.clone(),
        discipline: entry.discipline.clone(),
        plant_equipment: entry.plant_equipment.clone(),
        breakdown_description: entry.breakdown_description.clone(),
        notes: entry.notes.clone(),
        shift_day: format_date(entry.shift_day(tz)),
        user_id: record.user_id,
        created_at: record.created_at.clone(),
        updated_at: record.updated_at.clone(),
    })
}

fn respond(
    persistence: &mut SqlitePersistence,
    downtime_id: i64,
    tz: Tz,
    message: String,
) -> Result<DowntimeResponse, ApiError> {
    let record: DowntimeRecord = load_downtime(persistence, downtime_id)?;
    Ok(DowntimeResponse {
        entry: downtime_info(&record, tz)?,
        message,
    })
}

/// Lists every downtime entry, newest first.
///
/// # Errors
///
/// Returns an error if the entries cannot be read.
pub fn list_downtime(
    persistence: &mut SqlitePersistence,
    authenticated_actor: &AuthenticatedActor,
    tz: Tz,
) -> Result<ListDowntimeResponse, ApiError> {
    AuthorizationService::authorize_list_downtime(authenticated_actor)?;

    let records: Vec<DowntimeRecord> = persistence
        .list_downtime()
        .map_err(|e| translate_persistence_error(e, "Failed to list downtime"))?;

    debug!(count = records.len(), "Listed downtime entries");

    let entries: Vec<DowntimeInfo> = records
        .iter()
        .map(|record| downtime_info(record, tz))
        .collect::<Result<_, _>>()?;

    Ok(ListDowntimeResponse { entries })
}

/// Returns a single downtime entry.
///
/// # Errors
///
/// Returns an error if the entry does not exist.
pub fn get_downtime(
    persistence: &mut SqlitePersistence,
    downtime_id: i64,
    authenticated_actor: &AuthenticatedActor,
    tz: Tz,
) -> Result<DowntimeInfo, ApiError> {
    AuthorizationService::authorize_list_downtime(authenticated_actor)?;

    let record: DowntimeRecord = load_downtime(persistence, downtime_id)?;
    downtime_info(&record, tz)
}

/// Logs a new outage.
///
/// # Errors
///
/// Returns an error if a required field is blank, a timestamp is malformed,
/// or the end precedes the start.
pub fn create_downtime(
    persistence: &mut SqlitePersistence,
    request: &DowntimeRequest,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
    tz: Tz,
) -> Result<DowntimeResponse, ApiError> {
    AuthorizationService::authorize_create_downtime(authenticated_actor)?;

    let draft: Downtime = downtime_from_request(request)?;
    let persisted: PersistTransitionResult = run_command(
        persistence,
        Command::CreateDowntime { draft },
        authenticated_actor,
        user,
    )?;
    let downtime_id: i64 = first_row_id(&persisted)?;

    info!(
        downtime_id,
        user_id = authenticated_actor.user_id,
        "Created downtime entry"
    );

    respond(
        persistence,
        downtime_id,
        tz,
        String::from("Downtime entry created"),
    )
}

/// Replaces every field of an entry.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the entry does not exist,
/// or the submitted entry is invalid.
pub fn update_downtime(
    persistence: &mut SqlitePersistence,
    downtime_id: i64,
    request: &DowntimeRequest,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
    tz: Tz,
) -> Result<DowntimeResponse, ApiError> {
    AuthorizationService::authorize_update_downtime(authenticated_actor)?;

    let current: DowntimeRecord = load_downtime(persistence, downtime_id)?;
    let draft: Downtime = downtime_from_request(request)?;

    run_command(
        persistence,
        Command::UpdateDowntime {
            id: downtime_id,
            current: current.downtime,
            draft,
        },
        authenticated_actor,
        user,
    )?;

    info!(
        downtime_id,
        user_id = authenticated_actor.user_id,
        "Updated downtime entry"
    );

    respond(
        persistence,
        downtime_id,
        tz,
        String::from("Downtime entry updated"),
    )
}

/// Records that the equipment is running again.
///
/// # Errors
///
/// Returns an error if the entry does not exist, is already resolved, or
/// the end precedes the start.
pub fn resolve_downtime(
    persistence: &mut SqlitePersistence,
    downtime_id: i64,
    request: &ResolveDowntimeRequest,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
    tz: Tz,
) -> Result<DowntimeResponse, ApiError> {
    AuthorizationService::authorize_resolve_downtime(authenticated_actor)?;

    let current: DowntimeRecord = load_downtime(persistence, downtime_id)?;
    let end: OffsetDateTime =
        parse_timestamp(&request.end_date).map_err(invalid_field("end_date"))?;

    run_command(
        persistence,
        Command::ResolveDowntime {
            id: downtime_id,
            current: current.downtime,
            end,
            notes: request.notes.clone(),
        },
        authenticated_actor,
        user,
    )?;

    info!(
        downtime_id,
        user_id = authenticated_actor.user_id,
        "Resolved downtime entry"
    );

    respond(
        persistence,
        downtime_id,
        tz,
        String::from("Downtime entry resolved"),
    )
}

/// Deletes an entry, keeping an archived copy.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the entry does not exist.
pub fn delete_downtime(
    persistence: &mut SqlitePersistence,
    downtime_id: i64,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
) -> Result<DeleteResponse, ApiError> {
    AuthorizationService::authorize_delete_downtime(authenticated_actor)?;

    let current: DowntimeRecord = load_downtime(persistence, downtime_id)?;
    run_command(
        persistence,
        Command::DeleteDowntime {
            id: downtime_id,
            current: current.downtime,
        },
        authenticated_actor,
        user,
    )?;

    info!(
        downtime_id,
        user_id = authenticated_actor.user_id,
        "Deleted downtime entry"
    );

    Ok(DeleteResponse {
        id: downtime_id,
        message: String::from("Downtime entry deleted"),
    })
}

/// The full record of one entry: the entry, who logged it, and its audit
/// trail oldest first.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the entry does not exist.
pub fn get_downtime_report(
    persistence: &mut SqlitePersistence,
    downtime_id: i64,
    authenticated_actor: &AuthenticatedActor,
    tz: Tz,
) -> Result<DowntimeReportResponse, ApiError> {
    AuthorizationService::authorize_downtime_report(authenticated_actor)?;

    let record: DowntimeRecord = load_downtime(persistence, downtime_id)?;

    let reported_by: Option<ReporterInfo> = match record.user_id {
        Some(user_id) => persistence
            .get_user_by_id(user_id)
            .map_err(|e| translate_persistence_error(e, "Failed to load reporter"))?
            .map(|user| ReporterInfo {
                user_id: user.user_id,
                name: user.name,
                email: user.email,
            }),
        None => None,
    };

    let mut trail: Vec<AuditLogRecord> = persistence
        .list_audit_logs_for_entity(EntityType::Downtime.as_str(), &downtime_id.to_string())
        .map_err(|e| translate_persistence_error(e, "Failed to load audit trail"))?;
    trail.reverse();

    Ok(DowntimeReportResponse {
        entry: downtime_info(&record, tz)?,
        reported_by,
        audit_trail: trail.into_iter().map(audit_log_info).collect(),
    })
}

/// Exports every downtime entry as a spreadsheet.
///
/// # Errors
///
/// Returns an error if the entries cannot be read or rendered.
pub fn export_downtime(
    persistence: &mut SqlitePersistence,
    format: ExportFormat,
    authenticated_actor: &AuthenticatedActor,
    tz: Tz,
) -> Result<ExportFile, ApiError> {
    AuthorizationService::authorize_reports(authenticated_actor)?;

    let records: Vec<DowntimeRecord> = persistence
        .list_downtime()
        .map_err(|e| translate_persistence_error(e, "Failed to list downtime"))?;

    render(&downtime_sheet(&records, tz), format, "downtime").map_err(|e| ApiError::Internal {
        message: e.to_string(),
    })
}
