// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler takes the persistence layer, its request, and the
//! authenticated actor; writes also take the acting user's row so audit
//! records carry a readable name.

mod audit;
mod auth;
mod catalog;
mod downtime;
mod lab;
mod users;

pub use audit::{get_audit_log, list_audit_logs};
pub use auth::{change_password, login, logout, whoami};
pub use catalog::{get_batch_plan, get_catalog, get_form_schema};
pub use downtime::{
    create_downtime, delete_downtime, export_downtime, get_downtime, get_downtime_report,
    list_downtime, resolve_downtime, update_downtime,
};
pub use lab::{
    batch_create_lab_inspections, create_lab_inspection, delete_lab_inspection,
    export_lab_inspections, export_lab_report, get_lab_report, get_shift_summaries,
    list_lab_inspections, update_lab_inspection,
};
pub use users::{
    ban_user, bootstrap_admin, create_user, delete_user, list_users, unban_user, update_user_role,
};

use std::collections::BTreeMap;

use plantlog::{Command, TransitionResult, apply};
use plantlog_domain::{AssayReadings, DateRange, DomainError, Hour, Plant, parse_date};
use plantlog_persistence::{
    AuditLogRecord, LabFilter, PersistTransitionResult, SqlitePersistence, UserData,
};
use time::Date;

use crate::auth::{AuthenticatedActor, Role};
use crate::error::{ApiError, translate_core_error, translate_persistence_error};
use crate::request_response::{AuditLogInfo, LabFilterQuery, UserInfo};

/// Applies a command and writes its result in one transaction.
///
/// Returns the written row ids (insert order for inserts).
fn run_command(
    persistence: &mut SqlitePersistence,
    command: Command,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
) -> Result<PersistTransitionResult, ApiError> {
    let result: TransitionResult =
        apply(command, authenticated_actor.to_audit_actor(user)).map_err(translate_core_error)?;

    persistence
        .persist_transition(&result)
        .map_err(|e| translate_persistence_error(e, "Failed to persist change"))
}

/// The first written row id of an insert.
fn first_row_id(persisted: &PersistTransitionResult) -> Result<i64, ApiError> {
    persisted
        .row_ids
        .first()
        .copied()
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Insert returned no row id"),
        })
}

/// Maps a parse failure to an invalid-input error on `field`.
fn invalid_field(field: &'static str) -> impl Fn(DomainError) -> ApiError {
    move |err| ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

fn parse_optional_date(value: Option<&str>, field: &'static str) -> Result<Option<Date>, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| parse_date(v).map_err(invalid_field(field)))
        .transpose()
}

/// Parses the date bounds of a lab query.
fn parse_date_range(query: &LabFilterQuery) -> Result<DateRange, ApiError> {
    let start: Option<Date> = parse_optional_date(query.start_date.as_deref(), "start_date")?;
    let end: Option<Date> = parse_optional_date(query.end_date.as_deref(), "end_date")?;

    if let (Some(start), Some(end)) = (start, end)
        && end < start
    {
        return Err(ApiError::InvalidInput {
            field: String::from("end_date"),
            message: format!("End date {end} is before start date {start}"),
        });
    }

    Ok(DateRange::new(start, end))
}

/// Parses a full lab filter. `hours` is a comma-separated list.
fn parse_lab_filter(query: &LabFilterQuery) -> Result<LabFilter, ApiError> {
    let range: DateRange = parse_date_range(query)?;

    let plant: Option<Plant> = query
        .plant
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<Plant>().map_err(invalid_field("plant")))
        .transpose()?;

    let hours: Vec<Hour> = query
        .hours
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<Hour>().map_err(invalid_field("hours")))
        .collect::<Result<_, _>>()?;

    Ok(LabFilter {
        start_date: range.start,
        end_date: range.end,
        plant,
        hours,
    })
}

fn parse_readings(readings: &BTreeMap<String, String>) -> Result<AssayReadings, ApiError> {
    AssayReadings::from_pairs(readings.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .map_err(invalid_field("readings"))
}

fn user_info(user: &UserData) -> UserInfo {
    UserInfo {
        user_id: user.user_id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: display_role(&user.role),
        banned: user.banned,
        ban_reason: user.ban_reason.clone(),
        created_at: user.created_at.clone(),
        last_login_at: user.last_login_at.clone(),
    }
}

/// `admin` / `member`, or the stored string if it is not a known role.
fn display_role(stored: &str) -> String {
    Role::from_stored(stored).map_or_else(|| stored.to_string(), |role| role.as_str().to_string())
}

fn audit_log_info(record: AuditLogRecord) -> AuditLogInfo {
    let metadata: Option<serde_json::Value> = record.metadata.map(|raw| {
        serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
    });

    AuditLogInfo {
        id: record.audit_log_id,
        action: record.action,
        entity_type: record.entity_type,
        entity_id: record.entity_id,
        description: record.description,
        metadata,
        performed_by_name: record.performed_by_name,
        performed_by_identifier: record.performed_by_identifier,
        user_id: record.user_id,
        created_at: record.created_at,
    }
}
