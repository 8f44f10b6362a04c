// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;

use plantlog::Command;
use plantlog_domain::{
    AssayField, BatchSubmission, DateRange, Hour, LabInspection, Plant, SampleType, ShiftReport,
    ShiftSummary, build_shift_report, default_week, format_date, parse_date, shift_day_of,
    shift_label, summarize_shift_days,
};
use plantlog_persistence::{
    LabFilter, LabInspectionRecord, PersistTransitionResult, SqlitePersistence, UserData,
};
use time::Date;
use tracing::{debug, info};

use super::{
    first_row_id, invalid_field, parse_date_range, parse_lab_filter, parse_readings, run_command,
};
use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, not_found, translate_persistence_error};
use crate::export::{ExportFile, ExportFormat, lab_sheet, render, shift_report_sheet};
use crate::request_response::{
    BatchLabRequest, BatchLabResponse, DeleteResponse, LabEntryInfo, LabFilterQuery,
    LabInspectionInfo, LabInspectionRequest, LabInspectionResponse, ListLabInspectionsResponse,
    MetricInfo, ReportDayInfo, ReportRowInfo, ShiftReportResponse, ShiftSummariesResponse,
    ShiftSummaryInfo,
};

fn load_lab_inspection(
    persistence: &mut SqlitePersistence,
    lab_inspection_id: i64,
) -> Result<LabInspectionRecord, ApiError> {
    persistence
        .get_lab_inspection(lab_inspection_id)
        .map_err(|e| translate_persistence_error(e, "Failed to load lab result"))?
        .ok_or_else(|| {
            not_found(
                "Lab result",
                format!("Lab result {lab_inspection_id} does not exist"),
            )
        })
}

fn list_filtered(
    persistence: &mut SqlitePersistence,
    filter: &LabFilter,
) -> Result<Vec<LabInspectionRecord>, ApiError> {
    let records: Vec<LabInspectionRecord> = persistence
        .list_lab_inspections(filter)
        .map_err(|e| translate_persistence_error(e, "Failed to list lab results"))?;
    debug!(count = records.len(), filtered = !filter.is_empty(), "Listed lab results");
    Ok(records)
}

fn inspection_from_request(request: &LabInspectionRequest) -> Result<LabInspection, ApiError> {
    Ok(LabInspection::new(
        parse_date(&request.date).map_err(invalid_field("date"))?,
        request.hour.parse::<Hour>().map_err(invalid_field("hour"))?,
        request.plant.parse::<Plant>().map_err(invalid_field("plant"))?,
        request
            .sample_type
            .parse::<SampleType>()
            .map_err(invalid_field("sample_type"))?,
        request.sample_description.clone(),
        parse_readings(&request.readings)?,
    ))
}

fn lab_entry_info(inspection: &LabInspection) -> LabEntryInfo {
    let readings: BTreeMap<String, String> = AssayField::ALL
        .iter()
        .map(|field| {
            (
                field.key().to_string(),
                inspection.readings.get(*field).to_string(),
            )
        })
        .collect();

    LabEntryInfo {
        date: format_date(inspection.date),
        hour: inspection.hour.to_string(),
        plant: inspection.plant.to_string(),
        sample_type: inspection.sample_type.to_string(),
        sample_description: inspection.sample_description.clone(),
        readings,
    }
}

fn lab_info(record: &LabInspectionRecord) -> LabInspectionInfo {
    let inspection: &LabInspection = &record.inspection;
    LabInspectionInfo {
        id: record.lab_inspection_id,
        entry: lab_entry_info(inspection),
        shift_day: format_date(shift_day_of(inspection.date, inspection.hour)),
        user_id: record.user_id,
        created_at: record.created_at.clone(),
        updated_at: record.updated_at.clone(),
    }
}

/// Builds the grouped report over every stored result.
fn load_report(
    persistence: &mut SqlitePersistence,
    range: &DateRange,
) -> Result<ShiftReport, ApiError> {
    let inspections: Vec<LabInspection> = list_filtered(persistence, &LabFilter::default())?
        .into_iter()
        .map(|record| record.inspection)
        .collect();
    Ok(build_shift_report(&inspections, range))
}

fn report_response(report: ShiftReport, range: &DateRange) -> ShiftReportResponse {
    let metrics: Vec<MetricInfo> = ShiftReport::metrics()
        .iter()
        .map(|field| MetricInfo {
            key: field.key().to_string(),
            label: field.label().to_string(),
        })
        .collect();

    let days: Vec<ReportDayInfo> = report
        .days
        .into_iter()
        .map(|day| ReportDayInfo {
            shift_day: format_date(day.shift_day),
            label: shift_label(day.shift_day),
            rows: day
                .rows
                .into_iter()
                .map(|row| ReportRowInfo {
                    hour: row.hour.to_string(),
                    date: format_date(row.date),
                    cells: row.cells,
                })
                .collect(),
            averages: day.averages,
        })
        .collect();

    ShiftReportResponse {
        start_date: range.start.map(format_date),
        end_date: range.end.map(format_date),
        descriptions: report.descriptions,
        metrics,
        days,
    }
}

/// Lists lab results, newest first. An empty query returns everything.
///
/// # Errors
///
/// Returns an error if a filter value is malformed.
pub fn list_lab_inspections(
    persistence: &mut SqlitePersistence,
    query: &LabFilterQuery,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListLabInspectionsResponse, ApiError> {
    AuthorizationService::authorize_list_lab(authenticated_actor)?;

    let filter: LabFilter = parse_lab_filter(query)?;
    let records: Vec<LabInspectionRecord> = list_filtered(persistence, &filter)?;

    Ok(ListLabInspectionsResponse {
        entries: records.iter().map(lab_info).collect(),
    })
}

/// Logs one lab result.
///
/// # Errors
///
/// Returns an error if a selection is unknown or the readings do not
/// satisfy the form for that selection.
pub fn create_lab_inspection(
    persistence: &mut SqlitePersistence,
    request: &LabInspectionRequest,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
) -> Result<LabInspectionResponse, ApiError> {
    AuthorizationService::authorize_create_lab(authenticated_actor)?;

    let draft: LabInspection = inspection_from_request(request)?;
    let persisted: PersistTransitionResult = run_command(
        persistence,
        Command::CreateLabInspection { draft },
        authenticated_actor,
        user,
    )?;
    let lab_inspection_id: i64 = first_row_id(&persisted)?;

    info!(
        lab_inspection_id,
        user_id = authenticated_actor.user_id,
        "Created lab result"
    );

    let record: LabInspectionRecord = load_lab_inspection(persistence, lab_inspection_id)?;
    Ok(LabInspectionResponse {
        entry: lab_info(&record),
        message: String::from("Lab result created"),
    })
}

/// Logs a batch of results for one date, hour and plant. All or nothing.
///
/// # Errors
///
/// Returns an error if the batch is empty or any step fails; the message
/// names the failing step.
pub fn batch_create_lab_inspections(
    persistence: &mut SqlitePersistence,
    request: &BatchLabRequest,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
) -> Result<BatchLabResponse, ApiError> {
    AuthorizationService::authorize_create_lab(authenticated_actor)?;

    let date: Date = parse_date(&request.date).map_err(invalid_field("date"))?;
    let hour: Hour = request.hour.parse().map_err(invalid_field("hour"))?;
    let plant: Plant = request.plant.parse().map_err(invalid_field("plant"))?;

    let steps: Vec<BatchSubmission> = request
        .steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let sample_type: SampleType = step.sample_type.parse().map_err(|e| {
                ApiError::InvalidInput {
                    field: format!("steps[{index}].sample_type"),
                    message: format!("Batch step {} failed: {e}", index + 1),
                }
            })?;
            Ok(BatchSubmission {
                sample_type,
                sample_description: step.sample_description.clone(),
                readings: parse_readings(&step.readings)?,
            })
        })
        .collect::<Result<_, ApiError>>()?;

    let persisted: PersistTransitionResult = run_command(
        persistence,
        Command::BatchCreateLabInspections {
            date,
            hour,
            plant,
            steps,
        },
        authenticated_actor,
        user,
    )?;

    info!(
        count = persisted.row_ids.len(),
        plant = %plant,
        hour = %hour,
        user_id = authenticated_actor.user_id,
        "Created lab result batch"
    );

    Ok(BatchLabResponse {
        message: format!("{} lab results created", persisted.row_ids.len()),
        ids: persisted.row_ids,
    })
}

/// Replaces a lab result.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, the result does not exist,
/// or the submission is invalid.
pub fn update_lab_inspection(
    persistence: &mut SqlitePersistence,
    lab_inspection_id: i64,
    request: &LabInspectionRequest,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
) -> Result<LabInspectionResponse, ApiError> {
    AuthorizationService::authorize_update_lab(authenticated_actor)?;

    let current: LabInspectionRecord = load_lab_inspection(persistence, lab_inspection_id)?;
    let draft: LabInspection = inspection_from_request(request)?;

    run_command(
        persistence,
        Command::UpdateLabInspection {
            id: lab_inspection_id,
            current: current.inspection,
            draft,
        },
        authenticated_actor,
        user,
    )?;

    info!(
        lab_inspection_id,
        user_id = authenticated_actor.user_id,
        "Updated lab result"
    );

    let record: LabInspectionRecord = load_lab_inspection(persistence, lab_inspection_id)?;
    Ok(LabInspectionResponse {
        entry: lab_info(&record),
        message: String::from("Lab result updated"),
    })
}

/// Deletes a lab result, keeping an archived copy.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the result does not
/// exist.
pub fn delete_lab_inspection(
    persistence: &mut SqlitePersistence,
    lab_inspection_id: i64,
    authenticated_actor: &AuthenticatedActor,
    user: &UserData,
) -> Result<DeleteResponse, ApiError> {
    AuthorizationService::authorize_delete_lab(authenticated_actor)?;

    let current: LabInspectionRecord = load_lab_inspection(persistence, lab_inspection_id)?;
    run_command(
        persistence,
        Command::DeleteLabInspection {
            id: lab_inspection_id,
            current: current.inspection,
        },
        authenticated_actor,
        user,
    )?;

    info!(
        lab_inspection_id,
        user_id = authenticated_actor.user_id,
        "Deleted lab result"
    );

    Ok(DeleteResponse {
        id: lab_inspection_id,
        message: String::from("Lab result deleted"),
    })
}

/// The grouped shift report for a date range. Missing bounds are open.
///
/// # Errors
///
/// Returns an error if a date is malformed or the end precedes the start.
pub fn get_lab_report(
    persistence: &mut SqlitePersistence,
    query: &LabFilterQuery,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ShiftReportResponse, ApiError> {
    AuthorizationService::authorize_reports(authenticated_actor)?;

    let range: DateRange = parse_date_range(query)?;
    let report: ShiftReport = load_report(persistence, &range)?;
    Ok(report_response(report, &range))
}

/// Per-shift-day averages over filtered results.
///
/// Without date bounds the Sunday-to-Saturday week containing `today` is
/// used.
///
/// # Errors
///
/// Returns an error if a filter value is malformed.
pub fn get_shift_summaries(
    persistence: &mut SqlitePersistence,
    query: &LabFilterQuery,
    authenticated_actor: &AuthenticatedActor,
    today: Date,
) -> Result<ShiftSummariesResponse, ApiError> {
    AuthorizationService::authorize_reports(authenticated_actor)?;

    let mut filter: LabFilter = parse_lab_filter(query)?;
    if filter.start_date.is_none() && filter.end_date.is_none() {
        let week: DateRange = default_week(today);
        filter.start_date = week.start;
        filter.end_date = week.end;
    }

    let inspections: Vec<LabInspection> = list_filtered(persistence, &filter)?
        .into_iter()
        .map(|record| record.inspection)
        .collect();
    let summaries: Vec<ShiftSummary> = summarize_shift_days(&inspections);

    let shifts: Vec<ShiftSummaryInfo> = summaries
        .into_iter()
        .map(|summary| ShiftSummaryInfo {
            shift_day: format_date(summary.shift_day),
            label: summary.label,
            entries: summary.entries.iter().map(lab_entry_info).collect(),
            averages: summary
                .averages
                .into_iter()
                .map(|(field, average)| (field.key().to_string(), average))
                .collect(),
        })
        .collect();

    Ok(ShiftSummariesResponse {
        start_date: filter.start_date.map(format_date),
        end_date: filter.end_date.map(format_date),
        shifts,
    })
}

/// Exports filtered lab results as a spreadsheet.
///
/// # Errors
///
/// Returns an error if a filter value is malformed or rendering fails.
pub fn export_lab_inspections(
    persistence: &mut SqlitePersistence,
    query: &LabFilterQuery,
    format: ExportFormat,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ExportFile, ApiError> {
    AuthorizationService::authorize_reports(authenticated_actor)?;

    let filter: LabFilter = parse_lab_filter(query)?;
    let records: Vec<LabInspectionRecord> = list_filtered(persistence, &filter)?;

    render(&lab_sheet(&records), format, "lab-results").map_err(|e| ApiError::Internal {
        message: e.to_string(),
    })
}

/// Exports the grouped shift report, average rows included.
///
/// # Errors
///
/// Returns an error if a date is malformed or rendering fails.
pub fn export_lab_report(
    persistence: &mut SqlitePersistence,
    query: &LabFilterQuery,
    format: ExportFormat,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ExportFile, ApiError> {
    AuthorizationService::authorize_reports(authenticated_actor)?;

    let range: DateRange = parse_date_range(query)?;
    let report: ShiftReport = load_report(persistence, &range)?;

    render(&shift_report_sheet(&report), format, "shift-report").map_err(|e| {
        ApiError::Internal {
            message: e.to_string(),
        }
    })
}
