// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for PlantLog: authentication, role checks, request and
//! response types, handlers and spreadsheet export.
//!
//! Handlers are synchronous and take `&mut SqlitePersistence`; the HTTP
//! layer serializes access to the connection.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod export;
mod handlers;
mod password_policy;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use export::{
    ExportError, ExportFile, ExportFormat, Sheet, downtime_sheet, lab_sheet, local_time_label,
    render, shift_report_sheet, to_csv, to_xlsx,
};
pub use handlers::{
    ban_user, batch_create_lab_inspections, bootstrap_admin, change_password, create_downtime,
    create_lab_inspection, create_user, delete_downtime, delete_lab_inspection, delete_user,
    export_downtime, export_lab_inspections, export_lab_report, get_audit_log, get_batch_plan,
    get_catalog, get_downtime, get_downtime_report, get_form_schema, get_lab_report,
    get_shift_summaries, list_audit_logs, list_downtime, list_lab_inspections, list_users, login,
    logout, resolve_downtime, unban_user, update_downtime, update_lab_inspection,
    update_user_role, whoami,
};
pub use password_policy::{PasswordPolicy, PasswordPolicyError};
pub use request_response::{
    AuditLogInfo, BanUserRequest, BatchLabRequest, BatchLabResponse, BatchPlanQuery,
    BatchPlanResponse, BatchStepInfo, BatchStepRequest, CatalogFieldInfo, CatalogResponse,
    ChangePasswordRequest, ChangePasswordResponse, CreateUserRequest, DeleteResponse,
    DeleteUserResponse, DowntimeInfo, DowntimeReportResponse, DowntimeRequest, DowntimeResponse,
    EntryDefaultsInfo, FieldInfo, FormSchemaQuery, FormSchemaResponse, LabEntryInfo,
    LabFilterQuery, LabInspectionInfo, LabInspectionRequest, LabInspectionResponse,
    ListAuditLogsResponse, ListDowntimeResponse, ListLabInspectionsResponse, ListUsersResponse,
    LoginRequest, LoginResponse, LogoutResponse, MetricInfo, ReportDayInfo, ReportRowInfo,
    ReporterInfo, ResolveDowntimeRequest, ShiftReportResponse, ShiftSummariesResponse,
    ShiftSummaryInfo, UpdateUserRoleRequest, UserInfo, UserResponse, WhoAmIResponse,
};
