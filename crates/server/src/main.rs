// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono_tz::Tz;
use clap::Parser;
use plantlog_api::{
    ApiError, AuditLogInfo, BanUserRequest, BatchLabRequest, BatchLabResponse, BatchPlanQuery,
    BatchPlanResponse, CatalogResponse, ChangePasswordRequest, ChangePasswordResponse,
    CreateUserRequest, DeleteResponse, DeleteUserResponse, DowntimeInfo, DowntimeReportResponse,
    DowntimeRequest, DowntimeResponse, ExportFile, ExportFormat, FormSchemaQuery,
    FormSchemaResponse, LabFilterQuery, LabInspectionRequest, LabInspectionResponse,
    ListAuditLogsResponse, ListDowntimeResponse, ListLabInspectionsResponse, ListUsersResponse,
    LoginRequest, LoginResponse, LogoutResponse, ResolveDowntimeRequest, ShiftReportResponse,
    ShiftSummariesResponse, UpdateUserRoleRequest, UserResponse, WhoAmIResponse,
};
use plantlog_domain::{parse_timezone, today_in};
use plantlog_persistence::SqlitePersistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::session::{SessionToken, SessionUser};

/// `PlantLog` server: downtime and lab results for a processing plant.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long, env = "PLANTLOG_DATABASE")]
    database: Option<String>,

    /// MySQL/MariaDB connection URL. Takes precedence over `--database`.
    #[arg(long, env = "PLANTLOG_MYSQL_URL")]
    mysql_url: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, env = "PLANTLOG_PORT", default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(long, env = "PLANTLOG_BIND", default_value = "127.0.0.1")]
    bind: String,

    /// IANA timezone of the plant, used for shift days and exports
    #[arg(long, env = "PLANTLOG_TIMEZONE", default_value = "UTC")]
    timezone: String,

    /// E-mail of the admin created on first start
    #[arg(long, env = "PLANTLOG_ADMIN_EMAIL")]
    admin_email: Option<String>,

    /// Display name of the admin created on first start
    #[arg(long, env = "PLANTLOG_ADMIN_NAME", default_value = "Administrator")]
    admin_name: String,

    /// Password of the admin created on first start
    #[arg(long, env = "PLANTLOG_ADMIN_PASSWORD", hide_env_values = true)]
    admin_password: Option<String>,
}

/// Application state shared across handlers.
///
/// The persistence layer sits behind a mutex; handlers hold the lock for the
/// duration of one API call.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<SqlitePersistence>>,
    /// Plant timezone.
    timezone: Tz,
}

/// Query parameters for downtime export.
#[derive(Debug, Deserialize)]
struct ExportQuery {
    /// `xlsx` (default) or `csv`.
    format: Option<String>,
}

/// Query parameters for lab exports: a format plus the usual lab filter.
#[derive(Debug, Deserialize)]
struct LabExportQuery {
    format: Option<String>,
    #[serde(flatten)]
    filter: LabFilterQuery,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } | ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } | ApiError::PasswordPolicyViolation { .. } => {
                StatusCode::BAD_REQUEST
            }
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        Self {
            status,
            message: err.to_string(),
        }
    }
}

fn parse_export_format(format: Option<&str>) -> Result<ExportFormat, HttpError> {
    format
        .unwrap_or("xlsx")
        .parse::<ExportFormat>()
        .map_err(|e| HttpError {
            status: StatusCode::BAD_REQUEST,
            message: e.to_string(),
        })
}

/// Sends a rendered export as a file download.
fn download(file: ExportFile) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.file_name),
            ),
        ],
        file.bytes,
    )
        .into_response()
}

/// Handler for POST `/auth/login` endpoint.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(email = %req.email, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = plantlog_api::login(&mut persistence, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/auth/logout` endpoint.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionToken(token): SessionToken,
) -> Result<Json<LogoutResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: LogoutResponse = plantlog_api::logout(&mut persistence, &token)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/auth/me` endpoint.
async fn handle_me(SessionUser(actor, user): SessionUser) -> Json<WhoAmIResponse> {
    Json(plantlog_api::whoami(&actor, &user))
}

/// Handler for POST `/users/me/password` endpoint.
async fn handle_change_password(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ChangePasswordResponse>, HttpError> {
    info!(user_id = user.user_id, "Handling change_password request");

    let mut persistence = app_state.persistence.lock().await;
    let response: ChangePasswordResponse =
        plantlog_api::change_password(&mut persistence, &req, &actor, &user)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/catalog` endpoint.
async fn handle_catalog(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(_, _): SessionUser,
) -> Json<CatalogResponse> {
    Json(plantlog_api::get_catalog(today_in(app_state.timezone)))
}

/// Handler for GET `/lab/form-schema` endpoint.
async fn handle_form_schema(
    SessionUser(_, _): SessionUser,
    Query(query): Query<FormSchemaQuery>,
) -> Result<Json<FormSchemaResponse>, HttpError> {
    Ok(Json(plantlog_api::get_form_schema(&query)?))
}

/// Handler for GET `/lab/batch-plan` endpoint.
async fn handle_batch_plan(
    SessionUser(_, _): SessionUser,
    Query(query): Query<BatchPlanQuery>,
) -> Result<Json<BatchPlanResponse>, HttpError> {
    Ok(Json(plantlog_api::get_batch_plan(&query)?))
}

/// Handler for GET `/downtime` endpoint.
async fn handle_list_downtime(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<Json<ListDowntimeResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListDowntimeResponse =
        plantlog_api::list_downtime(&mut persistence, &actor, app_state.timezone)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/downtime` endpoint.
async fn handle_create_downtime(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Json(req): Json<DowntimeRequest>,
) -> Result<Json<DowntimeResponse>, HttpError> {
    info!(
        user_id = user.user_id,
        equipment = %req.plant_equipment,
        "Handling create_downtime request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: DowntimeResponse = plantlog_api::create_downtime(
        &mut persistence,
        &req,
        &actor,
        &user,
        app_state.timezone,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/downtime/{id}` endpoint.
async fn handle_get_downtime(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(downtime_id): Path<i64>,
) -> Result<Json<DowntimeInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: DowntimeInfo =
        plantlog_api::get_downtime(&mut persistence, downtime_id, &actor, app_state.timezone)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/downtime/{id}` endpoint.
async fn handle_update_downtime(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Path(downtime_id): Path<i64>,
    Json(req): Json<DowntimeRequest>,
) -> Result<Json<DowntimeResponse>, HttpError> {
    info!(downtime_id, user_id = user.user_id, "Handling update_downtime request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DowntimeResponse = plantlog_api::update_downtime(
        &mut persistence,
        downtime_id,
        &req,
        &actor,
        &user,
        app_state.timezone,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for DELETE `/downtime/{id}` endpoint.
async fn handle_delete_downtime(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Path(downtime_id): Path<i64>,
) -> Result<Json<DeleteResponse>, HttpError> {
    info!(downtime_id, user_id = user.user_id, "Handling delete_downtime request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteResponse =
        plantlog_api::delete_downtime(&mut persistence, downtime_id, &actor, &user)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/downtime/{id}/resolve` endpoint.
async fn handle_resolve_downtime(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Path(downtime_id): Path<i64>,
    Json(req): Json<ResolveDowntimeRequest>,
) -> Result<Json<DowntimeResponse>, HttpError> {
    info!(downtime_id, user_id = user.user_id, "Handling resolve_downtime request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DowntimeResponse = plantlog_api::resolve_downtime(
        &mut persistence,
        downtime_id,
        &req,
        &actor,
        &user,
        app_state.timezone,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/downtime/{id}/report` endpoint.
///
/// The entry, who logged it and its audit trail; the payload behind the
/// printable downtime report.
async fn handle_downtime_report(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(downtime_id): Path<i64>,
) -> Result<Json<DowntimeReportResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: DowntimeReportResponse = plantlog_api::get_downtime_report(
        &mut persistence,
        downtime_id,
        &actor,
        app_state.timezone,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/downtime/export` endpoint.
async fn handle_export_downtime(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response, HttpError> {
    let format: ExportFormat = parse_export_format(query.format.as_deref())?;

    let mut persistence = app_state.persistence.lock().await;
    let file: ExportFile =
        plantlog_api::export_downtime(&mut persistence, format, &actor, app_state.timezone)?;
    drop(persistence);

    info!(file_name = %file.file_name, bytes = file.bytes.len(), "Exported downtime");
    Ok(download(file))
}

/// Handler for GET `/lab` endpoint.
async fn handle_list_lab(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Query(query): Query<LabFilterQuery>,
) -> Result<Json<ListLabInspectionsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListLabInspectionsResponse =
        plantlog_api::list_lab_inspections(&mut persistence, &query, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/lab` endpoint.
async fn handle_create_lab(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Json(req): Json<LabInspectionRequest>,
) -> Result<Json<LabInspectionResponse>, HttpError> {
    info!(
        user_id = user.user_id,
        plant = %req.plant,
        hour = %req.hour,
        "Handling create_lab_inspection request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: LabInspectionResponse =
        plantlog_api::create_lab_inspection(&mut persistence, &req, &actor, &user)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/lab/batch` endpoint.
async fn handle_batch_lab(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Json(req): Json<BatchLabRequest>,
) -> Result<Json<BatchLabResponse>, HttpError> {
    info!(
        user_id = user.user_id,
        steps = req.steps.len(),
        "Handling batch_create_lab_inspections request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: BatchLabResponse =
        plantlog_api::batch_create_lab_inspections(&mut persistence, &req, &actor, &user)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/lab/{id}` endpoint.
async fn handle_update_lab(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Path(lab_inspection_id): Path<i64>,
    Json(req): Json<LabInspectionRequest>,
) -> Result<Json<LabInspectionResponse>, HttpError> {
    info!(lab_inspection_id, user_id = user.user_id, "Handling update_lab_inspection request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LabInspectionResponse = plantlog_api::update_lab_inspection(
        &mut persistence,
        lab_inspection_id,
        &req,
        &actor,
        &user,
    )?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for DELETE `/lab/{id}` endpoint.
async fn handle_delete_lab(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Path(lab_inspection_id): Path<i64>,
) -> Result<Json<DeleteResponse>, HttpError> {
    info!(lab_inspection_id, user_id = user.user_id, "Handling delete_lab_inspection request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteResponse =
        plantlog_api::delete_lab_inspection(&mut persistence, lab_inspection_id, &actor, &user)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/lab/report` endpoint.
async fn handle_lab_report(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Query(query): Query<LabFilterQuery>,
) -> Result<Json<ShiftReportResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ShiftReportResponse =
        plantlog_api::get_lab_report(&mut persistence, &query, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/lab/shifts` endpoint.
///
/// Without dates the current week in plant time is used.
async fn handle_lab_shifts(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Query(query): Query<LabFilterQuery>,
) -> Result<Json<ShiftSummariesResponse>, HttpError> {
    let today = today_in(app_state.timezone);

    let mut persistence = app_state.persistence.lock().await;
    let response: ShiftSummariesResponse =
        plantlog_api::get_shift_summaries(&mut persistence, &query, &actor, today)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/lab/export` endpoint.
async fn handle_export_lab(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Query(query): Query<LabExportQuery>,
) -> Result<Response, HttpError> {
    let format: ExportFormat = parse_export_format(query.format.as_deref())?;

    let mut persistence = app_state.persistence.lock().await;
    let file: ExportFile =
        plantlog_api::export_lab_inspections(&mut persistence, &query.filter, format, &actor)?;
    drop(persistence);

    info!(file_name = %file.file_name, bytes = file.bytes.len(), "Exported lab results");
    Ok(download(file))
}

/// Handler for GET `/lab/report/export` endpoint.
async fn handle_export_lab_report(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Query(query): Query<LabExportQuery>,
) -> Result<Response, HttpError> {
    let format: ExportFormat = parse_export_format(query.format.as_deref())?;

    let mut persistence = app_state.persistence.lock().await;
    let file: ExportFile =
        plantlog_api::export_lab_report(&mut persistence, &query.filter, format, &actor)?;
    drop(persistence);

    info!(file_name = %file.file_name, bytes = file.bytes.len(), "Exported shift report");
    Ok(download(file))
}

/// Handler for GET `/audit` endpoint.
async fn handle_list_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<Json<ListAuditLogsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListAuditLogsResponse = plantlog_api::list_audit_logs(&mut persistence, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/audit/{id}` endpoint.
async fn handle_get_audit(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(audit_log_id): Path<i64>,
) -> Result<Json<AuditLogInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditLogInfo =
        plantlog_api::get_audit_log(&mut persistence, audit_log_id, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/users` endpoint.
async fn handle_list_users(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
) -> Result<Json<ListUsersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListUsersResponse = plantlog_api::list_users(&mut persistence, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/users` endpoint.
async fn handle_create_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<UserResponse>, HttpError> {
    info!(email = %req.email, created_by = actor.user_id, "Handling create_user request");

    let mut persistence = app_state.persistence.lock().await;
    let response: UserResponse = plantlog_api::create_user(&mut persistence, &req, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/users/{id}/role` endpoint.
async fn handle_update_user_role(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateUserRoleRequest>,
) -> Result<Json<UserResponse>, HttpError> {
    info!(user_id, role = %req.role, "Handling update_user_role request");

    let mut persistence = app_state.persistence.lock().await;
    let response: UserResponse =
        plantlog_api::update_user_role(&mut persistence, user_id, &req, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for DELETE `/users/{id}` endpoint.
async fn handle_delete_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, _): SessionUser,
    Path(user_id): Path<i64>,
) -> Result<Json<DeleteUserResponse>, HttpError> {
    info!(user_id, "Handling delete_user request");

    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteUserResponse =
        plantlog_api::delete_user(&mut persistence, user_id, &actor)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/users/{id}/ban` endpoint.
async fn handle_ban_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Path(user_id): Path<i64>,
    Json(req): Json<BanUserRequest>,
) -> Result<Json<UserResponse>, HttpError> {
    info!(user_id, banned_by = user.user_id, "Handling ban_user request");

    let mut persistence = app_state.persistence.lock().await;
    let response: UserResponse =
        plantlog_api::ban_user(&mut persistence, user_id, &req, &actor, &user)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/users/{id}/unban` endpoint.
async fn handle_unban_user(
    AxumState(app_state): AxumState<AppState>,
    SessionUser(actor, user): SessionUser,
    Path(user_id): Path<i64>,
) -> Result<Json<UserResponse>, HttpError> {
    info!(user_id, unbanned_by = user.user_id, "Handling unban_user request");

    let mut persistence = app_state.persistence.lock().await;
    let response: UserResponse =
        plantlog_api::unban_user(&mut persistence, user_id, &actor, &user)?;
    drop(persistence);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/auth/me", get(handle_me))
        .route("/catalog", get(handle_catalog))
        .route("/downtime", get(handle_list_downtime).post(handle_create_downtime))
        .route("/downtime/export", get(handle_export_downtime))
        .route(
            "/downtime/{id}",
            get(handle_get_downtime)
                .put(handle_update_downtime)
                .delete(handle_delete_downtime),
        )
        .route("/downtime/{id}/resolve", post(handle_resolve_downtime))
        .route("/downtime/{id}/report", get(handle_downtime_report))
        .route("/lab", get(handle_list_lab).post(handle_create_lab))
        .route("/lab/batch", post(handle_batch_lab))
        .route("/lab/form-schema", get(handle_form_schema))
        .route("/lab/batch-plan", get(handle_batch_plan))
        .route("/lab/report", get(handle_lab_report))
        .route("/lab/report/export", get(handle_export_lab_report))
        .route("/lab/shifts", get(handle_lab_shifts))
        .route("/lab/export", get(handle_export_lab))
        .route("/lab/{id}", put(handle_update_lab).delete(handle_delete_lab))
        .route("/audit", get(handle_list_audit))
        .route("/audit/{id}", get(handle_get_audit))
        .route("/users", get(handle_list_users).post(handle_create_user))
        .route("/users/me/password", post(handle_change_password))
        .route("/users/{id}", axum::routing::delete(handle_delete_user))
        .route("/users/{id}/role", put(handle_update_user_role))
        .route("/users/{id}/ban", post(handle_ban_user))
        .route("/users/{id}/unban", post(handle_unban_user))
        .with_state(app_state)
}

/// Opens the configured backend: `MySQL` when a URL is given, otherwise a
/// `SQLite` file, otherwise in-memory.
fn open_persistence(args: &Args) -> Result<SqlitePersistence, Box<dyn std::error::Error>> {
    if let Some(url) = &args.mysql_url {
        info!("Using MySQL database");
        return Ok(SqlitePersistence::new_with_mysql(url)?);
    }

    if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Ok(SqlitePersistence::new_with_file(db_path)?)
    } else {
        info!("Using in-memory database");
        Ok(SqlitePersistence::new_in_memory()?)
    }
}

/// Creates the configured admin if the system has no users yet.
fn bootstrap(persistence: &mut SqlitePersistence, args: &Args) -> Result<(), ApiError> {
    let (Some(email), Some(password)) = (&args.admin_email, &args.admin_password) else {
        warn!("No bootstrap admin configured; set PLANTLOG_ADMIN_EMAIL and PLANTLOG_ADMIN_PASSWORD");
        return Ok(());
    };

    match plantlog_api::bootstrap_admin(persistence, email, &args.admin_name, password)? {
        Some(user_id) => info!(user_id, email = %email, "Created bootstrap admin"),
        None => info!("Users exist; skipping admin bootstrap"),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing PlantLog server");

    let timezone: Tz = parse_timezone(&args.timezone)?;
    info!(timezone = %timezone, "Using plant timezone");

    let mut persistence: SqlitePersistence = open_persistence(&args)?;
    bootstrap(&mut persistence, &args)?;

    let expired: usize = persistence.delete_expired_sessions()?;
    if expired > 0 {
        info!(expired, "Removed expired sessions");
    }

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        timezone,
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used)]

    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use plantlog_persistence::{ROLE_ADMIN, ROLE_MEMBER};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const PASSWORD: &str = "Sup3r-secret";

    /// Helper to create test app state with in-memory persistence and two
    /// users: `admin@plant.example` and `member@plant.example`.
    fn create_test_app_state() -> AppState {
        let mut persistence: SqlitePersistence =
            SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
        persistence
            .create_user("admin@plant.example", "Ada Admin", PASSWORD, ROLE_ADMIN)
            .expect("admin");
        persistence
            .create_user("member@plant.example", "Max Member", PASSWORD, ROLE_MEMBER)
            .expect("member");

        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            timezone: chrono_tz::UTC,
        }
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn empty_request(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body_bytes).unwrap()
    }

    async fn login_as(app: &Router, email: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/login",
                None,
                &json!({ "email": email, "password": PASSWORD }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        body_json(response)
            .await
            .get("session_token")
            .and_then(Value::as_str)
            .unwrap()
            .to_string()
    }

    fn downtime_body(equipment: &str) -> Value {
        json!({
            "start_date": "2026-03-02T08:00:00Z",
            "plant_category": "Processing",
            "plant_section": "Milling",
            "discipline": "Mechanical",
            "plant_equipment": equipment,
            "breakdown_description": "Bearing failure"
        })
    }

    async fn create_downtime(app: &Router, token: &str) -> i64 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/downtime",
                Some(token),
                &downtime_body("Ball mill 1"),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        body_json(response).await["entry"]["id"].as_i64().unwrap()
    }

    #[tokio::test]
    async fn test_login_and_me() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;

        let response = app
            .oneshot(empty_request("GET", "/auth/me", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["email"], "member@plant.example");
        assert_eq!(body["role"], "member");
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(json_request(
                "POST",
                "/auth/login",
                None,
                &json!({ "email": "member@plant.example", "password": "nope" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["error"], true);
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/downtime")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Missing Authorization header");
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;

        let response = app
            .clone()
            .oneshot(empty_request("POST", "/auth/logout", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);

        let response = app
            .oneshot(empty_request("GET", "/auth/me", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_member_logs_and_lists_downtime() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;
        create_downtime(&app, &token).await;

        let response = app
            .oneshot(empty_request("GET", "/downtime", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body = body_json(response).await;
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["status"], "down");
    }

    #[tokio::test]
    async fn test_member_cannot_delete_downtime() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;
        let id = create_downtime(&app, &token).await;

        let response = app
            .oneshot(empty_request("DELETE", &format!("/downtime/{id}"), &token))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_resolving_twice_is_unprocessable() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;
        let id = create_downtime(&app, &token).await;
        let uri = format!("/downtime/{id}/resolve");
        let body = json!({ "end_date": "2026-03-02T09:00:00Z" });

        let first = app
            .clone()
            .oneshot(json_request("POST", &uri, Some(&token), &body))
            .await
            .unwrap();
        assert_eq!(first.status(), HttpStatusCode::OK);

        let second = app
            .oneshot(json_request("POST", &uri, Some(&token), &body))
            .await
            .unwrap();
        assert_eq!(second.status(), HttpStatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_invalid_input_is_bad_request() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/downtime",
                Some(&token),
                &downtime_body(""),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("plant_equipment")
        );
    }

    #[tokio::test]
    async fn test_unknown_downtime_is_not_found() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "admin@plant.example").await;

        let response = app
            .oneshot(empty_request("GET", "/downtime/999/report", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_lab_entry_with_flattened_readings() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/lab",
                Some(&token),
                &json!({
                    "date": "2026-03-02",
                    "hour": "08h00",
                    "plant": "SAOB",
                    "sample_type": "Normal Sample",
                    "sample_description": "Tailings",
                    "fe_perc": "30.5",
                    "sio_perc": "4.1",
                    "p_perc": "0.05",
                    "tio_perc": "1.2",
                    "mgo_perc": "0.8",
                    "cao_perc": "0.6",
                    "moisture": "7.5"
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["entry"]["fe_perc"], "30.5");
        assert_eq!(body["entry"]["cu_perc"], "0");

        let response = app
            .oneshot(empty_request("GET", "/lab?plant=SAOB&hours=08h00,10h00", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_lab_shifts_default_to_a_week() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;

        let response = app
            .oneshot(empty_request("GET", "/lab/shifts", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body = body_json(response).await;
        assert!(body["start_date"].is_string());
        assert!(body["end_date"].is_string());
        assert_eq!(body["shifts"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_downtime_csv_download() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;
        create_downtime(&app, &token).await;

        let response = app
            .oneshot(empty_request("GET", "/downtime/export?format=csv", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"downtime.csv\""
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"ID,Start,End"));
    }

    #[tokio::test]
    async fn test_unknown_export_format_is_bad_request() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;

        let response = app
            .oneshot(empty_request("GET", "/lab/report/export?format=pdf", &token))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_cannot_change_own_role() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "admin@plant.example").await;
        let me = body_json(
            app.clone()
                .oneshot(empty_request("GET", "/auth/me", &token))
                .await
                .unwrap(),
        )
        .await;
        let user_id = me["user_id"].as_i64().unwrap();

        let response = app
            .oneshot(json_request(
                "PUT",
                &format!("/users/{user_id}/role"),
                Some(&token),
                &json!({ "role": "member" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Forbidden: You cannot update your own role");
    }

    #[tokio::test]
    async fn test_weak_new_password_is_bad_request() {
        let app: Router = build_router(create_test_app_state());
        let token = login_as(&app, "member@plant.example").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/users/me/password",
                Some(&token),
                &json!({
                    "current_password": PASSWORD,
                    "new_password": "short",
                    "new_password_confirmation": "short"
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_admin_reads_audit_log() {
        let app: Router = build_router(create_test_app_state());
        let member_token = login_as(&app, "member@plant.example").await;
        create_downtime(&app, &member_token).await;
        let admin_token = login_as(&app, "admin@plant.example").await;

        let forbidden = app
            .clone()
            .oneshot(empty_request("GET", "/audit", &member_token))
            .await
            .unwrap();
        assert_eq!(forbidden.status(), HttpStatusCode::FORBIDDEN);

        let response = app
            .oneshot(empty_request("GET", "/audit", &admin_token))
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body = body_json(response).await;
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["action"], "create");
        assert_eq!(entries[0]["performed_by_name"], "Max Member");
    }
}
