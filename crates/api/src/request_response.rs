// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates travel as `YYYY-MM-DD`, hours as `HHh00`, timestamps as RFC 3339
//! and assay readings as strings keyed by field name.

use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub session_token: String,
    pub user_id: i64,
    pub email: String,
    pub name: String,
    /// `admin` or `member`.
    pub role: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WhoAmIResponse {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LogoutResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserInfo {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: String,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListUsersResponse {
    /// Newest first.
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    pub password_confirmation: String,
    /// `admin` or `member`; defaults to `member`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Returned by every user-management write.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserResponse {
    pub user: UserInfo,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UpdateUserRoleRequest {
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BanUserRequest {
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteUserResponse {
    pub user_id: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChangePasswordResponse {
    pub message: String,
    /// Sessions revoked by the change, including the caller's.
    pub sessions_revoked: usize,
}

// ---------------------------------------------------------------------------
// Downtime
// ---------------------------------------------------------------------------

/// A downtime entry as submitted for create and update.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DowntimeRequest {
    /// RFC 3339.
    pub start_date: String,
    /// RFC 3339; absent while the equipment is still down.
    #[serde(default)]
    pub end_date: Option<String>,
    pub plant_category: String,
    pub plant_section: String,
    pub discipline: String,
    pub plant_equipment: String,
    pub breakdown_description: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolveDowntimeRequest {
    /// RFC 3339.
    pub end_date: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DowntimeInfo {
    pub id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    /// `up` once resolved, otherwise `down`.
    pub status: String,
    /// `{h}h {m}m`, or `N/A` while down.
    pub duration: String,
    pub plant_category: String,
    pub plant_section: String,
    pub discipline: String,
    pub plant_equipment: String,
    pub breakdown_description: String,
    pub notes: Option<String>,
    /// The shift day the outage started in, plant time.
    pub shift_day: String,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListDowntimeResponse {
    pub entries: Vec<DowntimeInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DowntimeResponse {
    pub entry: DowntimeInfo,
    pub message: String,
}

/// Who logged an entry, as far as the user still exists.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReporterInfo {
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

/// Everything known about one downtime entry. Doubles as the printable
/// report payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DowntimeReportResponse {
    pub entry: DowntimeInfo,
    pub reported_by: Option<ReporterInfo>,
    /// Oldest first.
    pub audit_trail: Vec<AuditLogInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DeleteResponse {
    pub id: i64,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Lab results
// ---------------------------------------------------------------------------

/// One lab result as submitted. Readings sit next to the other fields,
/// keyed by assay field name.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabInspectionRequest {
    pub date: String,
    pub hour: String,
    pub plant: String,
    pub sample_type: String,
    pub sample_description: String,
    #[serde(flatten)]
    pub readings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchStepRequest {
    pub sample_type: String,
    pub sample_description: String,
    #[serde(flatten)]
    pub readings: BTreeMap<String, String>,
}

/// A batch entry: shared date, hour and plant, one step per sample.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchLabRequest {
    pub date: String,
    pub hour: String,
    pub plant: String,
    pub steps: Vec<BatchStepRequest>,
}

/// A lab result without storage metadata.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabEntryInfo {
    pub date: String,
    pub hour: String,
    pub plant: String,
    pub sample_type: String,
    pub sample_description: String,
    /// Every assay field; `"0"` where nothing was entered.
    #[serde(flatten)]
    pub readings: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabInspectionInfo {
    pub id: i64,
    #[serde(flatten)]
    pub entry: LabEntryInfo,
    pub shift_day: String,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListLabInspectionsResponse {
    pub entries: Vec<LabInspectionInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabInspectionResponse {
    pub entry: LabInspectionInfo,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchLabResponse {
    /// Row ids in step order.
    pub ids: Vec<i64>,
    pub message: String,
}

/// Raw lab filter parameters as they arrive in a query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LabFilterQuery {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub plant: Option<String>,
    /// Comma-separated, e.g. `06h00,08h00`.
    #[serde(default)]
    pub hours: Option<String>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MetricInfo {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportRowInfo {
    pub hour: String,
    pub date: String,
    /// Per description: metric values in `metrics` order, or `None` when no
    /// reading was taken.
    pub cells: Vec<Option<Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ReportDayInfo {
    pub shift_day: String,
    pub label: String,
    /// Twelve rows, 06h00 first.
    pub rows: Vec<ReportRowInfo>,
    /// Per description: averaged metric values.
    pub averages: Vec<Vec<String>>,
}

/// The grouped shift report. Also the "PDF" payload.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShiftReportResponse {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub descriptions: Vec<String>,
    pub metrics: Vec<MetricInfo>,
    /// Newest first.
    pub days: Vec<ReportDayInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShiftSummaryInfo {
    pub shift_day: String,
    pub label: String,
    pub entries: Vec<LabEntryInfo>,
    /// Field key to average; `""` when a field has no non-zero reading.
    pub averages: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ShiftSummariesResponse {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Newest first.
    pub shifts: Vec<ShiftSummaryInfo>,
}

// ---------------------------------------------------------------------------
// Form schema and catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormSchemaQuery {
    pub plant: String,
    pub sample_type: String,
    pub sample_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldInfo {
    pub key: String,
    pub label: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FormSchemaResponse {
    pub plant: String,
    pub sample_type: String,
    pub sample_description: String,
    /// No sample taken: inputs disabled, everything stored as zero.
    pub locked: bool,
    /// Visible fields in catalog order.
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchPlanQuery {
    pub date: String,
    pub hour: String,
    pub plant: String,
    #[serde(default)]
    pub sample_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchStepInfo {
    pub index: usize,
    pub schema: FormSchemaResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BatchPlanResponse {
    pub date: String,
    pub hour: String,
    pub plant: String,
    pub steps: Vec<BatchStepInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CatalogFieldInfo {
    pub key: String,
    pub label: String,
    pub screen: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EntryDefaultsInfo {
    pub date: String,
    pub hour: String,
    pub plant: String,
    pub sample_type: String,
    pub sample_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CatalogResponse {
    pub plants: Vec<String>,
    pub sample_types: Vec<String>,
    /// Shift order, 06h00 first.
    pub hours: Vec<String>,
    pub sample_descriptions: Vec<String>,
    pub fields: Vec<CatalogFieldInfo>,
    pub report_metrics: Vec<MetricInfo>,
    pub defaults: EntryDefaultsInfo,
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditLogInfo {
    pub id: i64,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub description: String,
    /// Parsed metadata; the raw string when it is not valid JSON.
    pub metadata: Option<serde_json::Value>,
    pub performed_by_name: String,
    pub performed_by_identifier: String,
    pub user_id: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListAuditLogsResponse {
    /// Newest first.
    pub entries: Vec<AuditLogInfo>,
}
