// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use plantlog_domain::{
    AssayField, AssayReadings, Downtime, Hour, LabInspection, Plant, SampleType, format_date,
    format_timestamp, parse_date, parse_timestamp,
};
use serde::{Deserialize, Serialize};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::diesel_schema::{deleted_downtime, deleted_lab_inspections, downtime, lab_inspections};
use crate::error::PersistenceError;

/// Stored role string for administrators.
pub const ROLE_ADMIN: &str = "admin";
/// Stored role string for regular members.
pub const ROLE_MEMBER: &str = "user";

const DB_TIMESTAMP: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:6]Z");

/// Formats a UTC instant the way every `*_at` column stores it.
///
/// The fixed width keeps text comparison in step with time order on both
/// backends.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn format_db_timestamp(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .to_offset(time::UtcOffset::UTC)
        .format(DB_TIMESTAMP)
        .map_err(|e| PersistenceError::Other(format!("Failed to format timestamp: {e}")))
}

/// The current time as a stored timestamp.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn now_timestamp() -> Result<String, PersistenceError> {
    format_db_timestamp(OffsetDateTime::now_utc())
}

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    /// `admin` or `user`.
    pub role: String,
    pub banned: bool,
    pub ban_reason: Option<String>,
    pub created_at: String,
    pub last_login_at: Option<String>,
}

impl UserData {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// A login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub user_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// A stored downtime entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DowntimeRecord {
    pub downtime_id: i64,
    pub downtime: Downtime,
    /// The member who logged it; `None` once that user is deleted.
    pub user_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// A stored lab result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabInspectionRecord {
    pub lab_inspection_id: i64,
    pub inspection: LabInspection,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// A row of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogRecord {
    pub audit_log_id: i64,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub description: String,
    /// JSON text, see `AuditEvent::metadata`.
    pub metadata: Option<String>,
    pub performed_by_name: String,
    pub performed_by_identifier: String,
    pub user_id: Option<i64>,
    pub created_at: String,
}

/// Filters for listing lab results.
///
/// Every condition is optional; an empty `hours` list matches any hour.
/// Date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabFilter {
    pub start_date: Option<Date>,
    pub end_date: Option<Date>,
    pub plant: Option<Plant>,
    pub hours: Vec<Hour>,
}

impl LabFilter {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.plant.is_none()
            && self.hours.is_empty()
    }
}

/// Values written to `downtime`.
///
/// Like [`LabValues`], ownership and creation fields are only set on insert.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = downtime)]
#[diesel(treat_none_as_null = false)]
pub(crate) struct DowntimeValues {
    pub start_date: String,
    #[diesel(treat_none_as_null = true)]
    pub end_date: Option<String>,
    pub plant_category: String,
    pub plant_section: String,
    pub discipline: String,
    pub plant_equipment: String,
    pub breakdown_description: String,
    #[diesel(treat_none_as_null = true)]
    pub notes: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: String,
}

impl DowntimeValues {
    pub(crate) fn from_domain(
        downtime: &Downtime,
        updated_at: String,
    ) -> Result<Self, PersistenceError> {
        let end_date: Option<String> = downtime
            .end
            .map(format_timestamp)
            .transpose()
            .map_err(|e| PersistenceError::Other(e.to_string()))?;

        Ok(Self {
            start_date: format_timestamp(downtime.start)
                .map_err(|e| PersistenceError::Other(e.to_string()))?,
            end_date,
            plant_category: downtime.plant_category.clone(),
            plant_section: downtime.plant_section.clone(),
            discipline: downtime.discipline.clone(),
            plant_equipment: downtime.plant_equipment.clone(),
            breakdown_description: downtime.breakdown_description.clone(),
            notes: downtime.notes.clone(),
            user_id: None,
            created_at: None,
            updated_at,
        })
    }

    pub(crate) fn created_by(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self.created_at = Some(self.updated_at.clone());
        self
    }
}

/// A full `downtime` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = downtime)]
pub(crate) struct DowntimeRow {
    pub downtime_id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub plant_category: String,
    pub plant_section: String,
    pub discipline: String,
    pub plant_equipment: String,
    pub breakdown_description: String,
    pub notes: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl DowntimeRow {
    pub(crate) fn into_record(self) -> Result<DowntimeRecord, PersistenceError> {
        let downtime_id: i64 = self.downtime_id;
        let corrupt = |reason: String| PersistenceError::CorruptRow {
            table: "downtime",
            id: downtime_id,
            reason,
        };
        let start: OffsetDateTime =
            parse_timestamp(&self.start_date).map_err(|e| corrupt(e.to_string()))?;
        let end: Option<OffsetDateTime> = self
            .end_date
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(DowntimeRecord {
            downtime_id,
            downtime: Downtime {
                start,
                end,
                plant_category: self.plant_category,
                plant_section: self.plant_section,
                discipline: self.discipline,
                plant_equipment: self.plant_equipment,
                breakdown_description: self.breakdown_description,
                notes: self.notes,
            },
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// An archived downtime entry.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deleted_downtime)]
pub(crate) struct NewDeletedDowntime {
    pub downtime_id: i64,
    pub start_date: String,
    pub end_date: Option<String>,
    pub plant_category: String,
    pub plant_section: String,
    pub discipline: String,
    pub plant_equipment: String,
    pub breakdown_description: String,
    pub notes: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub deleted_by: Option<i64>,
    pub deleted_at: String,
}

impl NewDeletedDowntime {
    pub(crate) fn from_row(row: DowntimeRow, deleted_by: i64, deleted_at: String) -> Self {
        Self {
            downtime_id: row.downtime_id,
            start_date: row.start_date,
            end_date: row.end_date,
            plant_category: row.plant_category,
            plant_section: row.plant_section,
            discipline: row.discipline,
            plant_equipment: row.plant_equipment,
            breakdown_description: row.breakdown_description,
            notes: row.notes,
            user_id: row.user_id,
            created_at: row.created_at,
            deleted_by: Some(deleted_by),
            deleted_at,
        }
    }
}

/// A full `lab_inspections` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lab_inspections)]
pub(crate) struct LabRow {
    pub lab_inspection_id: i64,
    pub date: String,
    pub hour: String,
    pub plant: String,
    pub sample_type: String,
    pub sample_description: String,
    pub fe_perc: String,
    pub sio_perc: String,
    pub al2o3_perc: String,
    pub p_perc: String,
    pub tio_perc: String,
    pub mgo_perc: String,
    pub cao_perc: String,
    pub p2o5_perc: String,
    pub cu_perc: String,
    pub s_perc: String,
    pub aa_fe_perc: String,
    pub moisture: String,
    pub screen425: String,
    pub screen212: String,
    pub screen150: String,
    pub screen106: String,
    pub screen75: String,
    pub screen53: String,
    pub screen45: String,
    pub screen38: String,
    pub pan: String,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl LabRow {
    fn readings(&self) -> Result<AssayReadings, PersistenceError> {
        AssayReadings::from_pairs([
            ("fe_perc", self.fe_perc.as_str()),
            ("sio_perc", self.sio_perc.as_str()),
            ("al2o3_perc", self.al2o3_perc.as_str()),
            ("p_perc", self.p_perc.as_str()),
            ("tio_perc", self.tio_perc.as_str()),
            ("mgo_perc", self.mgo_perc.as_str()),
            ("cao_perc", self.cao_perc.as_str()),
            ("p2o5_perc", self.p2o5_perc.as_str()),
            ("cu_perc", self.cu_perc.as_str()),
            ("s_perc", self.s_perc.as_str()),
            ("aa_fe_perc", self.aa_fe_perc.as_str()),
            ("moisture", self.moisture.as_str()),
            ("screen425", self.screen425.as_str()),
            ("screen212", self.screen212.as_str()),
            ("screen150", self.screen150.as_str()),
            ("screen106", self.screen106.as_str()),
            ("screen75", self.screen75.as_str()),
            ("screen53", self.screen53.as_str()),
            ("screen45", self.screen45.as_str()),
            ("screen38", self.screen38.as_str()),
            ("pan", self.pan.as_str()),
        ])
        .map_err(|e| self.corrupt(e.to_string()))
    }

    fn corrupt(&self, reason: String) -> PersistenceError {
        PersistenceError::CorruptRow {
            table: "lab_inspections",
            id: self.lab_inspection_id,
            reason,
        }
    }

    pub(crate) fn into_record(self) -> Result<LabInspectionRecord, PersistenceError> {
        let date: Date = parse_date(&self.date).map_err(|e| self.corrupt(e.to_string()))?;
        let hour: Hour = self
            .hour
            .parse::<Hour>()
            .map_err(|e| self.corrupt(e.to_string()))?;
        let plant: Plant = self
            .plant
            .parse::<Plant>()
            .map_err(|e| self.corrupt(e.to_string()))?;
        let sample_type: SampleType = self
            .sample_type
            .parse::<SampleType>()
            .map_err(|e| self.corrupt(e.to_string()))?;
        let readings: AssayReadings = self.readings()?;

        Ok(LabInspectionRecord {
            lab_inspection_id: self.lab_inspection_id,
            inspection: LabInspection::new(
                date,
                hour,
                plant,
                sample_type,
                self.sample_description,
                readings,
            ),
            user_id: self.user_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Values written to `lab_inspections`.
///
/// `None` ownership and creation fields are skipped on update, so the same
/// struct serves inserts and edits.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = lab_inspections)]
#[diesel(treat_none_as_null = false)]
pub(crate) struct LabValues {
    pub date: String,
    pub hour: String,
    pub plant: String,
    pub sample_type: String,
    pub sample_description: String,
    pub fe_perc: String,
    pub sio_perc: String,
    pub al2o3_perc: String,
    pub p_perc: String,
    pub tio_perc: String,
    pub mgo_perc: String,
    pub cao_perc: String,
    pub p2o5_perc: String,
    pub cu_perc: String,
    pub s_perc: String,
    pub aa_fe_perc: String,
    pub moisture: String,
    pub screen425: String,
    pub screen212: String,
    pub screen150: String,
    pub screen106: String,
    pub screen75: String,
    pub screen53: String,
    pub screen45: String,
    pub screen38: String,
    pub pan: String,
    pub user_id: Option<i64>,
    pub created_at: Option<String>,
    pub updated_at: String,
}

impl LabValues {
    pub(crate) fn from_domain(inspection: &LabInspection, updated_at: String) -> Self {
        let reading = |field: AssayField| inspection.readings.get(field).to_string();
        Self {
            date: format_date(inspection.date),
            hour: inspection.hour.to_string(),
            plant: inspection.plant.as_str().to_string(),
            sample_type: inspection.sample_type.as_str().to_string(),
            sample_description: inspection.sample_description.clone(),
            fe_perc: reading(AssayField::FePerc),
            sio_perc: reading(AssayField::SioPerc),
            al2o3_perc: reading(AssayField::Al2o3Perc),
            p_perc: reading(AssayField::PPerc),
            tio_perc: reading(AssayField::TioPerc),
            mgo_perc: reading(AssayField::MgoPerc),
            cao_perc: reading(AssayField::CaoPerc),
            p2o5_perc: reading(AssayField::P2o5Perc),
            cu_perc: reading(AssayField::CuPerc),
            s_perc: reading(AssayField::SPerc),
            aa_fe_perc: reading(AssayField::AaFePerc),
            moisture: reading(AssayField::Moisture),
            screen425: reading(AssayField::Screen425),
            screen212: reading(AssayField::Screen212),
            screen150: reading(AssayField::Screen150),
            screen106: reading(AssayField::Screen106),
            screen75: reading(AssayField::Screen75),
            screen53: reading(AssayField::Screen53),
            screen45: reading(AssayField::Screen45),
            screen38: reading(AssayField::Screen38),
            pan: reading(AssayField::Pan),
            user_id: None,
            created_at: None,
            updated_at,
        }
    }

    /// Marks the values as a new row owned by `user_id`.
    pub(crate) fn created_by(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self.created_at = Some(self.updated_at.clone());
        self
    }
}

/// An archived lab result.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deleted_lab_inspections)]
pub(crate) struct NewDeletedLabInspection {
    pub lab_inspection_id: i64,
    pub date: String,
    pub hour: String,
    pub plant: String,
    pub sample_type: String,
    pub sample_description: String,
    pub fe_perc: String,
    pub sio_perc: String,
    pub al2o3_perc: String,
    pub p_perc: String,
    pub tio_perc: String,
    pub mgo_perc: String,
    pub cao_perc: String,
    pub p2o5_perc: String,
    pub cu_perc: String,
    pub s_perc: String,
    pub aa_fe_perc: String,
    pub moisture: String,
    pub screen425: String,
    pub screen212: String,
    pub screen150: String,
    pub screen106: String,
    pub screen75: String,
    pub screen53: String,
    pub screen45: String,
    pub screen38: String,
    pub pan: String,
    pub user_id: Option<i64>,
    pub created_at: String,
    pub deleted_by: Option<i64>,
    pub deleted_at: String,
}

impl NewDeletedLabInspection {
    /// Copies a live row into its archive form.
    pub(crate) fn from_row(row: LabRow, deleted_by: i64, deleted_at: String) -> Self {
        Self {
            lab_inspection_id: row.lab_inspection_id,
            date: row.date,
            hour: row.hour,
            plant: row.plant,
            sample_type: row.sample_type,
            sample_description: row.sample_description,
            fe_perc: row.fe_perc,
            sio_perc: row.sio_perc,
            al2o3_perc: row.al2o3_perc,
            p_perc: row.p_perc,
            tio_perc: row.tio_perc,
            mgo_perc: row.mgo_perc,
            cao_perc: row.cao_perc,
            p2o5_perc: row.p2o5_perc,
            cu_perc: row.cu_perc,
            s_perc: row.s_perc,
            aa_fe_perc: row.aa_fe_perc,
            moisture: row.moisture,
            screen425: row.screen425,
            screen212: row.screen212,
            screen150: row.screen150,
            screen106: row.screen106,
            screen75: row.screen75,
            screen53: row.screen53,
            screen45: row.screen45,
            screen38: row.screen38,
            pan: row.pan,
            user_id: row.user_id,
            created_at: row.created_at,
            deleted_by: Some(deleted_by),
            deleted_at,
        }
    }
}
