// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono_tz::Tz;
use time::format_description::well_known::Rfc3339;
use time::{Date, Duration, OffsetDateTime};

use crate::catalog::Hour;
use crate::error::DomainError;
use crate::timezone::local_date_and_hour;

/// Whether a piece of equipment is running again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DowntimeStatus {
    Up,
    Down,
}

impl DowntimeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl std::fmt::Display for DowntimeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An equipment outage.
///
/// The entry is open (status `down`) until an end time is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downtime {
    pub start: OffsetDateTime,
    pub end: Option<OffsetDateTime>,
    pub plant_category: String,
    pub plant_section: String,
    pub discipline: String,
    pub plant_equipment: String,
    pub breakdown_description: String,
    pub notes: Option<String>,
}

impl Downtime {
    #[must_use]
    pub const fn status(&self) -> DowntimeStatus {
        if self.end.is_some() {
            DowntimeStatus::Up
        } else {
            DowntimeStatus::Down
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.end.is_some()
    }

    /// Time between start and end, `None` while the equipment is down.
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        self.end.map(|end| end - self.start)
    }

    /// The duration as `"{h}h {m}m"`, or `"N/A"` while down.
    #[must_use]
    pub fn duration_label(&self) -> String {
        self.duration()
            .map_or_else(|| String::from("N/A"), format_duration)
    }

    /// Checks the required fields and the time ordering.
    ///
    /// Text fields are trimmed in place; a blank note becomes `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is blank or the end precedes the
    /// start.
    pub fn validate(mut self) -> Result<Self, DomainError> {
        self.plant_category = required(self.plant_category, "plant_category")?;
        self.plant_section = required(self.plant_section, "plant_section")?;
        self.discipline = required(self.discipline, "discipline")?;
        self.plant_equipment = required(self.plant_equipment, "plant_equipment")?;
        self.breakdown_description = required(self.breakdown_description, "breakdown_description")?;
        self.notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        if let Some(end) = self.end {
            check_order(self.start, end)?;
        }
        Ok(self)
    }

    /// Records the end of the outage.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is already resolved or `end` precedes
    /// the start.
    pub fn resolve(&self, end: OffsetDateTime, notes: Option<String>) -> Result<Self, DomainError> {
        if self.is_resolved() {
            return Err(DomainError::AlreadyResolved);
        }
        check_order(self.start, end)?;

        let notes: Option<String> = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .or_else(|| self.notes.clone());

        Ok(Self {
            end: Some(end),
            notes,
            ..self.clone()
        })
    }

    /// The shift day the outage started in, in the plant timezone.
    #[must_use]
    pub fn shift_day(&self, tz: Tz) -> Date {
        shift_day_of_timestamp(self.start, tz)
    }
}

fn required(value: String, field: &'static str) -> Result<String, DomainError> {
    let trimmed: &str = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

fn check_order(start: OffsetDateTime, end: OffsetDateTime) -> Result<(), DomainError> {
    if end < start {
        return Err(DomainError::EndBeforeStart {
            start: format_timestamp(start)?,
            end: format_timestamp(end)?,
        });
    }
    Ok(())
}

/// Formats a duration as `"{h}h {m}m"`.
#[must_use]
pub fn format_duration(duration: Duration) -> String {
    let minutes: i64 = duration.whole_minutes();
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Parses an RFC 3339 timestamp.
///
/// # Errors
///
/// Returns an error if the value is not RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<OffsetDateTime, DomainError> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).map_err(|e| DomainError::InvalidTimestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Formats a timestamp as RFC 3339.
///
/// # Errors
///
/// Returns an error if the timestamp cannot be represented (years outside
/// 0..=9999).
pub fn format_timestamp(value: OffsetDateTime) -> Result<String, DomainError> {
    value
        .format(&Rfc3339)
        .map_err(|e| DomainError::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// The shift day a timestamp falls in, in the given timezone.
///
/// Times before 06:00 local belong to the previous day's shift.
#[must_use]
pub fn shift_day_of_timestamp(timestamp: OffsetDateTime, tz: Tz) -> Date {
    let (date, hour) = local_date_and_hour(timestamp, tz);
    if hour < Hour::SHIFT_START {
        date.previous_day().unwrap_or(date)
    } else {
        date
    }
}
