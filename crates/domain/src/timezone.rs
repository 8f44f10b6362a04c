// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;
use time::{Date, Month, OffsetDateTime};

use crate::error::DomainError;

/// Parses an IANA timezone name such as `Africa/Johannesburg`.
///
/// # Errors
///
/// Returns an error if the name is not in the timezone database.
pub fn parse_timezone(name: &str) -> Result<Tz, DomainError> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| DomainError::InvalidTimezone(name.to_string()))
}

/// Today's date in the given timezone.
#[must_use]
pub fn today_in(tz: Tz) -> Date {
    let local: NaiveDate = Utc::now().with_timezone(&tz).date_naive();
    naive_to_date(local).unwrap_or_else(|| OffsetDateTime::now_utc().date())
}

/// The local calendar date and clock hour of a timestamp.
pub(crate) fn local_date_and_hour(timestamp: OffsetDateTime, tz: Tz) -> (Date, u8) {
    let utc: Option<DateTime<Utc>> =
        DateTime::from_timestamp(timestamp.unix_timestamp(), timestamp.nanosecond());

    utc.map(|dt| dt.with_timezone(&tz))
        .and_then(|local| {
            let date: Date = naive_to_date(local.date_naive())?;
            let hour: u8 = u8::try_from(local.hour()).ok()?;
            Some((date, hour))
        })
        .unwrap_or_else(|| (timestamp.date(), timestamp.hour()))
}

fn naive_to_date(naive: NaiveDate) -> Option<Date> {
    let month: Month = u8::try_from(naive.month())
        .ok()
        .and_then(|m| Month::try_from(m).ok())?;
    let day: u8 = u8::try_from(naive.day()).ok()?;
    Date::from_calendar_date(naive.year(), month, day).ok()
}
