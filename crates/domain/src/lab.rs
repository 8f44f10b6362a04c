// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;
use time::Date;
use time::macros::format_description;

use crate::catalog::{AssayField, Hour, Plant, SampleType};
use crate::error::DomainError;

/// The stored value for a reading that was not captured.
pub const ZERO_READING: &str = "0";

/// Parses a `YYYY-MM-DD` calendar date.
///
/// # Errors
///
/// Returns an error if the string is not a valid calendar date.
pub fn parse_date(value: &str) -> Result<Date, DomainError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        DomainError::InvalidDate {
            value: value.to_string(),
            reason: e.to_string(),
        }
    })
}

/// Formats a calendar date as `YYYY-MM-DD`.
#[must_use]
pub fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Assay readings keyed by field, kept as entered.
///
/// Readings are stored as strings and only interpreted as numbers when
/// averaged. A field with no entry reads as `"0"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssayReadings {
    values: BTreeMap<AssayField, String>,
}

impl AssayReadings {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Readings with every field set to `"0"`.
    #[must_use]
    pub fn zeroed() -> Self {
        let mut readings: Self = Self::new();
        for field in AssayField::ALL {
            readings.set(field, ZERO_READING);
        }
        readings
    }

    pub fn set(&mut self, field: AssayField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    /// Builder-style variant of [`AssayReadings::set`].
    #[must_use]
    pub fn with(mut self, field: AssayField, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    /// The raw value entered for a field, if any.
    #[must_use]
    pub fn raw(&self, field: AssayField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// The stored value for a field, `"0"` when absent.
    #[must_use]
    pub fn get(&self, field: AssayField) -> &str {
        self.raw(field).unwrap_or(ZERO_READING)
    }

    /// The reading as a number, if it is non-empty and finite.
    #[must_use]
    pub fn numeric(&self, field: AssayField) -> Option<f64> {
        let raw: &str = self.raw(field)?.trim();
        if raw.is_empty() {
            return None;
        }
        raw.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssayField, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }

    /// Builds readings from `(key, value)` pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if a key does not name an assay field.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut readings: Self = Self::new();
        for (key, value) in pairs {
            let field: AssayField = key.parse()?;
            readings.set(field, value);
        }
        Ok(readings)
    }
}

/// A lab inspection result for one sample at one sampling hour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabInspection {
    pub date: Date,
    pub hour: Hour,
    pub plant: Plant,
    pub sample_type: SampleType,
    pub sample_description: String,
    pub readings: AssayReadings,
}

impl LabInspection {
    #[must_use]
    pub const fn new(
        date: Date,
        hour: Hour,
        plant: Plant,
        sample_type: SampleType,
        sample_description: String,
        readings: AssayReadings,
    ) -> Self {
        Self {
            date,
            hour,
            plant,
            sample_type,
            sample_description,
            readings,
        }
    }

    /// The deduplication key: calendar date, hour and sample description.
    #[must_use]
    pub fn identity(&self) -> (Date, Hour, &str) {
        (self.date, self.hour, self.sample_description.as_str())
    }
}
