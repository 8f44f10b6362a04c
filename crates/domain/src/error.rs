// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Plant is not one of the known plants.
    InvalidPlant(String),
    /// Sample type is not one of the known sample types.
    InvalidSampleType(String),
    /// Hour is not one of the two-hourly `HHh00` slots.
    InvalidHour(String),
    /// A calendar date could not be parsed.
    InvalidDate {
        /// The rejected input.
        value: String,
        /// The parser message.
        reason: String,
    },
    /// A timestamp could not be parsed or formatted.
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// The parser message.
        reason: String,
    },
    /// Sample description is empty.
    InvalidSampleDescription(String),
    /// An assay field name is not recognized.
    UnknownField(String),
    /// A required assay reading is missing.
    MissingReading {
        /// The assay field key.
        field: &'static str,
    },
    /// An assay reading does not match the value format.
    InvalidReading {
        /// The assay field key.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A required text field is missing or blank.
    MissingField {
        /// The field name.
        field: &'static str,
    },
    /// A downtime end precedes its start.
    EndBeforeStart {
        /// The start timestamp (RFC 3339).
        start: String,
        /// The end timestamp (RFC 3339).
        end: String,
    },
    /// The downtime entry is already resolved.
    AlreadyResolved,
    /// A batch contains no entries.
    EmptyBatch,
    /// One step of a batch failed validation.
    BatchStepFailed {
        /// Zero-based index of the failing step.
        step: usize,
        /// The underlying error.
        source: Box<DomainError>,
    },
    /// Timezone name is not a valid IANA timezone.
    InvalidTimezone(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPlant(value) => {
                write!(f, "Invalid plant '{value}'. Must be one of MP2, SAOB, LIO")
            }
            Self::InvalidSampleType(value) => write!(f, "Invalid sample type '{value}'"),
            Self::InvalidHour(value) => {
                write!(f, "Invalid hour '{value}'. Expected a two-hourly slot like 06h00")
            }
            Self::InvalidDate { value, reason } => {
                write!(f, "Failed to parse date '{value}': {reason}")
            }
            Self::InvalidTimestamp { value, reason } => {
                write!(f, "Failed to parse timestamp '{value}': {reason}")
            }
            Self::InvalidSampleDescription(msg) => write!(f, "Invalid sample description: {msg}"),
            Self::UnknownField(field) => write!(f, "Unknown assay field '{field}'"),
            Self::MissingReading { field } => write!(f, "Reading '{field}' is required"),
            Self::InvalidReading { field, value } => {
                write!(
                    f,
                    "Reading '{field}' has invalid value '{value}'. Expected up to 2 digits with up to 2 decimals"
                )
            }
            Self::MissingField { field } => write!(f, "Field '{field}' is required"),
            Self::EndBeforeStart { start, end } => {
                write!(f, "End time {end} is before start time {start}")
            }
            Self::AlreadyResolved => write!(f, "Downtime entry is already resolved"),
            Self::EmptyBatch => write!(f, "Batch must contain at least one entry"),
            Self::BatchStepFailed { step, source } => {
                write!(f, "Batch step {} failed: {source}", step + 1)
            }
            Self::InvalidTimezone(name) => write!(f, "Invalid timezone '{name}'"),
        }
    }
}

impl std::error::Error for DomainError {}
