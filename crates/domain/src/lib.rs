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
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod catalog;
mod downtime;
mod error;
mod form_schema;
mod lab;
mod shift;
mod timezone;

#[cfg(test)]
mod tests;

pub use catalog::{
    AssayField, EntryDefaults, Hour, MAGS_PRODUCT, Plant, SAMPLE_DESCRIPTIONS, SampleType,
    catalog_position, normalize_sample_description,
};
pub use downtime::{
    Downtime, DowntimeStatus, format_duration, format_timestamp, parse_timestamp,
    shift_day_of_timestamp,
};
pub use error::DomainError;
pub use form_schema::{
    BatchPlan, BatchStep, BatchSubmission, FormSchema, batch_plan, build_batch, build_inspection,
    is_valid_reading,
};
pub use lab::{AssayReadings, LabInspection, ZERO_READING, format_date, parse_date};
pub use shift::{
    DateRange, HourRow, ShiftDay, ShiftReport, ShiftSummary, build_shift_report, calendar_date_of,
    dedupe, default_week, format_mean, shift_day_of, shift_label, summarize_shift_days,
};
pub use timezone::{parse_timezone, today_in};
