// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shift-day grouping of lab readings.
//!
//! A shift day runs from 06h00 to 06h00. Readings taken at 00h00, 02h00 and
//! 04h00 are reported under the previous calendar date.

use num_traits::ToPrimitive;
use std::collections::{BTreeMap, HashSet};
use time::{Date, Duration};

use crate::catalog::{AssayField, Hour, catalog_position};
use crate::lab::LabInspection;

/// The shift day a reading belongs to.
#[must_use]
pub fn shift_day_of(date: Date, hour: Hour) -> Date {
    if hour.rolls_back() {
        date.previous_day().unwrap_or(date)
    } else {
        date
    }
}

/// The calendar date of a slot within a shift day.
#[must_use]
pub fn calendar_date_of(shift_day: Date, hour: Hour) -> Date {
    if hour.rolls_back() {
        shift_day.next_day().unwrap_or(shift_day)
    } else {
        shift_day
    }
}

/// Keeps the first reading for each (date, hour, sample description).
#[must_use]
pub fn dedupe(entries: &[LabInspection]) -> Vec<&LabInspection> {
    let mut seen: HashSet<(Date, Hour, &str)> = HashSet::new();
    entries
        .iter()
        .filter(|entry| seen.insert((*entry).identity()))
        .collect()
}

/// An inclusive calendar date range. Missing bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

}

/// The Sunday-to-Saturday week containing `today`.
#[must_use]
pub fn default_week(today: Date) -> DateRange {
    let offset: i64 = i64::from(today.weekday().number_days_from_sunday());
    let start: Date = today.saturating_sub(Duration::days(offset));
    let end: Date = start.saturating_add(Duration::days(6));
    DateRange::new(Some(start), Some(end))
}

/// One sampling slot within a shift day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HourRow {
    pub hour: Hour,
    /// Calendar date the slot falls on.
    pub date: Date,
    /// Per report description: the metric values of the matching reading,
    /// in [`AssayField::REPORT_METRICS`] order.
    pub cells: Vec<Option<Vec<String>>>,
}

/// One shift day of the grouped report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftDay {
    pub shift_day: Date,
    /// Twelve rows in shift order.
    pub rows: Vec<HourRow>,
    /// Per report description: the averaged metric values.
    pub averages: Vec<Vec<String>>,
}

/// Lab readings grouped into shift days, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftReport {
    /// Column groups: catalog descriptions first, others in first-seen order.
    pub descriptions: Vec<String>,
    pub days: Vec<ShiftDay>,
}

impl ShiftReport {
    #[must_use]
    pub const fn metrics() -> &'static [AssayField] {
        &AssayField::REPORT_METRICS
    }
}

/// Builds the grouped shift report.
///
/// Readings are deduplicated before the range is applied; the range is
/// matched against each reading's calendar date.
#[must_use]
pub fn build_shift_report(entries: &[LabInspection], range: &DateRange) -> ShiftReport {
    let kept: Vec<&LabInspection> = dedupe(entries)
        .into_iter()
        .filter(|entry| range.contains(entry.date))
        .collect();

    let descriptions: Vec<String> = report_descriptions(&kept);

    let mut by_day: BTreeMap<Date, Vec<&LabInspection>> = BTreeMap::new();
    for &entry in &kept {
        by_day
            .entry(shift_day_of(entry.date, entry.hour))
            .or_default()
            .push(entry);
    }

    let days: Vec<ShiftDay> = by_day
        .into_iter()
        .rev()
        .map(|(shift_day, day_entries)| build_shift_day(shift_day, &day_entries, &descriptions))
        .collect();

    ShiftReport { descriptions, days }
}

fn report_descriptions(entries: &[&LabInspection]) -> Vec<String> {
    let mut known: Vec<(usize, &str)> = Vec::new();
    let mut unknown: Vec<&str> = Vec::new();

    for entry in entries {
        let description: &str = entry.sample_description.as_str();
        match catalog_position(description) {
            Some(position) => {
                if !known.iter().any(|(_, d)| *d == description) {
                    known.push((position, description));
                }
            }
            None => {
                if !unknown.contains(&description) {
                    unknown.push(description);
                }
            }
        }
    }

    known.sort_by_key(|(position, _)| *position);
    known
        .into_iter()
        .map(|(_, d)| d)
        .chain(unknown)
        .map(str::to_string)
        .collect()
}

fn build_shift_day(shift_day: Date, entries: &[&LabInspection], descriptions: &[String]) -> ShiftDay {
    let rows: Vec<HourRow> = Hour::SHIFT_ORDER
        .into_iter()
        .map(|hour| {
            let date: Date = calendar_date_of(shift_day, hour);
            let cells: Vec<Option<Vec<String>>> = descriptions
                .iter()
                .map(|description| {
                    entries
                        .iter()
                        .find(|e| e.hour == hour && e.date == date && e.sample_description == *description)
                        .map(|e| {
                            AssayField::REPORT_METRICS
                                .iter()
                                .map(|field| e.readings.get(*field).to_string())
                                .collect()
                        })
                })
                .collect();
            HourRow { hour, date, cells }
        })
        .collect();

    let averages: Vec<Vec<String>> = descriptions
        .iter()
        .map(|description| {
            AssayField::REPORT_METRICS
                .iter()
                .map(|field| {
                    let values: Vec<f64> = entries
                        .iter()
                        .filter(|e| e.sample_description == *description)
                        .filter_map(|e| e.readings.numeric(*field))
                        .collect();
                    format_mean(&values)
                })
                .collect()
        })
        .collect();

    ShiftDay {
        shift_day,
        rows,
        averages,
    }
}

/// Absorbs float error so that a mean like `1.125` stays a tie at cents.
const ROUNDING_NUDGE: f64 = 1e-9;

/// The mean of `values` with two decimals, or `""` when there are none.
///
/// Ties round half away from zero (`1.125` is `1.13`).
#[must_use]
pub fn format_mean(values: &[f64]) -> String {
    let Some(count) = values.len().to_f64().filter(|c| *c > 0.0) else {
        return String::new();
    };
    let sum: f64 = values.iter().sum();
    let cents: f64 = sum / count * 100.0;
    let rounded: f64 = (cents + cents.signum() * ROUNDING_NUDGE).round() / 100.0;
    format!("{rounded:.2}")
}

/// Formats a shift day as `d MMMM yyyy`, e.g. `5 March 2026`.
#[must_use]
pub fn shift_label(shift_day: Date) -> String {
    format!("{} {} {}", shift_day.day(), shift_day.month(), shift_day.year())
}

/// Readings of one shift day with per-field averages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSummary {
    pub shift_day: Date,
    pub label: String,
    pub entries: Vec<LabInspection>,
    /// Every assay field with its average; zero readings are ignored.
    pub averages: Vec<(AssayField, String)>,
}

/// Groups readings by shift day (newest first) and averages every field.
///
/// Empty, non-numeric and zero values do not count towards an average.
#[must_use]
pub fn summarize_shift_days(entries: &[LabInspection]) -> Vec<ShiftSummary> {
    let mut by_day: BTreeMap<Date, Vec<LabInspection>> = BTreeMap::new();
    for entry in entries {
        by_day
            .entry(shift_day_of(entry.date, entry.hour))
            .or_default()
            .push(entry.clone());
    }

    by_day
        .into_iter()
        .rev()
        .map(|(shift_day, day_entries)| {
            let averages: Vec<(AssayField, String)> = AssayField::ALL
                .into_iter()
                .map(|field| {
                    let values: Vec<f64> = day_entries
                        .iter()
                        .filter_map(|e| e.readings.numeric(field))
                        .filter(|v| v.abs() > 0.0)
                        .collect();
                    (field, format_mean(&values))
                })
                .collect();

            ShiftSummary {
                shift_day,
                label: shift_label(shift_day),
                entries: day_entries,
                averages,
            }
        })
        .collect()
}
