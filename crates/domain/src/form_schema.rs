// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Dynamic lab entry form.
//!
//! Which assay readings an operator must capture depends on the plant, the
//! sample type and (for one MP2 product) the sample description. The same
//! rules drive single-entry and batch entry.

use regex::Regex;
use std::sync::LazyLock;
use time::Date;

use crate::catalog::{AssayField, Hour, MAGS_PRODUCT, Plant, SAMPLE_DESCRIPTIONS, SampleType};
use crate::error::DomainError;
use crate::lab::{AssayReadings, LabInspection};

#[allow(clippy::expect_used)]
static READING_FORMAT: LazyLock<Regex> = LazyLock::new(|| {
    // Literal pattern; compilation cannot fail.
    Regex::new(r"^\d{1,2}(\.\d{1,2})?$").expect("reading pattern is valid")
});

/// Whether a value has the accepted reading format (`12`, `3.5`, `45.67`).
#[must_use]
pub fn is_valid_reading(value: &str) -> bool {
    READING_FORMAT.is_match(value)
}

/// The assay fields shown for one plant, sample type and description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    pub plant: Plant,
    pub sample_type: SampleType,
    pub sample_description: String,
    visible: Vec<AssayField>,
}

impl FormSchema {
    /// Resolves the form for a selection.
    #[must_use]
    pub fn for_selection(plant: Plant, sample_type: SampleType, sample_description: &str) -> Self {
        let visible: Vec<AssayField> = AssayField::ALL
            .into_iter()
            .filter(|field| is_visible(*field, plant, sample_type, sample_description))
            .collect();

        Self {
            plant,
            sample_type,
            sample_description: sample_description.to_string(),
            visible,
        }
    }

    /// Visible fields in catalog order.
    #[must_use]
    pub fn visible_fields(&self) -> &[AssayField] {
        &self.visible
    }

    #[must_use]
    pub fn is_visible(&self, field: AssayField) -> bool {
        self.visible.contains(&field)
    }

    /// Whether numeric input is disabled (no sample was taken).
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.sample_type == SampleType::NoSample
    }

    /// Fields the operator must fill in. Empty when the form is locked.
    #[must_use]
    pub fn required_fields(&self) -> Vec<AssayField> {
        if self.is_locked() {
            Vec::new()
        } else {
            self.visible.clone()
        }
    }

    /// Applies the form rules to submitted readings.
    ///
    /// Locked forms store zero for every field. Otherwise every visible field
    /// must be present and well-formed, and hidden fields are stored as zero.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first missing or malformed visible field.
    pub fn normalize(&self, submitted: &AssayReadings) -> Result<AssayReadings, DomainError> {
        if self.is_locked() {
            return Ok(AssayReadings::zeroed());
        }

        let mut normalized: AssayReadings = AssayReadings::zeroed();
        for field in &self.visible {
            let value: &str = submitted
                .raw(*field)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or(DomainError::MissingReading { field: field.key() })?;

            if !is_valid_reading(value) {
                return Err(DomainError::InvalidReading {
                    field: field.key(),
                    value: value.to_string(),
                });
            }
            normalized.set(*field, value);
        }

        Ok(normalized)
    }
}

fn is_visible(field: AssayField, plant: Plant, sample_type: SampleType, description: &str) -> bool {
    let special: bool = sample_type == SampleType::Special;
    match field {
        AssayField::FePerc
        | AssayField::SioPerc
        | AssayField::TioPerc
        | AssayField::MgoPerc
        | AssayField::CaoPerc
        | AssayField::Moisture => true,
        AssayField::Al2o3Perc => plant == Plant::Lio,
        AssayField::PPerc => matches!(plant, Plant::Saob | Plant::Lio) || (plant == Plant::Mp2 && special),
        AssayField::AaFePerc => plant == Plant::Mp2 && description == MAGS_PRODUCT,
        AssayField::P2o5Perc | AssayField::CuPerc => plant == Plant::Mp2,
        AssayField::SPerc => plant == Plant::Mp2 && special,
        AssayField::Screen425
        | AssayField::Screen212
        | AssayField::Screen150
        | AssayField::Screen106
        | AssayField::Screen75
        | AssayField::Screen53
        | AssayField::Screen45
        | AssayField::Screen38
        | AssayField::Pan => special,
    }
}

/// Builds a validated lab inspection from a form submission.
///
/// # Errors
///
/// Returns an error if the description is blank or the readings do not
/// satisfy the form for this selection.
pub fn build_inspection(
    date: Date,
    hour: Hour,
    plant: Plant,
    sample_type: SampleType,
    sample_description: &str,
    submitted: &AssayReadings,
) -> Result<LabInspection, DomainError> {
    let description: String = crate::catalog::normalize_sample_description(sample_description)?;
    let schema: FormSchema = FormSchema::for_selection(plant, sample_type, &description);
    let readings: AssayReadings = schema.normalize(submitted)?;

    Ok(LabInspection::new(
        date,
        hour,
        plant,
        sample_type,
        description,
        readings,
    ))
}

/// One step of a batch entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchStep {
    /// Zero-based step index.
    pub index: usize,
    pub schema: FormSchema,
}

/// A batch entry walk: one step per catalog sample description.
///
/// Date, hour and plant are fixed for the whole batch; sample type may be
/// changed per step by resolving that step's schema again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPlan {
    pub date: Date,
    pub hour: Hour,
    pub plant: Plant,
    pub steps: Vec<BatchStep>,
}

/// Plans a batch entry starting every step at `sample_type`.
#[must_use]
pub fn batch_plan(date: Date, hour: Hour, plant: Plant, sample_type: SampleType) -> BatchPlan {
    let steps: Vec<BatchStep> = SAMPLE_DESCRIPTIONS
        .iter()
        .enumerate()
        .map(|(index, description)| BatchStep {
            index,
            schema: FormSchema::for_selection(plant, sample_type, description),
        })
        .collect();

    BatchPlan {
        date,
        hour,
        plant,
        steps,
    }
}

/// A single step's submission within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSubmission {
    pub sample_type: SampleType,
    pub sample_description: String,
    pub readings: AssayReadings,
}

/// Validates a whole batch for one date, hour and plant.
///
/// # Errors
///
/// Returns `EmptyBatch` for an empty submission, otherwise the first failing
/// step wrapped in `BatchStepFailed`.
pub fn build_batch(
    date: Date,
    hour: Hour,
    plant: Plant,
    steps: &[BatchSubmission],
) -> Result<Vec<LabInspection>, DomainError> {
    if steps.is_empty() {
        return Err(DomainError::EmptyBatch);
    }

    steps
        .iter()
        .enumerate()
        .map(|(step, submission)| {
            build_inspection(
                date,
                hour,
                plant,
                submission.sample_type,
                &submission.sample_description,
                &submission.readings,
            )
            .map_err(|source| DomainError::BatchStepFailed {
                step,
                source: Box::new(source),
            })
        })
        .collect()
}
