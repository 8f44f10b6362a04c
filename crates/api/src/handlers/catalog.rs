// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only catalog and form lookups used by entry clients.

use plantlog_domain::{
    AssayField, BatchPlan, EntryDefaults, FormSchema, Hour, Plant, SAMPLE_DESCRIPTIONS,
    SampleType, batch_plan, format_date, parse_date,
};
use time::Date;

use super::invalid_field;
use crate::error::ApiError;
use crate::request_response::{
    BatchPlanQuery, BatchPlanResponse, BatchStepInfo, CatalogFieldInfo, CatalogResponse,
    EntryDefaultsInfo, FieldInfo, FormSchemaQuery, FormSchemaResponse, MetricInfo,
};

fn schema_response(schema: &FormSchema) -> FormSchemaResponse {
    let required: Vec<AssayField> = schema.required_fields();
    FormSchemaResponse {
        plant: schema.plant.to_string(),
        sample_type: schema.sample_type.to_string(),
        sample_description: schema.sample_description.clone(),
        locked: schema.is_locked(),
        fields: schema
            .visible_fields()
            .iter()
            .map(|field| FieldInfo {
                key: field.key().to_string(),
                label: field.label().to_string(),
                required: required.contains(field),
            })
            .collect(),
    }
}

/// Every fixed list a client needs, plus the defaults for a new entry made
/// on `today`.
#[must_use]
pub fn get_catalog(today: Date) -> CatalogResponse {
    let defaults: EntryDefaults = EntryDefaults::for_date(today);

    CatalogResponse {
        plants: Plant::ALL.iter().map(ToString::to_string).collect(),
        sample_types: SampleType::ALL.iter().map(ToString::to_string).collect(),
        hours: Hour::SHIFT_ORDER.iter().map(ToString::to_string).collect(),
        sample_descriptions: SAMPLE_DESCRIPTIONS.iter().map(ToString::to_string).collect(),
        fields: AssayField::ALL
            .iter()
            .map(|field| CatalogFieldInfo {
                key: field.key().to_string(),
                label: field.label().to_string(),
                screen: field.is_screen(),
            })
            .collect(),
        report_metrics: AssayField::REPORT_METRICS
            .iter()
            .map(|field| MetricInfo {
                key: field.key().to_string(),
                label: field.label().to_string(),
            })
            .collect(),
        defaults: EntryDefaultsInfo {
            date: format_date(defaults.date),
            hour: defaults.hour.to_string(),
            plant: defaults.plant.to_string(),
            sample_type: defaults.sample_type.to_string(),
            sample_description: defaults.sample_description.to_string(),
        },
    }
}

/// The visible and required fields for one selection.
///
/// # Errors
///
/// Returns an error if the plant or sample type is unknown.
pub fn get_form_schema(query: &FormSchemaQuery) -> Result<FormSchemaResponse, ApiError> {
    let plant: Plant = query.plant.parse().map_err(invalid_field("plant"))?;
    let sample_type: SampleType = query
        .sample_type
        .parse()
        .map_err(invalid_field("sample_type"))?;

    let schema: FormSchema =
        FormSchema::for_selection(plant, sample_type, query.sample_description.trim());
    Ok(schema_response(&schema))
}

/// The steps of a batch entry, one per catalog sample description.
///
/// # Errors
///
/// Returns an error if the date, hour, plant or sample type is malformed.
pub fn get_batch_plan(query: &BatchPlanQuery) -> Result<BatchPlanResponse, ApiError> {
    let date: Date = parse_date(&query.date).map_err(invalid_field("date"))?;
    let hour: Hour = query.hour.parse().map_err(invalid_field("hour"))?;
    let plant: Plant = query.plant.parse().map_err(invalid_field("plant"))?;
    let sample_type: SampleType = query
        .sample_type
        .as_deref()
        .map_or(Ok(SampleType::Normal), str::parse)
        .map_err(invalid_field("sample_type"))?;

    let plan: BatchPlan = batch_plan(date, hour, plant, sample_type);

    Ok(BatchPlanResponse {
        date: format_date(plan.date),
        hour: plan.hour.to_string(),
        plant: plan.plant.to_string(),
        steps: plan
            .steps
            .iter()
            .map(|step| BatchStepInfo {
                index: step.index,
                schema: schema_response(&step.schema),
            })
            .collect(),
    })
}
