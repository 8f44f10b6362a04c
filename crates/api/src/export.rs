// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Spreadsheet export of downtime entries, lab results and the shift report.
//!
//! Each export is first laid out as a [`Sheet`] of text cells, then rendered
//! as XLSX or CSV. Cells that read as finite numbers are written to XLSX as
//! numbers.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use plantlog_domain::{AssayField, ShiftReport, format_date, shift_label};
use plantlog_persistence::{DowntimeRecord, LabInspectionRecord};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use time::OffsetDateTime;

/// Output format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            Self::Csv => "text/csv; charset=utf-8",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors raised while rendering an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportError {
    /// The requested format is neither `xlsx` nor `csv`.
    UnknownFormat(String),
    Xlsx(String),
    Csv(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFormat(value) => {
                write!(f, "Unknown export format '{value}'. Must be xlsx or csv")
            }
            Self::Xlsx(msg) => write!(f, "Failed to write XLSX: {msg}"),
            Self::Csv(msg) => write!(f, "Failed to write CSV: {msg}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<XlsxError> for ExportError {
    fn from(err: XlsxError) -> Self {
        Self::Xlsx(err.to_string())
    }
}

impl From<csv::Error> for ExportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err.to_string())
    }
}

/// A rendered export ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// A single worksheet of text cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    fn new(name: &str, headers: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            headers,
            rows: Vec::new(),
        }
    }
}

/// Renders a sheet in the requested format.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn render(sheet: &Sheet, format: ExportFormat, file_stem: &str) -> Result<ExportFile, ExportError> {
    let bytes: Vec<u8> = match format {
        ExportFormat::Xlsx => to_xlsx(sheet)?,
        ExportFormat::Csv => to_csv(sheet)?,
    };

    Ok(ExportFile {
        file_name: format!("{file_stem}.{}", format.extension()),
        content_type: format.content_type(),
        bytes,
    })
}

/// Writes the sheet as CSV with a header row.
///
/// # Errors
///
/// Returns an error if a record cannot be written.
pub fn to_csv(sheet: &Sheet) -> Result<Vec<u8>, ExportError> {
    let mut writer: csv::Writer<Vec<u8>> = csv::Writer::from_writer(Vec::new());
    writer.write_record(&sheet.headers)?;
    for row in &sheet.rows {
        writer.write_record(row)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(e.to_string()))
}

/// Writes the sheet as a one-worksheet XLSX workbook with a bold header row.
///
/// # Errors
///
/// Returns an error if the workbook cannot be assembled.
pub fn to_xlsx(sheet: &Sheet) -> Result<Vec<u8>, ExportError> {
    let mut workbook: Workbook = Workbook::new();
    let mut worksheet: Worksheet = Worksheet::new();
    worksheet.set_name(&sheet.name)?;

    let bold: Format = Format::new().set_bold();
    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column(col)?, header, &bold)?;
    }

    for (index, row) in sheet.rows.iter().enumerate() {
        let row_number: u32 = u32::try_from(index + 1)
            .map_err(|_| ExportError::Xlsx(String::from("Too many rows")))?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            match value.parse::<f64>().ok().filter(|v| v.is_finite()) {
                Some(number) => {
                    worksheet.write_number(row_number, column(col)?, number)?;
                }
                None => {
                    worksheet.write_string(row_number, column(col)?, value)?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    Ok(workbook.save_to_buffer()?)
}

fn column(index: usize) -> Result<u16, ExportError> {
    u16::try_from(index).map_err(|_| ExportError::Xlsx(String::from("Too many columns")))
}

/// `YYYY-MM-DD HH:MM` in the plant timezone.
#[must_use]
pub fn local_time_label(timestamp: OffsetDateTime, tz: Tz) -> String {
    DateTime::<Utc>::from_timestamp(timestamp.unix_timestamp(), timestamp.nanosecond()).map_or_else(
        || timestamp.to_string(),
        |utc| utc.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
    )
}

/// Downtime entries, one row each, times in plant time.
#[must_use]
pub fn downtime_sheet(records: &[DowntimeRecord], tz: Tz) -> Sheet {
    let headers: Vec<String> = [
        "ID",
        "Start",
        "End",
        "Duration",
        "Status",
        "Plant Category",
        "Plant Section",
        "Discipline",
        "Plant Equipment",
        "Breakdown Description",
        "Notes",
        "Shift Day",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    let mut sheet: Sheet = Sheet::new("Downtime", headers);
    for record in records {
        let entry = &record.downtime;
        sheet.rows.push(vec![
            record.downtime_id.to_string(),
            local_time_label(entry.start, tz),
            entry
                .end
                .map(|end| local_time_label(end, tz))
                .unwrap_or_default(),
            entry.duration_label(),
            entry.status().to_string(),
            entry.plant_category.clone(),
            entry.plant_section.clone(),
            entry.discipline.clone(),
            entry.plant_equipment.clone(),
            entry.breakdown_description.clone(),
            entry.notes.clone().unwrap_or_default(),
            format_date(entry.shift_day(tz)),
        ]);
    }
    sheet
}

/// Lab results, one row each, every assay field as a column.
#[must_use]
pub fn lab_sheet(records: &[LabInspectionRecord]) -> Sheet {
    let mut headers: Vec<String> = [
        "ID",
        "Date",
        "Hour",
        "Plant",
        "Sample Type",
        "Sample Description",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    headers.extend(AssayField::ALL.iter().map(|field| field.label().to_string()));

    let mut sheet: Sheet = Sheet::new("Lab Results", headers);
    for record in records {
        let inspection = &record.inspection;
        let mut row: Vec<String> = vec![
            record.lab_inspection_id.to_string(),
            format_date(inspection.date),
            inspection.hour.to_string(),
            inspection.plant.to_string(),
            inspection.sample_type.to_string(),
            inspection.sample_description.clone(),
        ];
        row.extend(
            AssayField::ALL
                .iter()
                .map(|field| inspection.readings.get(*field).to_string()),
        );
        sheet.rows.push(row);
    }
    sheet
}

/// The grouped shift report: twelve hour rows per shift day followed by an
/// `Average` row. Columns are one group of report metrics per description.
#[must_use]
pub fn shift_report_sheet(report: &ShiftReport) -> Sheet {
    let mut headers: Vec<String> = vec![
        String::from("Shift Day"),
        String::from("Hour"),
        String::from("Date"),
    ];
    for description in &report.descriptions {
        headers.extend(
            ShiftReport::metrics()
                .iter()
                .map(|field| format!("{description} {}", field.label())),
        );
    }

    let blank_group = || vec![String::new(); ShiftReport::metrics().len()];

    let mut sheet: Sheet = Sheet::new("Shift Report", headers);
    for day in &report.days {
        let label: String = shift_label(day.shift_day);
        for hour_row in &day.rows {
            let mut row: Vec<String> = vec![
                label.clone(),
                hour_row.hour.to_string(),
                format_date(hour_row.date),
            ];
            for cell in &hour_row.cells {
                row.extend(cell.clone().unwrap_or_else(blank_group));
            }
            sheet.rows.push(row);
        }

        let mut average_row: Vec<String> =
            vec![label, String::from("Average"), String::new()];
        for group in &day.averages {
            average_row.extend(group.iter().cloned());
        }
        sheet.rows.push(average_row);
    }
    sheet
}
