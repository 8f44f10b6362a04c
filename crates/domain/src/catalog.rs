// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fixed catalogs used by lab entry: plants, sample types, sampling hours,
//! sample descriptions and assay fields.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

use crate::error::DomainError;

/// A processing plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Plant {
    #[serde(rename = "MP2")]
    Mp2,
    #[serde(rename = "SAOB")]
    Saob,
    #[serde(rename = "LIO")]
    Lio,
}

impl Plant {
    pub const ALL: [Self; 3] = [Self::Mp2, Self::Saob, Self::Lio];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mp2 => "MP2",
            Self::Saob => "SAOB",
            Self::Lio => "LIO",
        }
    }
}

impl FromStr for Plant {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|plant| plant.as_str() == s.trim())
            .ok_or_else(|| DomainError::InvalidPlant(s.to_string()))
    }
}

impl std::fmt::Display for Plant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of sample taken.
///
/// `NoSample` records that nothing was sampled for the slot; every reading is
/// then stored as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleType {
    #[serde(rename = "Normal Sample")]
    Normal,
    #[serde(rename = "Special Sample")]
    Special,
    #[serde(rename = "NS - No Sample")]
    NoSample,
}

impl SampleType {
    pub const ALL: [Self; 3] = [Self::Normal, Self::Special, Self::NoSample];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal Sample",
            Self::Special => "Special Sample",
            Self::NoSample => "NS - No Sample",
        }
    }
}

impl FromStr for SampleType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sample_type| sample_type.as_str() == s.trim())
            .ok_or_else(|| DomainError::InvalidSampleType(s.to_string()))
    }
}

impl std::fmt::Display for SampleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A two-hourly sampling slot, formatted `HHh00`.
///
/// The shift day starts at 06h00, so `00h00`, `02h00` and `04h00` are the
/// last three slots of the previous day's shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hour(u8);

impl Hour {
    /// The hour at which a shift day begins.
    pub const SHIFT_START: u8 = 6;

    /// All slots in shift order, starting at 06h00.
    pub const SHIFT_ORDER: [Self; 12] = [
        Self(6),
        Self(8),
        Self(10),
        Self(12),
        Self(14),
        Self(16),
        Self(18),
        Self(20),
        Self(22),
        Self(0),
        Self(2),
        Self(4),
    ];

    /// Creates an hour slot from a clock hour.
    ///
    /// # Errors
    ///
    /// Returns an error if the hour is odd or outside `0..24`.
    pub fn new(hour: u8) -> Result<Self, DomainError> {
        if hour >= 24 || hour % 2 != 0 {
            return Err(DomainError::InvalidHour(format!("{hour:02}h00")));
        }
        Ok(Self(hour))
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Position of this slot within the shift day (06h00 is 0, 04h00 is 11).
    #[must_use]
    pub const fn shift_index(self) -> usize {
        ((self.0 + 24 - Self::SHIFT_START) % 24 / 2) as usize
    }

    /// Whether this slot belongs to the previous calendar day's shift.
    #[must_use]
    pub const fn rolls_back(self) -> bool {
        self.0 < Self::SHIFT_START
    }
}

impl FromStr for Hour {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed: &str = s.trim();
        let invalid = || DomainError::InvalidHour(s.to_string());

        let (hours, minutes) = trimmed.split_once('h').ok_or_else(invalid)?;
        if hours.len() != 2 || minutes != "00" {
            return Err(invalid());
        }
        let hour: u8 = hours.parse().map_err(|_| invalid())?;
        Self::new(hour).map_err(|_| invalid())
    }
}

impl std::fmt::Display for Hour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}h00", self.0)
    }
}

impl Serialize for Hour {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Hour {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw: String = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Sample descriptions in batch-entry order.
pub const SAMPLE_DESCRIPTIONS: [&str; 6] = [
    "Plant Feed - Frm CNV -2",
    "Product 1 ( Mags)",
    "Product 2 ( Non Mags)",
    "Middlings",
    "Tailings",
    "Final Concentrate",
];

/// The description that carries the wet-chemistry iron reading on MP2.
pub const MAGS_PRODUCT: &str = "Product 1 ( Mags)";

/// Position of a description in the catalog, if it is a catalog entry.
#[must_use]
pub fn catalog_position(description: &str) -> Option<usize> {
    SAMPLE_DESCRIPTIONS.iter().position(|d| *d == description)
}

/// Validates and trims a free-text sample description.
///
/// # Errors
///
/// Returns an error if the description is blank.
pub fn normalize_sample_description(description: &str) -> Result<String, DomainError> {
    let trimmed: &str = description.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidSampleDescription(String::from(
            "Sample description cannot be empty",
        )));
    }
    Ok(trimmed.to_string())
}

/// A chemical or size-fraction reading captured for a lab sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssayField {
    FePerc,
    SioPerc,
    Al2o3Perc,
    PPerc,
    TioPerc,
    MgoPerc,
    CaoPerc,
    P2o5Perc,
    CuPerc,
    SPerc,
    AaFePerc,
    Moisture,
    Screen425,
    Screen212,
    Screen150,
    Screen106,
    Screen75,
    Screen53,
    Screen45,
    Screen38,
    Pan,
}

impl AssayField {
    pub const ALL: [Self; 21] = [
        Self::FePerc,
        Self::SioPerc,
        Self::Al2o3Perc,
        Self::PPerc,
        Self::TioPerc,
        Self::MgoPerc,
        Self::CaoPerc,
        Self::P2o5Perc,
        Self::CuPerc,
        Self::SPerc,
        Self::AaFePerc,
        Self::Moisture,
        Self::Screen425,
        Self::Screen212,
        Self::Screen150,
        Self::Screen106,
        Self::Screen75,
        Self::Screen53,
        Self::Screen45,
        Self::Screen38,
        Self::Pan,
    ];

    /// Size-fraction fields, only captured for special samples.
    pub const SCREENS: [Self; 9] = [
        Self::Screen425,
        Self::Screen212,
        Self::Screen150,
        Self::Screen106,
        Self::Screen75,
        Self::Screen53,
        Self::Screen45,
        Self::Screen38,
        Self::Pan,
    ];

    /// Columns shown in the shift report, in display order.
    pub const REPORT_METRICS: [Self; 13] = [
        Self::FePerc,
        Self::SioPerc,
        Self::PPerc,
        Self::TioPerc,
        Self::MgoPerc,
        Self::CaoPerc,
        Self::Screen212,
        Self::Screen150,
        Self::Screen75,
        Self::Screen53,
        Self::Screen38,
        Self::Pan,
        Self::Moisture,
    ];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FePerc => "fe_perc",
            Self::SioPerc => "sio_perc",
            Self::Al2o3Perc => "al2o3_perc",
            Self::PPerc => "p_perc",
            Self::TioPerc => "tio_perc",
            Self::MgoPerc => "mgo_perc",
            Self::CaoPerc => "cao_perc",
            Self::P2o5Perc => "p2o5_perc",
            Self::CuPerc => "cu_perc",
            Self::SPerc => "s_perc",
            Self::AaFePerc => "aa_fe_perc",
            Self::Moisture => "moisture",
            Self::Screen425 => "screen425",
            Self::Screen212 => "screen212",
            Self::Screen150 => "screen150",
            Self::Screen106 => "screen106",
            Self::Screen75 => "screen75",
            Self::Screen53 => "screen53",
            Self::Screen45 => "screen45",
            Self::Screen38 => "screen38",
            Self::Pan => "pan",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FePerc => "% Fe",
            Self::SioPerc => "% SiO2",
            Self::Al2o3Perc => "% Al2O3",
            Self::PPerc => "% P",
            Self::TioPerc => "% TiO2",
            Self::MgoPerc => "% MgO",
            Self::CaoPerc => "% CaO",
            Self::P2o5Perc => "% P2O5",
            Self::CuPerc => "% Cu",
            Self::SPerc => "% S",
            Self::AaFePerc => "AA Wet Chem % Fe",
            Self::Moisture => "% Moisture",
            Self::Screen425 => "+425µ",
            Self::Screen212 => "+212µ",
            Self::Screen150 => "+150µ",
            Self::Screen106 => "+106µ",
            Self::Screen75 => "+75µ",
            Self::Screen53 => "+53µ",
            Self::Screen45 => "+45µ",
            Self::Screen38 => "+38µ",
            Self::Pan => "Pan",
        }
    }

    #[must_use]
    pub fn is_screen(self) -> bool {
        Self::SCREENS.contains(&self)
    }
}

impl FromStr for AssayField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| DomainError::UnknownField(s.to_string()))
    }
}

impl std::fmt::Display for AssayField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Initial selections for a new lab entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryDefaults {
    pub date: time::Date,
    pub hour: Hour,
    pub plant: Plant,
    pub sample_type: SampleType,
    pub sample_description: &'static str,
}

impl EntryDefaults {
    /// Defaults for an entry made on `today`.
    #[must_use]
    pub const fn for_date(today: time::Date) -> Self {
        Self {
            date: today,
            hour: Hour::SHIFT_ORDER[0],
            plant: Plant::Mp2,
            sample_type: SampleType::Normal,
            sample_description: SAMPLE_DESCRIPTIONS[0],
        }
    }
}
