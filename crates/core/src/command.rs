// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plantlog_domain::{BatchSubmission, Downtime, Hour, LabInspection, Plant};
use time::{Date, OffsetDateTime};

/// A command represents user intent as data only.
///
/// Commands that change an existing row carry the row as currently stored so
/// the audit trail can record the before state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Log a new outage.
    CreateDowntime {
        /// The submitted entry.
        draft: Downtime,
    },
    /// Replace every field of an outage.
    UpdateDowntime {
        /// Row id.
        id: i64,
        /// The stored entry.
        current: Downtime,
        /// The submitted entry.
        draft: Downtime,
    },
    /// Record the end of an outage.
    ResolveDowntime {
        id: i64,
        current: Downtime,
        end: OffsetDateTime,
        notes: Option<String>,
    },
    /// Remove an outage, keeping an archived copy.
    DeleteDowntime { id: i64, current: Downtime },
    /// Log a single lab result. Readings are normalized against the form.
    CreateLabInspection { draft: LabInspection },
    /// Log one result per step for a shared date, hour and plant.
    BatchCreateLabInspections {
        date: Date,
        hour: Hour,
        plant: Plant,
        steps: Vec<BatchSubmission>,
    },
    /// Replace a lab result.
    UpdateLabInspection {
        id: i64,
        current: LabInspection,
        draft: LabInspection,
    },
    /// Remove a lab result, keeping an archived copy.
    DeleteLabInspection { id: i64, current: LabInspection },
}
