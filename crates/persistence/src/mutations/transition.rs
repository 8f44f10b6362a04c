// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Writes a core transition: the row change plus its audit trail.
//!
//! The orchestration calls the per-backend building blocks by name, so it is
//! stamped out once per backend by `transition_fn!` rather than `backend_fn!`.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use plantlog::{Mutation, TransitionResult};
use plantlog_audit::AuditEvent;
use tracing::info;

use crate::error::PersistenceError;
use crate::mutations::audit::{persist_audit_event_mysql, persist_audit_event_sqlite};
use crate::mutations::downtime::{
    archive_downtime_mysql, archive_downtime_sqlite, insert_downtime_mysql,
    insert_downtime_sqlite, update_downtime_mysql, update_downtime_sqlite,
};
use crate::mutations::lab::{
    archive_lab_inspection_mysql, archive_lab_inspection_sqlite, insert_lab_inspection_mysql,
    insert_lab_inspection_sqlite, update_lab_inspection_mysql, update_lab_inspection_sqlite,
};

/// Ids written by `persist_transition`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistTransitionResult {
    /// Affected rows: new ids for inserts, otherwise the edited or archived id.
    pub row_ids: Vec<i64>,
    /// One audit id per event, in event order.
    pub audit_log_ids: Vec<i64>,
}

/// Pairs insert events with the ids of the rows they describe.
fn assign_entity_ids(events: &[AuditEvent], row_ids: &[i64]) -> Vec<AuditEvent> {
    events
        .iter()
        .enumerate()
        .map(|(index, event)| match (&event.entity_id, row_ids.get(index)) {
            (None, Some(id)) => event.clone().with_entity_id(id.to_string()),
            _ => event.clone(),
        })
        .collect()
}

macro_rules! transition_fn {
    ($backend:ident, $conn_ty:ty) => {
        pastey::paste! {
            /// Writes the mutation and every audit event in one transaction.
            ///
            /// # Errors
            ///
            /// Returns an error, leaving the database untouched, if any write
            /// fails.
            pub fn [<persist_transition_ $backend>](
                conn: &mut $conn_ty,
                result: &TransitionResult,
            ) -> Result<PersistTransitionResult, PersistenceError> {
                let user_id: i64 = result.actor.user_id;

                conn.transaction(|conn| {
                    let row_ids: Vec<i64> = match &result.mutation {
                        Mutation::InsertDowntime(entry) => {
                            vec![[<insert_downtime_ $backend>](conn, entry, user_id)?]
                        }
                        Mutation::UpdateDowntime { id, downtime } => {
                            [<update_downtime_ $backend>](conn, *id, downtime)?;
                            vec![*id]
                        }
                        Mutation::ArchiveDowntime { id, .. } => {
                            [<archive_downtime_ $backend>](conn, *id, user_id)?;
                            vec![*id]
                        }
                        Mutation::InsertLabInspections(inspections) => inspections
                            .iter()
                            .map(|inspection| {
                                [<insert_lab_inspection_ $backend>](conn, inspection, user_id)
                            })
                            .collect::<Result<Vec<i64>, PersistenceError>>()?,
                        Mutation::UpdateLabInspection { id, inspection } => {
                            [<update_lab_inspection_ $backend>](conn, *id, inspection)?;
                            vec![*id]
                        }
                        Mutation::ArchiveLabInspection { id, .. } => {
                            [<archive_lab_inspection_ $backend>](conn, *id, user_id)?;
                            vec![*id]
                        }
                    };

                    let audit_log_ids: Vec<i64> =
                        assign_entity_ids(&result.audit_events, &row_ids)
                            .iter()
                            .map(|event| [<persist_audit_event_ $backend>](conn, event))
                            .collect::<Result<Vec<i64>, PersistenceError>>()?;

                    info!(
                        user_id,
                        rows = row_ids.len(),
                        events = audit_log_ids.len(),
                        "Persisted transition"
                    );

                    Ok(PersistTransitionResult {
                        row_ids,
                        audit_log_ids,
                    })
                })
            }
        }
    };
}

transition_fn!(sqlite, SqliteConnection);
transition_fn!(mysql, MysqlConnection);
