// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Every query is written once with `backend_fn!` and dispatched by
//! `Persistence`.

pub mod audit;
pub mod downtime;
pub mod lab;
pub mod sessions;
pub mod users;

pub use audit::{
    get_audit_log_mysql, get_audit_log_sqlite, list_audit_logs_for_entity_mysql,
    list_audit_logs_for_entity_sqlite, list_audit_logs_mysql, list_audit_logs_sqlite,
};
pub use downtime::{
    get_downtime_mysql, get_downtime_sqlite, list_downtime_mysql, list_downtime_sqlite,
};
pub use lab::{
    get_lab_inspection_mysql, get_lab_inspection_sqlite, list_lab_inspections_mysql,
    list_lab_inspections_sqlite,
};
pub use sessions::{get_session_by_token_mysql, get_session_by_token_sqlite};
pub use users::{
    count_active_admins_mysql, count_active_admins_sqlite, count_users_mysql, count_users_sqlite,
    get_user_by_email_mysql, get_user_by_email_sqlite, get_user_by_id_mysql,
    get_user_by_id_sqlite, list_users_mysql, list_users_sqlite,
};
