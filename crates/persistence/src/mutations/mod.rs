// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `users`, `sessions` — accounts and logins
//! - `downtime`, `lab` — entry rows and their archives
//! - `audit` — append-only audit log
//! - `transition` — writes a core transition atomically

pub mod audit;
pub mod downtime;
pub mod lab;
pub mod sessions;
pub mod transition;
pub mod users;

pub use audit::{persist_audit_event_mysql, persist_audit_event_sqlite};
pub use sessions::{
    create_session_mysql, create_session_sqlite, delete_expired_sessions_mysql,
    delete_expired_sessions_sqlite, delete_session_mysql, delete_session_sqlite,
    delete_sessions_for_user_mysql, delete_sessions_for_user_sqlite,
    update_session_activity_mysql, update_session_activity_sqlite,
};
pub use transition::{
    PersistTransitionResult, persist_transition_mysql, persist_transition_sqlite,
};
pub use users::{
    ban_user_mysql, ban_user_sqlite, create_user_mysql, create_user_sqlite, delete_user_mysql,
    delete_user_sqlite, unban_user_mysql, unban_user_sqlite, update_last_login_mysql,
    update_last_login_sqlite, update_password_mysql, update_password_sqlite,
    update_user_role_mysql, update_user_role_sqlite, verify_password,
};
