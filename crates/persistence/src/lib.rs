// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for PlantLog.
//!
//! Diesel-backed storage for users, sessions, downtime entries, lab results,
//! their archives and the audit log.
//!
//! ## Backends
//!
//! - **`SQLite`** (default): in-memory for tests, a WAL-mode file otherwise.
//! - **`MariaDB`/`MySQL`**: selected with `--mysql-url`; validated by the
//!   ignored backend tests, run with `cargo xtask test-mariadb`.
//!
//! Each backend has its own migration directory (`migrations/`,
//! `migrations_mysql/`) producing the same schema.
//!
//! Timestamps are generated here rather than by the database so both
//! backends store the same fixed-width UTC text.

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
#![allow(clippy::multiple_crate_versions)]

use diesel::{MysqlConnection, SqliteConnection};
use plantlog::TransitionResult;
use plantlog_audit::AuditEvent;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter giving every in-memory database its own name.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates `_sqlite` and `_mysql` variants of one function body.
///
/// Diesel needs a concrete connection type, so a query written once against
/// `conn: &mut _` is stamped out for each backend. The macro only substitutes
/// the connection type; dispatch happens in `Persistence`.
///
/// ```ignore
/// backend_fn! {
///     pub fn count_users(conn: &mut _) -> Result<i64, PersistenceError> {
///         Ok(users::table.count().get_result(conn)?)
///     }
/// }
/// ```
macro_rules! backend_fn {
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident (
            $conn:ident : &mut _
            $(, $param:ident : $param_ty:ty)* $(,)?
        ) -> $ret:ty
        $body:block
    ) => {
        pastey::paste! {
            $(#[$meta])*
            $vis fn [<$name _sqlite>] (
                $conn: &mut SqliteConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body

            $(#[$meta])*
            $vis fn [<$name _mysql>] (
                $conn: &mut MysqlConnection
                $(, $param : $param_ty)*
            ) -> $ret
            $body
        }
    };
}

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{
    AuditLogRecord, DowntimeRecord, LabFilter, LabInspectionRecord, ROLE_ADMIN, ROLE_MEMBER,
    SessionData, UserData, format_db_timestamp, now_timestamp,
};
pub use error::PersistenceError;
pub use mutations::PersistTransitionResult;

use backend::PersistenceBackend;

/// Alias kept for call sites that only ever use `SQLite`.
pub type SqlitePersistence = Persistence;

/// The live connection, fixed at construction.
pub enum BackendConnection {
    Sqlite(SqliteConnection),
    Mysql(MysqlConnection),
}

/// Backend-agnostic storage handle.
pub struct Persistence {
    pub(crate) conn: BackendConnection,
}

impl Persistence {
    /// Opens a fresh, isolated in-memory `SQLite` database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Opens (or creates) a `SQLite` database file in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        backend::sqlite::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Sqlite(conn),
        })
    }

    /// Connects to `MySQL`/`MariaDB` at `database_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be reached or migrated.
    pub fn new_with_mysql(database_url: &str) -> Result<Self, PersistenceError> {
        let mut conn: MysqlConnection = backend::mysql::initialize_database(database_url)?;
        backend::mysql::verify_foreign_key_enforcement(&mut conn)?;

        Ok(Self {
            conn: BackendConnection::Mysql(conn),
        })
    }

    /// Startup check that referential integrity is enforced.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => conn.verify_foreign_key_enforcement(),
            BackendConnection::Mysql(conn) => conn.verify_foreign_key_enforcement(),
        }
    }

    /// Checks a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the hash is malformed.
    pub fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, PersistenceError> {
        mutations::verify_password(password, password_hash)
    }

    // ========================================================================
    // Transitions & Audit
    // ========================================================================

    /// Writes a core transition: the row change and every audit event, atomically.
    ///
    /// Insert events receive the new row ids as their entity ids.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn persist_transition(
        &mut self,
        result: &TransitionResult,
    ) -> Result<PersistTransitionResult, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::persist_transition_sqlite(conn, result),
            BackendConnection::Mysql(conn) => mutations::persist_transition_mysql(conn, result),
        }
    }

    /// Appends a standalone audit event (user bans and unbans).
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn persist_audit_event(&mut self, event: &AuditEvent) -> Result<i64, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::persist_audit_event_sqlite(conn, event),
            BackendConnection::Mysql(conn) => mutations::persist_audit_event_mysql(conn, event),
        }
    }

    /// Lists the audit log, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_audit_logs(&mut self) -> Result<Vec<AuditLogRecord>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::list_audit_logs_sqlite(conn),
            BackendConnection::Mysql(conn) => queries::list_audit_logs_mysql(conn),
        }
    }

    /// Fetches one audit entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_audit_log(
        &mut self,
        audit_log_id: i64,
    ) -> Result<Option<AuditLogRecord>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::get_audit_log_sqlite(conn, audit_log_id),
            BackendConnection::Mysql(conn) => queries::get_audit_log_mysql(conn, audit_log_id),
        }
    }

    /// Lists the audit trail of one entity, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_audit_logs_for_entity(
        &mut self,
        entity_type: &str,
        entity_id: &str,
    ) -> Result<Vec<AuditLogRecord>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::list_audit_logs_for_entity_sqlite(conn, entity_type, entity_id)
            }
            BackendConnection::Mysql(conn) => {
                queries::list_audit_logs_for_entity_mysql(conn, entity_type, entity_id)
            }
        }
    }

    // ========================================================================
    // Users
    // ========================================================================

    /// Creates a user. The e-mail is stored lowercase and the password
    /// bcrypt-hashed.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateEmail` if the address is taken.
    pub fn create_user(
        &mut self,
        email: &str,
        name: &str,
        password: &str,
        role: &str,
    ) -> Result<i64, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::create_user_sqlite(conn, email, name, password, role)
            }
            BackendConnection::Mysql(conn) => {
                mutations::create_user_mysql(conn, email, name, password, role)
            }
        }
    }

    /// Looks a user up by e-mail, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserData>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::get_user_by_email_sqlite(conn, email),
            BackendConnection::Mysql(conn) => queries::get_user_by_email_mysql(conn, email),
        }
    }

    /// Looks a user up by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_user_by_id(&mut self, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::get_user_by_id_sqlite(conn, user_id),
            BackendConnection::Mysql(conn) => queries::get_user_by_id_mysql(conn, user_id),
        }
    }

    /// Lists all users, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_users(&mut self) -> Result<Vec<UserData>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::list_users_sqlite(conn),
            BackendConnection::Mysql(conn) => queries::list_users_mysql(conn),
        }
    }

    /// Counts all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_users(&mut self) -> Result<i64, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::count_users_sqlite(conn),
            BackendConnection::Mysql(conn) => queries::count_users_mysql(conn),
        }
    }

    /// Counts admins who are not banned.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count_active_admins(&mut self) -> Result<i64, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::count_active_admins_sqlite(conn),
            BackendConnection::Mysql(conn) => queries::count_active_admins_mysql(conn),
        }
    }

    /// Changes a user's role.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist.
    pub fn update_user_role(&mut self, user_id: i64, role: &str) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::update_user_role_sqlite(conn, user_id, role)
            }
            BackendConnection::Mysql(conn) => {
                mutations::update_user_role_mysql(conn, user_id, role)
            }
        }
    }

    /// Replaces a user's password.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist.
    pub fn update_password(
        &mut self,
        user_id: i64,
        new_password: &str,
    ) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::update_password_sqlite(conn, user_id, new_password)
            }
            BackendConnection::Mysql(conn) => {
                mutations::update_password_mysql(conn, user_id, new_password)
            }
        }
    }

    /// Bans a user and revokes their sessions.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist.
    pub fn ban_user(&mut self, user_id: i64, reason: &str) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::ban_user_sqlite(conn, user_id, reason),
            BackendConnection::Mysql(conn) => mutations::ban_user_mysql(conn, user_id, reason),
        }
    }

    /// Lifts a ban.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist.
    pub fn unban_user(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::unban_user_sqlite(conn, user_id),
            BackendConnection::Mysql(conn) => mutations::unban_user_mysql(conn, user_id),
        }
    }

    /// Deletes a user, archiving name, e-mail and role in `deleted_users`.
    ///
    /// # Errors
    ///
    /// Returns `UserNotFound` if the user does not exist.
    pub fn delete_user(&mut self, user_id: i64, deleted_by: i64) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::delete_user_sqlite(conn, user_id, deleted_by)
            }
            BackendConnection::Mysql(conn) => {
                mutations::delete_user_mysql(conn, user_id, deleted_by)
            }
        }
    }

    /// Stamps a successful login.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_last_login(&mut self, user_id: i64) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::update_last_login_sqlite(conn, user_id),
            BackendConnection::Mysql(conn) => mutations::update_last_login_mysql(conn, user_id),
        }
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Creates a session. `expires_at` uses the stored timestamp format.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_session(
        &mut self,
        session_token: &str,
        user_id: i64,
        expires_at: &str,
    ) -> Result<i64, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::create_session_sqlite(conn, session_token, user_id, expires_at)
            }
            BackendConnection::Mysql(conn) => {
                mutations::create_session_mysql(conn, session_token, user_id, expires_at)
            }
        }
    }

    /// Looks a session up by token. Expiry is the caller's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_session_by_token(
        &mut self,
        session_token: &str,
    ) -> Result<Option<SessionData>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::get_session_by_token_sqlite(conn, session_token)
            }
            BackendConnection::Mysql(conn) => {
                queries::get_session_by_token_mysql(conn, session_token)
            }
        }
    }

    /// Touches a session's last activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn update_session_activity(&mut self, session_id: i64) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::update_session_activity_sqlite(conn, session_id)
            }
            BackendConnection::Mysql(conn) => {
                mutations::update_session_activity_mysql(conn, session_id)
            }
        }
    }

    /// Deletes a session by token.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_session(&mut self, session_token: &str) -> Result<(), PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::delete_session_sqlite(conn, session_token)
            }
            BackendConnection::Mysql(conn) => mutations::delete_session_mysql(conn, session_token),
        }
    }

    /// Revokes every session of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_sessions_for_user(&mut self, user_id: i64) -> Result<usize, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                mutations::delete_sessions_for_user_sqlite(conn, user_id)
            }
            BackendConnection::Mysql(conn) => {
                mutations::delete_sessions_for_user_mysql(conn, user_id)
            }
        }
    }

    /// Deletes sessions past their expiry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_expired_sessions(&mut self) -> Result<usize, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => mutations::delete_expired_sessions_sqlite(conn),
            BackendConnection::Mysql(conn) => mutations::delete_expired_sessions_mysql(conn),
        }
    }

    // ========================================================================
    // Downtime
    // ========================================================================

    /// Lists downtime entries, most recently logged first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_downtime(&mut self) -> Result<Vec<DowntimeRecord>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::list_downtime_sqlite(conn),
            BackendConnection::Mysql(conn) => queries::list_downtime_mysql(conn),
        }
    }

    /// Fetches one downtime entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_downtime(
        &mut self,
        downtime_id: i64,
    ) -> Result<Option<DowntimeRecord>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::get_downtime_sqlite(conn, downtime_id),
            BackendConnection::Mysql(conn) => queries::get_downtime_mysql(conn, downtime_id),
        }
    }

    // ========================================================================
    // Lab results
    // ========================================================================

    /// Lists lab results matching `filter`, most recently logged first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_lab_inspections(
        &mut self,
        filter: &LabFilter,
    ) -> Result<Vec<LabInspectionRecord>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => queries::list_lab_inspections_sqlite(conn, filter),
            BackendConnection::Mysql(conn) => queries::list_lab_inspections_mysql(conn, filter),
        }
    }

    /// Fetches one lab result.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_lab_inspection(
        &mut self,
        lab_inspection_id: i64,
    ) -> Result<Option<LabInspectionRecord>, PersistenceError> {
        match &mut self.conn {
            BackendConnection::Sqlite(conn) => {
                queries::get_lab_inspection_sqlite(conn, lab_inspection_id)
            }
            BackendConnection::Mysql(conn) => {
                queries::get_lab_inspection_mysql(conn, lab_inspection_id)
            }
        }
    }
}
