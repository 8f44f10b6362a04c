// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::now_timestamp;
use crate::diesel_schema::sessions;
use crate::error::PersistenceError;

backend_fn! {
/// Creates a session.
///
/// `expires_at` must use the stored timestamp format.
///
/// # Errors
///
/// Returns an error if the session cannot be created.
pub fn create_session(
    conn: &mut _,
    session_token: &str,
    user_id: i64,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    let now: String = now_timestamp()?;

    diesel::insert_into(sessions::table)
        .values((
            sessions::session_token.eq(session_token),
            sessions::user_id.eq(user_id),
            sessions::created_at.eq(&now),
            sessions::last_activity_at.eq(&now),
            sessions::expires_at.eq(expires_at),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    debug!(session_id, user_id, expires_at, "Session created");
    Ok(session_id)
}
}

backend_fn! {
/// Touches a session's `last_activity_at`.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_session_activity(conn: &mut _, session_id: i64) -> Result<(), PersistenceError> {
    diesel::update(sessions::table)
        .filter(sessions::session_id.eq(session_id))
        .set(sessions::last_activity_at.eq(now_timestamp()?))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Deletes a session by token. Unknown tokens are ignored.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_session(conn: &mut _, session_token: &str) -> Result<(), PersistenceError> {
    diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    Ok(())
}
}

backend_fn! {
/// Deletes every session of a user, returning how many were removed.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_sessions_for_user(conn: &mut _, user_id: i64) -> Result<usize, PersistenceError> {
    let deleted: usize = diesel::delete(sessions::table)
        .filter(sessions::user_id.eq(user_id))
        .execute(conn)?;

    info!(user_id, deleted, "Revoked sessions");
    Ok(deleted)
}
}

backend_fn! {
/// Deletes sessions whose expiry has passed.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn delete_expired_sessions(conn: &mut _) -> Result<usize, PersistenceError> {
    let now: String = now_timestamp()?;

    let deleted: usize = diesel::delete(sessions::table)
        .filter(sessions::expires_at.lt(&now))
        .execute(conn)?;

    debug!(deleted, "Removed expired sessions");
    Ok(deleted)
}
}
