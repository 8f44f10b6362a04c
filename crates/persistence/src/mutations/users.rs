// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account mutations.

use diesel::prelude::*;
use diesel::result::DatabaseErrorKind;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::now_timestamp;
use crate::diesel_schema::{deleted_users, users};
use crate::error::PersistenceError;

fn hash_password(password: &str) -> Result<String, PersistenceError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))
}

/// Checks a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}

backend_fn! {
/// Creates a user account.
///
/// The e-mail is stored lowercase and must be unique.
///
/// # Errors
///
/// Returns `DuplicateEmail` if the address is taken, or an error if the
/// insert fails.
pub fn create_user(
    conn: &mut _,
    email: &str,
    name: &str,
    password: &str,
    role: &str,
) -> Result<i64, PersistenceError> {
    let normalized_email: String = email.trim().to_lowercase();

    info!(email = %normalized_email, role, "Creating user");

    let password_hash: String = hash_password(password)?;
    let created_at: String = now_timestamp()?;

    let result: Result<usize, diesel::result::Error> = diesel::insert_into(users::table)
        .values((
            users::email.eq(&normalized_email),
            users::name.eq(name.trim()),
            users::password_hash.eq(&password_hash),
            users::role.eq(role),
            users::banned.eq(0),
            users::created_at.eq(&created_at),
        ))
        .execute(conn);

    match result {
        Ok(_) => {}
        Err(diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(PersistenceError::DuplicateEmail(normalized_email));
        }
        Err(e) => return Err(PersistenceError::from(e)),
    }

    let user_id: i64 = conn.get_last_insert_rowid()?;

    info!(user_id, "User created");
    Ok(user_id)
}
}

backend_fn! {
/// Changes a user's role.
///
/// # Errors
///
/// Returns `UserNotFound` if no row was updated.
pub fn update_user_role(conn: &mut _, user_id: i64, role: &str) -> Result<(), PersistenceError> {
    info!(user_id, role, "Updating user role");

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::role.eq(role))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::UserNotFound(user_id));
    }
    Ok(())
}
}

backend_fn! {
/// Replaces a user's password.
///
/// # Errors
///
/// Returns `UserNotFound` if no row was updated, or an error if hashing
/// fails.
pub fn update_password(
    conn: &mut _,
    user_id: i64,
    new_password: &str,
) -> Result<(), PersistenceError> {
    info!(user_id, "Updating password");

    let password_hash: String = hash_password(new_password)?;

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::password_hash.eq(&password_hash))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::UserNotFound(user_id));
    }
    Ok(())
}
}

backend_fn! {
/// Bans a user and drops their sessions.
///
/// # Errors
///
/// Returns `UserNotFound` if no row was updated.
pub fn ban_user(conn: &mut _, user_id: i64, reason: &str) -> Result<(), PersistenceError> {
    info!(user_id, reason, "Banning user");

    conn.transaction(|conn| {
        let rows_affected: usize = diesel::update(users::table)
            .filter(users::user_id.eq(user_id))
            .set((users::banned.eq(1), users::ban_reason.eq(Some(reason))))
            .execute(conn)?;

        if rows_affected == 0 {
            return Err(PersistenceError::UserNotFound(user_id));
        }

        diesel::delete(crate::diesel_schema::sessions::table)
            .filter(crate::diesel_schema::sessions::user_id.eq(user_id))
            .execute(conn)?;
        Ok(())
    })
}
}

backend_fn! {
/// Lifts a ban.
///
/// # Errors
///
/// Returns `UserNotFound` if no row was updated.
pub fn unban_user(conn: &mut _, user_id: i64) -> Result<(), PersistenceError> {
    info!(user_id, "Unbanning user");

    let rows_affected: usize = diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set((users::banned.eq(0), users::ban_reason.eq(None::<String>)))
        .execute(conn)?;

    if rows_affected == 0 {
        return Err(PersistenceError::UserNotFound(user_id));
    }
    Ok(())
}
}

backend_fn! {
/// Deletes a user, keeping a copy in `deleted_users`.
///
/// Sessions go with the user; entries and audit rows they created keep
/// their data with the owner cleared.
///
/// # Errors
///
/// Returns `UserNotFound` if the user does not exist.
pub fn delete_user(conn: &mut _, user_id: i64, deleted_by: i64) -> Result<(), PersistenceError> {
    info!(user_id, deleted_by, "Deleting user");

    conn.transaction(|conn| {
        let found: Result<(String, String, String), diesel::result::Error> = users::table
            .filter(users::user_id.eq(user_id))
            .select((users::name, users::email, users::role))
            .first(conn);

        let (name, email, role) = match found {
            Ok(row) => row,
            Err(diesel::result::Error::NotFound) => {
                return Err(PersistenceError::UserNotFound(user_id));
            }
            Err(e) => return Err(PersistenceError::from(e)),
        };

        diesel::insert_into(deleted_users::table)
            .values((
                deleted_users::user_id.eq(user_id),
                deleted_users::name.eq(&name),
                deleted_users::email.eq(&email),
                deleted_users::role.eq(&role),
                deleted_users::deleted_by.eq(Some(deleted_by)),
                deleted_users::deleted_at.eq(now_timestamp()?),
            ))
            .execute(conn)?;

        diesel::delete(users::table)
            .filter(users::user_id.eq(user_id))
            .execute(conn)?;

        Ok(())
    })
}
}

backend_fn! {
/// Stamps the user's last successful login.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn update_last_login(conn: &mut _, user_id: i64) -> Result<(), PersistenceError> {
    debug!(user_id, "Updating last_login_at");

    diesel::update(users::table)
        .filter(users::user_id.eq(user_id))
        .set(users::last_login_at.eq(Some(now_timestamp()?)))
        .execute(conn)?;

    Ok(())
}
}
