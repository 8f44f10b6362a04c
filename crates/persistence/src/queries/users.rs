// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User account queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::{ROLE_ADMIN, UserData};
use crate::diesel_schema::users;
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = users)]
struct UserRow {
    user_id: i64,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    banned: i32,
    ban_reason: Option<String>,
    created_at: String,
    last_login_at: Option<String>,
}

impl From<UserRow> for UserData {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.user_id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: row.role,
            banned: row.banned != 0,
            ban_reason: row.ban_reason,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

backend_fn! {
/// Looks a user up by e-mail.
///
/// The address is matched lowercase.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no user has this address.
pub fn get_user_by_email(
    conn: &mut _,
    email: &str,
) -> Result<Option<UserData>, PersistenceError> {
    let normalized_email: String = email.trim().to_lowercase();

    debug!(email = %normalized_email, "Looking up user by e-mail");

    let result: Result<UserRow, diesel::result::Error> = users::table
        .filter(users::email.eq(&normalized_email))
        .select(UserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(UserData::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Looks a user up by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if the user does not exist.
pub fn get_user_by_id(conn: &mut _, user_id: i64) -> Result<Option<UserData>, PersistenceError> {
    debug!(user_id, "Looking up user by id");

    let result: Result<UserRow, diesel::result::Error> = users::table
        .filter(users::user_id.eq(user_id))
        .select(UserRow::as_select())
        .first(conn);

    match result {
        Ok(row) => Ok(Some(UserData::from(row))),
        Err(diesel::result::Error::NotFound) => Ok(None),
        Err(e) => Err(PersistenceError::from(e)),
    }
}
}

backend_fn! {
/// Lists every user, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_users(conn: &mut _) -> Result<Vec<UserData>, PersistenceError> {
    let rows: Vec<UserRow> = users::table
        .order((users::created_at.desc(), users::user_id.desc()))
        .select(UserRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(UserData::from).collect())
}
}

backend_fn! {
/// Counts all users.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_users(conn: &mut _) -> Result<i64, PersistenceError> {
    Ok(users::table.count().get_result(conn)?)
}
}

backend_fn! {
/// Counts admins who are not banned.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn count_active_admins(conn: &mut _) -> Result<i64, PersistenceError> {
    Ok(users::table
        .filter(users::role.eq(ROLE_ADMIN))
        .filter(users::banned.eq(0))
        .count()
        .get_result(conn)?)
}
}
