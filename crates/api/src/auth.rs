// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.

use std::fmt::Write as _;

use plantlog_audit::Actor;
use plantlog_persistence::{
    PersistenceError, ROLE_ADMIN, ROLE_MEMBER, SessionData, SqlitePersistence, UserData,
    format_db_timestamp, now_timestamp,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::AuthError;

/// User roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full access, including edits, deletions, the audit log and user
    /// management.
    Admin,
    /// Plant operators: log and resolve downtime, log lab results and read
    /// reports.
    Member,
}

impl Role {
    /// The role string stored on the user row.
    #[must_use]
    pub const fn as_stored(self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::Member => ROLE_MEMBER,
        }
    }

    /// The role name shown to clients.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Parses a stored role string.
    #[must_use]
    pub fn from_stored(value: &str) -> Option<Self> {
        match value {
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_MEMBER => Some(Self::Member),
            _ => None,
        }
    }

    /// Parses a role named by a client. Accepts `member` and the stored
    /// `user` alias.
    #[must_use]
    pub fn from_request(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "member" | "user" => Some(Self::Member),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed-in user with a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    pub user_id: i64,
    /// Login e-mail.
    pub email: String,
    pub role: Role,
}

impl AuthenticatedActor {
    #[must_use]
    pub const fn new(user_id: i64, email: String, role: Role) -> Self {
        Self {
            user_id,
            email,
            role,
        }
    }

    /// The audit attribution for this actor, using the user's current name.
    #[must_use]
    pub fn to_audit_actor(&self, user: &UserData) -> Actor {
        Actor::new(self.user_id, user.name.clone(), user.email.clone())
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Role-based access checks, one per guarded action.
pub struct AuthorizationService;

impl AuthorizationService {
    fn admin_only(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Member => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Admin"),
            }),
        }
    }

    /// Both roles may list downtime.
    ///
    /// # Errors
    ///
    /// Never fails; kept fallible so every handler checks the same way.
    pub const fn authorize_list_downtime(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// Both roles may log downtime.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub const fn authorize_create_downtime(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// Both roles may resolve downtime.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub const fn authorize_resolve_downtime(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_update_downtime(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::admin_only(actor, "update_downtime")
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_delete_downtime(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::admin_only(actor, "delete_downtime")
    }

    /// The per-entry downtime report includes the audit trail, so it is
    /// admin only.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_downtime_report(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::admin_only(actor, "downtime_report")
    }

    /// Both roles may list lab results.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub const fn authorize_list_lab(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// Both roles may log lab results, singly or as a batch.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub const fn authorize_create_lab(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_update_lab(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::admin_only(actor, "update_lab_inspection")
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_delete_lab(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::admin_only(actor, "delete_lab_inspection")
    }

    /// Both roles may read reports and download exports.
    ///
    /// # Errors
    ///
    /// Never fails.
    pub const fn authorize_reports(_actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_view_audit_log(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::admin_only(actor, "view_audit_log")
    }

    /// Listing, creating, deleting, banning and changing roles of users.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an admin.
    pub fn authorize_manage_users(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::admin_only(actor, "manage_users")
    }
}

/// Session-based authentication.
pub struct AuthenticationService;

impl AuthenticationService {
    /// How long a session stays valid after login.
    pub const DEFAULT_SESSION_EXPIRATION: Duration = Duration::days(30);

    /// Checks credentials and opens a session.
    ///
    /// Unknown e-mails and wrong passwords fail with the same message.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `user`, `expires_at`).
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are wrong, the user is banned or
    /// the session cannot be stored.
    pub fn login(
        persistence: &mut SqlitePersistence,
        email: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedActor, UserData, String), AuthError> {
        let invalid_credentials = || AuthError::AuthenticationFailed {
            reason: String::from("Invalid email or password"),
        };

        let user: UserData = persistence
            .get_user_by_email(email)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(invalid_credentials)?;

        let password_ok: bool = persistence
            .verify_password(password, &user.password_hash)
            .map_err(Self::map_persistence_error)?;
        if !password_ok {
            warn!(user_id = user.user_id, "Login rejected: wrong password");
            return Err(invalid_credentials());
        }

        Self::check_not_banned(&user)?;
        let role: Role = Self::parse_role(&user)?;

        let session_token: String = Self::generate_session_token();
        let expires_at: String =
            format_db_timestamp(OffsetDateTime::now_utc() + Self::DEFAULT_SESSION_EXPIRATION)
                .map_err(Self::map_persistence_error)?;

        persistence
            .create_session(&session_token, user.user_id, &expires_at)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to create session: {e}"),
            })?;

        persistence
            .update_last_login(user.user_id)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to update last login: {e}"),
            })?;

        info!(user_id = user.user_id, role = %role, "User logged in");

        let authenticated_actor: AuthenticatedActor =
            AuthenticatedActor::new(user.user_id, user.email.clone(), role);

        Ok((session_token, authenticated_actor, user, expires_at))
    }

    /// Resolves a session token to its user and records the activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is unknown or expired, or the user is
    /// gone, banned or carries an unknown role.
    pub fn validate_session(
        persistence: &mut SqlitePersistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, UserData), AuthError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        // Stored timestamps are fixed width, so text order is time order.
        let now: String = now_timestamp().map_err(Self::map_persistence_error)?;
        if session.expires_at <= now {
            warn!(session_id = session.session_id, "Rejected expired session");
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)
            .map_err(Self::map_persistence_error)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("User not found"),
            })?;

        Self::check_not_banned(&user)?;
        let role: Role = Self::parse_role(&user)?;

        persistence
            .update_session_activity(session.session_id)
            .map_err(Self::map_persistence_error)?;

        debug!(user_id = user.user_id, "Session validated");

        let authenticated_actor: AuthenticatedActor =
            AuthenticatedActor::new(user.user_id, user.email.clone(), role);

        Ok((authenticated_actor, user))
    }

    /// Ends a session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(
        persistence: &mut SqlitePersistence,
        session_token: &str,
    ) -> Result<(), AuthError> {
        persistence
            .delete_session(session_token)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to delete session: {e}"),
            })?;

        Ok(())
    }

    fn check_not_banned(user: &UserData) -> Result<(), AuthError> {
        if user.banned {
            warn!(user_id = user.user_id, "Rejected banned user");
            return Err(AuthError::AuthenticationFailed {
                reason: format!(
                    "User is banned: {}",
                    user.ban_reason.as_deref().unwrap_or("no reason given")
                ),
            });
        }
        Ok(())
    }

    fn parse_role(user: &UserData) -> Result<Role, AuthError> {
        Role::from_stored(&user.role).ok_or_else(|| AuthError::AuthenticationFailed {
            reason: format!("Invalid role: {}", user.role),
        })
    }

    /// A 256-bit random token, hex encoded, prefixed with the issue time.
    fn generate_session_token() -> String {
        let nanos: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos();
        let bytes: [u8; 32] = rand::random();
        let mut token: String = format!("session_{nanos}_");
        for byte in bytes {
            let _ = write!(token, "{byte:02x}");
        }
        token
    }

    fn map_persistence_error(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
