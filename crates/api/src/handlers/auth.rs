// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plantlog_persistence::{SqlitePersistence, UserData};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthenticationService};
use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    ChangePasswordRequest, ChangePasswordResponse, LoginRequest, LoginResponse, LogoutResponse,
    WhoAmIResponse,
};

/// Signs a user in.
///
/// # Errors
///
/// Returns an error if the credentials are wrong or the user is banned.
pub fn login(
    persistence: &mut SqlitePersistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session_token, authenticated_actor, user, expires_at) =
        AuthenticationService::login(persistence, &request.email, &request.password)?;

    Ok(LoginResponse {
        session_token,
        user_id: user.user_id,
        email: user.email,
        name: user.name,
        role: authenticated_actor.role.as_str().to_string(),
        expires_at,
    })
}

/// Ends the session identified by `session_token`.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(
    persistence: &mut SqlitePersistence,
    session_token: &str,
) -> Result<LogoutResponse, ApiError> {
    AuthenticationService::logout(persistence, session_token)?;

    Ok(LogoutResponse {
        message: String::from("Logged out"),
    })
}

/// Describes the signed-in user.
#[must_use]
pub fn whoami(authenticated_actor: &AuthenticatedActor, user: &UserData) -> WhoAmIResponse {
    WhoAmIResponse {
        user_id: user.user_id,
        email: user.email.clone(),
        name: user.name.clone(),
        role: authenticated_actor.role.as_str().to_string(),
    }
}

/// Changes the caller's own password and revokes all of their sessions.
///
/// # Errors
///
/// Returns an error if the current password is wrong or the new one breaks
/// the password policy.
pub fn change_password(
    persistence: &mut SqlitePersistence,
    request: &ChangePasswordRequest,
    _authenticated_actor: &AuthenticatedActor,
    user: &UserData,
) -> Result<ChangePasswordResponse, ApiError> {
    let password_valid: bool = persistence
        .verify_password(&request.current_password, &user.password_hash)
        .map_err(|e| ApiError::Internal {
            message: format!("Password verification failed: {e}"),
        })?;

    if !password_valid {
        return Err(ApiError::AuthenticationFailed {
            reason: String::from("Current password is incorrect"),
        });
    }

    let policy: PasswordPolicy = PasswordPolicy::default();
    policy.validate(
        &request.new_password,
        &request.new_password_confirmation,
        &user.email,
        &user.name,
    )?;

    persistence
        .update_password(user.user_id, &request.new_password)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to update password: {e}"),
        })?;

    let sessions_revoked: usize = persistence
        .delete_sessions_for_user(user.user_id)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to invalidate sessions: {e}"),
        })?;

    info!(
        user_id = user.user_id,
        sessions_revoked, "Password changed"
    );

    Ok(ChangePasswordResponse {
        message: String::from("Password changed successfully. All sessions have been invalidated."),
        sessions_revoked,
    })
}
