// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! User management. Admin only, apart from the first-admin bootstrap.

use plantlog_audit::{AuditAction, AuditEvent, EntityType, ban_description, unban_description};
use plantlog_persistence::{SqlitePersistence, UserData};
use tracing::info;

use super::user_info;
use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::error::{ApiError, not_found, translate_persistence_error};
use crate::password_policy::PasswordPolicy;
use crate::request_response::{
    BanUserRequest, CreateUserRequest, DeleteUserResponse, ListUsersResponse,
    UpdateUserRoleRequest, UserResponse,
};

fn load_user(persistence: &mut SqlitePersistence, user_id: i64) -> Result<UserData, ApiError> {
    persistence
        .get_user_by_id(user_id)
        .map_err(|e| translate_persistence_error(e, "Failed to load user"))?
        .ok_or_else(|| not_found("User", format!("User {user_id} does not exist")))
}

/// Refuses a change that would leave no active admin.
///
/// Only matters when `target` is itself an active admin.
fn ensure_not_last_active_admin(
    persistence: &mut SqlitePersistence,
    target: &UserData,
) -> Result<(), ApiError> {
    if !target.is_admin() || target.banned {
        return Ok(());
    }

    let active_admins: i64 = persistence
        .count_active_admins()
        .map_err(|e| translate_persistence_error(e, "Failed to count admins"))?;

    if active_admins <= 1 {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("last_active_admin"),
            message: String::from("Operation would leave the system without an active admin"),
        });
    }
    Ok(())
}

fn parse_role(value: &str) -> Result<Role, ApiError> {
    Role::from_request(value).ok_or_else(|| ApiError::InvalidInput {
        field: String::from("role"),
        message: format!("Invalid role '{value}'. Must be admin or member"),
    })
}

/// Lists every user, newest first.
///
/// # Errors
///
/// Returns an error if the actor is not an admin.
pub fn list_users(
    persistence: &mut SqlitePersistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListUsersResponse, ApiError> {
    AuthorizationService::authorize_manage_users(authenticated_actor)?;

    let users: Vec<UserData> = persistence
        .list_users()
        .map_err(|e| translate_persistence_error(e, "Failed to list users"))?;

    Ok(ListUsersResponse {
        users: users.iter().map(user_info).collect(),
    })
}

/// Creates an account.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, a field is blank, the role
/// is unknown, the password breaks the policy, or the e-mail is taken.
pub fn create_user(
    persistence: &mut SqlitePersistence,
    request: &CreateUserRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<UserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(authenticated_actor)?;

    let email: &str = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::InvalidInput {
            field: String::from("email"),
            message: String::from("A valid e-mail address is required"),
        });
    }
    let name: &str = request.name.trim();
    if name.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("name"),
            message: String::from("Name is required"),
        });
    }
    let role: Role = request
        .role
        .as_deref()
        .map_or(Ok(Role::Member), parse_role)?;

    PasswordPolicy::default().validate(
        &request.password,
        &request.password_confirmation,
        email,
        name,
    )?;

    let user_id: i64 = persistence
        .create_user(email, name, &request.password, role.as_stored())
        .map_err(|e| translate_persistence_error(e, "Failed to create user"))?;

    info!(
        user_id,
        role = %role,
        created_by = authenticated_actor.user_id,
        "Created user"
    );

    let user: UserData = load_user(persistence, user_id)?;
    Ok(UserResponse {
        message: format!("Created user {}", user.email),
        user: user_info(&user),
    })
}

/// Changes another user's role.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, targets themselves, names
/// an unknown role, or would demote the last active admin.
pub fn update_user_role(
    persistence: &mut SqlitePersistence,
    user_id: i64,
    request: &UpdateUserRoleRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<UserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(authenticated_actor)?;

    if user_id == authenticated_actor.user_id {
        return Err(ApiError::Forbidden {
            message: String::from("You cannot update your own role"),
        });
    }

    let role: Role = parse_role(&request.role)?;
    let target: UserData = load_user(persistence, user_id)?;

    if role == Role::Member {
        ensure_not_last_active_admin(persistence, &target)?;
    }

    persistence
        .update_user_role(user_id, role.as_stored())
        .map_err(|e| translate_persistence_error(e, "Failed to update role"))?;

    info!(user_id, role = %role, "Updated user role");

    let user: UserData = load_user(persistence, user_id)?;
    Ok(UserResponse {
        message: format!("{} is now {role}", user.email),
        user: user_info(&user),
    })
}

/// Deletes a user, keeping an archived copy of the account.
///
/// Rows the user logged stay, detached from the account.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, targets themselves, or the
/// target is the last active admin.
pub fn delete_user(
    persistence: &mut SqlitePersistence,
    user_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<DeleteUserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(authenticated_actor)?;

    if user_id == authenticated_actor.user_id {
        return Err(ApiError::Forbidden {
            message: String::from("You cannot delete your own account"),
        });
    }

    let target: UserData = load_user(persistence, user_id)?;
    ensure_not_last_active_admin(persistence, &target)?;

    persistence
        .delete_user(user_id, authenticated_actor.user_id)
        .map_err(|e| translate_persistence_error(e, "Failed to delete user"))?;

    info!(
        user_id,
        deleted_by = authenticated_actor.user_id,
        "Deleted user"
    );

    Ok(DeleteUserResponse {
        user_id,
        message: format!("Deleted user {}", target.email),
    })
}

/// Bans a user: they can no longer sign in and their sessions end.
///
/// # Errors
///
/// Returns an error if the actor is not an admin, targets themselves, gives
/// no reason, the user is already banned, or is the last active admin.
pub fn ban_user(
    persistence: &mut SqlitePersistence,
    user_id: i64,
    request: &BanUserRequest,
    authenticated_actor: &AuthenticatedActor,
    actor_user: &UserData,
) -> Result<UserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(authenticated_actor)?;

    if user_id == authenticated_actor.user_id {
        return Err(ApiError::Forbidden {
            message: String::from("You cannot ban yourself"),
        });
    }

    let reason: &str = request.reason.trim();
    if reason.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("reason"),
            message: String::from("A ban reason is required"),
        });
    }

    let target: UserData = load_user(persistence, user_id)?;
    if target.banned {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("already_banned"),
            message: format!("User {} is already banned", target.email),
        });
    }
    ensure_not_last_active_admin(persistence, &target)?;

    persistence
        .ban_user(user_id, reason)
        .map_err(|e| translate_persistence_error(e, "Failed to ban user"))?;

    let event: AuditEvent = AuditEvent::new(
        authenticated_actor.to_audit_actor(actor_user),
        AuditAction::Ban,
        EntityType::User,
        Some(user_id.to_string()),
        ban_description(&target.email, reason),
        None,
        None,
    );
    persistence
        .persist_audit_event(&event)
        .map_err(|e| translate_persistence_error(e, "Failed to persist audit event"))?;

    info!(user_id, banned_by = authenticated_actor.user_id, "Banned user");

    let user: UserData = load_user(persistence, user_id)?;
    Ok(UserResponse {
        message: format!("Banned user {}", user.email),
        user: user_info(&user),
    })
}

/// Lifts a ban.
///
/// # Errors
///
/// Returns an error if the actor is not an admin or the user is not banned.
pub fn unban_user(
    persistence: &mut SqlitePersistence,
    user_id: i64,
    authenticated_actor: &AuthenticatedActor,
    actor_user: &UserData,
) -> Result<UserResponse, ApiError> {
    AuthorizationService::authorize_manage_users(authenticated_actor)?;

    let target: UserData = load_user(persistence, user_id)?;
    if !target.banned {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("not_banned"),
            message: format!("User {} is not banned", target.email),
        });
    }

    persistence
        .unban_user(user_id)
        .map_err(|e| translate_persistence_error(e, "Failed to unban user"))?;

    let event: AuditEvent = AuditEvent::new(
        authenticated_actor.to_audit_actor(actor_user),
        AuditAction::Unban,
        EntityType::User,
        Some(user_id.to_string()),
        unban_description(&target.email),
        None,
        None,
    );
    persistence
        .persist_audit_event(&event)
        .map_err(|e| translate_persistence_error(e, "Failed to persist audit event"))?;

    info!(user_id, unbanned_by = authenticated_actor.user_id, "Unbanned user");

    let user: UserData = load_user(persistence, user_id)?;
    Ok(UserResponse {
        message: format!("Unbanned user {}", user.email),
        user: user_info(&user),
    })
}

/// Creates the first admin when the system has no users at all.
///
/// Returns the new user's id, or `None` if users already exist.
///
/// # Errors
///
/// Returns an error if the credentials are invalid or the user cannot be
/// stored.
pub fn bootstrap_admin(
    persistence: &mut SqlitePersistence,
    email: &str,
    name: &str,
    password: &str,
) -> Result<Option<i64>, ApiError> {
    let existing: i64 = persistence
        .count_users()
        .map_err(|e| translate_persistence_error(e, "Failed to count users"))?;
    if existing > 0 {
        return Ok(None);
    }

    let email: &str = email.trim();
    let name: &str = name.trim();
    if email.is_empty() || name.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("email"),
            message: String::from("Bootstrap admin needs an e-mail and a name"),
        });
    }
    PasswordPolicy::default().validate(password, password, email, name)?;

    let user_id: i64 = persistence
        .create_user(email, name, password, Role::Admin.as_stored())
        .map_err(|e| translate_persistence_error(e, "Failed to create bootstrap admin"))?;

    info!(user_id, "Created bootstrap admin");
    Ok(Some(user_id))
}
