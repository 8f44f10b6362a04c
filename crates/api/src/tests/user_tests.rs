// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use plantlog_persistence::{AuditLogRecord, UserData};

use super::helpers::{
    create_named_member, create_test_admin, create_test_member, create_test_persistence,
};
use crate::{
    ApiError, AuthenticatedActor, BanUserRequest, CreateUserRequest, Role, UpdateUserRoleRequest,
    ban_user, bootstrap_admin, create_user, delete_user, list_users, unban_user,
    update_user_role,
};

fn create_request(email: &str, role: Option<&str>) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        name: String::from("Night Shift"),
        password: String::from("Welcome-2026"),
        password_confirmation: String::from("Welcome-2026"),
        role: role.map(str::to_string),
    }
}

fn ban_request(reason: &str) -> BanUserRequest {
    BanUserRequest {
        reason: reason.to_string(),
    }
}

#[test]
fn test_create_user_defaults_to_member() {
    let mut persistence = create_test_persistence();
    let (admin_actor, _) = create_test_admin(&mut persistence);

    let response = create_user(
        &mut persistence,
        &create_request("night@plant.example", None),
        &admin_actor,
    )
    .unwrap();

    assert_eq!(response.user.role, "member");
    assert!(!response.user.banned);
    assert_eq!(list_users(&mut persistence, &admin_actor).unwrap().users.len(), 2);
}

#[test]
fn test_create_user_rejects_duplicate_email() {
    let mut persistence = create_test_persistence();
    let (admin_actor, _) = create_test_admin(&mut persistence);
    create_user(
        &mut persistence,
        &create_request("night@plant.example", Some("member")),
        &admin_actor,
    )
    .unwrap();

    let err = create_user(
        &mut persistence,
        &create_request("night@plant.example", Some("admin")),
        &admin_actor,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "unique_email"));
}

#[test]
fn test_create_user_applies_password_policy() {
    let mut persistence = create_test_persistence();
    let (admin_actor, _) = create_test_admin(&mut persistence);
    let mut request = create_request("night@plant.example", None);
    request.password = String::from("lowercaseonly");
    request.password_confirmation = String::from("lowercaseonly");

    let err = create_user(&mut persistence, &request, &admin_actor).unwrap_err();

    assert!(matches!(err, ApiError::PasswordPolicyViolation { .. }));
}

#[test]
fn test_create_user_rejects_unknown_role() {
    let mut persistence = create_test_persistence();
    let (admin_actor, _) = create_test_admin(&mut persistence);

    let err = create_user(
        &mut persistence,
        &create_request("night@plant.example", Some("supervisor")),
        &admin_actor,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "role"));
}

#[test]
fn test_admin_cannot_change_own_role() {
    let mut persistence = create_test_persistence();
    let (admin_actor, admin) = create_test_admin(&mut persistence);

    let err = update_user_role(
        &mut persistence,
        admin.user_id,
        &UpdateUserRoleRequest {
            role: String::from("member"),
        },
        &admin_actor,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::Forbidden { .. }));
}

#[test]
fn test_promote_member_to_admin() {
    let mut persistence = create_test_persistence();
    let (admin_actor, _) = create_test_admin(&mut persistence);
    let (_, member) = create_test_member(&mut persistence);

    let response = update_user_role(
        &mut persistence,
        member.user_id,
        &UpdateUserRoleRequest {
            role: String::from("Admin"),
        },
        &admin_actor,
    )
    .unwrap();

    assert_eq!(response.user.role, "admin");
    assert_eq!(persistence.count_active_admins().unwrap(), 2);
}

#[test]
fn test_cannot_delete_or_ban_self() {
    let mut persistence = create_test_persistence();
    let (admin_actor, admin) = create_test_admin(&mut persistence);

    let delete_err = delete_user(&mut persistence, admin.user_id, &admin_actor).unwrap_err();
    let ban_err = ban_user(
        &mut persistence,
        admin.user_id,
        &ban_request("Testing"),
        &admin_actor,
        &admin,
    )
    .unwrap_err();

    assert!(matches!(delete_err, ApiError::Forbidden { .. }));
    assert!(matches!(ban_err, ApiError::Forbidden { .. }));
}

#[test]
fn test_last_active_admin_is_protected() {
    let mut persistence = create_test_persistence();
    let (_, admin) = create_test_admin(&mut persistence);
    let (_, member) = create_test_member(&mut persistence);

    // A caller whose session predates a demotion still carries the admin role.
    let stale_actor = AuthenticatedActor::new(member.user_id, member.email.clone(), Role::Admin);

    let demote_err = update_user_role(
        &mut persistence,
        admin.user_id,
        &UpdateUserRoleRequest {
            role: String::from("member"),
        },
        &stale_actor,
    )
    .unwrap_err();
    let delete_err = delete_user(&mut persistence, admin.user_id, &stale_actor).unwrap_err();
    let ban_err = ban_user(
        &mut persistence,
        admin.user_id,
        &ban_request("Locked out"),
        &stale_actor,
        &member,
    )
    .unwrap_err();

    for err in [demote_err, delete_err, ban_err] {
        assert!(
            matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "last_active_admin")
        );
    }
    assert_eq!(persistence.count_active_admins().unwrap(), 1);
}

#[test]
fn test_delete_user_keeps_their_entries() {
    let mut persistence = create_test_persistence();
    let (admin_actor, _) = create_test_admin(&mut persistence);
    let (member_actor, member) = create_test_member(&mut persistence);
    let created = crate::create_downtime(
        &mut persistence,
        &super::helpers::create_downtime_request("Crusher"),
        &member_actor,
        &member,
        super::helpers::plant_tz(),
    )
    .unwrap();

    delete_user(&mut persistence, member.user_id, &admin_actor).unwrap();

    assert!(persistence.get_user_by_id(member.user_id).unwrap().is_none());
    let entry = persistence.get_downtime(created.entry.id).unwrap().unwrap();
    assert_eq!(entry.user_id, None);
}

#[test]
fn test_ban_and_unban_are_audited() {
    let mut persistence = create_test_persistence();
    let (admin_actor, admin) = create_test_admin(&mut persistence);
    let (_, member) = create_named_member(&mut persistence, "crew@plant.example");

    let banned = ban_user(
        &mut persistence,
        member.user_id,
        &ban_request("Shared credentials"),
        &admin_actor,
        &admin,
    )
    .unwrap();
    assert!(banned.user.banned);
    assert_eq!(banned.user.ban_reason.as_deref(), Some("Shared credentials"));

    let again = ban_user(
        &mut persistence,
        member.user_id,
        &ban_request("Twice"),
        &admin_actor,
        &admin,
    )
    .unwrap_err();
    assert!(matches!(again, ApiError::DomainRuleViolation { ref rule, .. } if rule == "already_banned"));

    let unbanned = unban_user(&mut persistence, member.user_id, &admin_actor, &admin).unwrap();
    assert!(!unbanned.user.banned);
    assert_eq!(unbanned.user.ban_reason, None);

    let trail: Vec<AuditLogRecord> = persistence
        .list_audit_logs_for_entity("user", &member.user_id.to_string())
        .unwrap();
    let actions: Vec<&str> = trail.iter().map(|r| r.action.as_str()).collect();
    assert_eq!(actions, vec!["unban", "ban"]);
    assert!(trail.iter().all(|r| r.performed_by_name == "Ada Admin"));
}

#[test]
fn test_ban_requires_reason() {
    let mut persistence = create_test_persistence();
    let (admin_actor, admin) = create_test_admin(&mut persistence);
    let (_, member) = create_test_member(&mut persistence);

    let err = ban_user(
        &mut persistence,
        member.user_id,
        &ban_request("   "),
        &admin_actor,
        &admin,
    )
    .unwrap_err();

    assert!(matches!(err, ApiError::InvalidInput { ref field, .. } if field == "reason"));
}

#[test]
fn test_unban_requires_banned_user() {
    let mut persistence = create_test_persistence();
    let (admin_actor, admin) = create_test_admin(&mut persistence);
    let (_, member) = create_test_member(&mut persistence);

    let err = unban_user(&mut persistence, member.user_id, &admin_actor, &admin).unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { ref rule, .. } if rule == "not_banned"));
}

#[test]
fn test_unknown_user_is_not_found() {
    let mut persistence = create_test_persistence();
    let (admin_actor, _) = create_test_admin(&mut persistence);

    let err = delete_user(&mut persistence, 9_999, &admin_actor).unwrap_err();

    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_bootstrap_admin_only_on_empty_system() {
    let mut persistence = create_test_persistence();

    let first = bootstrap_admin(
        &mut persistence,
        "owner@plant.example",
        "Plant Owner",
        "Initial-Pass1",
    )
    .unwrap();
    let user_id = first.unwrap();
    let user: UserData = persistence.get_user_by_id(user_id).unwrap().unwrap();
    assert!(user.is_admin());

    let second = bootstrap_admin(
        &mut persistence,
        "other@plant.example",
        "Someone Else",
        "Initial-Pass1",
    )
    .unwrap();
    assert_eq!(second, None);
    assert_eq!(persistence.count_users().unwrap(), 1);
}
