// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use serde_json::{Value, json};

/// The user who performed an audited action.
///
/// Name and identifier are copied into the audit record so the trail stays
/// readable after the user is deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The user's database id.
    pub user_id: i64,
    /// Display name at the time of the action.
    pub name: String,
    /// Login e-mail at the time of the action.
    pub identifier: String,
}

impl Actor {
    #[must_use]
    pub const fn new(user_id: i64, name: String, identifier: String) -> Self {
        Self {
            user_id,
            name,
            identifier,
        }
    }
}

/// The kind of change recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Resolve,
    Ban,
    Unban,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Resolve => "resolve",
            Self::Ban => "ban",
            Self::Unban => "unban",
        }
    }

    /// Parses a stored action name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [
            Self::Create,
            Self::Update,
            Self::Delete,
            Self::Resolve,
            Self::Ban,
            Self::Unban,
        ]
        .into_iter()
        .find(|action| action.as_str() == value)
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of entity an audit record refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityType {
    Downtime,
    LabInspection,
    User,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Downtime => "downtime",
            Self::LabInspection => "lab_inspection",
            Self::User => "user",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        [Self::Downtime, Self::LabInspection, Self::User]
            .into_iter()
            .find(|entity| entity.as_str() == value)
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A JSON image of an entity before or after a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub data: Value,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: Value) -> Self {
        Self { data }
    }
}

/// An immutable record of one change.
///
/// Creates carry only `after`, deletes only `before`, and updates and
/// resolves carry both. Ban and unban carry neither; the reason is part of
/// the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    pub actor: Actor,
    pub action: AuditAction,
    pub entity_type: EntityType,
    /// Id of the affected row. `None` for inserts until the row id is known.
    pub entity_id: Option<String>,
    pub description: String,
    pub before: Option<StateSnapshot>,
    pub after: Option<StateSnapshot>,
}

impl AuditEvent {
    #[must_use]
    pub const fn new(
        actor: Actor,
        action: AuditAction,
        entity_type: EntityType,
        entity_id: Option<String>,
        description: String,
        before: Option<StateSnapshot>,
        after: Option<StateSnapshot>,
    ) -> Self {
        Self {
            actor,
            action,
            entity_type,
            entity_id,
            description,
            before,
            after,
        }
    }

    /// Returns the event with its entity id set.
    #[must_use]
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// The metadata string stored alongside the event.
    #[must_use]
    pub fn metadata(&self) -> Option<String> {
        match (&self.before, &self.after) {
            (None, Some(after)) => Some(after.data.to_string()),
            (Some(before), Some(after)) => {
                Some(json!({ "old": before.data, "new": after.data }).to_string())
            }
            (Some(before), None) => Some(before.data.to_string()),
            (None, None) => None,
        }
    }
}

/// `Downtime entry {verb} for {equipment}`.
#[must_use]
pub fn downtime_description(action: AuditAction, plant_equipment: &str) -> String {
    format!("Downtime entry {} for {plant_equipment}", past_tense(action))
}

/// `Lab Results entry {verb} for {description}`.
#[must_use]
pub fn lab_description(action: AuditAction, sample_description: &str) -> String {
    format!(
        "Lab Results entry {} for {sample_description}",
        past_tense(action)
    )
}

#[must_use]
pub fn ban_description(email: &str, reason: &str) -> String {
    format!("User {email} banned: {reason}")
}

#[must_use]
pub fn unban_description(email: &str) -> String {
    format!("User {email} unbanned")
}

const fn past_tense(action: AuditAction) -> &'static str {
    match action {
        AuditAction::Create => "created",
        AuditAction::Update => "updated",
        AuditAction::Delete => "deleted",
        AuditAction::Resolve => "resolved",
        AuditAction::Ban => "banned",
        AuditAction::Unban => "unbanned",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> Actor {
        Actor::new(
            7,
            String::from("Jane Operator"),
            String::from("jane@plant.example"),
        )
    }

    fn event(before: Option<StateSnapshot>, after: Option<StateSnapshot>) -> AuditEvent {
        AuditEvent::new(
            actor(),
            AuditAction::Update,
            EntityType::Downtime,
            Some(String::from("3")),
            String::from("Downtime entry updated for Conveyor"),
            before,
            after,
        )
    }

    #[test]
    fn test_create_metadata_is_after_state() {
        let after: StateSnapshot = StateSnapshot::new(json!({ "plant_equipment": "Conveyor" }));
        let metadata: Option<String> = event(None, Some(after)).metadata();
        assert_eq!(metadata.as_deref(), Some(r#"{"plant_equipment":"Conveyor"}"#));
    }

    #[test]
    fn test_update_metadata_wraps_old_and_new() {
        let before: StateSnapshot = StateSnapshot::new(json!({ "notes": null }));
        let after: StateSnapshot = StateSnapshot::new(json!({ "notes": "fixed" }));
        let metadata: String = event(Some(before), Some(after)).metadata().unwrap_or_default();

        let parsed: Value = serde_json::from_str(&metadata).unwrap_or_default();
        assert_eq!(parsed["old"]["notes"], Value::Null);
        assert_eq!(parsed["new"]["notes"], "fixed");
    }

    #[test]
    fn test_delete_metadata_is_before_state() {
        let before: StateSnapshot = StateSnapshot::new(json!({ "id": 3 }));
        let metadata: Option<String> = event(Some(before), None).metadata();
        assert_eq!(metadata.as_deref(), Some(r#"{"id":3}"#));
    }

    #[test]
    fn test_ban_has_no_metadata() {
        assert_eq!(event(None, None).metadata(), None);
    }

    #[test]
    fn test_entity_id_can_be_filled_later() {
        let pending: AuditEvent = AuditEvent::new(
            actor(),
            AuditAction::Create,
            EntityType::LabInspection,
            None,
            lab_description(AuditAction::Create, "Tailings"),
            None,
            None,
        );
        let stored: AuditEvent = pending.clone().with_entity_id("42");
        assert_eq!(pending.entity_id, None);
        assert_eq!(stored.entity_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_action_and_entity_names_round_trip() {
        for action in [
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::Resolve,
            AuditAction::Ban,
            AuditAction::Unban,
        ] {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(EntityType::parse("lab_inspection"), Some(EntityType::LabInspection));
        assert_eq!(EntityType::parse("labinspections"), None);
    }

    #[test]
    fn test_standard_descriptions() {
        assert_eq!(
            downtime_description(AuditAction::Resolve, "Primary crusher"),
            "Downtime entry resolved for Primary crusher"
        );
        assert_eq!(
            lab_description(AuditAction::Delete, "Tailings"),
            "Lab Results entry deleted for Tailings"
        );
        assert_eq!(
            ban_description("bob@plant.example", "left company"),
            "User bob@plant.example banned: left company"
        );
        assert_eq!(
            unban_description("bob@plant.example"),
            "User bob@plant.example unbanned"
        );
    }
}
