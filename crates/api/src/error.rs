// Copyright (C) 2026 PlantLog Contributors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use crate::password_policy::PasswordPolicyError;
use plantlog::CoreError;
use plantlog_domain::DomainError;
use plantlog_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The actor's role does not allow the action.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// The action is refused for this particular actor, whatever the role.
    Forbidden {
        /// A human-readable description of the refusal.
        message: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
    /// Password policy violation.
    PasswordPolicyViolation {
        /// A human-readable description of the policy violation.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::Forbidden { message } => write!(f, "Forbidden: {message}"),
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
            Self::PasswordPolicyViolation { message } => {
                write!(f, "Password policy violation: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PasswordPolicyError> for ApiError {
    fn from(err: PasswordPolicyError) -> Self {
        Self::PasswordPolicyViolation {
            message: err.to_string(),
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidPlant(_) => invalid("plant", message),
        DomainError::InvalidSampleType(_) => invalid("sample_type", message),
        DomainError::InvalidHour(_) => invalid("hour", message),
        DomainError::InvalidDate { .. } => invalid("date", message),
        DomainError::InvalidTimestamp { .. } => invalid("timestamp", message),
        DomainError::InvalidSampleDescription(_) => invalid("sample_description", message),
        DomainError::UnknownField(_) => invalid("readings", message),
        DomainError::MissingReading { field } | DomainError::InvalidReading { field, .. } => {
            invalid(field, message)
        }
        DomainError::MissingField { field } => invalid(field, message),
        DomainError::InvalidTimezone(_) => invalid("timezone", message),
        DomainError::EndBeforeStart { .. } => ApiError::DomainRuleViolation {
            rule: String::from("end_after_start"),
            message,
        },
        DomainError::AlreadyResolved => ApiError::DomainRuleViolation {
            rule: String::from("resolve_once"),
            message,
        },
        DomainError::EmptyBatch => ApiError::DomainRuleViolation {
            rule: String::from("non_empty_batch"),
            message,
        },
        DomainError::BatchStepFailed { .. } => ApiError::DomainRuleViolation {
            rule: String::from("batch_step"),
            message,
        },
    }
}

fn invalid(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message,
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
    }
}

/// Translates a persistence error into an API error.
///
/// Missing rows and duplicate e-mails are client errors; everything else is
/// reported as internal with `context` prefixed.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError, context: &str) -> ApiError {
    match err {
        PersistenceError::UserNotFound(id) => not_found("User", format!("User {id} does not exist")),
        PersistenceError::DowntimeNotFound(id) => not_found(
            "Downtime entry",
            format!("Downtime entry {id} does not exist"),
        ),
        PersistenceError::LabInspectionNotFound(id) => {
            not_found("Lab result", format!("Lab result {id} does not exist"))
        }
        PersistenceError::AuditLogNotFound(id) => {
            not_found("Audit entry", format!("Audit entry {id} does not exist"))
        }
        PersistenceError::DuplicateEmail(email) => ApiError::DomainRuleViolation {
            rule: String::from("unique_email"),
            message: format!("A user with e-mail {email} already exists"),
        },
        other => ApiError::Internal {
            message: format!("{context}: {other}"),
        },
    }
}

pub(crate) fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message,
    }
}
