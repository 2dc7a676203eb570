//! User accounts managed through the management hierarchy.
//!
//! Users are plain records here; who may create or change them is decided by
//! [`crate::ManagementAuthorizer`] before any command reaches storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_core::{Entity, UserId, ValidationErrors};

use crate::{AuthError, RoleName, RoleRegistry};

// ─────────────────────────────────────────────────────────────────────────────
// User Status
// ─────────────────────────────────────────────────────────────────────────────

/// Account approval status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Registered but not yet approved by a manager.
    Pending,
    #[default]
    Approved,
}

impl core::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            UserStatus::Pending => write!(f, "pending"),
            UserStatus::Approved => write!(f, "approved"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Profile
// ─────────────────────────────────────────────────────────────────────────────

pub const USERNAME_MIN_LEN: usize = 4;
pub const USERNAME_MAX_LEN: usize = 25;

/// Editable identity fields of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub department: Option<String>,
}

impl UserProfile {
    /// Trim every field; blank optional fields become `None`.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: non_blank(self.phone),
            department: non_blank(self.department),
        }
    }

    /// Shape checks only. Uniqueness needs storage and is checked by the
    /// caller.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let len = self.username.chars().count();
        errors.check(
            (USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len),
            "username",
            "must be between 4 and 25 characters",
        );
        errors.check(is_email(&self.email), "email", "invalid email address");
        errors.check(!self.first_name.is_empty(), "first_name", "is required");
        errors.check(!self.last_name.is_empty(), "last_name", "is required");

        errors
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A user account.
///
/// # Invariants
/// - Always carries a role (the registry default when none is chosen).
/// - `approved_by` is a weak reference: the approver may no longer exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub profile: UserProfile,
    pub status: UserStatus,
    pub active: bool,
    role: RoleName,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// A new approved, active account. Pick `role` with
    /// [`resolve_initial_role`].
    pub fn new(
        id: UserId,
        profile: UserProfile,
        role: RoleName,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            profile,
            status: UserStatus::Approved,
            active: true,
            role,
            approved_by: None,
            approved_at: None,
            created_at,
        }
    }

    pub fn role(&self) -> &RoleName {
        &self.role
    }

    pub fn set_role(&mut self, role: RoleName) {
        self.role = role;
    }

    pub fn username(&self) -> &str {
        &self.profile.username
    }

    pub fn email(&self) -> &str {
        &self.profile.email
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.profile.first_name, self.profile.last_name)
            .trim()
            .to_string()
    }

    /// Approved and active accounts may act.
    pub fn can_act(&self) -> bool {
        self.active && self.status == UserStatus::Approved
    }

    pub fn approve(&mut self, approver: UserId, at: DateTime<Utc>) {
        self.status = UserStatus::Approved;
        self.approved_by = Some(approver);
        self.approved_at = Some(at);
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Pick the role for a new account.
///
/// An explicit role must exist in the registry. Without one, the configured
/// bootstrap admin address gets Admin when that role exists, and everyone
/// else gets the registry default.
pub fn resolve_initial_role(
    requested: Option<&RoleName>,
    email: &str,
    registry: &RoleRegistry,
    bootstrap_admin_email: Option<&str>,
) -> Result<RoleName, AuthError> {
    if let Some(name) = requested {
        return Ok(registry.role_by_name(name)?.name().clone());
    }

    if bootstrap_admin_email.is_some_and(|admin| admin == email) {
        if let Ok(admin) = registry.role_by_name(&RoleName::ADMIN) {
            return Ok(admin.name().clone());
        }
    }

    Ok(registry.default_role()?.name().clone())
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

/// Command to create a user on behalf of an actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub profile: UserProfile,
    /// Requested role; `None` falls back to [`resolve_initial_role`].
    pub role: Option<RoleName>,
    pub occurred_at: DateTime<Utc>,
}

/// Command to edit an existing user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditUser {
    pub user_id: UserId,
    pub profile: UserProfile,
    pub role: RoleName,
}

/// Command to approve a pending user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveUser {
    pub user_id: UserId,
    pub occurred_at: DateTime<Utc>,
}
