//! User administration on behalf of an authenticated actor.
//!
//! Every mutation runs the [`ManagementAuthorizer`] first. Denials are
//! reported as a bare [`AdminError::Denied`]; the reason is only logged.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use roster_auth::{
    require, resolve_initial_role, Actor, ApproveUser, AuthError, CreateUser, EditUser,
    ManagementAuthorizer, Permission, RoleName, User, UserProfile, UserStatus,
};
use roster_core::{UserId, ValidationErrors};

use crate::config::AdminConfig;
use crate::store::{Constraint, SharedRoleRegistry, StoreError, UserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("not permitted")]
    Denied,

    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Auth(AuthError),

    #[error(transparent)]
    Store(StoreError),
}

impl From<AuthError> for AdminError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::Forbidden => AdminError::Denied,
            other => AdminError::Auth(other),
        }
    }
}

impl From<StoreError> for AdminError {
    fn from(value: StoreError) -> Self {
        let field = match &value {
            StoreError::UniqueViolation { constraint: Constraint::Username, .. } => "username",
            StoreError::UniqueViolation { constraint: Constraint::Email, .. } => "email",
            _ => return AdminError::Store(value),
        };
        let mut errors = ValidationErrors::new();
        errors.push(field, "already exists");
        AdminError::Invalid(errors)
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub total: usize,
    pub pending: usize,
    /// Approved and active.
    pub active: usize,
}

pub struct UserAdministration<U> {
    users: U,
    roles: SharedRoleRegistry,
    authorizer: ManagementAuthorizer,
    admin: AdminConfig,
}

impl<U> UserAdministration<U>
where
    U: UserStore,
{
    pub fn new(users: U, roles: SharedRoleRegistry, admin: AdminConfig) -> Self {
        Self {
            users,
            roles,
            authorizer: ManagementAuthorizer::standard(),
            admin,
        }
    }

    pub fn store(&self) -> &U {
        &self.users
    }

    pub fn roles(&self) -> &SharedRoleRegistry {
        &self.roles
    }

    /// Resolve a stored user into the actor used for later checks.
    pub fn actor(&self, user_id: UserId) -> Result<Actor, AdminError> {
        let user = self.users.user(user_id)?.ok_or(AdminError::NotFound("user"))?;
        Ok(self.roles.read(|registry| Actor::resolve(&user, registry))??)
    }

    /// Roles `actor` may assign, in registry order.
    pub fn role_choices(&self, actor: &Actor) -> Result<Vec<RoleName>, AdminError> {
        self.gate(actor, "role_choices")?;
        Ok(self.roles.read(|registry| {
            self.authorizer
                .allowed_role_choices(actor, registry)
                .into_iter()
                .map(|role| role.name().clone())
                .collect()
        })?)
    }

    /// All users, newest first.
    pub fn list_users(&self, actor: &Actor) -> Result<Vec<User>, AdminError> {
        self.gate(actor, "list_users")?;
        let mut users = self.users.users()?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    pub fn stats(&self, actor: &Actor) -> Result<UserStats, AdminError> {
        self.gate(actor, "stats")?;
        let users = self.users.users()?;
        Ok(UserStats {
            total: users.len(),
            pending: users.iter().filter(|u| u.status == UserStatus::Pending).count(),
            active: users.iter().filter(|u| u.can_act()).count(),
        })
    }

    /// Create an approved, active account. The actor becomes the approver.
    pub fn create_user(&self, actor: &Actor, cmd: CreateUser) -> Result<User, AdminError> {
        self.gate(actor, "create_user")?;

        let profile = cmd.profile.normalized();
        let role = self.roles.read(|registry| {
            resolve_initial_role(cmd.role.as_ref(), &profile.email, registry, Some(self.admin.email.as_str()))
        })??;
        if !self.authorizer.can_manage(actor, &role) {
            return Err(self.deny(actor, "create_user", Some(&role)));
        }

        self.validate_profile(&profile, None)?;

        let mut user = User::new(UserId::new(), profile, role, cmd.occurred_at);
        user.approve(actor.user_id(), cmd.occurred_at);
        self.users.insert_user(user.clone())?;

        tracing::info!(
            actor = %actor.user_id(),
            user = %user.id,
            username = %user.username(),
            role = %user.role(),
            "user created"
        );
        Ok(user)
    }

    pub fn edit_user(&self, actor: &Actor, cmd: EditUser) -> Result<User, AdminError> {
        self.gate(actor, "edit_user")?;

        let mut target = self.load(cmd.user_id)?;
        if !self.authorizer.can_manage_user(actor, &target) {
            return Err(self.deny(actor, "edit_user", Some(target.role())));
        }

        self.roles.read(|registry| registry.role_by_name(&cmd.role).map(|_| ()))??;
        if !self.authorizer.can_manage(actor, &cmd.role) {
            return Err(self.deny(actor, "edit_user", Some(&cmd.role)));
        }

        let profile = cmd.profile.normalized();
        self.validate_profile(&profile, Some(target.id))?;

        target.profile = profile;
        target.set_role(cmd.role);
        self.users.update_user(target.clone())?;

        tracing::info!(actor = %actor.user_id(), user = %target.id, role = %target.role(), "user updated");
        Ok(target)
    }

    /// Approve a pending account. Already approved accounts are returned
    /// unchanged.
    pub fn approve_user(&self, actor: &Actor, cmd: ApproveUser) -> Result<User, AdminError> {
        self.gate(actor, "approve_user")?;

        let mut target = self.load(cmd.user_id)?;
        if !self.authorizer.can_manage_user(actor, &target) {
            return Err(self.deny(actor, "approve_user", Some(target.role())));
        }
        if target.status == UserStatus::Approved {
            return Ok(target);
        }

        target.approve(actor.user_id(), cmd.occurred_at);
        self.users.update_user(target.clone())?;

        tracing::info!(actor = %actor.user_id(), user = %target.id, "user approved");
        Ok(target)
    }

    /// Seed the roles and create the configured admin account if no user
    /// holds its username yet. Returns the account when it was created.
    pub fn bootstrap_admin(&self, now: DateTime<Utc>) -> Result<Option<User>, AdminError> {
        self.roles.reseed()?;

        if self.users.user_by_username(&self.admin.username)?.is_some() {
            tracing::debug!(username = %self.admin.username, "admin account already present");
            return Ok(None);
        }

        let profile = UserProfile {
            username: self.admin.username.clone(),
            email: self.admin.email.clone(),
            first_name: self.admin.first_name.clone(),
            last_name: self.admin.last_name.clone(),
            phone: None,
            department: None,
        }
        .normalized();
        profile.validate().into_result().map_err(AdminError::Invalid)?;

        let role = self
            .roles
            .read(|registry| registry.role_by_name(&RoleName::ADMIN).map(|r| r.name().clone()))??;

        let mut admin = User::new(UserId::new(), profile, role, now);
        admin.approved_at = Some(now);
        self.users.insert_user(admin.clone())?;

        tracing::info!(user = %admin.id, username = %admin.username(), "admin account created");
        Ok(Some(admin))
    }

    fn gate(&self, actor: &Actor, operation: &'static str) -> Result<(), AdminError> {
        require(actor, Permission::ManageUsers).map_err(|_| self.deny(actor, operation, None))
    }

    fn deny(&self, actor: &Actor, operation: &'static str, target: Option<&RoleName>) -> AdminError {
        match target {
            Some(target) => {
                let decision = self.authorizer.explain(actor, target);
                tracing::warn!(actor = %actor.user_id(), operation, %target, ?decision, "denied");
            }
            None => {
                tracing::warn!(actor = %actor.user_id(), operation, gate = %Permission::ManageUsers, "denied");
            }
        }
        AdminError::Denied
    }

    fn load(&self, id: UserId) -> Result<User, AdminError> {
        self.users.user(id)?.ok_or(AdminError::NotFound("user"))
    }

    /// Shape checks plus uniqueness, reported together. `owner` is excluded
    /// from the uniqueness checks.
    fn validate_profile(&self, profile: &UserProfile, owner: Option<UserId>) -> Result<(), AdminError> {
        let mut errors = profile.validate();
        let taken_by_other = |found: Option<User>| found.is_some_and(|u| Some(u.id) != owner);

        if taken_by_other(self.users.user_by_username(&profile.username)?) {
            errors.push("username", "already exists");
        }
        if taken_by_other(self.users.user_by_email(&profile.email)?) {
            errors.push("email", "already exists");
        }

        errors.into_result().map_err(AdminError::Invalid)
    }
}
