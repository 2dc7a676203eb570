use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{AuthError, Permission, PermissionSet};

/// Role name used as the key for roles and management rules.
///
/// Names are compared exactly (case-sensitive).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    pub const REGULAR: RoleName = RoleName(Cow::Borrowed("Regular"));
    pub const ANALYST: RoleName = RoleName(Cow::Borrowed("Analyst"));
    pub const MANAGER: RoleName = RoleName(Cow::Borrowed("Manager"));
    pub const ADMIN: RoleName = RoleName(Cow::Borrowed("Admin"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named bundle of permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    name: RoleName,
    permissions: PermissionSet,
    is_default: bool,
}

impl Role {
    pub fn new(name: RoleName, permissions: PermissionSet) -> Self {
        Self {
            name,
            permissions,
            is_default: false,
        }
    }

    pub fn name(&self) -> &RoleName {
        &self.name
    }

    pub fn permissions(&self) -> PermissionSet {
        self.permissions
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn has_permission(&self, flag: Permission) -> bool {
        self.permissions.has(flag)
    }

    pub fn add_permission(&mut self, flag: Permission) {
        self.permissions.add(flag);
    }

    pub fn remove_permission(&mut self, flag: Permission) {
        self.permissions.remove(flag);
    }

    pub fn reset_permissions(&mut self) {
        self.permissions.reset();
    }
}

/// Canonical roles, lowest tier first. Each tier repeats the flags of the
/// tier below it.
pub static CANONICAL_ROLES: [(RoleName, &[Permission]); 4] = [
    (RoleName::REGULAR, &[Permission::ViewBasicStats]),
    (
        RoleName::ANALYST,
        &[
            Permission::ViewBasicStats,
            Permission::ViewAdvancedStats,
            Permission::ExportData,
        ],
    ),
    (
        RoleName::MANAGER,
        &[
            Permission::ViewBasicStats,
            Permission::ViewAdvancedStats,
            Permission::ExportData,
            Permission::ManageTeams,
            Permission::ManageUsers,
            Permission::ManageAnalysts,
        ],
    ),
    (
        RoleName::ADMIN,
        &[
            Permission::ViewBasicStats,
            Permission::ViewAdvancedStats,
            Permission::ExportData,
            Permission::ManageTeams,
            Permission::ManageUsers,
            Permission::ManageAnalysts,
            Permission::ManageManagers,
            Permission::Admin,
        ],
    ),
];

pub const DEFAULT_ROLE: RoleName = RoleName::REGULAR;

/// Registry of roles.
///
/// Invariants:
/// - role names are unique;
/// - at most one role is flagged default (exactly one after `seed`).
///
/// Deserialization goes through [`TryFrom<Vec<Role>>`], so a decoded registry
/// holds the same invariants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Role>", into = "Vec<Role>")]
pub struct RoleRegistry {
    roles: Vec<Role>,
}

impl RoleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding exactly the canonical roles.
    pub fn seeded() -> Self {
        let mut registry = Self::new();
        registry.seed();
        registry
    }

    /// Insert or reconcile the canonical roles.
    ///
    /// Existing roles have their mask reset and rebuilt from the canonical
    /// table, so repeated seeding never accumulates stray flags. Roles outside
    /// the table are kept but lose the default flag.
    pub fn seed(&mut self) {
        for (name, flags) in CANONICAL_ROLES.iter() {
            let idx = match self.position(name) {
                Some(idx) => idx,
                None => {
                    self.roles.push(Role::new(name.clone(), PermissionSet::empty()));
                    self.roles.len() - 1
                }
            };
            let role = &mut self.roles[idx];
            role.reset_permissions();
            for flag in flags.iter() {
                role.add_permission(*flag);
            }
        }

        for role in &mut self.roles {
            role.is_default = role.name == DEFAULT_ROLE;
        }

        tracing::debug!(roles = self.roles.len(), "role registry seeded");
    }

    /// Add a non-canonical role.
    pub fn insert(&mut self, role: Role) -> Result<(), AuthError> {
        if self.position(role.name()).is_some() {
            return Err(AuthError::DuplicateRole(role.name.to_string()));
        }
        let mut role = role;
        role.is_default = false;
        self.roles.push(role);
        Ok(())
    }

    pub fn role_by_name(&self, name: &RoleName) -> Result<&Role, AuthError> {
        self.roles
            .iter()
            .find(|r| &r.name == name)
            .ok_or_else(|| AuthError::UnknownRole(name.to_string()))
    }

    pub fn role_mut(&mut self, name: &RoleName) -> Result<&mut Role, AuthError> {
        self.roles
            .iter_mut()
            .find(|r| &r.name == name)
            .ok_or_else(|| AuthError::UnknownRole(name.to_string()))
    }

    pub fn default_role(&self) -> Result<&Role, AuthError> {
        self.roles
            .iter()
            .find(|r| r.is_default)
            .ok_or(AuthError::NoDefaultRole)
    }

    /// Move the default flag to `name`, clearing it everywhere else.
    pub fn set_default(&mut self, name: &RoleName) -> Result<(), AuthError> {
        self.role_by_name(name)?;
        for role in &mut self.roles {
            role.is_default = &role.name == name;
        }
        Ok(())
    }

    pub fn all_roles(&self) -> &[Role] {
        &self.roles
    }

    /// Permissions of the named role; an unknown role has none.
    pub fn permissions_of(&self, name: &RoleName) -> PermissionSet {
        self.role_by_name(name)
            .map(Role::permissions)
            .unwrap_or_default()
    }

    fn position(&self, name: &RoleName) -> Option<usize> {
        self.roles.iter().position(|r| &r.name == name)
    }
}

impl TryFrom<Vec<Role>> for RoleRegistry {
    type Error = AuthError;

    /// Rejects duplicate names, and a non-empty list without exactly one
    /// default role.
    fn try_from(roles: Vec<Role>) -> Result<Self, Self::Error> {
        let mut registry = Self::new();
        let mut defaults = Vec::new();
        for role in roles {
            if role.is_default {
                defaults.push(role.name.clone());
            }
            registry.insert(role)?;
        }

        match defaults.as_slice() {
            [] if registry.roles.is_empty() => Ok(registry),
            [name] => {
                registry.set_default(name)?;
                Ok(registry)
            }
            other => Err(AuthError::DefaultRoleCount(other.len())),
        }
    }
}

impl From<RoleRegistry> for Vec<Role> {
    fn from(registry: RoleRegistry) -> Self {
        registry.roles
    }
}
