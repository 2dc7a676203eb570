use serde::{Deserialize, Serialize};

use roster_core::UserId;

use crate::{AuthError, PermissionSet, RoleName, RoleRegistry, User};

/// A fully resolved actor for authorization decisions.
///
/// Construction is decoupled from sessions and storage: whatever supplies the
/// current user resolves it against the role registry once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    user_id: UserId,
    role: RoleName,
    permissions: PermissionSet,
}

impl Actor {
    pub fn new(user_id: UserId, role: RoleName, permissions: PermissionSet) -> Self {
        Self {
            user_id,
            role,
            permissions,
        }
    }

    /// Resolve a stored user into an actor.
    ///
    /// Pending or deactivated accounts cannot act. A role missing from the
    /// registry resolves to an empty permission set.
    pub fn resolve(user: &User, registry: &RoleRegistry) -> Result<Self, AuthError> {
        if !user.can_act() {
            return Err(AuthError::Inactive);
        }

        Ok(Self {
            user_id: user.id,
            role: user.role().clone(),
            permissions: registry.permissions_of(user.role()),
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> &RoleName {
        &self.role
    }

    pub fn permissions(&self) -> PermissionSet {
        self.permissions
    }
}
