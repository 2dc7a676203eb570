use serde::Serialize;

use crate::{Actor, AuthError, Permission, Role, RoleName, RoleRegistry, User};

/// Which target roles a management rule admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetScope {
    Any,
    Only(&'static [RoleName]),
}

impl TargetScope {
    pub fn admits(&self, target: &RoleName) -> bool {
        match self {
            TargetScope::Any => true,
            TargetScope::Only(names) => names.contains(target),
        }
    }
}

/// One row of the management rule table: an actor holding `capability`
/// may manage targets admitted by `targets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ManagementRule {
    pub capability: Permission,
    pub targets: TargetScope,
}

/// Ordered management rules, first match wins.
pub static MANAGEMENT_RULES: [ManagementRule; 3] = [
    ManagementRule {
        capability: Permission::Admin,
        targets: TargetScope::Any,
    },
    ManagementRule {
        capability: Permission::ManageManagers,
        targets: TargetScope::Only(&[RoleName::REGULAR, RoleName::ANALYST, RoleName::MANAGER]),
    },
    ManagementRule {
        capability: Permission::ManageAnalysts,
        targets: TargetScope::Only(&[RoleName::REGULAR]),
    },
];

/// Why a management check came out the way it did.
///
/// For logs and tests. User-facing denials stay terse and do not include
/// this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ManagementDecision {
    /// The actor lacks the gate capability entirely.
    MissingGate { gate: Permission },
    /// Rule `index` matched on `capability`.
    Matched {
        index: usize,
        capability: Permission,
        granted: bool,
    },
    /// The actor passed the gate but holds none of the rule capabilities.
    NoRule,
}

impl ManagementDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, ManagementDecision::Matched { granted: true, .. })
    }
}

/// Decides which roles an actor may create, edit or assign.
///
/// - No IO
/// - No panics
/// - Self-management is evaluated like any other target
#[derive(Debug, Clone, Copy)]
pub struct ManagementAuthorizer {
    gate: Permission,
    rules: &'static [ManagementRule],
}

impl Default for ManagementAuthorizer {
    fn default() -> Self {
        Self::standard()
    }
}

impl ManagementAuthorizer {
    /// Gate on MANAGE_USERS, then [`MANAGEMENT_RULES`].
    pub fn standard() -> Self {
        Self {
            gate: Permission::ManageUsers,
            rules: &MANAGEMENT_RULES,
        }
    }

    pub fn gate(&self) -> Permission {
        self.gate
    }

    pub fn rules(&self) -> &'static [ManagementRule] {
        self.rules
    }

    pub fn explain(&self, actor: &Actor, target: &RoleName) -> ManagementDecision {
        let perms = actor.permissions();
        if !perms.has(self.gate) {
            return ManagementDecision::MissingGate { gate: self.gate };
        }

        self.rules
            .iter()
            .enumerate()
            .find(|(_, rule)| perms.has(rule.capability))
            .map(|(index, rule)| ManagementDecision::Matched {
                index,
                capability: rule.capability,
                granted: rule.targets.admits(target),
            })
            .unwrap_or(ManagementDecision::NoRule)
    }

    pub fn can_manage(&self, actor: &Actor, target: &RoleName) -> bool {
        let decision = self.explain(actor, target);
        tracing::trace!(actor = %actor.user_id(), target = %target, ?decision, "management check");
        decision.is_granted()
    }

    /// Whether `actor` may manage `target` in its current role.
    pub fn can_manage_user(&self, actor: &Actor, target: &User) -> bool {
        self.can_manage(actor, target.role())
    }

    /// Roles the actor may assign, in registry order.
    ///
    /// Derived from [`Self::can_manage`], so every returned role passes the
    /// same check when it is later assigned.
    pub fn allowed_role_choices<'r>(&self, actor: &Actor, registry: &'r RoleRegistry) -> Vec<&'r Role> {
        registry
            .all_roles()
            .iter()
            .filter(|role| self.can_manage(actor, role.name()))
            .collect()
    }
}

/// Plain capability gate.
pub fn require(actor: &Actor, permission: Permission) -> Result<(), AuthError> {
    if actor.permissions().has(permission) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}
