//! `roster-auth` — role/permission authorization core.
//!
//! This crate is intentionally decoupled from HTTP, sessions and storage.

pub mod actor;
pub mod authorize;
pub mod error;
pub mod permissions;
pub mod roles;
pub mod user;

pub use actor::Actor;
pub use authorize::{
    require, ManagementAuthorizer, ManagementDecision, ManagementRule, TargetScope,
    MANAGEMENT_RULES,
};
pub use error::AuthError;
pub use permissions::{Permission, PermissionParseError, PermissionSet};
pub use roles::{Role, RoleName, RoleRegistry, CANONICAL_ROLES, DEFAULT_ROLE};
pub use user::{
    resolve_initial_role, ApproveUser, CreateUser, EditUser, User, UserProfile, UserStatus,
};
