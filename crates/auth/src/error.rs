use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("unknown role '{0}'")]
    UnknownRole(String),

    #[error("role '{0}' already exists")]
    DuplicateRole(String),

    #[error("no default role configured")]
    NoDefaultRole,

    #[error("expected exactly one default role, found {0}")]
    DefaultRoleCount(usize),

    /// Deliberately terse: does not say which capability was missing.
    #[error("not permitted")]
    Forbidden,

    #[error("account is not active")]
    Inactive,
}
