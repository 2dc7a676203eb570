use serde::Serialize;
use thiserror::Error;

/// Unique index names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Constraint {
    TeamId,
    PlayerId,
    PlayerSlug,
    TeamJersey,
    TeamPlayerName,
    UserId,
    Username,
    Email,
}

impl core::fmt::Display for Constraint {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Constraint::TeamId => "team_id",
            Constraint::PlayerId => "player_id",
            Constraint::PlayerSlug => "player_slug",
            Constraint::TeamJersey => "unique_jersey_per_team",
            Constraint::TeamPlayerName => "unique_player_name_per_team",
            Constraint::UserId => "user_id",
            Constraint::Username => "username",
            Constraint::Email => "email",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("unique constraint '{constraint}' violated by '{value}'")]
    UniqueViolation { constraint: Constraint, value: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unique(constraint: Constraint, value: impl Into<String>) -> Self {
        Self::UniqueViolation {
            constraint,
            value: value.into(),
        }
    }

    pub(crate) fn poisoned() -> Self {
        Self::Unavailable("lock poisoned".to_string())
    }

    pub fn violates(&self, constraint: Constraint) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint: c, .. } if *c == constraint)
    }
}
