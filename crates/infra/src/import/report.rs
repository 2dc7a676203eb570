use serde::Serialize;
use thiserror::Error;

use roster_core::{PlayerId, TeamId};
use roster_players::SlugError;

use crate::store::StoreError;

/// Why one data row was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectionReason {
    MissingName,
    Duplicate { name: String },
    InvalidDate { value: String, name: String },
    /// Unexpected failure while handling the row.
    Processing { message: String },
}

impl core::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            RejectionReason::MissingName => write!(f, "Player name is required"),
            RejectionReason::Duplicate { name } => {
                write!(f, "Player '{name}' already exists in this team")
            }
            RejectionReason::InvalidDate { value, name } => {
                write!(f, "Invalid date format '{value}' for player '{name}'")
            }
            RejectionReason::Processing { message } => {
                write!(f, "Error processing player - {message}")
            }
        }
    }
}

/// A rejected row. `row` is 1-based over data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowRejection {
    pub row: usize,
    pub reason: RejectionReason,
}

impl core::fmt::Display for RowRejection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Row {}: {}", self.row, self.reason)
    }
}

/// A failure that aborts the whole import. Nothing is persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ImportFailure {
    #[error("error processing CSV file: {0}")]
    Decode(String),

    #[error("team {0} not found")]
    UnknownTeam(TeamId),

    #[error("could not allocate player slugs: {0}")]
    SlugAllocation(#[from] SlugError),

    #[error("import could not be saved: {0}")]
    Persistence(#[from] StoreError),
}

/// Outcome of a completed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub team_id: TeamId,
    pub rows_read: usize,
    pub accepted: usize,
    pub created: Vec<PlayerId>,
    /// In row order.
    pub rejections: Vec<RowRejection>,
}

impl ImportReport {
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }

    pub fn preview(&self, limit: usize) -> RejectionPreview<'_> {
        let shown = &self.rejections[..limit.min(self.rejections.len())];
        RejectionPreview {
            shown,
            remaining: self.rejections.len() - shown.len(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

/// The first few rejections plus a count of the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectionPreview<'a> {
    pub shown: &'a [RowRejection],
    pub remaining: usize,
}

impl RejectionPreview<'_> {
    /// One message per shown rejection, then a summary line if any were
    /// held back.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.shown.iter().map(ToString::to_string).collect();
        if self.remaining > 0 {
            lines.push(format!("... and {} more errors", self.remaining));
        }
        lines
    }
}
