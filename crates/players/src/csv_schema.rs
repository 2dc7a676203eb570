//! Column layout of roster spreadsheets.
//!
//! Headers are matched by exact, case-sensitive name. Unknown columns are
//! ignored and missing optional columns read as unset.

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use roster_core::TeamId;

use crate::birthplace::Birthplace;
use crate::dates::DateParser;
use crate::player::PlayerDraft;

pub const COL_PLAYER_NAME: &str = "Player name";
pub const COL_GENERAL_POSITION: &str = "General Position";
pub const COL_SPECIFIC_POSITION: &str = "Specific POS";
pub const COL_BATS: &str = "Bats";
pub const COL_THROWS: &str = "Throws";
pub const COL_ACTUAL_LEAGUE: &str = "Actual League";
pub const COL_TEAM: &str = "Team";
pub const COL_BIRTHPLACE: &str = "Birthplace";
pub const COL_DOB: &str = "DOB";

/// Header positions of the known columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RosterColumns {
    name: Option<usize>,
    general_position: Option<usize>,
    specific_position: Option<usize>,
    bats: Option<usize>,
    throws: Option<usize>,
    actual_league: Option<usize>,
    team: Option<usize>,
    birthplace: Option<usize>,
    dob: Option<usize>,
}

impl RosterColumns {
    pub fn from_headers(headers: &StringRecord) -> Self {
        let find = |column: &str| headers.iter().position(|h| h == column);

        Self {
            name: find(COL_PLAYER_NAME),
            general_position: find(COL_GENERAL_POSITION),
            specific_position: find(COL_SPECIFIC_POSITION),
            bats: find(COL_BATS),
            throws: find(COL_THROWS),
            actual_league: find(COL_ACTUAL_LEAGUE),
            team: find(COL_TEAM),
            birthplace: find(COL_BIRTHPLACE),
            dob: find(COL_DOB),
        }
    }

    pub fn has_name_column(&self) -> bool {
        self.name.is_some()
    }

    /// Extract the known cells of one record. Blank cells become `None`.
    pub fn row(&self, record: &StringRecord) -> RosterRow {
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        RosterRow {
            name: cell(self.name),
            general_position: cell(self.general_position),
            specific_position: cell(self.specific_position),
            bats: cell(self.bats),
            throws: cell(self.throws),
            actual_league: cell(self.actual_league),
            team: cell(self.team),
            birthplace: cell(self.birthplace),
            dob: cell(self.dob),
        }
    }
}

/// One data row, trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRow {
    pub name: Option<String>,
    pub general_position: Option<String>,
    pub specific_position: Option<String>,
    pub bats: Option<String>,
    pub throws: Option<String>,
    pub actual_league: Option<String>,
    pub team: Option<String>,
    pub birthplace: Option<String>,
    pub dob: Option<String>,
}

/// Why a row could not become a player draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    MissingName,
    InvalidDate { value: String },
}

impl RosterRow {
    /// Convert into a draft for `team_id`.
    ///
    /// A blank date is simply unset; a present but unparseable one is an
    /// error.
    pub fn into_draft(self, team_id: TeamId, dates: &DateParser) -> Result<PlayerDraft, RowError> {
        let name = self.name.ok_or(RowError::MissingName)?;

        let date_of_birth = match self.dob {
            Some(value) => Some(dates.parse(&value).ok_or(RowError::InvalidDate { value })?),
            None => None,
        };

        let mut draft = PlayerDraft::new(team_id, name);
        draft.date_of_birth = date_of_birth;
        draft.general_position = self.general_position;
        draft.specific_position = self.specific_position;
        draft.bats = self.bats;
        draft.throws = self.throws;
        draft.current_league = self.actual_league;
        draft.current_team_external = self.team;
        draft.birthplace = self
            .birthplace
            .as_deref()
            .map(Birthplace::parse)
            .unwrap_or_default();

        Ok(draft)
    }
}
