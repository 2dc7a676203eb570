//! Players and per-team roster views.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use roster_core::{Entity, PlayerId, TeamId, UserId, ValidationErrors};

use crate::birthplace::Birthplace;

pub const PLAYER_NAME_MIN_LEN: usize = 2;
pub const PLAYER_NAME_MAX_LEN: usize = 100;
pub const JERSEY_RANGE: core::ops::RangeInclusive<u8> = 0..=99;
pub const WEIGHT_RANGE: core::ops::RangeInclusive<u16> = 100..=400;

/// General positions in roster display order. Anything else is listed after
/// these, in first-seen order.
pub const GENERAL_POSITION_ORDER: [&str; 6] =
    ["CATCHER", "INFIELDER", "OUTFIELDER", "RHP", "LHP", "PITCHER"];

/// Group label for players without a general position.
pub const UNKNOWN_POSITION: &str = "Unknown";

/// Display name for a specific position code. Unknown codes are returned
/// unchanged.
pub fn specific_position_name(code: &str) -> &str {
    match code {
        "C" => "Catcher",
        "1B" => "First Base",
        "2B" => "Second Base",
        "3B" => "Third Base",
        "SS" => "Shortstop",
        "LF" => "Left Field",
        "CF" => "Center Field",
        "RF" => "Right Field",
        "DH" => "Designated Hitter",
        "SP" => "Starting Pitcher",
        "RP" => "Relief Pitcher",
        "CP" => "Closing Pitcher",
        "RHP" => "Right-Handed Pitcher",
        "LHP" => "Left-Handed Pitcher",
        other => other,
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ─────────────────────────────────────────────────────────────────────────────
// Draft
// ─────────────────────────────────────────────────────────────────────────────

/// Player fields before an id and slug are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerDraft {
    pub team_id: TeamId,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub jersey_number: Option<u8>,
    pub general_position: Option<String>,
    pub specific_position: Option<String>,
    pub birthplace: Birthplace,
    pub height: Option<String>,
    pub weight: Option<u16>,
    pub bats: Option<String>,
    pub throws: Option<String>,
    pub current_league: Option<String>,
    pub current_team_external: Option<String>,
    pub contract_status: Option<String>,
    pub notes: Option<String>,
}

impl PlayerDraft {
    pub fn new(team_id: TeamId, name: impl Into<String>) -> Self {
        Self {
            team_id,
            name: name.into(),
            date_of_birth: None,
            jersey_number: None,
            general_position: None,
            specific_position: None,
            birthplace: Birthplace::default(),
            height: None,
            weight: None,
            bats: None,
            throws: None,
            current_league: None,
            current_team_external: None,
            contract_status: None,
            notes: None,
        }
    }

    /// Form-level checks for a single player entry. Bulk import applies only
    /// the non-empty name rule.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let len = self.name.trim().chars().count();
        errors.check(
            (PLAYER_NAME_MIN_LEN..=PLAYER_NAME_MAX_LEN).contains(&len),
            "name",
            "must be between 2 and 100 characters",
        );
        if let Some(jersey) = self.jersey_number {
            errors.check(JERSEY_RANGE.contains(&jersey), "jersey_number", "must be between 0 and 99");
        }
        if let Some(weight) = self.weight {
            errors.check(WEIGHT_RANGE.contains(&weight), "weight", "must be between 100 and 400");
        }

        errors
    }

    pub fn into_player(
        self,
        id: PlayerId,
        slug: String,
        created_by: Option<UserId>,
        created_at: DateTime<Utc>,
    ) -> Player {
        Player {
            id,
            slug,
            name: self.name.trim().to_string(),
            team_id: self.team_id,
            date_of_birth: self.date_of_birth,
            jersey_number: self.jersey_number,
            general_position: self.general_position,
            specific_position: self.specific_position,
            birthplace: self.birthplace,
            height: self.height,
            weight: self.weight,
            bats: self.bats,
            throws: self.throws,
            current_league: self.current_league,
            current_team_external: self.current_team_external,
            contract_status: self.contract_status,
            notes: self.notes,
            created_by,
            created_at,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Player
// ─────────────────────────────────────────────────────────────────────────────

/// A player on exactly one team.
///
/// # Invariants
/// - `slug` is unique across all players.
/// - `jersey_number`, when set, is unique within the team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub slug: String,
    pub name: String,
    pub team_id: TeamId,
    pub date_of_birth: Option<NaiveDate>,
    pub jersey_number: Option<u8>,
    pub general_position: Option<String>,
    pub specific_position: Option<String>,
    pub birthplace: Birthplace,
    pub height: Option<String>,
    pub weight: Option<u16>,
    pub bats: Option<String>,
    pub throws: Option<String>,
    pub current_league: Option<String>,
    pub current_team_external: Option<String>,
    pub contract_status: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Player {
    /// Whole years between birth and `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        today.years_since(self.date_of_birth?)
    }

    /// Specific position name, else the general position in title case.
    pub fn position_display(&self) -> String {
        if let Some(code) = &self.specific_position {
            return specific_position_name(code).to_string();
        }
        match &self.general_position {
            Some(general) => title_case(general),
            None => UNKNOWN_POSITION.to_string(),
        }
    }

    pub fn birthplace_display(&self) -> Option<String> {
        self.birthplace.display()
    }
}

impl Entity for Player {
    type Id = PlayerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Team summary
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionGroup {
    pub position: String,
    pub players: Vec<Player>,
}

/// Roster overview for one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummary {
    pub player_count: usize,
    /// Mean age of players with a known birth date, one decimal.
    pub average_age: Option<f64>,
    pub positions: Vec<PositionGroup>,
}

impl TeamSummary {
    pub fn build(players: Vec<Player>, today: NaiveDate) -> Self {
        let ages: Vec<u32> = players.iter().filter_map(|p| p.age_on(today)).collect();
        let average_age = if ages.is_empty() {
            None
        } else {
            let mean = ages.iter().map(|a| f64::from(*a)).sum::<f64>() / ages.len() as f64;
            Some((mean * 10.0).round() / 10.0)
        };

        let player_count = players.len();
        let mut groups: Vec<PositionGroup> = Vec::new();
        for player in players {
            let position = player
                .general_position
                .clone()
                .unwrap_or_else(|| UNKNOWN_POSITION.to_string());
            match groups.iter_mut().find(|g| g.position == position) {
                Some(group) => group.players.push(player),
                None => groups.push(PositionGroup {
                    position,
                    players: vec![player],
                }),
            }
        }

        // Stable sort keeps first-seen order among non-canonical positions.
        groups.sort_by_key(|g| {
            GENERAL_POSITION_ORDER
                .iter()
                .position(|p| *p == g.position)
                .unwrap_or(GENERAL_POSITION_ORDER.len())
        });

        Self {
            player_count,
            average_age,
            positions: groups,
        }
    }
}
