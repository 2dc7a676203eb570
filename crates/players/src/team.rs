use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use roster_core::{Entity, TeamId, UserId, ValidationErrors};

pub const TEAM_NAME_MIN_LEN: usize = 2;
pub const TEAM_NAME_MAX_LEN: usize = 100;
pub const FOUNDED_YEAR_RANGE: core::ops::RangeInclusive<i32> = 1800..=2100;

/// Team details as submitted for creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub league: Option<String>,
    pub division: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub founded_year: Option<i32>,
    pub home_stadium: Option<String>,
    pub manager: Option<String>,
    pub description: Option<String>,
}

impl NewTeam {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();

        let len = self.name.trim().chars().count();
        errors.check(
            (TEAM_NAME_MIN_LEN..=TEAM_NAME_MAX_LEN).contains(&len),
            "name",
            "must be between 2 and 100 characters",
        );
        if let Some(year) = self.founded_year {
            errors.check(
                FOUNDED_YEAR_RANGE.contains(&year),
                "founded_year",
                "must be between 1800 and 2100",
            );
        }

        errors
    }
}

/// A team. Owns its players; removing a team removes them too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub league: Option<String>,
    pub division: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub founded_year: Option<i32>,
    pub home_stadium: Option<String>,
    pub manager: Option<String>,
    pub description: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Build a team from validated input.
    pub fn create(
        id: TeamId,
        new: NewTeam,
        created_by: Option<UserId>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationErrors> {
        new.validate().into_result()?;

        Ok(Self {
            id,
            name: new.name.trim().to_string(),
            league: new.league,
            division: new.division,
            city: new.city,
            state: new.state,
            country: new.country,
            founded_year: new.founded_year,
            home_stadium: new.home_stadium,
            manager: new.manager,
            description: new.description,
            created_by,
            created_at,
        })
    }
}

impl Entity for Team {
    type Id = TeamId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_trims_name() {
        let team = Team::create(TeamId::new(), NewTeam::named("  Leones "), None, Utc::now()).unwrap();
        assert_eq!(team.name, "Leones");
    }

    #[test]
    fn rejects_short_name_and_out_of_range_year() {
        let new = NewTeam {
            name: "L".to_string(),
            founded_year: Some(1799),
            ..Default::default()
        };
        let errors = Team::create(TeamId::new(), new, None, Utc::now()).unwrap_err();
        assert!(errors.has_field("name"));
        assert!(errors.has_field("founded_year"));
    }

    #[test]
    fn founded_year_is_optional() {
        let mut new = NewTeam::named("Tiburones");
        assert!(new.validate().is_empty());
        new.founded_year = Some(2100);
        assert!(new.validate().is_empty());
    }
}
