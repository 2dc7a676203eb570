//! Team and player operations.

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use roster_auth::{require, Actor, AuthError, Permission};
use roster_core::{PlayerId, TeamId, ValidationErrors};
use roster_players::{NewTeam, Player, PlayerDraft, SlugError, SlugGenerator, Team, TeamSummary};

use crate::config::ImportConfig;
use crate::import::{ImportFailure, ImportPipeline, ImportReport};
use crate::store::{Constraint, RosterStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("not permitted")]
    Denied,

    #[error("validation failed: {0}")]
    Invalid(ValidationErrors),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Slug(#[from] SlugError),

    #[error(transparent)]
    Import(#[from] ImportFailure),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RosterError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(what) => RosterError::NotFound(what),
            other => RosterError::Store(other),
        }
    }
}

impl From<AuthError> for RosterError {
    fn from(_: AuthError) -> Self {
        RosterError::Denied
    }
}

const DUPLICATE_NAME: &str = "already exists in this team";

fn field_error(field: &'static str, message: &'static str) -> RosterError {
    let mut errors = ValidationErrors::new();
    errors.push(field, message);
    RosterError::Invalid(errors)
}

pub struct RosterService<S> {
    store: S,
    import: ImportConfig,
    slugs: SlugGenerator,
}

impl<S> RosterService<S>
where
    S: RosterStore,
{
    pub fn new(store: S, import: ImportConfig) -> Self {
        Self {
            store,
            import,
            slugs: SlugGenerator::new(import.slug_probe_limit),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Admin only.
    pub fn create_team(&self, actor: &Actor, new: NewTeam, now: DateTime<Utc>) -> Result<Team, RosterError> {
        self.require_admin(actor, "create_team")?;

        let team = Team::create(TeamId::new(), new, Some(actor.user_id()), now).map_err(RosterError::Invalid)?;
        self.store.insert_team(team.clone())?;

        tracing::info!(actor = %actor.user_id(), team = %team.id, name = %team.name, "team created");
        Ok(team)
    }

    /// Admin only. Removes the team's players too.
    pub fn delete_team(&self, actor: &Actor, team_id: TeamId) -> Result<usize, RosterError> {
        self.require_admin(actor, "delete_team")?;

        let removed = self.store.delete_team(team_id)?;
        tracing::info!(actor = %actor.user_id(), team = %team_id, players_removed = removed, "team deleted");
        Ok(removed)
    }

    pub fn teams(&self) -> Result<Vec<Team>, RosterError> {
        Ok(self.store.teams()?)
    }

    /// Add one player from a form entry.
    pub fn add_player(&self, actor: &Actor, draft: PlayerDraft, now: DateTime<Utc>) -> Result<Player, RosterError> {
        if self.store.team(draft.team_id)?.is_none() {
            return Err(RosterError::NotFound("team"));
        }

        let mut errors = draft.validate();
        if self.store.player_name_exists(draft.team_id, draft.name.trim())? {
            errors.push("name", DUPLICATE_NAME);
        }
        if let Some(jersey) = draft.jersey_number {
            if self.store.jersey_taken(draft.team_id, jersey)? {
                errors.push("jersey_number", "already taken in this team");
            }
        }
        errors.into_result().map_err(RosterError::Invalid)?;

        let mut player = draft.into_player(PlayerId::new(), String::new(), Some(actor.user_id()), now);
        let mut attempt = 0;
        loop {
            player.slug = self.slugs.generate(&player.name, |s| self.store.slug_exists(s))?;
            match self.store.insert_players(vec![player.clone()]) {
                Ok(()) => break,
                Err(e) if e.violates(Constraint::PlayerSlug) && attempt < self.import.commit_retries => {
                    attempt += 1;
                    tracing::warn!(slug = %player.slug, attempt, "slug taken at insert, regenerating");
                }
                Err(e) if e.violates(Constraint::TeamJersey) => {
                    return Err(field_error("jersey_number", "already taken in this team"));
                }
                Err(e) if e.violates(Constraint::TeamPlayerName) => {
                    return Err(field_error("name", DUPLICATE_NAME));
                }
                Err(e) => return Err(e.into()),
            }
        }

        tracing::info!(actor = %actor.user_id(), player = %player.id, slug = %player.slug, "player added");
        Ok(player)
    }

    /// Bulk import a CSV upload into a team.
    pub fn import_players(
        &self,
        actor: &Actor,
        team_id: TeamId,
        upload: &[u8],
        now: DateTime<Utc>,
    ) -> Result<ImportReport, RosterError> {
        let pipeline = ImportPipeline::new(&self.store, &self.import);
        Ok(pipeline.run(team_id, upload, Some(actor.user_id()), now)?)
    }

    pub fn team_summary(&self, team_id: TeamId, today: NaiveDate) -> Result<TeamSummary, RosterError> {
        if self.store.team(team_id)?.is_none() {
            return Err(RosterError::NotFound("team"));
        }
        let players = self.store.players_in_team(team_id)?;
        Ok(TeamSummary::build(players, today))
    }

    fn require_admin(&self, actor: &Actor, operation: &'static str) -> Result<(), RosterError> {
        require(actor, Permission::Admin).map_err(|e| {
            tracing::warn!(actor = %actor.user_id(), operation, "denied");
            RosterError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use roster_auth::{PermissionSet, RoleName, RoleRegistry};
    use roster_core::UserId;

    use super::*;
    use crate::store::InMemoryRosterStore;

    fn actor(role: RoleName) -> Actor {
        let registry = RoleRegistry::seeded();
        let perms: PermissionSet = registry.permissions_of(&role);
        Actor::new(UserId::new(), role, perms)
    }

    fn service() -> RosterService<InMemoryRosterStore> {
        RosterService::new(InMemoryRosterStore::new(), ImportConfig::default())
    }

    #[test]
    fn only_admins_manage_teams() {
        let svc = service();
        let manager = actor(RoleName::MANAGER);
        assert_eq!(
            svc.create_team(&manager, NewTeam::named("Leones"), Utc::now()).unwrap_err(),
            RosterError::Denied
        );

        let admin = actor(RoleName::ADMIN);
        let team = svc.create_team(&admin, NewTeam::named("Leones"), Utc::now()).unwrap();
        assert_eq!(team.created_by, Some(admin.user_id()));
        assert_eq!(svc.delete_team(&manager, team.id).unwrap_err(), RosterError::Denied);
        assert_eq!(svc.delete_team(&admin, team.id).unwrap(), 0);
        assert_eq!(svc.delete_team(&admin, team.id).unwrap_err(), RosterError::NotFound("team"));
    }

    #[test]
    fn invalid_team_is_reported_per_field() {
        let svc = service();
        let err = svc
            .create_team(&actor(RoleName::ADMIN), NewTeam::named("X"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, RosterError::Invalid(e) if e.has_field("name")));
    }

    #[test]
    fn add_player_allocates_slug_and_guards_jersey() {
        let svc = service();
        let admin = actor(RoleName::ADMIN);
        let scout = actor(RoleName::REGULAR);
        let leones = svc.create_team(&admin, NewTeam::named("Leones"), Utc::now()).unwrap();
        let tigres = svc.create_team(&admin, NewTeam::named("Tigres"), Utc::now()).unwrap();

        let mut draft = PlayerDraft::new(leones.id, "John Smith");
        draft.jersey_number = Some(23);
        let first = svc.add_player(&scout, draft.clone(), Utc::now()).unwrap();
        assert_eq!(first.slug, "john-smith");
        assert_eq!(first.created_by, Some(scout.user_id()));

        draft.name = "Juan Smith".to_string();
        let err = svc.add_player(&scout, draft.clone(), Utc::now()).unwrap_err();
        assert!(matches!(err, RosterError::Invalid(e) if e.has_field("jersey_number")));

        draft.team_id = tigres.id;
        draft.name = "John Smith".to_string();
        let second = svc.add_player(&scout, draft, Utc::now()).unwrap();
        assert_eq!(second.slug, "john-smith-1");
    }

    #[test]
    fn add_player_rejects_a_name_already_on_the_team() {
        let svc = service();
        let admin = actor(RoleName::ADMIN);
        let team = svc.create_team(&admin, NewTeam::named("Leones"), Utc::now()).unwrap();
        svc.add_player(&admin, PlayerDraft::new(team.id, "Ana Rivas"), Utc::now())
            .unwrap();

        let err = svc
            .add_player(&admin, PlayerDraft::new(team.id, "  Ana Rivas "), Utc::now())
            .unwrap_err();
        assert!(matches!(&err, RosterError::Invalid(e) if e.has_field("name") && !e.has_field("jersey_number")));
        assert_eq!(svc.store().players_in_team(team.id).unwrap().len(), 1);
    }

    #[test]
    fn add_player_needs_a_team() {
        let svc = service();
        let draft = PlayerDraft::new(TeamId::new(), "John Smith");
        assert_eq!(
            svc.add_player(&actor(RoleName::REGULAR), draft, Utc::now()).unwrap_err(),
            RosterError::NotFound("team")
        );
    }

    #[test]
    fn summary_reflects_stored_players() {
        let svc = service();
        let admin = actor(RoleName::ADMIN);
        let team = svc.create_team(&admin, NewTeam::named("Leones"), Utc::now()).unwrap();

        let mut draft = PlayerDraft::new(team.id, "Ana Rivas");
        draft.date_of_birth = NaiveDate::from_ymd_opt(2000, 1, 1);
        draft.general_position = Some("CATCHER".to_string());
        svc.add_player(&admin, draft, Utc::now()).unwrap();

        let summary = svc
            .team_summary(team.id, NaiveDate::from_ymd_opt(2020, 6, 1).unwrap())
            .unwrap();
        assert_eq!(summary.player_count, 1);
        assert_eq!(summary.average_age, Some(20.0));
        assert_eq!(summary.positions[0].position, "CATCHER");
    }
}
