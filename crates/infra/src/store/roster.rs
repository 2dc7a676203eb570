use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use roster_core::{PlayerId, TeamId};
use roster_players::{Player, Team};

use super::{Constraint, StoreError};

/// Team and player persistence.
pub trait RosterStore: Send + Sync {
    fn insert_team(&self, team: Team) -> Result<(), StoreError>;
    fn team(&self, id: TeamId) -> Result<Option<Team>, StoreError>;
    fn teams(&self) -> Result<Vec<Team>, StoreError>;
    /// Remove a team and every player on it. Returns the number of players
    /// removed.
    fn delete_team(&self, id: TeamId) -> Result<usize, StoreError>;

    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError>;
    fn player_by_slug(&self, slug: &str) -> Result<Option<Player>, StoreError>;
    /// Players of a team in insertion order.
    fn players_in_team(&self, team_id: TeamId) -> Result<Vec<Player>, StoreError>;
    /// Exact, case-sensitive name match within a team.
    fn player_name_exists(&self, team_id: TeamId, name: &str) -> Result<bool, StoreError>;
    fn slug_exists(&self, slug: &str) -> Result<bool, StoreError>;
    fn jersey_taken(&self, team_id: TeamId, jersey: u8) -> Result<bool, StoreError>;

    /// Insert all players or none.
    fn insert_players(&self, players: Vec<Player>) -> Result<(), StoreError>;
}

impl<S> RosterStore for Arc<S>
where
    S: RosterStore + ?Sized,
{
    fn insert_team(&self, team: Team) -> Result<(), StoreError> {
        (**self).insert_team(team)
    }

    fn team(&self, id: TeamId) -> Result<Option<Team>, StoreError> {
        (**self).team(id)
    }

    fn teams(&self) -> Result<Vec<Team>, StoreError> {
        (**self).teams()
    }

    fn delete_team(&self, id: TeamId) -> Result<usize, StoreError> {
        (**self).delete_team(id)
    }

    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        (**self).player(id)
    }

    fn player_by_slug(&self, slug: &str) -> Result<Option<Player>, StoreError> {
        (**self).player_by_slug(slug)
    }

    fn players_in_team(&self, team_id: TeamId) -> Result<Vec<Player>, StoreError> {
        (**self).players_in_team(team_id)
    }

    fn player_name_exists(&self, team_id: TeamId, name: &str) -> Result<bool, StoreError> {
        (**self).player_name_exists(team_id, name)
    }

    fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        (**self).slug_exists(slug)
    }

    fn jersey_taken(&self, team_id: TeamId, jersey: u8) -> Result<bool, StoreError> {
        (**self).jersey_taken(team_id, jersey)
    }

    fn insert_players(&self, players: Vec<Player>) -> Result<(), StoreError> {
        (**self).insert_players(players)
    }
}

#[derive(Debug, Default)]
struct RosterState {
    teams: Vec<Team>,
    players: Vec<Player>,
    slugs: HashMap<String, PlayerId>,
    jerseys: HashSet<(TeamId, u8)>,
    names: HashSet<(TeamId, String)>,
}

impl RosterState {
    fn has_team(&self, id: TeamId) -> bool {
        self.teams.iter().any(|t| t.id == id)
    }

    /// Check a batch against current indexes and against itself.
    fn check_batch(&self, players: &[Player]) -> Result<(), StoreError> {
        let mut ids = HashSet::new();
        let mut slugs = HashSet::new();
        let mut jerseys = HashSet::new();
        let mut names = HashSet::new();

        for p in players {
            if !self.has_team(p.team_id) {
                return Err(StoreError::NotFound("team"));
            }
            if !ids.insert(p.id) || self.players.iter().any(|e| e.id == p.id) {
                return Err(StoreError::unique(Constraint::PlayerId, p.id.to_string()));
            }
            let name = (p.team_id, p.name.clone());
            if self.names.contains(&name) || !names.insert(name) {
                return Err(StoreError::unique(Constraint::TeamPlayerName, p.name.clone()));
            }
            if !slugs.insert(p.slug.as_str()) || self.slugs.contains_key(&p.slug) {
                return Err(StoreError::unique(Constraint::PlayerSlug, p.slug.clone()));
            }
            if let Some(jersey) = p.jersey_number {
                let key = (p.team_id, jersey);
                if !jerseys.insert(key) || self.jerseys.contains(&key) {
                    return Err(StoreError::unique(Constraint::TeamJersey, jersey.to_string()));
                }
            }
        }
        Ok(())
    }
}

/// In-memory roster store.
///
/// All indexes sit behind one lock so a batch insert is checked and applied
/// atomically.
#[derive(Debug, Default)]
pub struct InMemoryRosterStore {
    inner: RwLock<RosterState>,
}

impl InMemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RosterStore for InMemoryRosterStore {
    fn insert_team(&self, team: Team) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| StoreError::poisoned())?;
        if state.has_team(team.id) {
            return Err(StoreError::unique(Constraint::TeamId, team.id.to_string()));
        }
        state.teams.push(team);
        Ok(())
    }

    fn team(&self, id: TeamId) -> Result<Option<Team>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(state.teams.iter().find(|t| t.id == id).cloned())
    }

    fn teams(&self) -> Result<Vec<Team>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::poisoned())?;
        let mut teams = state.teams.clone();
        teams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(teams)
    }

    fn delete_team(&self, id: TeamId) -> Result<usize, StoreError> {
        let mut state = self.inner.write().map_err(|_| StoreError::poisoned())?;
        if !state.has_team(id) {
            return Err(StoreError::NotFound("team"));
        }

        let state = &mut *state;
        let before = state.players.len();
        let slugs = &mut state.slugs;
        state.players.retain(|p| {
            let keep = p.team_id != id;
            if !keep {
                slugs.remove(&p.slug);
            }
            keep
        });
        state.jerseys.retain(|(team_id, _)| *team_id != id);
        state.names.retain(|(team_id, _)| *team_id != id);
        state.teams.retain(|t| t.id != id);

        Ok(before - state.players.len())
    }

    fn player(&self, id: PlayerId) -> Result<Option<Player>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(state.players.iter().find(|p| p.id == id).cloned())
    }

    fn player_by_slug(&self, slug: &str) -> Result<Option<Player>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::poisoned())?;
        let Some(id) = state.slugs.get(slug) else {
            return Ok(None);
        };
        Ok(state.players.iter().find(|p| p.id == *id).cloned())
    }

    fn players_in_team(&self, team_id: TeamId) -> Result<Vec<Player>, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(state
            .players
            .iter()
            .filter(|p| p.team_id == team_id)
            .cloned()
            .collect())
    }

    fn player_name_exists(&self, team_id: TeamId, name: &str) -> Result<bool, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(state.names.contains(&(team_id, name.to_string())))
    }

    fn slug_exists(&self, slug: &str) -> Result<bool, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(state.slugs.contains_key(slug))
    }

    fn jersey_taken(&self, team_id: TeamId, jersey: u8) -> Result<bool, StoreError> {
        let state = self.inner.read().map_err(|_| StoreError::poisoned())?;
        Ok(state.jerseys.contains(&(team_id, jersey)))
    }

    fn insert_players(&self, players: Vec<Player>) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| StoreError::poisoned())?;
        state.check_batch(&players)?;

        for p in players {
            state.slugs.insert(p.slug.clone(), p.id);
            if let Some(jersey) = p.jersey_number {
                state.jerseys.insert((p.team_id, jersey));
            }
            state.names.insert((p.team_id, p.name.clone()));
            state.players.push(p);
        }
        Ok(())
    }
}
