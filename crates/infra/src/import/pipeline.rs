use std::collections::HashSet;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord};

use roster_core::{PlayerId, TeamId, UserId};
use roster_players::{
    DateParser, Player, PlayerDraft, RosterColumns, RosterRow, RowError, SlugGenerator,
};

use super::report::{ImportFailure, ImportReport, RejectionReason, RowRejection};
use crate::config::ImportConfig;
use crate::store::{Constraint, RosterStore, StoreError};

const UTF8_BOM: char = '\u{feff}';

/// A fully decoded upload, not yet validated row by row.
#[derive(Debug, Clone)]
pub struct OpenedImport {
    team_id: TeamId,
    columns: RosterColumns,
    records: Vec<StringRecord>,
}

impl OpenedImport {
    pub fn team_id(&self) -> TeamId {
        self.team_id
    }

    pub fn rows(&self) -> usize {
        self.records.len()
    }
}

/// An accepted row waiting for commit.
#[derive(Debug, Clone)]
pub struct PendingRow {
    pub row: usize,
    pub player: Player,
}

/// Rows sorted into pending players and rejections.
#[derive(Debug, Clone)]
pub struct ProcessedImport {
    team_id: TeamId,
    rows_read: usize,
    pending: Vec<PendingRow>,
    rejections: Vec<RowRejection>,
}

impl ProcessedImport {
    pub fn pending(&self) -> &[PendingRow] {
        &self.pending
    }

    pub fn rejections(&self) -> &[RowRejection] {
        &self.rejections
    }
}

/// CSV import against a [`RosterStore`].
pub struct ImportPipeline<'s, S: ?Sized> {
    store: &'s S,
    dates: DateParser,
    slugs: SlugGenerator,
    commit_retries: usize,
}

impl<'s, S> ImportPipeline<'s, S>
where
    S: RosterStore + ?Sized,
{
    pub fn new(store: &'s S, config: &ImportConfig) -> Self {
        Self {
            store,
            dates: DateParser::default(),
            slugs: SlugGenerator::new(config.slug_probe_limit),
            commit_retries: config.commit_retries,
        }
    }

    /// Open, process and commit in one call.
    pub fn run(
        &self,
        team_id: TeamId,
        upload: &[u8],
        created_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> Result<ImportReport, ImportFailure> {
        let opened = self.open(team_id, upload)?;
        let processed = self.process(opened, created_by, now);
        self.commit(processed)
    }

    /// Check the team and decode every record of the upload.
    ///
    /// Any decode or structure problem fails the whole upload.
    pub fn open(&self, team_id: TeamId, upload: &[u8]) -> Result<OpenedImport, ImportFailure> {
        if self.store.team(team_id)?.is_none() {
            tracing::warn!(%team_id, "import rejected: unknown team");
            return Err(ImportFailure::UnknownTeam(team_id));
        }

        let text = std::str::from_utf8(upload)
            .map_err(|e| ImportFailure::Decode(format!("upload is not valid UTF-8: {e}")))?;
        let text = text.strip_prefix(UTF8_BOM).unwrap_or(text);

        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| ImportFailure::Decode(e.to_string()))?
            .clone();
        if headers.iter().all(|h| h.trim().is_empty()) {
            return Err(ImportFailure::Decode("missing header row".to_string()));
        }

        let columns = RosterColumns::from_headers(&headers);
        if !columns.has_name_column() {
            tracing::warn!(%team_id, "upload has no 'Player name' column");
        }

        let records = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ImportFailure::Decode(e.to_string()))?;

        tracing::debug!(%team_id, rows = records.len(), "upload decoded");
        Ok(OpenedImport {
            team_id,
            columns,
            records,
        })
    }

    /// Validate and transform every row. Never fails as a whole: problems
    /// become rejections attached to their row.
    pub fn process(
        &self,
        opened: OpenedImport,
        created_by: Option<UserId>,
        now: DateTime<Utc>,
    ) -> ProcessedImport {
        let OpenedImport {
            team_id,
            columns,
            records,
        } = opened;

        let mut pending: Vec<PendingRow> = Vec::new();
        let mut batch_names: HashSet<String> = HashSet::new();
        let mut batch_slugs: HashSet<String> = HashSet::new();
        let mut rejections = Vec::new();

        for (idx, record) in records.iter().enumerate() {
            let row = idx + 1;
            let cells = columns.row(record);

            match self.accept_row(team_id, cells, &batch_names, &batch_slugs) {
                Ok((draft, slug)) => {
                    let player = draft.into_player(PlayerId::new(), slug.clone(), created_by, now);
                    tracing::debug!(row, slug = %slug, "row accepted");
                    batch_names.insert(player.name.clone());
                    batch_slugs.insert(slug);
                    pending.push(PendingRow { row, player });
                }
                Err(reason) => {
                    tracing::warn!(row, %reason, "row rejected");
                    rejections.push(RowRejection { row, reason });
                }
            }
        }

        ProcessedImport {
            team_id,
            rows_read: records.len(),
            pending,
            rejections,
        }
    }

    fn accept_row(
        &self,
        team_id: TeamId,
        cells: RosterRow,
        batch_names: &HashSet<String>,
        batch_slugs: &HashSet<String>,
    ) -> Result<(PlayerDraft, String), RejectionReason> {
        let Some(name) = cells.name.clone() else {
            return Err(RejectionReason::MissingName);
        };

        let exists = batch_names.contains(&name)
            || self
                .store
                .player_name_exists(team_id, &name)
                .map_err(processing)?;
        if exists {
            return Err(RejectionReason::Duplicate { name });
        }

        let draft = cells
            .into_draft(team_id, &self.dates)
            .map_err(|e| match e {
                RowError::MissingName => RejectionReason::MissingName,
                RowError::InvalidDate { value } => RejectionReason::InvalidDate {
                    value,
                    name: name.clone(),
                },
            })?;

        let slug = self
            .slugs
            .generate(&draft.name, |candidate| {
                if batch_slugs.contains(candidate) {
                    return Ok(true);
                }
                self.store.slug_exists(candidate)
            })
            .map_err(processing)?;

        Ok((draft, slug))
    }

    /// Persist pending players in one batch.
    ///
    /// A slug conflict means another writer took a slug after it was probed:
    /// slugs are regenerated and the batch retried, up to the configured
    /// number of times. A name conflict means another writer added the same
    /// player to the team: that row is rejected as a duplicate and the rest
    /// of the batch retried.
    pub fn commit(&self, processed: ProcessedImport) -> Result<ImportReport, ImportFailure> {
        let ProcessedImport {
            team_id,
            rows_read,
            mut pending,
            mut rejections,
        } = processed;

        let mut attempt = 0;
        while !pending.is_empty() {
            let batch: Vec<Player> = pending.iter().map(|p| p.player.clone()).collect();
            match self.store.insert_players(batch) {
                Ok(()) => break,
                Err(e) if e.violates(Constraint::TeamPlayerName) => {
                    let Some(rejection) = take_late_duplicate(&mut pending, &e) else {
                        tracing::error!(%team_id, error = %e, "import commit failed");
                        return Err(ImportFailure::Persistence(e));
                    };
                    tracing::warn!(%team_id, row = rejection.row, reason = %rejection.reason, "row rejected at commit");
                    let at = rejections.partition_point(|r| r.row < rejection.row);
                    rejections.insert(at, rejection);
                }
                Err(e) if e.violates(Constraint::PlayerSlug) && attempt < self.commit_retries => {
                    attempt += 1;
                    tracing::warn!(%team_id, attempt, error = %e, "slug conflict at commit, regenerating");
                    self.reassign_slugs(&mut pending)?;
                }
                Err(e) => {
                    tracing::error!(%team_id, error = %e, "import commit failed");
                    return Err(ImportFailure::Persistence(e));
                }
            }
        }

        let created: Vec<PlayerId> = pending.iter().map(|p| p.player.id).collect();
        if created.is_empty() {
            tracing::info!(%team_id, rows_read, rejected = rejections.len(), "import finished, nothing to save");
        } else {
            tracing::info!(
                %team_id,
                rows_read,
                accepted = created.len(),
                rejected = rejections.len(),
                "import committed"
            );
        }

        Ok(ImportReport {
            team_id,
            rows_read,
            accepted: created.len(),
            created,
            rejections,
        })
    }

    fn reassign_slugs(&self, pending: &mut [PendingRow]) -> Result<(), ImportFailure> {
        let mut assigned: HashSet<String> = HashSet::new();
        for PendingRow { player, .. } in pending.iter_mut() {
            let slug = self.slugs.generate(&player.name, |candidate| {
                if assigned.contains(candidate) {
                    return Ok::<bool, StoreError>(true);
                }
                self.store.slug_exists(candidate)
            })?;
            assigned.insert(slug.clone());
            player.slug = slug;
        }
        Ok(())
    }
}

/// Pull the row named by a late name violation out of the batch. The last
/// matching row is taken, so an earlier row of the same batch is kept.
fn take_late_duplicate(pending: &mut Vec<PendingRow>, err: &StoreError) -> Option<RowRejection> {
    let StoreError::UniqueViolation { value, .. } = err else {
        return None;
    };
    let idx = pending.iter().rposition(|p| &p.player.name == value)?;
    let PendingRow { row, player } = pending.remove(idx);
    Some(RowRejection {
        row,
        reason: RejectionReason::Duplicate { name: player.name },
    })
}

fn processing(e: impl core::fmt::Display) -> RejectionReason {
    RejectionReason::Processing {
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use roster_players::{NewTeam, Team};

    use super::*;
    use crate::store::InMemoryRosterStore;

    fn store_with_team() -> (InMemoryRosterStore, TeamId) {
        let store = InMemoryRosterStore::new();
        let team = Team::create(TeamId::new(), NewTeam::named("Leones"), None, Utc::now()).unwrap();
        let id = team.id;
        store.insert_team(team).unwrap();
        (store, id)
    }

    #[test]
    fn bom_is_tolerated() {
        let (store, team) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());
        let upload = "\u{feff}Player name,DOB\nAna Rivas,01/02/1990\n";

        let report = pipeline.run(team, upload.as_bytes(), None, Utc::now()).unwrap();
        assert_eq!(report.accepted, 1);
        assert!(store.slug_exists("ana-rivas").unwrap());
    }

    #[test]
    fn empty_upload_has_no_header() {
        let (store, team) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());
        let err = pipeline.open(team, b"").unwrap_err();
        assert!(matches!(err, ImportFailure::Decode(_)));
    }

    #[test]
    fn unknown_team_fails_before_reading() {
        let (store, _) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());
        let other = TeamId::new();
        assert_eq!(
            pipeline.open(other, b"\xff\xfe").unwrap_err(),
            ImportFailure::UnknownTeam(other)
        );
    }

    #[test]
    fn duplicate_names_inside_one_upload() {
        let (store, team) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());
        let upload = "Player name\nAna\nAna\nana\n";

        let report = pipeline.run(team, upload.as_bytes(), None, Utc::now()).unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(
            report.rejections,
            vec![RowRejection {
                row: 2,
                reason: RejectionReason::Duplicate {
                    name: "Ana".to_string()
                }
            }]
        );

        let slugs: Vec<String> = store
            .players_in_team(team)
            .unwrap()
            .into_iter()
            .map(|p| p.slug)
            .collect();
        assert_eq!(slugs, vec!["ana", "ana-1"]);
    }

    #[test]
    fn bad_dates_reject_but_blank_dates_do_not() {
        let (store, team) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());
        let upload = "Player name,DOB\nAna,\nBea,31/02/2001\nCai,2000-12-31\n";

        let report = pipeline.run(team, upload.as_bytes(), None, Utc::now()).unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(
            report.rejections[0].reason,
            RejectionReason::InvalidDate {
                value: "31/02/2001".to_string(),
                name: "Bea".to_string()
            }
        );
    }

    #[test]
    fn all_rows_rejected_persists_nothing() {
        let (store, team) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());
        let upload = "Name,Bats\nAna,R\nBea,L\n";

        let report = pipeline.run(team, upload.as_bytes(), None, Utc::now()).unwrap();
        assert_eq!(report.accepted, 0);
        assert_eq!(report.rejected(), 2);
        assert!(report.created.is_empty());
        assert!(store.players_in_team(team).unwrap().is_empty());
    }

    #[test]
    fn processing_keeps_phases_separate() {
        let (store, team) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());
        let opened = pipeline.open(team, b"Player name\nAna\n,\n").unwrap();
        assert_eq!(opened.rows(), 2);

        let processed = pipeline.process(opened, None, Utc::now());
        assert_eq!(processed.pending().len(), 1);
        assert_eq!(processed.rejections().len(), 1);
        assert!(!store.slug_exists("ana").unwrap());

        pipeline.commit(processed).unwrap();
        assert!(store.slug_exists("ana").unwrap());
    }

    #[test]
    fn name_taken_between_process_and_commit_rejects_the_row() {
        let (store, team) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());

        let first = pipeline.open(team, b"Player name\nAna\n").unwrap();
        let first = pipeline.process(first, None, Utc::now());
        let second = pipeline
            .open(team, b"Player name,Bats\nBea,R\nAna,R\n,R\nCai,L\n")
            .unwrap();
        let second = pipeline.process(second, None, Utc::now());
        assert_eq!(second.pending().len(), 3);
        assert_eq!(second.pending()[1].row, 2);

        assert_eq!(pipeline.commit(first).unwrap().accepted, 1);
        let report = pipeline.commit(second).unwrap();

        assert_eq!(report.accepted, 2);
        assert_eq!(
            report.rejections,
            vec![
                RowRejection {
                    row: 2,
                    reason: RejectionReason::Duplicate {
                        name: "Ana".to_string()
                    }
                },
                RowRejection {
                    row: 3,
                    reason: RejectionReason::MissingName
                },
            ]
        );

        let names: Vec<String> = store
            .players_in_team(team)
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Ana", "Bea", "Cai"]);
    }

    #[test]
    fn late_duplicates_can_empty_the_batch() {
        let (store, team) = store_with_team();
        let pipeline = ImportPipeline::new(&store, &ImportConfig::default());

        let first = pipeline.open(team, b"Player name\nAna\n").unwrap();
        let first = pipeline.process(first, None, Utc::now());
        let second = pipeline.open(team, b"Player name\nAna\n").unwrap();
        let second = pipeline.process(second, None, Utc::now());

        pipeline.commit(first).unwrap();
        let report = pipeline.commit(second).unwrap();
        assert_eq!(report.accepted, 0);
        assert!(report.created.is_empty());
        assert_eq!(report.rejections.len(), 1);
        assert_eq!(store.players_in_team(team).unwrap().len(), 1);
    }
}
