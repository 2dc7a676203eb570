//! Command-line entry point for one-off roster jobs.
//!
//! Storage is in-memory, so every run starts from the bootstrap admin and an
//! empty roster.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;

use roster_infra::services::{RosterService, UserAdministration};
use roster_infra::store::{InMemoryRosterStore, InMemoryUserStore, SharedRoleRegistry};
use roster_infra::AppConfig;
use roster_players::NewTeam;

const USAGE: &str = "usage:
  roster-admin import <file.csv> [team name]
  roster-admin config";

fn main() -> Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    roster_observability::init(&config.log.filter, config.log.format);

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("import") => {
            let Some(path) = args.get(1) else {
                bail!("missing CSV path\n{USAGE}");
            };
            let team = args.get(2).map(String::as_str).unwrap_or("Imported");
            import(&config, Path::new(path), team)
        }
        Some("config") => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
        _ => bail!("{USAGE}"),
    }
}

fn import(config: &AppConfig, path: &Path, team_name: &str) -> Result<()> {
    let upload = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;

    let users = UserAdministration::new(
        Arc::new(InMemoryUserStore::new()),
        SharedRoleRegistry::default(),
        config.admin.clone(),
    );
    let admin = users
        .bootstrap_admin(Utc::now())?
        .context("admin account was not created")?;
    let actor = users.actor(admin.id)?;

    let roster = RosterService::new(Arc::new(InMemoryRosterStore::new()), config.import);
    let team = roster.create_team(&actor, NewTeam::named(team_name), Utc::now())?;

    let report = roster
        .import_players(&actor, team.id, &upload, Utc::now())
        .with_context(|| format!("importing {}", path.display()))?;

    tracing::info!(team = %team.id, accepted = report.accepted, rejected = report.rejected(), "import done");
    println!(
        "Imported {} players to {} ({} rows rejected)",
        report.accepted,
        team.name,
        report.rejected()
    );
    for line in report.preview(config.import.preview_limit).lines() {
        println!("  {line}");
    }

    let summary = roster.team_summary(team.id, Utc::now().date_naive())?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
