//! Operator CLI for seeding and repairing tournament brackets.
//!
//! Every command prints its result as JSON on stdout; logs go to stderr.

mod commands;
mod config;
mod logging;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Error};
use pico_args::Arguments;
use serde::Serialize;
use tourney_bracket::{
    bracket::{BracketEditor, BracketError, PgBracketStore},
    db::Database,
    seeding::{Participant, PgRankingSource, SeedingEngine, SeedingError},
};

use commands::{Command, Invocation};
use config::AdminConfig;

const HELP: &str = "\
Seed, inspect and repair tournament brackets

USAGE:
  tb_admin <COMMAND> [OPTIONS]

COMMANDS:
  seed      --participants FILE [--method random|ranked]   Seed a JSON roster
  validate  --stage ID                                     Report structural problems
  repair    --stage ID                                     Cancel scheduled matches left empty
  swap      --a MATCH --b MATCH                            Exchange the slots of two matches
  move      --participant ID --from MATCH --to MATCH [--slot 1|2]
                                                           Relocate one participant
  remove    --match MATCH --participant ID                 Vacate a participant's slot
  audit     --stage ID [--operation KIND] [--limit N]      Show the audit trail, newest first

OPTIONS:
  --db-url     URL         Database connection string  [default: env DATABASE_URL]
  --actor      ID          Acting user for audit entries  [default: env TB_ACTOR_ID]
  --migrate                Apply pending migrations first  [default: env TB_RUN_MIGRATIONS]

FLAGS:
  -h, --help               Print help information

EXIT STATUS:
  0  success
  1  configuration, storage or unexpected failure
  2  the request was rejected (guard check, unknown participant, bad roster)
";

const EXIT_REJECTED: u8 = 2;

#[tokio::main]
async fn main() -> Result<ExitCode, Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        return Ok(ExitCode::SUCCESS);
    }

    let invocation = commands::parse(pargs)?;

    logging::init();

    let config = AdminConfig::from_env(
        invocation.database_url.clone(),
        invocation.actor_id,
        invocation.migrate,
    )?;
    config.validate()?;

    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        db.migrate().await.context("Failed to run migrations")?;
        tracing::info!("Migrations applied");
    }

    let name = invocation.command.name();
    let started = Instant::now();
    let result = run(invocation, &config, &db).await;
    logging::log_command(name, started.elapsed(), result.is_ok());

    db.close().await;

    match result {
        Ok(output) => {
            println!("{output}");
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match rejection_message(&err) {
            Some(message) => {
                eprintln!("Rejected: {message}");
                Ok(ExitCode::from(EXIT_REJECTED))
            }
            None => Err(err),
        },
    }
}

/// Run one command and render its result as pretty JSON
async fn run(invocation: Invocation, config: &AdminConfig, db: &Database) -> Result<String, Error> {
    let pool = Arc::new(db.pool().clone());

    let mut editor = BracketEditor::new(PgBracketStore::new(pool.clone()));
    if let Some(actor_id) = config.actor_id {
        editor = editor.acting_as(actor_id);
    } else if invocation.command.is_mutating() {
        tracing::warn!("No acting user configured; audit entries will carry no actor");
    }

    match invocation.command {
        Command::Seed {
            method,
            participants,
        } => {
            let raw = tokio::fs::read_to_string(&participants)
                .await
                .with_context(|| format!("Failed to read {}", participants.display()))?;
            let roster: Vec<Participant> = serde_json::from_str(&raw)
                .with_context(|| format!("Invalid roster in {}", participants.display()))?;

            let rankings = PgRankingSource::new(pool);
            let seeded = SeedingEngine::new().seed(roster, method, &rankings).await?;
            render(&seeded)
        }
        Command::Validate { stage_id } => render(&editor.validate_bracket(stage_id).await?),
        Command::Repair { stage_id } => render(&editor.repair_bracket(stage_id).await?),
        Command::Swap { match_a, match_b } => {
            editor.swap_participants(match_a, match_b).await?;
            render(&serde_json::json!({ "swapped": [match_a, match_b] }))
        }
        Command::Move {
            participant_id,
            from_match,
            to_match,
            slot,
        } => {
            editor
                .move_participant(participant_id, from_match, to_match, slot)
                .await?;
            render(&serde_json::json!({
                "moved": participant_id,
                "from_match": from_match,
                "to_match": to_match,
            }))
        }
        Command::Remove {
            match_id,
            participant_id,
        } => {
            editor.remove_participant(match_id, participant_id).await?;
            render(&serde_json::json!({ "removed": participant_id, "match_id": match_id }))
        }
        Command::Audit {
            stage_id,
            operation,
            limit,
        } => render(&editor.audit_log(stage_id, operation, limit).await?),
    }
}

fn render<T: Serialize>(value: &T) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Sanitized message for errors caused by the request rather than the system
fn rejection_message(err: &Error) -> Option<String> {
    if let Some(err) = err.downcast_ref::<BracketError>() {
        return err.is_client_error().then(|| err.client_message());
    }
    if let Some(err) = err.downcast_ref::<SeedingError>() {
        return err.is_client_error().then(|| err.client_message());
    }
    None
}
