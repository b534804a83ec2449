//! Command-line parsing for the admin CLI.

use pico_args::Arguments;
use std::ffi::OsString;
use std::path::PathBuf;

use tourney_bracket::bracket::{AuditOperation, MatchId, SlotPosition, StageId, UserId};
use tourney_bracket::seeding::{ParticipantId, SeedingMethod};

const DEFAULT_AUDIT_LIMIT: i64 = 50;

/// Admin command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Seed {
        method: SeedingMethod,
        participants: PathBuf,
    },
    Validate {
        stage_id: StageId,
    },
    Repair {
        stage_id: StageId,
    },
    Swap {
        match_a: MatchId,
        match_b: MatchId,
    },
    Move {
        participant_id: ParticipantId,
        from_match: MatchId,
        to_match: MatchId,
        slot: Option<SlotPosition>,
    },
    Remove {
        match_id: MatchId,
        participant_id: ParticipantId,
    },
    Audit {
        stage_id: StageId,
        operation: Option<AuditOperation>,
        limit: i64,
    },
}

impl Command {
    /// Command name as typed on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Command::Seed { .. } => "seed",
            Command::Validate { .. } => "validate",
            Command::Repair { .. } => "repair",
            Command::Swap { .. } => "swap",
            Command::Move { .. } => "move",
            Command::Remove { .. } => "remove",
            Command::Audit { .. } => "audit",
        }
    }

    /// Whether the command writes to the bracket
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Command::Repair { .. }
                | Command::Swap { .. }
                | Command::Move { .. }
                | Command::Remove { .. }
        )
    }
}

/// Parsed invocation: one command plus global options
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub command: Command,
    pub database_url: Option<String>,
    pub actor_id: Option<UserId>,
    pub migrate: bool,
}

/// Command-line parsing errors
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("No command given (see --help)")]
    MissingCommand,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unexpected arguments: {0:?}")]
    UnexpectedArguments(Vec<OsString>),

    #[error(transparent)]
    Args(#[from] pico_args::Error),
}

/// Parse a full invocation
///
/// The command comes first, followed by its options and any global options.
pub fn parse(mut pargs: Arguments) -> Result<Invocation, CommandError> {
    let name = pargs.subcommand()?.ok_or(CommandError::MissingCommand)?;

    let command = match name.as_str() {
        "seed" => Command::Seed {
            method: pargs
                .opt_value_from_str("--method")?
                .unwrap_or(SeedingMethod::Random),
            participants: pargs.value_from_str("--participants")?,
        },
        "validate" => Command::Validate {
            stage_id: pargs.value_from_str("--stage")?,
        },
        "repair" => Command::Repair {
            stage_id: pargs.value_from_str("--stage")?,
        },
        "swap" => Command::Swap {
            match_a: pargs.value_from_str("--a")?,
            match_b: pargs.value_from_str("--b")?,
        },
        "move" => Command::Move {
            participant_id: pargs.value_from_str("--participant")?,
            from_match: pargs.value_from_str("--from")?,
            to_match: pargs.value_from_str("--to")?,
            slot: pargs.opt_value_from_fn("--slot", parse_slot)?,
        },
        "remove" => Command::Remove {
            match_id: pargs.value_from_str("--match")?,
            participant_id: pargs.value_from_str("--participant")?,
        },
        "audit" => Command::Audit {
            stage_id: pargs.value_from_str("--stage")?,
            operation: pargs.opt_value_from_str("--operation")?,
            limit: pargs
                .opt_value_from_str("--limit")?
                .unwrap_or(DEFAULT_AUDIT_LIMIT),
        },
        other => return Err(CommandError::UnknownCommand(other.to_string())),
    };

    let invocation = Invocation {
        command,
        database_url: pargs.opt_value_from_str("--db-url")?,
        actor_id: pargs.opt_value_from_str("--actor")?,
        migrate: pargs.contains("--migrate"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(CommandError::UnexpectedArguments(remaining));
    }

    Ok(invocation)
}

fn parse_slot(value: &str) -> Result<SlotPosition, String> {
    value
        .parse::<u8>()
        .ok()
        .and_then(SlotPosition::from_number)
        .ok_or_else(|| format!("slot must be 1 or 2, got {value:?}"))
}
