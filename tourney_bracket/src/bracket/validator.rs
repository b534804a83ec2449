//! Read-only structural checks over a stage's matches.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::models::{Match, MatchStatus, ParticipantId};

/// Outcome of a bracket validation scan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `true` when `errors` is empty; warnings never affect validity
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Validate a stage's matches
///
/// Errors:
/// - a match that is not cancelled while both slots are byes
/// - a participant seated in more than one match of the same round
///
/// Warnings:
/// - a round that still has unfinished matches while a later round already
///   has a completed match
///
/// Messages are produced in round order, then match order, so repeated scans
/// of the same rows yield identical reports.
pub fn validate(matches: &[Match]) -> ValidationReport {
    let mut sorted: Vec<&Match> = matches.iter().collect();
    sorted.sort_by_key(|m| (m.round_number, m.match_number, m.id));

    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for m in &sorted {
        if m.is_empty() && m.status != MatchStatus::Cancelled {
            errors.push(format!(
                "Match {} has no participants but is {} instead of cancelled",
                m.label(),
                m.status
            ));
        }
    }

    // round -> participant -> matches seating them
    let mut seats: BTreeMap<u32, BTreeMap<ParticipantId, Vec<&Match>>> = BTreeMap::new();
    for m in &sorted {
        for participant_id in m.participant_ids() {
            seats
                .entry(m.round_number)
                .or_default()
                .entry(participant_id)
                .or_default()
                .push(m);
        }
    }
    for (round, participants) in &seats {
        for (participant_id, seated_in) in participants {
            if seated_in.len() > 1 {
                let labels: Vec<String> = seated_in.iter().map(|m| m.label()).collect();
                errors.push(format!(
                    "Participant {} appears {} times in round {}: {}",
                    participant_id,
                    seated_in.len(),
                    round,
                    labels.join(", ")
                ));
            }
        }
    }

    let unfinished_rounds: BTreeSet<u32> = sorted
        .iter()
        .filter(|m| !m.status.is_terminal())
        .map(|m| m.round_number)
        .collect();
    let latest_completed_round = sorted
        .iter()
        .filter(|m| m.status == MatchStatus::Completed)
        .map(|m| m.round_number)
        .max();
    if let Some(latest) = latest_completed_round {
        for round in unfinished_rounds.range(..latest) {
            warnings.push(format!(
                "Round {round} still has unfinished matches while round {latest} already has completed matches"
            ));
        }
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}
