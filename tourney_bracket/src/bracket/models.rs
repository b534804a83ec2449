//! Bracket data models: matches, slots, lifecycle states and audit entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::BracketError;

/// Match ID type
pub type MatchId = i64;

/// Stage ID type
pub type StageId = i64;

/// Participant ID type (team or individual)
pub type ParticipantId = i64;

/// Acting user ID type
pub type UserId = i64;

/// Match lifecycle state
///
/// `Scheduled -> Live -> Completed`, or `Scheduled -> Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Waiting to be played
    Scheduled,
    /// Currently being played
    Live,
    /// Finished with a recorded outcome
    Completed,
    /// Will never be played
    Cancelled,
}

impl MatchStatus {
    /// Whether no further transition is possible
    pub fn is_terminal(self) -> bool {
        matches!(self, MatchStatus::Completed | MatchStatus::Cancelled)
    }

    /// Whether participants of a match in this state are frozen
    pub fn is_locked(self) -> bool {
        matches!(self, MatchStatus::Live | MatchStatus::Completed)
    }

    /// Database representation
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MatchStatus {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "completed" => Ok(MatchStatus::Completed),
            "cancelled" => Ok(MatchStatus::Cancelled),
            other => Err(BracketError::UnknownStatus(other.to_string())),
        }
    }
}

/// Participant seated in a match slot, with its denormalized display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    pub participant_id: ParticipantId,
    pub display_name: String,
}

impl Occupant {
    pub fn new(participant_id: ParticipantId, display_name: impl Into<String>) -> Self {
        Self {
            participant_id,
            display_name: display_name.into(),
        }
    }
}

/// A match slot. `None` is a bye.
pub type Slot = Option<Occupant>;

/// Slot position within a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotPosition {
    First,
    Second,
}

impl SlotPosition {
    /// Both positions in fill order
    pub const ALL: [SlotPosition; 2] = [SlotPosition::First, SlotPosition::Second];

    /// 1-based slot number
    pub fn number(self) -> u8 {
        match self {
            SlotPosition::First => 1,
            SlotPosition::Second => 2,
        }
    }

    /// Parse a 1-based slot number
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(SlotPosition::First),
            2 => Some(SlotPosition::Second),
            _ => None,
        }
    }
}

impl std::fmt::Display for SlotPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "slot_{}", self.number())
    }
}

/// A single match row of a stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    /// Match ID
    pub id: MatchId,
    /// Owning stage
    pub stage_id: StageId,
    /// Round number (1-indexed, increasing toward the final)
    pub round_number: u32,
    /// Match number within the round (1-indexed)
    pub match_number: u32,
    pub slot_1: Slot,
    pub slot_2: Slot,
    pub status: MatchStatus,
    /// Only populated once completed
    pub winner_id: Option<ParticipantId>,
    /// Only populated once completed
    pub loser_id: Option<ParticipantId>,
}

impl Match {
    /// Create a scheduled match
    pub fn scheduled(
        id: MatchId,
        stage_id: StageId,
        round_number: u32,
        match_number: u32,
        slot_1: Slot,
        slot_2: Slot,
    ) -> Self {
        Self {
            id,
            stage_id,
            round_number,
            match_number,
            slot_1,
            slot_2,
            status: MatchStatus::Scheduled,
            winner_id: None,
            loser_id: None,
        }
    }

    pub fn slot(&self, position: SlotPosition) -> &Slot {
        match position {
            SlotPosition::First => &self.slot_1,
            SlotPosition::Second => &self.slot_2,
        }
    }

    pub fn slot_mut(&mut self, position: SlotPosition) -> &mut Slot {
        match position {
            SlotPosition::First => &mut self.slot_1,
            SlotPosition::Second => &mut self.slot_2,
        }
    }

    /// Position of the slot holding `participant_id`, if any
    pub fn position_of(&self, participant_id: ParticipantId) -> Option<SlotPosition> {
        SlotPosition::ALL.into_iter().find(|&position| {
            self.slot(position)
                .as_ref()
                .is_some_and(|occupant| occupant.participant_id == participant_id)
        })
    }

    /// First bye slot, in slot order
    pub fn first_empty_slot(&self) -> Option<SlotPosition> {
        SlotPosition::ALL
            .into_iter()
            .find(|&position| self.slot(position).is_none())
    }

    /// Both slots are byes
    pub fn is_empty(&self) -> bool {
        self.slot_1.is_none() && self.slot_2.is_none()
    }

    /// Participant IDs currently seated, in slot order
    pub fn participant_ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        [&self.slot_1, &self.slot_2]
            .into_iter()
            .flatten()
            .map(|occupant| occupant.participant_id)
    }

    /// Human-readable placement, e.g. `R1 M3 (#17)`
    pub fn label(&self) -> String {
        format!("R{} M{} (#{})", self.round_number, self.match_number, self.id)
    }
}

/// Point-in-time copy of the editable part of a match, recorded in audit entries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub match_id: MatchId,
    pub round_number: u32,
    pub match_number: u32,
    pub status: MatchStatus,
    pub slot_1: Slot,
    pub slot_2: Slot,
}

impl From<&Match> for MatchSnapshot {
    fn from(m: &Match) -> Self {
        Self {
            match_id: m.id,
            round_number: m.round_number,
            match_number: m.match_number,
            status: m.status,
            slot_1: m.slot_1.clone(),
            slot_2: m.slot_2.clone(),
        }
    }
}

/// Kind of structural edit recorded in the audit log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditOperation {
    Swap,
    Move,
    Remove,
    Repair,
}

impl AuditOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            AuditOperation::Swap => "swap",
            AuditOperation::Move => "move",
            AuditOperation::Remove => "remove",
            AuditOperation::Repair => "repair",
        }
    }
}

impl std::fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditOperation {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "swap" => Ok(AuditOperation::Swap),
            "move" => Ok(AuditOperation::Move),
            "remove" => Ok(AuditOperation::Remove),
            "repair" => Ok(AuditOperation::Repair),
            other => Err(BracketError::UnknownOperation(other.to_string())),
        }
    }
}

/// Audit entry as handed to the store, before it is assigned an ID and timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAuditEntry {
    pub operation: AuditOperation,
    pub stage_id: Option<StageId>,
    pub match_ids: Vec<MatchId>,
    pub before: serde_json::Value,
    pub after: serde_json::Value,
    pub actor_id: Option<UserId>,
}

/// Immutable, append-only audit log row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: i64,
    pub operation: AuditOperation,
    pub stage_id: Option<StageId>,
    /// Matches affected by the operation
    pub match_ids: Vec<MatchId>,
    /// Snapshots of the affected matches before the edit
    pub before: serde_json::Value,
    /// Snapshots of the affected matches after the edit
    pub after: serde_json::Value,
    pub actor_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Result of a repair sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairSummary {
    pub stage_id: StageId,
    /// Number of matches transitioned to cancelled
    pub repaired: usize,
    pub cancelled_match_ids: Vec<MatchId>,
}
