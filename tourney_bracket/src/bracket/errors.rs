//! Bracket editor error types.

use thiserror::Error;

use super::models::{MatchId, MatchStatus, ParticipantId};

/// Bracket editor errors
#[derive(Debug, Error)]
pub enum BracketError {
    /// Mutation attempted on a live or completed match
    #[error("Match {match_id} is {status} and cannot be edited")]
    InvalidState {
        match_id: MatchId,
        status: MatchStatus,
    },

    /// Referenced participant is not seated in the referenced match
    #[error("Participant {participant_id} not found in match {match_id}")]
    ParticipantNotFound {
        participant_id: ParticipantId,
        match_id: MatchId,
    },

    /// Destination has no empty slot and none was specified
    #[error("Match {0} has no available slot")]
    NoAvailableSlot(MatchId),

    /// Match not found
    #[error("Match not found: {0}")]
    MatchNotFound(MatchId),

    /// Swap requested between a match and itself
    #[error("Cannot swap match {0} with itself")]
    SameMatch(MatchId),

    /// Participant is already seated in the destination match
    #[error("Participant {participant_id} is already seated in match {match_id}")]
    AlreadySeated {
        participant_id: ParticipantId,
        match_id: MatchId,
    },

    /// Matches from different stages referenced in one edit
    #[error("Matches {first} and {second} belong to different stages")]
    StageMismatch { first: MatchId, second: MatchId },

    /// Stored status string is not a known lifecycle state
    #[error("Unknown match status: {0}")]
    UnknownStatus(String),

    /// Stored operation string is not a known audit operation
    #[error("Unknown audit operation: {0}")]
    UnknownOperation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Snapshot serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BracketError {
    /// Whether the error is an expected validation failure caused by the request
    ///
    /// Anything else is a storage or serialization fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            BracketError::InvalidState { .. }
                | BracketError::ParticipantNotFound { .. }
                | BracketError::NoAvailableSlot(_)
                | BracketError::MatchNotFound(_)
                | BracketError::SameMatch(_)
                | BracketError::StageMismatch { .. }
                | BracketError::AlreadySeated { .. }
        )
    }

    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            "Internal server error".to_string()
        }
    }
}

/// Result type for bracket operations
pub type BracketResult<T> = Result<T, BracketError>;
