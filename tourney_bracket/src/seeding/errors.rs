//! Seeding error types.

use thiserror::Error;

use super::models::ParticipantId;

/// Seeding errors
#[derive(Debug, Error)]
pub enum SeedingError {
    /// Nothing to seed
    #[error("No participants to seed")]
    NoParticipants,

    /// The same participant was listed more than once
    #[error("Participant {0} is listed more than once")]
    DuplicateParticipant(ParticipantId),

    /// Ranked seeding requested with individual participants present
    #[error("Ranked seeding requires team participants; individual participants: {}", join_ids(.0))]
    MixedParticipantType(Vec<ParticipantId>),

    /// Ranked seeding requested for teams without ranking data
    #[error("Missing ranking data for participants: {}", join_ids(.0))]
    MissingRankingData(Vec<ParticipantId>),

    /// Seeding method name not recognized
    #[error("Unknown seeding method: {0}")]
    UnknownMethod(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl SeedingError {
    /// Whether the error is an expected validation failure caused by the request
    pub fn is_client_error(&self) -> bool {
        !matches!(self, SeedingError::Database(_))
    }

    /// Get a client-safe error message that doesn't leak storage details
    pub fn client_message(&self) -> String {
        match self {
            SeedingError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

fn join_ids(ids: &[ParticipantId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for seeding operations
pub type SeedingResult<T> = Result<T, SeedingError>;
