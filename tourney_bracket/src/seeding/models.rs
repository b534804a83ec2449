//! Seeding data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::SeedingError;
pub use crate::bracket::models::ParticipantId;

/// Whether a participant is team-like or an individual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    /// Team-like entrant with ranking points
    Team,
    /// Single player entrant
    Individual,
}

/// Entrant to be seeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub kind: ParticipantKind,
    /// Caller data carried through seeding untouched
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Participant {
    /// Create a team-like participant
    pub fn team(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ParticipantKind::Team,
            metadata: serde_json::Value::Null,
        }
    }

    /// Create an individual participant
    pub fn individual(id: ParticipantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: ParticipantKind::Individual,
            metadata: serde_json::Value::Null,
        }
    }

    /// Attach caller metadata
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Seeding method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Uniformly random order
    Random,
    /// Ranking points descending, deterministic tie-break
    Ranked,
}

impl std::fmt::Display for SeedingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeedingMethod::Random => write!(f, "random"),
            SeedingMethod::Ranked => write!(f, "ranked"),
        }
    }
}

impl std::str::FromStr for SeedingMethod {
    type Err = SeedingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(SeedingMethod::Random),
            "ranked" => Ok(SeedingMethod::Ranked),
            other => Err(SeedingError::UnknownMethod(other.to_string())),
        }
    }
}

/// Ranking data for one participant, as supplied by the ranking source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub participant_id: ParticipantId,
    pub total_points: i64,
    /// Stable creation timestamp; older ranks higher on equal points
    pub created_at: DateTime<Utc>,
}

/// Participant with its assigned seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeededParticipant {
    pub participant: Participant,
    /// 1 = top seed
    pub seed: u32,
    /// Ranking data the seed was derived from (`None` for random seeding)
    pub ranking: Option<RankingSnapshot>,
}
