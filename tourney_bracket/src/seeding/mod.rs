//! Seeding module producing deterministic participant orderings.
//!
//! Two methods are supported:
//! - **Random**: any permutation of the roster
//! - **Ranked**: ranking points descending, older snapshots first on ties,
//!   participant ID as the final tie-break
//!
//! ## Example
//!
//! ```no_run
//! use tourney_bracket::seeding::{Participant, PgRankingSource, SeedingEngine, SeedingMethod};
//! use tourney_bracket::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let rankings = PgRankingSource::new(Arc::new(db.pool().clone()));
//!
//!     let roster = vec![
//!         Participant::team(1, "Falcons"),
//!         Participant::team(2, "Owls"),
//!     ];
//!     let seeded = SeedingEngine::new()
//!         .seed(roster, SeedingMethod::Ranked, &rankings)
//!         .await?;
//!
//!     for s in seeded {
//!         println!("#{} {}", s.seed, s.participant.name);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod engine;
pub mod errors;
pub mod models;
pub mod ranking;

pub use engine::{SeedingEngine, rank_participants, seed_random};
pub use errors::{SeedingError, SeedingResult};
pub use models::{
    Participant, ParticipantId, ParticipantKind, RankingSnapshot, SeededParticipant,
    SeedingMethod,
};
pub use ranking::{InMemoryRankingSource, PgRankingSource, RankingSource};
