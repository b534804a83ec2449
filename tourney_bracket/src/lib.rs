//! # Tourney Bracket
//!
//! Seeding and manual bracket editing for elimination tournaments.
//!
//! Bracket *generation* happens elsewhere: this crate produces the seed order
//! that generation consumes, then lets organizers repair or rearrange the
//! generated match rows without breaking the bracket's structure.
//!
//! ## Core Modules
//!
//! - [`seeding`]: Random and ranked seeding with a deterministic tie-break
//! - [`bracket`]: Swap, move, remove and repair edits, each applied in one
//!   transaction with exactly one audit log entry, plus a read-only validator
//! - [`db`]: PostgreSQL pool and schema migrations
//!
//! ## Example
//!
//! ```
//! use tourney_bracket::bracket::{validate, Match, Occupant};
//!
//! let matches = vec![
//!     Match::scheduled(1, 1, 1, 1, Some(Occupant::new(10, "Falcons")), None),
//!     Match::scheduled(2, 1, 1, 2, None, None),
//! ];
//!
//! let report = validate(&matches);
//! assert!(!report.is_valid); // match 2 is empty but still scheduled
//! ```

/// Audited bracket edits, storage backends and validation.
pub mod bracket;

/// Database connection pooling and configuration.
pub mod db;

/// Participant seeding.
pub mod seeding;

pub use bracket::{BracketEditor, BracketError, BracketResult, ValidationReport};
pub use seeding::{SeedingEngine, SeedingError, SeedingMethod, SeedingResult};
