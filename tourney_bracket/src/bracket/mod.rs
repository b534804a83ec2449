//! Bracket module for manual, audited edits of elimination brackets.
//!
//! This module provides:
//! - Match and audit log data models
//! - Swap, move and remove edits guarded against live/completed matches
//! - Repair sweep cancelling matches left without participants
//! - Read-only structural validation
//! - PostgreSQL and in-memory storage backends
//!
//! ## Example
//!
//! ```no_run
//! use tourney_bracket::bracket::{BracketEditor, PgBracketStore};
//! use tourney_bracket::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let editor = BracketEditor::new(PgBracketStore::new(Arc::new(db.pool().clone())))
//!         .acting_as(42);
//!
//!     // Team 7 withdrew: free its slot, then cancel matches left empty
//!     editor.remove_participant(1001, 7).await?;
//!     let summary = editor.repair_bracket(12).await?;
//!     println!("Cancelled {} match(es)", summary.repaired);
//!
//!     let report = editor.validate_bracket(12).await?;
//!     assert!(report.is_valid);
//!
//!     Ok(())
//! }
//! ```

pub mod editor;
pub mod errors;
pub mod memory_store;
pub mod models;
pub mod pg_store;
pub mod store;
pub mod validator;

pub use editor::BracketEditor;
pub use errors::{BracketError, BracketResult};
pub use memory_store::InMemoryBracketStore;
pub use models::{
    AuditLogEntry, AuditOperation, Match, MatchId, MatchSnapshot, MatchStatus, NewAuditEntry,
    Occupant, ParticipantId, RepairSummary, Slot, SlotPosition, StageId, UserId,
};
pub use pg_store::PgBracketStore;
pub use store::{BracketStore, BracketTransaction};
pub use validator::{ValidationReport, validate};
