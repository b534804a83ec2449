//! Storage abstraction for the bracket editor.
//!
//! The editor never talks to a database directly. It opens a
//! [`BracketTransaction`] from a [`BracketStore`], locks the rows it needs,
//! writes, appends one audit entry and commits. Dropping a transaction without
//! committing discards every write made through it.

use async_trait::async_trait;

use super::errors::BracketResult;
use super::models::{
    AuditLogEntry, AuditOperation, Match, MatchId, MatchStatus, NewAuditEntry, StageId,
};

/// Trait for bracket storage backends
#[async_trait]
pub trait BracketStore: Send + Sync {
    /// Open a new all-or-nothing transaction
    async fn begin(&self) -> BracketResult<Box<dyn BracketTransaction>>;

    /// Read every match of a stage without taking locks, ordered by round then
    /// match number
    async fn stage_matches(&self, stage_id: StageId) -> BracketResult<Vec<Match>>;

    /// Audit entries of a stage, newest first
    async fn audit_entries(
        &self,
        stage_id: StageId,
        operation: Option<AuditOperation>,
        limit: i64,
    ) -> BracketResult<Vec<AuditLogEntry>>;
}

/// An open storage transaction
#[async_trait]
pub trait BracketTransaction: Send {
    /// Take an exclusive lock on each match row and return the rows
    ///
    /// Locks are acquired one row at a time in ascending ID order, whatever
    /// order `ids` is given in, and held until commit or rollback. Duplicate
    /// IDs are locked once. Fails with `MatchNotFound` on the first missing
    /// row.
    async fn lock_matches(&mut self, ids: &[MatchId]) -> BracketResult<Vec<Match>>;

    /// IDs of a stage's matches ordered by round then match number, unlocked
    async fn stage_match_ids(&mut self, stage_id: StageId) -> BracketResult<Vec<MatchId>>;

    /// Persist both slots of a match
    async fn write_slots(&mut self, m: &Match) -> BracketResult<()>;

    /// Persist a status change
    async fn write_status(&mut self, match_id: MatchId, status: MatchStatus)
    -> BracketResult<()>;

    /// Append an audit entry
    async fn append_audit(&mut self, entry: NewAuditEntry) -> BracketResult<AuditLogEntry>;

    /// Commit every write made through this transaction
    async fn commit(self: Box<Self>) -> BracketResult<()>;
}
