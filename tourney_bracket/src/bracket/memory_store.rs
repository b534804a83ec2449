//! In-memory bracket store.
//!
//! Useful for embedding the editor without a database and for tests. A
//! transaction holds the whole store behind one async mutex and works on a
//! staged copy, so transactions are fully serialized and writes become
//! visible only on commit.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::errors::{BracketError, BracketResult};
use super::models::{
    AuditLogEntry, AuditOperation, Match, MatchId, MatchStatus, NewAuditEntry, StageId,
};
use super::store::{BracketStore, BracketTransaction};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    matches: BTreeMap<MatchId, Match>,
    audit_log: Vec<AuditLogEntry>,
    next_audit_id: i64,
}

/// In-memory bracket store
#[derive(Clone, Default)]
pub struct InMemoryBracketStore {
    state: Arc<Mutex<MemoryState>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryBracketStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with match rows
    pub fn with_matches(matches: impl IntoIterator<Item = Match>) -> Self {
        let state = MemoryState {
            matches: matches.into_iter().map(|m| (m.id, m)).collect(),
            audit_log: Vec::new(),
            next_audit_id: 1,
        };

        Self {
            state: Arc::new(Mutex::new(state)),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Insert or replace a match row outside of any audited edit
    ///
    /// Stands in for external bracket generation and for lifecycle changes
    /// owned by other components (going live, recording results).
    pub async fn put_match(&self, m: Match) {
        self.state.lock().await.matches.insert(m.id, m);
    }

    /// Read a single match row
    pub async fn get_match(&self, id: MatchId) -> Option<Match> {
        self.state.lock().await.matches.get(&id).cloned()
    }

    /// Total number of audit entries across all stages
    pub async fn audit_len(&self) -> usize {
        self.state.lock().await.audit_log.len()
    }

    /// Make every subsequent write fail as if storage were unavailable
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BracketStore for InMemoryBracketStore {
    async fn begin(&self) -> BracketResult<Box<dyn BracketTransaction>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();

        Ok(Box::new(MemoryTransaction {
            guard,
            staged,
            fail_writes: Arc::clone(&self.fail_writes),
        }))
    }

    async fn stage_matches(&self, stage_id: StageId) -> BracketResult<Vec<Match>> {
        let state = self.state.lock().await;
        Ok(sorted_stage_matches(&state, stage_id))
    }

    async fn audit_entries(
        &self,
        stage_id: StageId,
        operation: Option<AuditOperation>,
        limit: i64,
    ) -> BracketResult<Vec<AuditLogEntry>> {
        let state = self.state.lock().await;
        let limit = usize::try_from(limit).unwrap_or(0);

        Ok(state
            .audit_log
            .iter()
            .rev()
            .filter(|entry| entry.stage_id == Some(stage_id))
            .filter(|entry| operation.is_none_or(|op| entry.operation == op))
            .take(limit)
            .cloned()
            .collect())
    }
}

fn sorted_stage_matches(state: &MemoryState, stage_id: StageId) -> Vec<Match> {
    let mut matches: Vec<Match> = state
        .matches
        .values()
        .filter(|m| m.stage_id == stage_id)
        .cloned()
        .collect();
    matches.sort_by_key(|m| (m.round_number, m.match_number));
    matches
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryTransaction {
    fn check_writable(&self) -> BracketResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(BracketError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl BracketTransaction for MemoryTransaction {
    async fn lock_matches(&mut self, ids: &[MatchId]) -> BracketResult<Vec<Match>> {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        ordered
            .into_iter()
            .map(|id| {
                self.staged
                    .matches
                    .get(&id)
                    .cloned()
                    .ok_or(BracketError::MatchNotFound(id))
            })
            .collect()
    }

    async fn stage_match_ids(&mut self, stage_id: StageId) -> BracketResult<Vec<MatchId>> {
        Ok(sorted_stage_matches(&self.staged, stage_id)
            .into_iter()
            .map(|m| m.id)
            .collect())
    }

    async fn write_slots(&mut self, m: &Match) -> BracketResult<()> {
        self.check_writable()?;
        let row = self
            .staged
            .matches
            .get_mut(&m.id)
            .ok_or(BracketError::MatchNotFound(m.id))?;
        row.slot_1 = m.slot_1.clone();
        row.slot_2 = m.slot_2.clone();
        Ok(())
    }

    async fn write_status(
        &mut self,
        match_id: MatchId,
        status: MatchStatus,
    ) -> BracketResult<()> {
        self.check_writable()?;
        let row = self
            .staged
            .matches
            .get_mut(&match_id)
            .ok_or(BracketError::MatchNotFound(match_id))?;
        row.status = status;
        Ok(())
    }

    async fn append_audit(&mut self, entry: NewAuditEntry) -> BracketResult<AuditLogEntry> {
        self.check_writable()?;
        let id = self.staged.next_audit_id.max(1);
        self.staged.next_audit_id = id + 1;

        let row = AuditLogEntry {
            id,
            operation: entry.operation,
            stage_id: entry.stage_id,
            match_ids: entry.match_ids,
            before: entry.before,
            after: entry.after,
            actor_id: entry.actor_id,
            created_at: Utc::now(),
        };
        self.staged.audit_log.push(row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> BracketResult<()> {
        self.check_writable()?;
        let MemoryTransaction {
            mut guard, staged, ..
        } = *self;
        *guard = staged;
        Ok(())
    }
}
