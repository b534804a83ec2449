//! PostgreSQL implementation of the bracket store.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use std::sync::Arc;

use super::errors::{BracketError, BracketResult};
use super::models::{
    AuditLogEntry, AuditOperation, Match, MatchId, MatchStatus, NewAuditEntry, Occupant, Slot,
    StageId,
};
use super::store::{BracketStore, BracketTransaction};

const MATCH_COLUMNS: &str = "id, stage_id, round_number, match_number, \
     slot_1_participant_id, slot_1_display_name, slot_2_participant_id, slot_2_display_name, \
     status, winner_id, loser_id";

/// PostgreSQL-backed bracket store
///
/// Row locks are `SELECT ... FOR UPDATE` locks scoped to the enclosing
/// transaction.
#[derive(Clone)]
pub struct PgBracketStore {
    pool: Arc<PgPool>,
}

impl PgBracketStore {
    /// Create a new store over a connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BracketStore for PgBracketStore {
    async fn begin(&self) -> BracketResult<Box<dyn BracketTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgBracketTransaction { tx }))
    }

    async fn stage_matches(&self, stage_id: StageId) -> BracketResult<Vec<Match>> {
        let rows = sqlx::query(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches WHERE stage_id = $1 \
             ORDER BY round_number, match_number"
        ))
        .bind(stage_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter().map(match_from_row).collect()
    }

    async fn audit_entries(
        &self,
        stage_id: StageId,
        operation: Option<AuditOperation>,
        limit: i64,
    ) -> BracketResult<Vec<AuditLogEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, operation, stage_id, match_ids, before_state, after_state, actor_id, created_at
            FROM audit_log_entries
            WHERE stage_id = $1 AND ($2::TEXT IS NULL OR operation = $2)
            ORDER BY id DESC
            LIMIT $3
            "#,
        )
        .bind(stage_id)
        .bind(operation.map(AuditOperation::as_str))
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.iter()
            .map(|row| -> BracketResult<AuditLogEntry> {
                Ok(AuditLogEntry {
                    id: row.try_get("id")?,
                    operation: row.try_get::<String, _>("operation")?.parse()?,
                    stage_id: row.try_get("stage_id")?,
                    match_ids: row.try_get("match_ids")?,
                    before: row.try_get("before_state")?,
                    after: row.try_get("after_state")?,
                    actor_id: row.try_get("actor_id")?,
                    created_at: row
                        .try_get::<chrono::NaiveDateTime, _>("created_at")?
                        .and_utc(),
                })
            })
            .collect()
    }
}

/// Open PostgreSQL transaction; rolled back on drop unless committed
struct PgBracketTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BracketTransaction for PgBracketTransaction {
    async fn lock_matches(&mut self, ids: &[MatchId]) -> BracketResult<Vec<Match>> {
        let mut ordered = ids.to_vec();
        ordered.sort_unstable();
        ordered.dedup();

        let query = format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = $1 FOR UPDATE");
        let mut locked = Vec::with_capacity(ordered.len());
        for id in ordered {
            let row = sqlx::query(&query)
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?
                .ok_or(BracketError::MatchNotFound(id))?;
            locked.push(match_from_row(&row)?);
        }

        Ok(locked)
    }

    async fn stage_match_ids(&mut self, stage_id: StageId) -> BracketResult<Vec<MatchId>> {
        let rows = sqlx::query(
            "SELECT id FROM matches WHERE stage_id = $1 ORDER BY round_number, match_number",
        )
        .bind(stage_id)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.iter()
            .map(|row| row.try_get::<MatchId, _>("id").map_err(BracketError::from))
            .collect()
    }

    async fn write_slots(&mut self, m: &Match) -> BracketResult<()> {
        sqlx::query(
            r#"
            UPDATE matches
            SET slot_1_participant_id = $1, slot_1_display_name = $2,
                slot_2_participant_id = $3, slot_2_display_name = $4,
                updated_at = NOW()
            WHERE id = $5
            "#,
        )
        .bind(m.slot_1.as_ref().map(|o| o.participant_id))
        .bind(m.slot_1.as_ref().map(|o| o.display_name.as_str()))
        .bind(m.slot_2.as_ref().map(|o| o.participant_id))
        .bind(m.slot_2.as_ref().map(|o| o.display_name.as_str()))
        .bind(m.id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn write_status(
        &mut self,
        match_id: MatchId,
        status: MatchStatus,
    ) -> BracketResult<()> {
        sqlx::query("UPDATE matches SET status = $1, updated_at = NOW() WHERE id = $2")
            .bind(status.as_str())
            .bind(match_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn append_audit(&mut self, entry: NewAuditEntry) -> BracketResult<AuditLogEntry> {
        let row = sqlx::query(
            r#"
            INSERT INTO audit_log_entries (operation, stage_id, match_ids, before_state, after_state, actor_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at
            "#,
        )
        .bind(entry.operation.as_str())
        .bind(entry.stage_id)
        .bind(&entry.match_ids)
        .bind(&entry.before)
        .bind(&entry.after)
        .bind(entry.actor_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(AuditLogEntry {
            id: row.try_get("id")?,
            operation: entry.operation,
            stage_id: entry.stage_id,
            match_ids: entry.match_ids,
            before: entry.before,
            after: entry.after,
            actor_id: entry.actor_id,
            created_at: row
                .try_get::<chrono::NaiveDateTime, _>("created_at")?
                .and_utc(),
        })
    }

    async fn commit(self: Box<Self>) -> BracketResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn occupant(participant_id: Option<i64>, display_name: Option<String>) -> Slot {
    participant_id.map(|participant_id| Occupant {
        participant_id,
        display_name: display_name.unwrap_or_default(),
    })
}

fn match_from_row(row: &PgRow) -> BracketResult<Match> {
    Ok(Match {
        id: row.try_get("id")?,
        stage_id: row.try_get("stage_id")?,
        round_number: row.try_get::<i32, _>("round_number")? as u32,
        match_number: row.try_get::<i32, _>("match_number")? as u32,
        slot_1: occupant(
            row.try_get("slot_1_participant_id")?,
            row.try_get("slot_1_display_name")?,
        ),
        slot_2: occupant(
            row.try_get("slot_2_participant_id")?,
            row.try_get("slot_2_display_name")?,
        ),
        status: row.try_get::<String, _>("status")?.parse()?,
        winner_id: row.try_get("winner_id")?,
        loser_id: row.try_get("loser_id")?,
    })
}
