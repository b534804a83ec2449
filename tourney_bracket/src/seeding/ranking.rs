//! Read-only ranking sources consulted by ranked seeding.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;

use super::errors::SeedingResult;
use super::models::{ParticipantId, RankingSnapshot};

/// Trait for ranking lookups
///
/// A participant missing from the returned map has no ranking data. That is
/// never the same as zero points.
#[async_trait]
pub trait RankingSource: Send + Sync {
    /// Fetch snapshots for the given participants in one lookup
    async fn fetch_rankings(
        &self,
        participant_ids: &[ParticipantId],
    ) -> SeedingResult<HashMap<ParticipantId, RankingSnapshot>>;
}

/// PostgreSQL ranking source reading the `ranking_snapshots` table
#[derive(Clone)]
pub struct PgRankingSource {
    pool: Arc<PgPool>,
}

impl PgRankingSource {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RankingSource for PgRankingSource {
    async fn fetch_rankings(
        &self,
        participant_ids: &[ParticipantId],
    ) -> SeedingResult<HashMap<ParticipantId, RankingSnapshot>> {
        let rows = sqlx::query(
            "SELECT participant_id, total_points, created_at
             FROM ranking_snapshots
             WHERE participant_id = ANY($1)",
        )
        .bind(participant_ids)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut snapshots = HashMap::with_capacity(rows.len());
        for row in rows {
            let snapshot = RankingSnapshot {
                participant_id: row.try_get("participant_id")?,
                total_points: row.try_get("total_points")?,
                created_at: row
                    .try_get::<chrono::NaiveDateTime, _>("created_at")?
                    .and_utc(),
            };
            snapshots.insert(snapshot.participant_id, snapshot);
        }

        Ok(snapshots)
    }
}

/// Fixed in-memory ranking source
#[derive(Debug, Clone, Default)]
pub struct InMemoryRankingSource {
    snapshots: HashMap<ParticipantId, RankingSnapshot>,
}

impl InMemoryRankingSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a participant's snapshot
    pub fn insert(&mut self, snapshot: RankingSnapshot) {
        self.snapshots.insert(snapshot.participant_id, snapshot);
    }
}

impl FromIterator<RankingSnapshot> for InMemoryRankingSource {
    fn from_iter<I: IntoIterator<Item = RankingSnapshot>>(iter: I) -> Self {
        let mut source = Self::new();
        for snapshot in iter {
            source.insert(snapshot);
        }
        source
    }
}

#[async_trait]
impl RankingSource for InMemoryRankingSource {
    async fn fetch_rankings(
        &self,
        participant_ids: &[ParticipantId],
    ) -> SeedingResult<HashMap<ParticipantId, RankingSnapshot>> {
        Ok(participant_ids
            .iter()
            .filter_map(|id| self.snapshots.get(id).map(|s| (*id, s.clone())))
            .collect())
    }
}
