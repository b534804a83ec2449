//! Seeding engine producing totally ordered seed assignments.

use rand::Rng;
use rand::seq::SliceRandom;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use super::errors::{SeedingError, SeedingResult};
use super::models::{
    Participant, ParticipantId, ParticipantKind, RankingSnapshot, SeededParticipant,
    SeedingMethod,
};
use super::ranking::RankingSource;

/// Seeding engine
///
/// Stateless; the only input besides the roster is the ranking source handed
/// to [`seed`](Self::seed).
#[derive(Debug, Clone, Copy, Default)]
pub struct SeedingEngine;

impl SeedingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Seed participants with the given method
    ///
    /// Every participant appears exactly once in the output, seeds run
    /// `1..=N` in output order and participant metadata is left untouched.
    ///
    /// # Errors
    ///
    /// * `SeedingError::NoParticipants` - Empty roster
    /// * `SeedingError::DuplicateParticipant` - Same ID listed twice
    /// * `SeedingError::MixedParticipantType` - Ranked seeding with individuals
    /// * `SeedingError::MissingRankingData` - Ranked seeding with unranked teams
    pub async fn seed<R>(
        &self,
        participants: Vec<Participant>,
        method: SeedingMethod,
        rankings: &R,
    ) -> SeedingResult<Vec<SeededParticipant>>
    where
        R: RankingSource + ?Sized,
    {
        check_roster(&participants)?;

        let seeded = match method {
            SeedingMethod::Random => shuffle_with_thread_rng(participants)?,
            SeedingMethod::Ranked => {
                ensure_all_teams(&participants)?;
                let ids: Vec<ParticipantId> = participants.iter().map(|p| p.id).collect();
                let snapshots = rankings.fetch_rankings(&ids).await?;
                rank_participants(participants, &snapshots)?
            }
        };

        log::info!("Seeded {} participant(s) using {method} seeding", seeded.len());
        Ok(seeded)
    }
}

fn shuffle_with_thread_rng(participants: Vec<Participant>) -> SeedingResult<Vec<SeededParticipant>> {
    let mut rng = rand::rng();
    seed_random(participants, &mut rng)
}

/// Random seeding with a caller-supplied RNG
///
/// Passing a seeded RNG (e.g. `StdRng::seed_from_u64`) reproduces a draw.
pub fn seed_random<G>(
    mut participants: Vec<Participant>,
    rng: &mut G,
) -> SeedingResult<Vec<SeededParticipant>>
where
    G: Rng + ?Sized,
{
    check_roster(&participants)?;
    participants.shuffle(rng);

    Ok(participants
        .into_iter()
        .enumerate()
        .map(|(index, participant)| SeededParticipant {
            participant,
            seed: index as u32 + 1,
            ranking: None,
        })
        .collect())
}

/// Ranked seeding over already-fetched snapshots
///
/// Sort order, each key breaking ties of the previous one:
/// 1. total points, descending
/// 2. snapshot creation time, ascending
/// 3. participant ID, ascending
///
/// The last key makes the order total, so identical inputs always produce
/// identical seeds.
pub fn rank_participants(
    participants: Vec<Participant>,
    snapshots: &HashMap<ParticipantId, RankingSnapshot>,
) -> SeedingResult<Vec<SeededParticipant>> {
    check_roster(&participants)?;
    ensure_all_teams(&participants)?;

    let mut missing: Vec<ParticipantId> = participants
        .iter()
        .filter(|p| !snapshots.contains_key(&p.id))
        .map(|p| p.id)
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(SeedingError::MissingRankingData(missing));
    }

    let mut ranked: Vec<(Participant, RankingSnapshot)> = participants
        .into_iter()
        .filter_map(|p| snapshots.get(&p.id).cloned().map(|s| (p, s)))
        .collect();
    ranked.sort_by(|(a, ra), (b, rb)| compare_ranked(a, ra, b, rb));

    Ok(ranked
        .into_iter()
        .enumerate()
        .map(|(index, (participant, snapshot))| SeededParticipant {
            participant,
            seed: index as u32 + 1,
            ranking: Some(snapshot),
        })
        .collect())
}

fn compare_ranked(
    a: &Participant,
    ra: &RankingSnapshot,
    b: &Participant,
    rb: &RankingSnapshot,
) -> Ordering {
    rb.total_points
        .cmp(&ra.total_points)
        .then_with(|| ra.created_at.cmp(&rb.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn check_roster(participants: &[Participant]) -> SeedingResult<()> {
    if participants.is_empty() {
        return Err(SeedingError::NoParticipants);
    }

    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(p.id) {
            return Err(SeedingError::DuplicateParticipant(p.id));
        }
    }
    Ok(())
}

fn ensure_all_teams(participants: &[Participant]) -> SeedingResult<()> {
    let individuals: Vec<ParticipantId> = participants
        .iter()
        .filter(|p| match p.kind {
            ParticipantKind::Team => false,
            ParticipantKind::Individual => true,
        })
        .map(|p| p.id)
        .collect();

    if individuals.is_empty() {
        Ok(())
    } else {
        Err(SeedingError::MixedParticipantType(individuals))
    }
}
