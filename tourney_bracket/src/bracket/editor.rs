//! Bracket editor: audited manual edits over an already generated bracket.

use super::errors::{BracketError, BracketResult};
use super::models::{
    AuditLogEntry, AuditOperation, Match, MatchId, MatchSnapshot, MatchStatus, NewAuditEntry,
    ParticipantId, RepairSummary, SlotPosition, StageId, UserId,
};
use super::store::{BracketStore, BracketTransaction};
use super::validator::{ValidationReport, validate};

/// Bracket editor
///
/// Holds no state besides the store handle and the acting user, so it is
/// cheap to construct per request. Every mutating operation follows the same
/// shape inside one transaction:
///
/// 1. lock the match rows it will touch, ascending by ID
/// 2. run guard checks against the locked rows
/// 3. write
/// 4. append exactly one audit entry
/// 5. commit
///
/// Any guard failure or storage error returns before commit, so the
/// transaction is rolled back and nothing (including the audit entry) is
/// persisted.
#[derive(Clone)]
pub struct BracketEditor<S> {
    store: S,
    actor_id: Option<UserId>,
}

impl<S: BracketStore> BracketEditor<S> {
    /// Create a new bracket editor
    pub fn new(store: S) -> Self {
        Self {
            store,
            actor_id: None,
        }
    }

    /// Record `actor_id` as the acting user on every audit entry written
    pub fn acting_as(mut self, actor_id: UserId) -> Self {
        self.actor_id = Some(actor_id);
        self
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Exchange both slots of two matches wholesale
    ///
    /// # Errors
    ///
    /// * `BracketError::SameMatch` - Both IDs refer to the same match
    /// * `BracketError::MatchNotFound` - Either match does not exist
    /// * `BracketError::InvalidState` - Either match is live or completed
    /// * `BracketError::StageMismatch` - Matches belong to different stages
    pub async fn swap_participants(&self, match_a: MatchId, match_b: MatchId) -> BracketResult<()> {
        if match_a == match_b {
            return Err(BracketError::SameMatch(match_a));
        }

        let mut tx = self.store.begin().await?;
        let mut locked = tx.lock_matches(&[match_a, match_b]).await?;
        let mut a = take_locked(&mut locked, match_a)?;
        let mut b = take_locked(&mut locked, match_b)?;

        ensure_editable(&a)?;
        ensure_editable(&b)?;
        ensure_same_stage(&a, &b)?;

        let before = snapshot(&[&a, &b])?;
        std::mem::swap(&mut a.slot_1, &mut b.slot_1);
        std::mem::swap(&mut a.slot_2, &mut b.slot_2);
        tx.write_slots(&a).await?;
        tx.write_slots(&b).await?;
        let after = snapshot(&[&a, &b])?;

        self.finish(
            tx,
            AuditOperation::Swap,
            Some(a.stage_id),
            vec![match_a, match_b],
            before,
            after,
        )
        .await?;

        log::info!("Swapped participants of match {match_a} and match {match_b}");
        Ok(())
    }

    /// Relocate one participant from one match to another
    ///
    /// Without `target_slot` the first empty slot of the destination is used.
    /// With an explicit `target_slot` that is already occupied, the occupant
    /// is displaced and that slot's previous occupant is left only in the audit
    /// entry's before-snapshot. The source slot always becomes a bye; nothing
    /// cascades to other matches.
    ///
    /// Moving within one match (`from_match == to_match`) switches slots.
    ///
    /// # Errors
    ///
    /// * `BracketError::MatchNotFound` - Either match does not exist
    /// * `BracketError::InvalidState` - Either match is live or completed
    /// * `BracketError::ParticipantNotFound` - Participant not seated in `from_match`
    /// * `BracketError::NoAvailableSlot` - No `target_slot` and destination is full
    /// * `BracketError::StageMismatch` - Matches belong to different stages
    /// * `BracketError::AlreadySeated` - Participant already seated in `to_match`
    pub async fn move_participant(
        &self,
        participant_id: ParticipantId,
        from_match: MatchId,
        to_match: MatchId,
        target_slot: Option<SlotPosition>,
    ) -> BracketResult<()> {
        let mut tx = self.store.begin().await?;
        let mut locked = tx.lock_matches(&[from_match, to_match]).await?;
        for m in &locked {
            ensure_editable(m)?;
        }

        let mut source = take_locked(&mut locked, from_match)?;
        let source_position =
            source
                .position_of(participant_id)
                .ok_or(BracketError::ParticipantNotFound {
                    participant_id,
                    match_id: from_match,
                })?;

        let (before, after, displaced) = if from_match == to_match {
            let target = target_slot
                .or_else(|| source.first_empty_slot())
                .ok_or(BracketError::NoAvailableSlot(to_match))?;

            let before = snapshot(&[&source])?;
            let occupant = source.slot_mut(source_position).take();
            let displaced = std::mem::replace(source.slot_mut(target), occupant);
            tx.write_slots(&source).await?;
            (before, snapshot(&[&source])?, displaced)
        } else {
            let mut destination = take_locked(&mut locked, to_match)?;
            ensure_same_stage(&source, &destination)?;
            if destination.position_of(participant_id).is_some() {
                return Err(BracketError::AlreadySeated {
                    participant_id,
                    match_id: to_match,
                });
            }
            let target = target_slot
                .or_else(|| destination.first_empty_slot())
                .ok_or(BracketError::NoAvailableSlot(to_match))?;

            let before = snapshot(&[&source, &destination])?;
            let occupant = source.slot_mut(source_position).take();
            let displaced = std::mem::replace(destination.slot_mut(target), occupant);
            tx.write_slots(&source).await?;
            tx.write_slots(&destination).await?;
            (before, snapshot(&[&source, &destination])?, displaced)
        };

        let mut match_ids = vec![from_match];
        if to_match != from_match {
            match_ids.push(to_match);
        }
        self.finish(
            tx,
            AuditOperation::Move,
            Some(source.stage_id),
            match_ids,
            before,
            after,
        )
        .await?;

        if let Some(displaced) = displaced {
            log::warn!(
                "Moving participant {participant_id} into match {to_match} displaced participant {}",
                displaced.participant_id
            );
        }
        log::info!("Moved participant {participant_id} from match {from_match} to match {to_match}");
        Ok(())
    }

    /// Vacate the slot holding `participant_id`, leaving a bye
    ///
    /// The other slot is left untouched, and the match keeps its status even if
    /// both slots are now byes; [`repair_bracket`](Self::repair_bracket) cancels
    /// such matches.
    ///
    /// # Errors
    ///
    /// * `BracketError::MatchNotFound` - Match does not exist
    /// * `BracketError::InvalidState` - Match is live or completed
    /// * `BracketError::ParticipantNotFound` - Participant not seated in the match
    pub async fn remove_participant(
        &self,
        match_id: MatchId,
        participant_id: ParticipantId,
    ) -> BracketResult<()> {
        let mut tx = self.store.begin().await?;
        let mut locked = tx.lock_matches(&[match_id]).await?;
        let mut m = take_locked(&mut locked, match_id)?;

        ensure_editable(&m)?;
        let position = m
            .position_of(participant_id)
            .ok_or(BracketError::ParticipantNotFound {
                participant_id,
                match_id,
            })?;

        let before = snapshot(&[&m])?;
        *m.slot_mut(position) = None;
        tx.write_slots(&m).await?;
        let after = snapshot(&[&m])?;

        self.finish(
            tx,
            AuditOperation::Remove,
            Some(m.stage_id),
            vec![match_id],
            before,
            after,
        )
        .await?;

        log::info!("Removed participant {participant_id} from match {match_id}");
        Ok(())
    }

    /// Cancel every scheduled match of a stage whose slots are both byes
    ///
    /// Matches are visited by round then match number and locked one at a
    /// time as visited. Live matches are never touched, even when empty; they
    /// keep being reported by [`validate_bracket`](Self::validate_bracket).
    /// Duplicate participants are not corrected.
    ///
    /// Idempotent: a second call finds nothing to repair. Every call appends
    /// one audit entry, including calls that repair nothing.
    pub async fn repair_bracket(&self, stage_id: StageId) -> BracketResult<RepairSummary> {
        let mut tx = self.store.begin().await?;
        let ids = tx.stage_match_ids(stage_id).await?;

        let mut before = Vec::new();
        let mut after = Vec::new();
        let mut cancelled_match_ids = Vec::new();

        for id in ids {
            let mut locked = tx.lock_matches(&[id]).await?;
            let mut m = take_locked(&mut locked, id)?;
            if !m.is_empty() || m.status.is_terminal() {
                continue;
            }
            if m.status.is_locked() {
                log::warn!("Skipping empty match {} while it is {}", m.label(), m.status);
                continue;
            }

            before.push(MatchSnapshot::from(&m));
            tx.write_status(m.id, MatchStatus::Cancelled).await?;
            m.status = MatchStatus::Cancelled;
            after.push(MatchSnapshot::from(&m));
            cancelled_match_ids.push(m.id);
        }

        self.finish(
            tx,
            AuditOperation::Repair,
            Some(stage_id),
            cancelled_match_ids.clone(),
            serde_json::to_value(&before)?,
            serde_json::to_value(&after)?,
        )
        .await?;

        log::info!(
            "Repaired stage {stage_id}: cancelled {} empty match(es)",
            cancelled_match_ids.len()
        );
        Ok(RepairSummary {
            stage_id,
            repaired: cancelled_match_ids.len(),
            cancelled_match_ids,
        })
    }

    /// Scan a stage for structural problems without taking locks
    ///
    /// The scan reads a best-effort snapshot; it is not serialized against
    /// concurrent edits.
    pub async fn validate_bracket(&self, stage_id: StageId) -> BracketResult<ValidationReport> {
        let matches = self.store.stage_matches(stage_id).await?;
        let report = validate(&matches);

        log::debug!(
            "Validated stage {stage_id}: {} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
        Ok(report)
    }

    /// Audit trail of a stage, newest first
    ///
    /// # Arguments
    ///
    /// * `stage_id` - Stage ID
    /// * `operation` - Only return entries of this kind
    /// * `limit` - Maximum number of entries to return
    pub async fn audit_log(
        &self,
        stage_id: StageId,
        operation: Option<AuditOperation>,
        limit: i64,
    ) -> BracketResult<Vec<AuditLogEntry>> {
        self.store.audit_entries(stage_id, operation, limit).await
    }

    /// Append the audit entry and commit
    async fn finish(
        &self,
        mut tx: Box<dyn BracketTransaction>,
        operation: AuditOperation,
        stage_id: Option<StageId>,
        match_ids: Vec<MatchId>,
        before: serde_json::Value,
        after: serde_json::Value,
    ) -> BracketResult<()> {
        tx.append_audit(NewAuditEntry {
            operation,
            stage_id,
            match_ids,
            before,
            after,
            actor_id: self.actor_id,
        })
        .await?;
        tx.commit().await
    }
}

fn ensure_editable(m: &Match) -> BracketResult<()> {
    if m.status.is_locked() {
        log::warn!("Rejected edit of match {}: match is {}", m.label(), m.status);
        return Err(BracketError::InvalidState {
            match_id: m.id,
            status: m.status,
        });
    }
    Ok(())
}

fn ensure_same_stage(first: &Match, second: &Match) -> BracketResult<()> {
    if first.stage_id != second.stage_id {
        return Err(BracketError::StageMismatch {
            first: first.id,
            second: second.id,
        });
    }
    Ok(())
}

fn take_locked(locked: &mut Vec<Match>, id: MatchId) -> BracketResult<Match> {
    let index = locked
        .iter()
        .position(|m| m.id == id)
        .ok_or(BracketError::MatchNotFound(id))?;
    Ok(locked.swap_remove(index))
}

fn snapshot(matches: &[&Match]) -> BracketResult<serde_json::Value> {
    let snapshots: Vec<MatchSnapshot> = matches.iter().map(|m| MatchSnapshot::from(*m)).collect();
    Ok(serde_json::to_value(snapshots)?)
}
