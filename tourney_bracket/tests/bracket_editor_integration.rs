//! Integration tests for the bracket editor.
//!
//! Runs every editor operation against the in-memory store and checks the
//! resulting rows and audit trail.

use tourney_bracket::bracket::{
    AuditOperation, BracketEditor, BracketError, BracketStore, InMemoryBracketStore, Match,
    MatchSnapshot, MatchStatus, Occupant, Slot, SlotPosition,
};

const STAGE: i64 = 1;

fn team(id: i64) -> Slot {
    Some(Occupant::new(id, format!("Team {id}")))
}

fn with_status(mut m: Match, status: MatchStatus) -> Match {
    m.status = status;
    m
}

/// Round 1 of a stage: 1 v 2, 3 v 4, 5 v bye
fn round_one() -> Vec<Match> {
    vec![
        Match::scheduled(1, STAGE, 1, 1, team(1), team(2)),
        Match::scheduled(2, STAGE, 1, 2, team(3), team(4)),
        Match::scheduled(3, STAGE, 1, 3, team(5), None),
    ]
}

fn setup() -> (BracketEditor<InMemoryBracketStore>, InMemoryBracketStore) {
    let store = InMemoryBracketStore::with_matches(round_one());
    (BracketEditor::new(store.clone()), store)
}

async fn slots(store: &InMemoryBracketStore, id: i64) -> (Option<i64>, Option<i64>) {
    let m = store.get_match(id).await.expect("match should exist");
    (
        m.slot_1.map(|o| o.participant_id),
        m.slot_2.map(|o| o.participant_id),
    )
}

// ============================================================================
// Swap
// ============================================================================

#[tokio::test]
async fn test_swap_exchanges_both_slots() {
    let (editor, store) = setup();

    editor.swap_participants(1, 2).await.expect("swap should succeed");

    assert_eq!(slots(&store, 1).await, (Some(3), Some(4)));
    assert_eq!(slots(&store, 2).await, (Some(1), Some(2)));

    let entries = editor.audit_log(STAGE, None, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].operation, AuditOperation::Swap);
    assert_eq!(entries[0].match_ids, vec![1, 2]);
    assert_eq!(entries[0].before[0]["slot_1"]["participant_id"], 1);
    assert_eq!(entries[0].after[0]["slot_1"]["participant_id"], 3);
}

#[tokio::test]
async fn test_swap_twice_restores_original_state() {
    let (editor, store) = setup();
    let original = store.stage_matches(STAGE).await.unwrap();

    editor.swap_participants(1, 3).await.unwrap();
    editor.swap_participants(1, 3).await.unwrap();

    assert_eq!(store.stage_matches(STAGE).await.unwrap(), original);
    assert_eq!(store.audit_len().await, 2);
}

#[tokio::test]
async fn test_swap_rejects_live_match_without_side_effects() {
    let (editor, store) = setup();
    store
        .put_match(with_status(
            Match::scheduled(2, STAGE, 1, 2, team(3), team(4)),
            MatchStatus::Live,
        ))
        .await;
    let rows_before = store.stage_matches(STAGE).await.unwrap();

    let err = editor.swap_participants(1, 2).await.unwrap_err();

    assert!(matches!(
        err,
        BracketError::InvalidState {
            match_id: 2,
            status: MatchStatus::Live
        }
    ));
    assert_eq!(store.stage_matches(STAGE).await.unwrap(), rows_before);
    assert_eq!(store.audit_len().await, 0);
}

#[tokio::test]
async fn test_swap_with_itself_rejected() {
    let (editor, _) = setup();
    let err = editor.swap_participants(2, 2).await.unwrap_err();
    assert!(matches!(err, BracketError::SameMatch(2)));
}

#[tokio::test]
async fn test_swap_missing_match() {
    let (editor, store) = setup();
    let err = editor.swap_participants(1, 42).await.unwrap_err();
    assert!(matches!(err, BracketError::MatchNotFound(42)));
    assert_eq!(store.audit_len().await, 0);
}

#[tokio::test]
async fn test_swap_across_stages_rejected() {
    let (editor, store) = setup();
    store
        .put_match(Match::scheduled(10, 2, 1, 1, team(8), team(9)))
        .await;

    let err = editor.swap_participants(1, 10).await.unwrap_err();
    assert!(matches!(err, BracketError::StageMismatch { first: 1, second: 10 }));
}

#[tokio::test]
async fn test_concurrent_swaps_sharing_a_match_serialize() {
    let (editor, store) = setup();

    let first = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.swap_participants(1, 2).await })
    };
    let second = {
        let editor = editor.clone();
        tokio::spawn(async move { editor.swap_participants(3, 2).await })
    };
    first.await.unwrap().expect("first swap should succeed");
    second.await.unwrap().expect("second swap should succeed");

    assert_eq!(store.audit_len().await, 2);

    let mut seated: Vec<i64> = store
        .stage_matches(STAGE)
        .await
        .unwrap()
        .iter()
        .flat_map(|m| m.participant_ids().collect::<Vec<_>>())
        .collect();
    seated.sort_unstable();
    assert_eq!(seated, vec![1, 2, 3, 4, 5]);
}

// ============================================================================
// Move
// ============================================================================

#[tokio::test]
async fn test_move_uses_first_empty_slot() {
    let (editor, store) = setup();

    editor.move_participant(1, 1, 3, None).await.unwrap();

    assert_eq!(slots(&store, 1).await, (None, Some(2)));
    assert_eq!(slots(&store, 3).await, (Some(5), Some(1)));

    let entries = editor
        .audit_log(STAGE, Some(AuditOperation::Move), 10)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].match_ids, vec![1, 3]);
}

#[tokio::test]
async fn test_move_into_occupied_slot_displaces_occupant() {
    let (editor, store) = setup();

    editor
        .move_participant(1, 1, 2, Some(SlotPosition::First))
        .await
        .unwrap();

    assert_eq!(slots(&store, 1).await, (None, Some(2)));
    assert_eq!(slots(&store, 2).await, (Some(1), Some(4)));

    // Team 3 no longer seated anywhere; it survives only in the before-snapshot
    let entry = &editor.audit_log(STAGE, None, 1).await.unwrap()[0];
    assert_eq!(entry.before[1]["match_id"], 2);
    assert_eq!(entry.before[1]["slot_1"]["participant_id"], 3);
    assert_eq!(entry.after[1]["slot_1"]["participant_id"], 1);
}

#[tokio::test]
async fn test_move_without_free_slot_fails() {
    let (editor, store) = setup();
    let rows_before = store.stage_matches(STAGE).await.unwrap();

    let err = editor.move_participant(1, 1, 2, None).await.unwrap_err();

    assert!(matches!(err, BracketError::NoAvailableSlot(2)));
    assert_eq!(store.stage_matches(STAGE).await.unwrap(), rows_before);
    assert_eq!(store.audit_len().await, 0);
}

#[tokio::test]
async fn test_move_participant_not_in_source() {
    let (editor, _) = setup();
    let err = editor.move_participant(5, 1, 3, None).await.unwrap_err();
    assert!(matches!(
        err,
        BracketError::ParticipantNotFound {
            participant_id: 5,
            match_id: 1
        }
    ));
}

#[tokio::test]
async fn test_move_into_completed_match_rejected() {
    let (editor, store) = setup();
    let mut completed = with_status(
        Match::scheduled(3, STAGE, 1, 3, team(5), team(6)),
        MatchStatus::Completed,
    );
    completed.winner_id = Some(5);
    completed.loser_id = Some(6);
    store.put_match(completed).await;

    let err = editor
        .move_participant(1, 1, 3, Some(SlotPosition::Second))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        BracketError::InvalidState {
            match_id: 3,
            status: MatchStatus::Completed
        }
    ));
    assert_eq!(slots(&store, 1).await, (Some(1), Some(2)));
}

#[tokio::test]
async fn test_move_within_match_switches_slot() {
    let (editor, store) = setup();

    editor.move_participant(5, 3, 3, None).await.unwrap();

    assert_eq!(slots(&store, 3).await, (None, Some(5)));
    let entry = &editor.audit_log(STAGE, None, 1).await.unwrap()[0];
    assert_eq!(entry.match_ids, vec![3]);
}

#[tokio::test]
async fn test_move_to_match_already_seating_participant_rejected() {
    let (editor, store) = setup();
    store
        .put_match(Match::scheduled(4, STAGE, 2, 1, team(1), None))
        .await;

    let err = editor.move_participant(1, 1, 4, None).await.unwrap_err();
    assert!(matches!(
        err,
        BracketError::AlreadySeated {
            participant_id: 1,
            match_id: 4
        }
    ));
}

// ============================================================================
// Remove
// ============================================================================

#[tokio::test]
async fn test_remove_leaves_bye_and_other_slot_untouched() {
    let (editor, store) = setup();

    editor.remove_participant(1, 2).await.unwrap();

    let m = store.get_match(1).await.unwrap();
    assert_eq!(m.slot_1, team(1));
    assert_eq!(m.slot_2, None);
    assert_eq!(m.status, MatchStatus::Scheduled);
}

#[tokio::test]
async fn test_remove_missing_participant() {
    let (editor, store) = setup();
    let err = editor.remove_participant(1, 3).await.unwrap_err();
    assert!(matches!(
        err,
        BracketError::ParticipantNotFound {
            participant_id: 3,
            match_id: 1
        }
    ));
    assert_eq!(store.audit_len().await, 0);
}

#[tokio::test]
async fn test_remove_rejects_completed_match() {
    let (editor, store) = setup();
    store
        .put_match(with_status(
            Match::scheduled(1, STAGE, 1, 1, team(1), team(2)),
            MatchStatus::Completed,
        ))
        .await;
    let audit_before = editor.audit_log(STAGE, None, 100).await.unwrap();

    let err = editor.remove_participant(1, 2).await.unwrap_err();

    assert!(matches!(err, BracketError::InvalidState { match_id: 1, .. }));
    assert_eq!(slots(&store, 1).await, (Some(1), Some(2)));
    assert_eq!(editor.audit_log(STAGE, None, 100).await.unwrap(), audit_before);
}

#[tokio::test]
async fn test_remove_from_cancelled_match_is_allowed() {
    let (editor, store) = setup();
    store
        .put_match(with_status(
            Match::scheduled(3, STAGE, 1, 3, team(5), None),
            MatchStatus::Cancelled,
        ))
        .await;

    editor.remove_participant(3, 5).await.unwrap();
    assert_eq!(slots(&store, 3).await, (None, None));
}

// ============================================================================
// Repair & validate
// ============================================================================

#[tokio::test]
async fn test_repair_cancels_emptied_match_and_is_idempotent() {
    let (editor, store) = setup();
    editor.remove_participant(3, 5).await.unwrap();

    let report = editor.validate_bracket(STAGE).await.unwrap();
    assert!(!report.is_valid);

    let summary = editor.repair_bracket(STAGE).await.unwrap();
    assert_eq!(summary.repaired, 1);
    assert_eq!(summary.cancelled_match_ids, vec![3]);
    assert_eq!(
        store.get_match(3).await.unwrap().status,
        MatchStatus::Cancelled
    );

    let again = editor.repair_bracket(STAGE).await.unwrap();
    assert_eq!(again.repaired, 0);
    assert!(again.cancelled_match_ids.is_empty());

    let report = editor.validate_bracket(STAGE).await.unwrap();
    assert!(report.is_valid, "errors: {:?}", report.errors);
}

#[tokio::test]
async fn test_repair_visits_in_round_order_and_records_audit() {
    let store = InMemoryBracketStore::with_matches([
        Match::scheduled(30, STAGE, 2, 1, None, None),
        Match::scheduled(20, STAGE, 1, 2, None, None),
        Match::scheduled(10, STAGE, 1, 1, team(1), None),
    ]);
    let editor = BracketEditor::new(store.clone()).acting_as(77);

    let summary = editor.repair_bracket(STAGE).await.unwrap();
    assert_eq!(summary.cancelled_match_ids, vec![20, 30]);

    let entry = &editor.audit_log(STAGE, Some(AuditOperation::Repair), 1).await.unwrap()[0];
    assert_eq!(entry.match_ids, vec![20, 30]);
    assert_eq!(entry.actor_id, Some(77));
    assert_eq!(entry.before[0]["status"], "scheduled");
    assert_eq!(entry.after[0]["status"], "cancelled");
}

#[tokio::test]
async fn test_repair_leaves_live_and_duplicates_alone() {
    let store = InMemoryBracketStore::with_matches([
        with_status(Match::scheduled(1, STAGE, 1, 1, None, None), MatchStatus::Live),
        Match::scheduled(2, STAGE, 1, 2, team(7), team(8)),
        Match::scheduled(3, STAGE, 1, 3, team(7), None),
    ]);
    let editor = BracketEditor::new(store.clone());

    let summary = editor.repair_bracket(STAGE).await.unwrap();
    assert_eq!(summary.repaired, 0);
    assert_eq!(store.get_match(1).await.unwrap().status, MatchStatus::Live);

    let report = editor.validate_bracket(STAGE).await.unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 2);
}

#[tokio::test]
async fn test_validate_takes_no_audit_entry() {
    let (editor, store) = setup();
    let report = editor.validate_bracket(STAGE).await.unwrap();
    assert!(report.is_valid);
    assert_eq!(store.audit_len().await, 0);
}

// ============================================================================
// Audit trail
// ============================================================================

#[tokio::test]
async fn test_every_successful_edit_appends_exactly_one_entry() {
    let (editor, store) = setup();

    editor.swap_participants(1, 2).await.unwrap();
    assert_eq!(store.audit_len().await, 1);

    editor.move_participant(3, 1, 3, None).await.unwrap();
    assert_eq!(store.audit_len().await, 2);

    editor.remove_participant(3, 5).await.unwrap();
    assert_eq!(store.audit_len().await, 3);

    editor.repair_bracket(STAGE).await.unwrap();
    assert_eq!(store.audit_len().await, 4);

    // failures add nothing
    let _ = editor.remove_participant(3, 99).await.unwrap_err();
    assert_eq!(store.audit_len().await, 4);

    let kinds: Vec<AuditOperation> = editor
        .audit_log(STAGE, None, 10)
        .await
        .unwrap()
        .iter()
        .map(|e| e.operation)
        .collect();
    assert_eq!(
        kinds,
        vec![
            AuditOperation::Repair,
            AuditOperation::Remove,
            AuditOperation::Move,
            AuditOperation::Swap
        ]
    );
}

#[tokio::test]
async fn test_after_snapshot_matches_stored_rows() {
    let (editor, store) = setup();

    editor.swap_participants(2, 3).await.unwrap();

    let entry = &editor.audit_log(STAGE, None, 1).await.unwrap()[0];
    let stored: Vec<MatchSnapshot> = vec![
        MatchSnapshot::from(&store.get_match(2).await.unwrap()),
        MatchSnapshot::from(&store.get_match(3).await.unwrap()),
    ];
    assert_eq!(entry.after, serde_json::to_value(stored).unwrap());
}

#[tokio::test]
async fn test_actor_is_recorded() {
    let store = InMemoryBracketStore::with_matches(round_one());
    let editor = BracketEditor::new(store).acting_as(501);

    editor.remove_participant(1, 1).await.unwrap();

    let entry = &editor.audit_log(STAGE, None, 1).await.unwrap()[0];
    assert_eq!(entry.actor_id, Some(501));
    assert_eq!(entry.stage_id, Some(STAGE));
}

#[tokio::test]
async fn test_storage_failure_leaves_no_partial_edit() {
    let (editor, store) = setup();
    let rows_before = store.stage_matches(STAGE).await.unwrap();

    store.set_fail_writes(true);
    let err = editor.swap_participants(1, 2).await.unwrap_err();
    store.set_fail_writes(false);

    assert!(matches!(err, BracketError::Database(_)));
    assert!(!err.is_client_error());
    assert_eq!(store.stage_matches(STAGE).await.unwrap(), rows_before);
    assert_eq!(store.audit_len().await, 0);
}
