//! End-to-end behavior of the sync engine against two fake stores.

mod common;

use std::time::Duration;

use common::{event, product, settle, AdapterCall, BrokenCounter, World, LOC_A, LOC_B, TAG};
use stockbridge_core::{StoreKey, SyncKind};
use stockbridge_state::keys;
use stockbridge_sync::{EchoLockManager, EventDisposition, SkipReason, StoreAdapter, SyncError};

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test(start_paused = true)]
async fn first_event_without_snapshot_is_full_sync() {
    let w = World::new();

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;

    assert_eq!(
        w.b.writes(),
        vec![AdapterCall::Set {
            item: 9001,
            location: LOC_B,
            value: 5
        }]
    );
    assert_eq!(w.engine.snapshot(StoreKey::Primary, "0123").await.unwrap(), Some(5));
    assert_eq!(w.engine.snapshot(StoreKey::Secondary, "0123").await.unwrap(), Some(5));

    let log = w.engine.recent_syncs(10).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].kind, SyncKind::Full);
    assert_eq!(log[0].source, StoreKey::Primary);
    assert_eq!(log[0].target, StoreKey::Secondary);
    assert_eq!(log[0].identifier, "0123");
}

#[tokio::test(start_paused = true)]
async fn burst_within_window_reconciles_once_against_pre_burst_snapshot() {
    let w = World::new();

    w.engine.handle_event(event(StoreKey::Primary, 111, 10)).await;
    settle().await;
    // Let the echo lock on B lapse so it cannot interfere.
    tokio::time::sleep(Duration::from_secs(30)).await;

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    w.engine.handle_event(event(StoreKey::Primary, 111, 3)).await;
    settle().await;

    assert_eq!(
        w.b.writes(),
        vec![
            AdapterCall::Set {
                item: 9001,
                location: LOC_B,
                value: 10
            },
            AdapterCall::Adjust {
                item: 9001,
                location: LOC_B,
                delta: -7
            },
        ]
    );
    assert_eq!(w.engine.stats().await.unwrap().total_syncs, 2);
    assert_eq!(w.engine.snapshot(StoreKey::Secondary, "0123").await.unwrap(), Some(3));
}

#[tokio::test(start_paused = true)]
async fn echo_of_our_own_write_is_dropped() {
    let w = World::new();

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;

    let echo = w.engine.handle_event(event(StoreKey::Secondary, 9001, 5)).await;
    assert_eq!(echo, EventDisposition::Skipped(SkipReason::EchoLocked));
    settle().await;

    assert!(w.a.writes().is_empty());
    assert_eq!(w.engine.stats().await.unwrap().total_syncs, 1);
}

#[tokio::test(start_paused = true)]
async fn untagged_product_is_dropped_without_state_change() {
    let w = World::new();

    let disposition = w.engine.handle_event(event(StoreKey::Primary, 222, 7)).await;
    assert_eq!(disposition, EventDisposition::Skipped(SkipReason::NotInCatalog));
    settle().await;

    assert!(w.b.writes().is_empty());
    assert_eq!(w.engine.snapshot(StoreKey::Primary, "0555").await.unwrap(), None);
    assert_eq!(w.engine.stats().await.unwrap(), Default::default());
}

#[tokio::test(start_paused = true)]
async fn missing_counterpart_is_not_enrolled() {
    let w = World::new();

    let disposition = w.engine.handle_event(event(StoreKey::Primary, 112, 4)).await;
    assert!(disposition.is_scheduled());
    settle().await;

    assert!(w.b.writes().is_empty());
    let stats = w.engine.stats().await.unwrap();
    assert_eq!(stats.total_errors, 0);
    assert_eq!(stats.total_syncs, 0);
    assert_eq!(w.engine.snapshot(StoreKey::Primary, "0777").await.unwrap(), None);

    // Exactly one entry explains the outcome, without counting as an error.
    assert!(w.engine.recent_syncs(10).await.unwrap().is_empty());
    let errors = w.engine.recent_errors(10).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].context["kind"], "not_enrolled");
    assert_eq!(errors[0].context["identifier"], "0777");
    assert_eq!(errors[0].context["target"], "secondary");
}

#[tokio::test]
async fn manual_sync_of_unenrolled_identifier_returns_error() {
    let w = World::new();
    w.a.set_level(112, LOC_A, 4);

    let err = w
        .engine
        .sync_identifier("0777", StoreKey::Primary)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SyncError::NotEnrolled {
            store: StoreKey::Secondary,
            ..
        }
    ));
    assert!(w.b.writes().is_empty());
}

// =============================================================================
// Properties
// =============================================================================

#[tokio::test(start_paused = true)]
async fn zero_delta_writes_nothing() {
    let w = World::new();

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;
    // Replaying the applied event is a no-op.
    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;

    assert_eq!(w.b.writes().len(), 1);
    assert!(w.a.writes().is_empty());
    assert_eq!(w.engine.stats().await.unwrap().total_syncs, 1);
}

#[tokio::test(start_paused = true)]
async fn lock_drops_events_until_it_expires() {
    let w = World::new();
    let locks = EchoLockManager::new(w.state.clone());
    locks
        .acquire(StoreKey::Primary, 111, Duration::from_secs(25))
        .await
        .unwrap();

    let dropped = w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    assert_eq!(dropped, EventDisposition::Skipped(SkipReason::EchoLocked));
    assert_eq!(w.engine.pending_reconciliations().await, 0);
    assert_eq!(w.engine.snapshot(StoreKey::Primary, "0123").await.unwrap(), None);

    tokio::time::sleep(Duration::from_secs(26)).await;
    let admitted = w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    assert!(admitted.is_scheduled());
}

#[tokio::test(start_paused = true)]
async fn delta_flows_back_and_predicts_target_snapshot() {
    let w = World::new();

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    // A genuine edit on B after its lock expired.
    w.engine.handle_event(event(StoreKey::Secondary, 9001, 8)).await;
    settle().await;

    assert_eq!(
        w.a.writes(),
        vec![AdapterCall::Adjust {
            item: 111,
            location: LOC_A,
            delta: 3
        }]
    );
    assert_eq!(w.engine.snapshot(StoreKey::Primary, "0123").await.unwrap(), Some(8));
    assert_eq!(w.engine.snapshot(StoreKey::Secondary, "0123").await.unwrap(), Some(8));
}

#[tokio::test(start_paused = true)]
async fn delta_without_target_snapshot_uses_observed_value() {
    let w = World::new();

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;
    w.engine.invalidate_item("0123", StoreKey::Secondary).await.unwrap();

    w.engine.handle_event(event(StoreKey::Primary, 111, 9)).await;
    settle().await;

    assert_eq!(
        w.b.writes().last(),
        Some(&AdapterCall::Adjust {
            item: 9001,
            location: LOC_B,
            delta: 4
        })
    );
    assert_eq!(w.engine.snapshot(StoreKey::Secondary, "0123").await.unwrap(), Some(9));
}

#[tokio::test(start_paused = true)]
async fn full_sync_overrides_prior_target_snapshot() {
    let w = World::new();

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;
    w.engine.invalidate_item("0123", StoreKey::Primary).await.unwrap();

    w.engine.handle_event(event(StoreKey::Primary, 111, 12)).await;
    settle().await;

    assert_eq!(
        w.b.writes().last(),
        Some(&AdapterCall::Set {
            item: 9001,
            location: LOC_B,
            value: 12
        })
    );
    assert_eq!(w.engine.snapshot(StoreKey::Secondary, "0123").await.unwrap(), Some(12));
}

#[tokio::test(start_paused = true)]
async fn failed_write_is_journaled_and_leaves_snapshots() {
    let w = World::new();
    w.b.fail_writes(true);

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;

    let stats = w.engine.stats().await.unwrap();
    assert_eq!(stats.total_syncs, 0);
    assert_eq!(stats.total_errors, 1);
    assert_eq!(w.engine.snapshot(StoreKey::Primary, "0123").await.unwrap(), None);

    let errors = w.engine.recent_errors(5).await.unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("set_inventory_level"));

    // The next genuine event self-heals with a full sync.
    w.b.fail_writes(false);
    w.engine.release_lock(StoreKey::Secondary, 9001).await.unwrap();
    w.engine.handle_event(event(StoreKey::Primary, 111, 6)).await;
    settle().await;
    assert_eq!(w.b.level(9001, LOC_B), Some(6));
}

#[tokio::test]
async fn manual_full_sync_round_trips() {
    let w = World::new();
    w.a.set_level(111, LOC_A, 17);

    let entry = w.engine.sync_identifier("0123", StoreKey::Primary).await.unwrap();
    assert_eq!(entry.kind, SyncKind::Full);
    assert_eq!(entry.value, 17);

    assert_eq!(w.b.get_inventory_level(9001, LOC_B).await.unwrap(), 17);
    assert_eq!(w.engine.snapshot(StoreKey::Primary, "0123").await.unwrap(), Some(17));
    assert_eq!(w.engine.snapshot(StoreKey::Secondary, "0123").await.unwrap(), Some(17));
    assert!(w.engine.is_locked(StoreKey::Secondary, 9001).await.unwrap());
}

#[tokio::test]
async fn manual_sync_store_failure_is_returned_and_journaled() {
    let w = World::new();
    w.a.set_level(111, LOC_A, 3);
    w.b.fail_writes(true);

    let err = w.engine.sync_identifier("0123", StoreKey::Primary).await.unwrap_err();
    assert!(err.is_store_api_error());
    assert_eq!(w.engine.stats().await.unwrap().total_errors, 1);
}

#[tokio::test]
async fn manual_sync_of_unknown_identifier_is_not_in_catalog() {
    let w = World::new();
    let err = w.engine.sync_identifier("4242", StoreKey::Secondary).await.unwrap_err();
    assert!(matches!(err, SyncError::NotInCatalog { .. }));
}

#[tokio::test(start_paused = true)]
async fn wrong_location_is_ignored() {
    let w = World::new();
    let mut stray = event(StoreKey::Primary, 111, 5);
    stray.location_id = LOC_A + 1;

    assert_eq!(
        w.engine.handle_event(stray).await,
        EventDisposition::Skipped(SkipReason::WrongLocation)
    );
    settle().await;
    assert!(w.b.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn catalog_invalidation_picks_up_new_enrollment() {
    let w = World::new();

    assert_eq!(
        w.engine.handle_event(event(StoreKey::Primary, 222, 1)).await,
        EventDisposition::Skipped(SkipReason::NotInCatalog)
    );

    // Tagged in the store, but the cached catalog still predates it.
    w.a.set_products(vec![
        product("a-shirt", &[TAG], 111, Some("0123")),
        product("a-mug", &[TAG], 222, Some("0555")),
    ]);
    assert_eq!(
        w.engine.handle_event(event(StoreKey::Primary, 222, 1)).await,
        EventDisposition::Skipped(SkipReason::NotInCatalog)
    );

    w.engine.invalidate_catalog(StoreKey::Primary).await.unwrap();
    assert!(w.engine.handle_event(event(StoreKey::Primary, 222, 1)).await.is_scheduled());

    // Independent identifiers debounce independently.
    w.engine.handle_event(event(StoreKey::Primary, 111, 2)).await;
    assert_eq!(w.engine.pending_reconciliations().await, 2);

    settle().await;
    assert_eq!(w.b.level(9002, LOC_B), Some(1));
    assert_eq!(w.b.level(9001, LOC_B), Some(2));
}

#[tokio::test(start_paused = true)]
async fn journal_failure_after_write_still_counts_as_applied() {
    let w = World::with_state(BrokenCounter::client(keys::SYNC_COUNTER));

    w.engine.handle_event(event(StoreKey::Primary, 111, 5)).await;
    settle().await;

    assert_eq!(w.b.level(9001, LOC_B), Some(5));
    assert_eq!(w.engine.snapshot(StoreKey::Primary, "0123").await.unwrap(), Some(5));
    assert_eq!(w.engine.snapshot(StoreKey::Secondary, "0123").await.unwrap(), Some(5));

    assert_eq!(w.engine.recent_syncs(10).await.unwrap().len(), 1);
    assert!(w.engine.recent_errors(10).await.unwrap().is_empty());
    assert_eq!(w.engine.stats().await.unwrap().total_errors, 0);
}

#[tokio::test]
async fn manual_sync_survives_journal_failure() {
    let w = World::with_state(BrokenCounter::client(keys::SYNC_COUNTER));
    w.a.set_level(111, LOC_A, 8);

    let entry = w.engine.sync_identifier("0123", StoreKey::Primary).await.unwrap();
    assert_eq!(entry.value, 8);
    assert_eq!(w.b.level(9001, LOC_B), Some(8));
    assert!(w.engine.recent_errors(10).await.unwrap().is_empty());
}
