//! Dispute and reconsideration workflow.

use std::sync::Arc;

use rust_decimal_macros::dec;
use settlor::domain::{EvidenceKind, MarketId, OutcomeId, ResolutionStatus, UserId};
use settlor::engine::ResolutionEngine;
use settlor::error::EngineError;
use settlor::notifier::TracingNotifier;
use settlor::port::LedgerStore;
use settlor::store::MemoryLedger;
use settlor::testkit::domain::{active_buy, actor, admin, arbiter, fast_config, market};

fn engine_over(store: Arc<MemoryLedger>) -> ResolutionEngine {
    ResolutionEngine::new(store, Arc::new(TracingNotifier::new()), fast_config())
}

async fn seeded_engine() -> (Arc<MemoryLedger>, ResolutionEngine) {
    let store = Arc::new(MemoryLedger::new());
    store.save_market(&market("m1", "creator", &["x", "y"])).await.unwrap();
    store
        .save_trade(&active_buy("alice", "m1", "x", dec!(100), dec!(0.4)))
        .await
        .unwrap();
    store
        .save_trade(&active_buy("bob", "m1", "y", dec!(50), dec!(0.6)))
        .await
        .unwrap();
    let engine = engine_over(store.clone());
    (store, engine)
}

#[tokio::test]
async fn disputed_resolution_blocks_finalize_until_reconsidered() {
    let (_store, engine) = seeded_engine().await;
    let resolution = engine
        .propose(
            &actor("creator"),
            &MarketId::from("m1"),
            &OutcomeId::from("x"),
            "result",
        )
        .await
        .unwrap();

    // Any actor may dispute a pending resolution.
    let disputed = engine
        .dispute(
            &actor("bob"),
            resolution.resolution_id(),
            "wrong outcome",
            "the official feed says y",
        )
        .await
        .unwrap();
    assert_eq!(disputed.status(), ResolutionStatus::Disputed);

    let err = engine
        .finalize(&arbiter("arb"), resolution.resolution_id())
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { .. }));

    // Reconsideration returns it to pending and finalize succeeds.
    let pending = engine
        .reconsider(
            &actor("creator"),
            resolution.resolution_id(),
            None,
            "evidence reviewed, original outcome stands",
        )
        .await
        .unwrap();
    assert_eq!(pending.status(), ResolutionStatus::Pending);

    let receipt = engine
        .finalize(&arbiter("arb"), resolution.resolution_id())
        .await
        .unwrap();
    assert_eq!(receipt.sheet.total_volume, dec!(150));
}

#[tokio::test]
async fn reconsider_can_amend_the_outcome() {
    let (store, engine) = seeded_engine().await;
    let resolution = engine
        .propose(
            &actor("creator"),
            &MarketId::from("m1"),
            &OutcomeId::from("x"),
            "result",
        )
        .await
        .unwrap();

    engine
        .dispute(
            &actor("bob"),
            resolution.resolution_id(),
            "wrong outcome",
            "the official feed says y",
        )
        .await
        .unwrap();
    let amended = engine
        .reconsider(
            &admin("ops"),
            resolution.resolution_id(),
            Some(&OutcomeId::from("y")),
            "feed confirmed",
        )
        .await
        .unwrap();
    assert_eq!(amended.resolved_outcome_id(), &OutcomeId::from("y"));

    let receipt = engine
        .finalize(&arbiter("arb"), resolution.resolution_id())
        .await
        .unwrap();
    assert_eq!(receipt.sheet.winning_volume, dec!(50));
    // Bob's side won after the amendment: 150 / 50 = 3x.
    assert_eq!(receipt.sheet.reward_multiplier, Some(dec!(3)));
    assert_eq!(store.balance(&UserId::from("bob")).await.unwrap(), dec!(150));
    assert_eq!(store.balance(&UserId::from("alice")).await.unwrap(), dec!(0));
}

#[tokio::test]
async fn reconsider_is_restricted_and_validates_outcome() {
    let (_store, engine) = seeded_engine().await;
    let resolution = engine
        .propose(
            &actor("creator"),
            &MarketId::from("m1"),
            &OutcomeId::from("x"),
            "result",
        )
        .await
        .unwrap();
    engine
        .dispute(&actor("bob"), resolution.resolution_id(), "wrong", "feed")
        .await
        .unwrap();

    let err = engine
        .reconsider(&actor("bob"), resolution.resolution_id(), None, "note")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Unauthorized { .. }));

    let err = engine
        .reconsider(
            &actor("creator"),
            resolution.resolution_id(),
            Some(&OutcomeId::from("nope")),
            "note",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::NotFound { .. }));
}

#[tokio::test]
async fn only_pending_resolutions_can_be_disputed() {
    let (_store, engine) = seeded_engine().await;
    let resolution = engine
        .propose(
            &actor("creator"),
            &MarketId::from("m1"),
            &OutcomeId::from("x"),
            "result",
        )
        .await
        .unwrap();
    engine
        .finalize(&arbiter("arb"), resolution.resolution_id())
        .await
        .unwrap();

    let err = engine
        .dispute(&actor("bob"), resolution.resolution_id(), "late", "too late")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { .. }));

    // Reconsidering a non-disputed resolution fails the same way.
    let err = engine
        .reconsider(&actor("creator"), resolution.resolution_id(), None, "note")
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidState { .. }));
}

#[tokio::test]
async fn repeated_cycles_accumulate_the_evidence_trail() {
    let (store, engine) = seeded_engine().await;
    let resolution = engine
        .propose(
            &actor("creator"),
            &MarketId::from("m1"),
            &OutcomeId::from("x"),
            "first look",
        )
        .await
        .unwrap();

    for round in 0..2 {
        engine
            .dispute(
                &actor("bob"),
                resolution.resolution_id(),
                "contested",
                &format!("round {round}"),
            )
            .await
            .unwrap();
        engine
            .reconsider(
                &actor("creator"),
                resolution.resolution_id(),
                None,
                "stands",
            )
            .await
            .unwrap();
    }

    let stored = store
        .resolution(resolution.resolution_id())
        .await
        .unwrap()
        .unwrap();
    // Proposal + 2 * (dispute + reconsideration).
    assert_eq!(stored.evidence().len(), 5);
    assert_eq!(stored.evidence()[0].kind, EvidenceKind::Proposal);
    assert_eq!(stored.evidence()[1].kind, EvidenceKind::Dispute);
    assert_eq!(stored.evidence()[1].text, "contested: round 0");
    assert_eq!(stored.evidence()[4].kind, EvidenceKind::Reconsideration);
    assert_eq!(stored.status(), ResolutionStatus::Pending);
}
