//! Reputation recompute driven through the settlement flow.

use std::sync::Arc;

use rust_decimal_macros::dec;
use settlor::domain::{Badge, MarketId, OutcomeId, UserId};
use settlor::engine::ResolutionEngine;
use settlor::notifier::TracingNotifier;
use settlor::port::LedgerStore;
use settlor::store::MemoryLedger;
use settlor::testkit::domain::{active_buy, actor, arbiter, fast_config, market};

fn engine_over(store: Arc<MemoryLedger>) -> ResolutionEngine {
    ResolutionEngine::new(store, Arc::new(TracingNotifier::new()), fast_config())
}

async fn settle_market(
    store: &MemoryLedger,
    engine: &ResolutionEngine,
    market_id: &str,
    winner: &str,
) {
    store
        .save_market(&market(market_id, "creator", &["x", "y"]))
        .await
        .unwrap();
    // Alice always backs x, bob always backs y.
    store
        .save_trade(&active_buy("alice", market_id, "x", dec!(10), dec!(0.5)))
        .await
        .unwrap();
    store
        .save_trade(&active_buy("bob", market_id, "y", dec!(10), dec!(0.5)))
        .await
        .unwrap();

    let resolution = engine
        .propose(
            &actor("creator"),
            &MarketId::from(market_id),
            &OutcomeId::from(winner),
            "result",
        )
        .await
        .unwrap();
    engine
        .finalize(&arbiter("arb"), resolution.resolution_id())
        .await
        .unwrap();
}

#[tokio::test]
async fn each_settled_market_adds_one_prediction_per_user() {
    let store = Arc::new(MemoryLedger::new());
    let engine = engine_over(store.clone());

    settle_market(&store, &engine, "m1", "x").await;
    settle_market(&store, &engine, "m2", "x").await;
    settle_market(&store, &engine, "m3", "y").await;

    let alice = store.reputation(&UserId::from("alice")).await.unwrap().unwrap();
    assert_eq!(alice.total_predictions(), 3);
    assert_eq!(alice.successful_predictions(), 2);

    let bob = store.reputation(&UserId::from("bob")).await.unwrap().unwrap();
    assert_eq!(bob.total_predictions(), 3);
    assert_eq!(bob.successful_predictions(), 1);

    // Totals only ever grow as markets settle.
    settle_market(&store, &engine, "m4", "y").await;
    let alice = store.reputation(&UserId::from("alice")).await.unwrap().unwrap();
    assert_eq!(alice.total_predictions(), 4);
    assert_eq!(alice.successful_predictions(), 2);
}

#[tokio::test]
async fn recompute_replaces_rather_than_increments() {
    let store = Arc::new(MemoryLedger::new());
    let engine = engine_over(store.clone());

    settle_market(&store, &engine, "m1", "x").await;

    // Running the recompute again over the same history must be a no-op
    // on the counts.
    let first = store.reputation(&UserId::from("alice")).await.unwrap().unwrap();
    let again = engine
        .recompute_reputation(&UserId::from("alice"))
        .await
        .unwrap();
    assert_eq!(again.total_predictions(), first.total_predictions());
    assert_eq!(again.successful_predictions(), first.successful_predictions());
    assert_eq!(again.trust_score(), first.trust_score());
}

#[tokio::test]
async fn user_with_no_settled_trades_scores_zero() {
    let store = Arc::new(MemoryLedger::new());
    let engine = engine_over(store);

    let rep = engine
        .recompute_reputation(&UserId::from("ghost"))
        .await
        .unwrap();
    assert_eq!(rep.total_predictions(), 0);
    assert_eq!(rep.trust_score(), dec!(0));
    assert_eq!(rep.badge(), None);
}

#[tokio::test]
async fn top_predictors_orders_by_trust_then_volume() {
    let store = Arc::new(MemoryLedger::new());
    let engine = engine_over(store.clone());

    // Seed records directly; ordering is the store's contract.
    let now = chrono::Utc::now();
    store
        .save_reputation(&settlor::domain::UserReputation::compute(
            UserId::from("sharp"),
            100,
            80,
            now,
        ))
        .await
        .unwrap();
    store
        .save_reputation(&settlor::domain::UserReputation::compute(
            UserId::from("steady"),
            50,
            30,
            now,
        ))
        .await
        .unwrap();
    store
        .save_reputation(&settlor::domain::UserReputation::compute(
            UserId::from("newbie"),
            4,
            2,
            now,
        ))
        .await
        .unwrap();

    let top = engine.top_predictors(2).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].user_id(), &UserId::from("sharp"));
    assert_eq!(top[0].badge(), Some(Badge::Expert));
    assert_eq!(top[1].user_id(), &UserId::from("steady"));
}
