//! Builders for domain primitives used across tests.
//!
//! Concise factory functions so tests focus on assertions rather than
//! construction boilerplate.

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use crate::config::{EngineConfig, RetryConfig, TimeoutConfig};
use crate::domain::{Market, MarketId, Outcome, OutcomeId, Trade, TradeSide, UserId};
use crate::engine::{Actor, Capability};

/// Create an open market with named outcomes, expiring in a week.
pub fn market(id: &str, creator: &str, outcomes: &[&str]) -> Market {
    let outcomes = outcomes
        .iter()
        .map(|name| Outcome::new(OutcomeId::from(*name), name.to_uppercase()))
        .collect();
    Market::try_new(
        MarketId::from(id),
        format!("Market {id}?"),
        UserId::from(creator),
        outcomes,
        Utc::now() + Duration::days(7),
    )
    .expect("test market must be valid")
}

/// Create an active buy position.
pub fn active_buy(
    user: &str,
    market: &str,
    outcome: &str,
    amount: Decimal,
    price: Decimal,
) -> Trade {
    let mut trade = Trade::try_new(
        UserId::from(user),
        MarketId::from(market),
        OutcomeId::from(outcome),
        TradeSide::Buy,
        amount,
        price,
    )
    .expect("test trade must be valid");
    trade.activate();
    trade
}

/// Create a pending (cancellable) buy position.
pub fn pending_buy(
    user: &str,
    market: &str,
    outcome: &str,
    amount: Decimal,
    price: Decimal,
) -> Trade {
    Trade::try_new(
        UserId::from(user),
        MarketId::from(market),
        OutcomeId::from(outcome),
        TradeSide::Buy,
        amount,
        price,
    )
    .expect("test trade must be valid")
}

/// An actor with no special capabilities.
pub fn actor(id: &str) -> Actor {
    Actor::new(id)
}

/// An actor holding the admin capability.
pub fn admin(id: &str) -> Actor {
    Actor::new(id).with_capability(Capability::Admin)
}

/// An actor holding the arbiter capability.
pub fn arbiter(id: &str) -> Actor {
    Actor::new(id).with_capability(Capability::Arbiter)
}

/// Engine configuration with millisecond-scale delays so retry and
/// lock-wait paths run fast under test.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        retry: RetryConfig {
            max_attempts: 3,
            initial_delay_ms: 1,
            max_delay_ms: 5,
            backoff_multiplier: 2.0,
        },
        timeouts: TimeoutConfig {
            storage_ms: 1_000,
            finalize_lock_wait_ms: 1_000,
        },
        ..EngineConfig::default()
    }
}
