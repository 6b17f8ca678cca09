//! Reputation recompute and leaderboard reads.

use std::collections::HashMap;

use chrono::Utc;
use tracing::debug;

use crate::domain::{MarketId, Resolution, UserId, UserReputation};
use crate::error::Result;

use super::ResolutionEngine;

impl ResolutionEngine {
    /// Fully recompute a user's reputation from their settled trades.
    ///
    /// Serialized per user: two concurrent recomputes for the same user
    /// id never interleave their read-modify-write. The record is
    /// replaced, not incremented, so it stays correct if trades are
    /// retroactively amended.
    pub async fn recompute_reputation(&self, user_id: &UserId) -> Result<UserReputation> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let trades = self
            .store_op("resolved_trades_for_user", || {
                self.store().resolved_trades_for_user(user_id)
            })
            .await?;

        // Join each trade with its market's resolution. Markets repeat
        // across trades, so fetch each resolution once.
        let mut resolutions: HashMap<MarketId, Option<Resolution>> = HashMap::new();
        let mut successful = 0u64;
        for trade in &trades {
            if !resolutions.contains_key(trade.market_id()) {
                let resolution = self
                    .store_op("resolution_for_market", || {
                        self.store().resolution_for_market(trade.market_id())
                    })
                    .await?;
                resolutions.insert(trade.market_id().clone(), resolution);
            }
            if let Some(Some(resolution)) = resolutions.get(trade.market_id()) {
                if resolution.is_approved()
                    && resolution.resolved_outcome_id() == trade.outcome_id()
                {
                    successful += 1;
                }
            }
        }

        let reputation = UserReputation::compute(
            user_id.clone(),
            trades.len() as u64,
            successful,
            Utc::now(),
        );
        self.store_op("save_reputation", || {
            self.store().save_reputation(&reputation)
        })
        .await?;

        debug!(
            user = %user_id,
            total = reputation.total_predictions(),
            successful = reputation.successful_predictions(),
            trust = %reputation.trust_score(),
            "reputation recomputed"
        );

        Ok(reputation)
    }

    /// Top reputation records ordered by trust score, then prediction
    /// count.
    pub async fn top_predictors(&self, limit: usize) -> Result<Vec<UserReputation>> {
        self.store_op("top_reputations", || self.store().top_reputations(limit))
            .await
    }
}
