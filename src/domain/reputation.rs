//! Reputation and trust-score model.
//!
//! A user's reputation is derived entirely from their settled trade
//! history and is fully recomputed on every settlement (replace, not
//! increment) so it stays correct if trades are retroactively amended.
//!
//! The trust score is a weighted composite with fixed model constants:
//!
//! ```text
//! trust = 0.4·accuracy + 0.2·min(total/100, 1) + 0.4·min(successful/50, 1)
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::id::UserId;

const ACCURACY_WEIGHT: Decimal = dec!(0.4);
const VOLUME_WEIGHT: Decimal = dec!(0.2);
const SUCCESS_WEIGHT: Decimal = dec!(0.4);

/// Prediction count at which the volume term saturates.
const VOLUME_SATURATION: u64 = 100;
/// Successful-prediction count at which the success term saturates.
const SUCCESS_SATURATION: u64 = 50;

/// Badge tiers, mutually exclusive: a user holds at most the highest tier
/// whose prediction-count and accuracy thresholds are both met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Badge {
    Novice,
    Intermediate,
    Expert,
    Master,
}

impl Badge {
    /// Stable badge name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Novice => "NOVICE",
            Self::Intermediate => "INTERMEDIATE",
            Self::Expert => "EXPERT",
            Self::Master => "MASTER",
        }
    }

    const fn thresholds(self) -> (u64, Decimal) {
        match self {
            Self::Master => (200, dec!(0.8)),
            Self::Expert => (100, dec!(0.7)),
            Self::Intermediate => (50, dec!(0.6)),
            Self::Novice => (10, dec!(0.5)),
        }
    }
}

/// Determine the badge for a record, highest tier first.
#[must_use]
pub fn badge_for(total_predictions: u64, accuracy: Decimal) -> Option<Badge> {
    [
        Badge::Master,
        Badge::Expert,
        Badge::Intermediate,
        Badge::Novice,
    ]
    .into_iter()
    .find(|badge| {
        let (min_predictions, min_accuracy) = badge.thresholds();
        total_predictions >= min_predictions && accuracy >= min_accuracy
    })
}

/// Compute the weighted trust score for a record.
#[must_use]
pub fn trust_score(total_predictions: u64, successful_predictions: u64) -> Decimal {
    let accuracy = accuracy(total_predictions, successful_predictions);
    let volume_term =
        (Decimal::from(total_predictions) / Decimal::from(VOLUME_SATURATION)).min(Decimal::ONE);
    let success_term = (Decimal::from(successful_predictions)
        / Decimal::from(SUCCESS_SATURATION))
    .min(Decimal::ONE);

    ACCURACY_WEIGHT * accuracy + VOLUME_WEIGHT * volume_term + SUCCESS_WEIGHT * success_term
}

/// Fraction of predictions that were successful; zero when there are none.
#[must_use]
pub fn accuracy(total_predictions: u64, successful_predictions: u64) -> Decimal {
    Decimal::from(successful_predictions)
        .checked_div(Decimal::from(total_predictions))
        .unwrap_or(Decimal::ZERO)
}

/// A user's longitudinal prediction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserReputation {
    user_id: UserId,
    total_predictions: u64,
    successful_predictions: u64,
    accuracy: Decimal,
    trust_score: Decimal,
    badge: Option<Badge>,
    updated_at: DateTime<Utc>,
}

impl UserReputation {
    /// Derive a reputation record from settled-prediction counts.
    #[must_use]
    pub fn compute(
        user_id: UserId,
        total_predictions: u64,
        successful_predictions: u64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let acc = accuracy(total_predictions, successful_predictions);
        Self {
            user_id,
            total_predictions,
            successful_predictions,
            accuracy: acc,
            trust_score: trust_score(total_predictions, successful_predictions),
            badge: badge_for(total_predictions, acc),
            updated_at,
        }
    }

    /// Get the user id.
    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Total settled predictions.
    #[must_use]
    pub const fn total_predictions(&self) -> u64 {
        self.total_predictions
    }

    /// Settled predictions on the outcome that won.
    #[must_use]
    pub const fn successful_predictions(&self) -> u64 {
        self.successful_predictions
    }

    /// `successful / total`, zero when there are no predictions.
    #[must_use]
    pub const fn accuracy(&self) -> Decimal {
        self.accuracy
    }

    /// Weighted composite trust score.
    #[must_use]
    pub const fn trust_score(&self) -> Decimal {
        self.trust_score
    }

    /// The badge tier currently held, if any.
    #[must_use]
    pub const fn badge(&self) -> Option<Badge> {
        self.badge
    }

    /// When this record was last recomputed.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
