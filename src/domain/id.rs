//! Domain identifier types with proper encapsulation.
//!
//! The inner `String` of each id is private so all construction goes
//! through the defined constructors. `TradeId` and `ResolutionId` are
//! generated by the engine and default to UUID v4; the remaining ids are
//! assigned by the surrounding platform.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Create an id from a string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id! {
    /// Market identifier - newtype for type safety.
    MarketId
}

string_id! {
    /// Outcome identifier, unique within its market.
    OutcomeId
}

string_id! {
    /// User identifier as assigned by the platform's account system.
    UserId
}

string_id! {
    /// Trade (position) identifier.
    TradeId
}

string_id! {
    /// Resolution identifier. Exactly one resolution exists per market.
    ResolutionId
}

impl TradeId {
    /// Generate a fresh trade id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl ResolutionId {
    /// Generate a fresh resolution id (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn market_id_new_and_as_str() {
        let id = MarketId::new("market-1");
        assert_eq!(id.as_str(), "market-1");
    }

    #[test]
    fn market_id_display() {
        let id = MarketId::from("display-test");
        assert_eq!(format!("{}", id), "display-test");
    }

    #[test]
    fn outcome_id_from_string() {
        let id = OutcomeId::from("yes".to_string());
        assert_eq!(id.as_str(), "yes");
    }

    #[test]
    fn trade_id_generates_unique_ids() {
        let id1 = TradeId::generate();
        let id2 = TradeId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn trade_id_generate_is_uuid_format() {
        let id = TradeId::generate();
        // UUID v4 format: 8-4-4-4-12 hex chars
        assert_eq!(id.as_str().len(), 36);
        assert_eq!(id.as_str().chars().filter(|c| *c == '-').count(), 4);
    }

    #[test]
    fn resolution_id_generates_unique_ids() {
        let id1 = ResolutionId::generate();
        let id2 = ResolutionId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn user_id_round_trips_through_from() {
        let id = UserId::from("user-9");
        assert_eq!(id, UserId::new("user-9"));
    }
}
