//! Notifier adapters.
//!
//! - [`TracingNotifier`] - structured log sink, the default for services
//!   that have no real-time delivery layer attached
//! - [`ChannelNotifier`] - forwards events over an unbounded channel, for
//!   tests and for an external delivery layer to consume

use tokio::sync::mpsc;
use tracing::info;

use crate::port::notifier::{ResolutionEvent, SettlementNotifier};

/// Notifier that logs every event through `tracing`.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Create a new tracing notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SettlementNotifier for TracingNotifier {
    fn notify(&self, event: ResolutionEvent) {
        match &event {
            ResolutionEvent::Proposed(e) => info!(
                kind = event.kind(),
                resolution = %e.resolution_id,
                market = %e.market_id,
                outcome = %e.proposed_outcome_id,
                "resolution event"
            ),
            ResolutionEvent::Finalized(e) => info!(
                kind = event.kind(),
                resolution = %e.resolution_id,
                market = %e.market_id,
                outcome = %e.resolved_outcome_id,
                total_paid = %e.summary.total_paid,
                winners = e.summary.winners,
                "resolution event"
            ),
            ResolutionEvent::Disputed(e) => info!(
                kind = event.kind(),
                resolution = %e.resolution_id,
                market = %e.market_id,
                disputed_by = %e.disputed_by,
                "resolution event"
            ),
        }
    }
}

/// Notifier that forwards events over an unbounded mpsc channel.
///
/// Sending never blocks; if the receiver is gone the event is dropped,
/// which matches the at-least-once, consumer-deduplicated delivery
/// contract.
#[derive(Debug)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<ResolutionEvent>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ResolutionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SettlementNotifier for ChannelNotifier {
    fn notify(&self, event: ResolutionEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarketId, OutcomeId, ResolutionId, UserId};
    use crate::port::notifier::ProposedEvent;

    fn proposed(id: &str) -> ResolutionEvent {
        ResolutionEvent::Proposed(ProposedEvent {
            resolution_id: ResolutionId::from(id),
            market_id: MarketId::from("m1"),
            proposed_outcome_id: OutcomeId::from("yes"),
            proposed_by: UserId::from("creator"),
        })
    }

    #[tokio::test]
    async fn channel_notifier_delivers_in_order() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(proposed("r1"));
        notifier.notify(proposed("r2"));

        assert_eq!(
            rx.recv().await.unwrap().resolution_id(),
            &ResolutionId::from("r1")
        );
        assert_eq!(
            rx.recv().await.unwrap().resolution_id(),
            &ResolutionId::from("r2")
        );
    }

    #[test]
    fn dropped_receiver_does_not_panic() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(proposed("r1"));
    }
}
