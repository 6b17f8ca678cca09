//! Resolution domain types.
//!
//! A [`Resolution`] is the authoritative record of which outcome won and
//! under what evidence. Exactly one exists per market. It carries a
//! structured evidence trail that grows through propose/dispute/reconsider
//! cycles, and - once approved - the settled payout sheet so a retried
//! finalize can replay the identical result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{MarketId, OutcomeId, ResolutionId, UserId};
use super::settlement::SettlementSheet;

/// Resolution lifecycle state.
///
/// Transitions: `Pending → Approved` (finalize) or `Pending → Disputed`
/// (dispute) and `Disputed → Pending` (reconsider). `Approved` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStatus {
    Pending,
    Approved,
    Disputed,
}

impl ResolutionStatus {
    /// Stable name used in logs and events.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Disputed => "disputed",
        }
    }
}

/// What kind of submission an evidence entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvidenceKind {
    /// The original proposal, or an amended proposal.
    Proposal,
    /// A dispute raised against a pending resolution.
    Dispute,
    /// A reconsideration returning a disputed resolution to pending.
    Reconsideration,
}

/// One entry in a resolution's evidence trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub kind: EvidenceKind,
    pub submitted_by: UserId,
    pub text: String,
    pub submitted_at: DateTime<Utc>,
}

impl EvidenceEntry {
    fn new(kind: EvidenceKind, submitted_by: UserId, text: impl Into<String>) -> Self {
        Self {
            kind,
            submitted_by,
            text: text.into(),
            submitted_at: Utc::now(),
        }
    }
}

/// The resolution record for a market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resolution {
    resolution_id: ResolutionId,
    market_id: MarketId,
    resolved_outcome_id: OutcomeId,
    resolved_by: UserId,
    status: ResolutionStatus,
    evidence: Vec<EvidenceEntry>,
    settlement: Option<SettlementSheet>,
    resolved_at: Option<DateTime<Utc>>,
}

impl Resolution {
    /// Create a pending resolution with the initial proposal evidence.
    pub fn new(
        market_id: MarketId,
        resolved_outcome_id: OutcomeId,
        proposed_by: UserId,
        evidence: impl Into<String>,
    ) -> Self {
        let entry = EvidenceEntry::new(EvidenceKind::Proposal, proposed_by.clone(), evidence);
        Self {
            resolution_id: ResolutionId::generate(),
            market_id,
            resolved_outcome_id,
            resolved_by: proposed_by,
            status: ResolutionStatus::Pending,
            evidence: vec![entry],
            settlement: None,
            resolved_at: None,
        }
    }

    /// Get the resolution ID.
    #[must_use]
    pub const fn resolution_id(&self) -> &ResolutionId {
        &self.resolution_id
    }

    /// Get the market this resolution belongs to.
    #[must_use]
    pub const fn market_id(&self) -> &MarketId {
        &self.market_id
    }

    /// The currently proposed (or approved) winning outcome.
    #[must_use]
    pub const fn resolved_outcome_id(&self) -> &OutcomeId {
        &self.resolved_outcome_id
    }

    /// Who proposed the resolution.
    #[must_use]
    pub const fn resolved_by(&self) -> &UserId {
        &self.resolved_by
    }

    /// Get the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ResolutionStatus {
        self.status
    }

    /// The full evidence trail, oldest first.
    #[must_use]
    pub fn evidence(&self) -> &[EvidenceEntry] {
        &self.evidence
    }

    /// The settled payout sheet, present once approved.
    #[must_use]
    pub const fn settlement(&self) -> Option<&SettlementSheet> {
        self.settlement.as_ref()
    }

    /// When the resolution was approved.
    #[must_use]
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Whether finalize may proceed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == ResolutionStatus::Pending
    }

    /// Whether the resolution has been finalized.
    #[must_use]
    pub fn is_approved(&self) -> bool {
        self.status == ResolutionStatus::Approved
    }

    /// Record a dispute: append evidence and block finalize.
    pub(crate) fn dispute(&mut self, by: UserId, reason: &str, evidence: &str) {
        self.evidence.push(EvidenceEntry::new(
            EvidenceKind::Dispute,
            by,
            format!("{reason}: {evidence}"),
        ));
        self.status = ResolutionStatus::Disputed;
    }

    /// Return a disputed resolution to pending, optionally amending the
    /// proposed outcome.
    pub(crate) fn reconsider(
        &mut self,
        by: UserId,
        note: &str,
        new_outcome: Option<OutcomeId>,
    ) {
        if let Some(outcome) = new_outcome {
            self.resolved_outcome_id = outcome;
        }
        self.evidence
            .push(EvidenceEntry::new(EvidenceKind::Reconsideration, by, note));
        self.status = ResolutionStatus::Pending;
    }

    /// Approve the resolution with its settled sheet.
    pub(crate) fn approve(&mut self, sheet: SettlementSheet, at: DateTime<Utc>) {
        self.settlement = Some(sheet);
        self.resolved_at = Some(at);
        self.status = ResolutionStatus::Approved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::settlement::SettlementSheet;

    fn pending() -> Resolution {
        Resolution::new(
            MarketId::from("m1"),
            OutcomeId::from("yes"),
            UserId::from("creator"),
            "source: official announcement",
        )
    }

    #[test]
    fn new_resolution_is_pending_with_proposal_evidence() {
        let res = pending();
        assert_eq!(res.status(), ResolutionStatus::Pending);
        assert_eq!(res.evidence().len(), 1);
        assert_eq!(res.evidence()[0].kind, EvidenceKind::Proposal);
        assert!(res.settlement().is_none());
        assert!(res.resolved_at().is_none());
    }

    #[test]
    fn dispute_appends_evidence_and_blocks() {
        let mut res = pending();
        res.dispute(UserId::from("challenger"), "wrong outcome", "see link");

        assert_eq!(res.status(), ResolutionStatus::Disputed);
        assert!(!res.is_pending());
        assert_eq!(res.evidence().len(), 2);
        assert_eq!(res.evidence()[1].kind, EvidenceKind::Dispute);
        assert!(res.evidence()[1].text.contains("wrong outcome"));
    }

    #[test]
    fn reconsider_returns_to_pending_and_can_amend_outcome() {
        let mut res = pending();
        res.dispute(UserId::from("challenger"), "wrong outcome", "see link");
        res.reconsider(
            UserId::from("creator"),
            "amended after review",
            Some(OutcomeId::from("no")),
        );

        assert_eq!(res.status(), ResolutionStatus::Pending);
        assert_eq!(res.resolved_outcome_id(), &OutcomeId::from("no"));
        assert_eq!(res.evidence().len(), 3);
    }

    #[test]
    fn reconsider_without_amendment_keeps_outcome() {
        let mut res = pending();
        res.dispute(UserId::from("challenger"), "procedural", "late evidence");
        res.reconsider(UserId::from("creator"), "dispute rejected", None);
        assert_eq!(res.resolved_outcome_id(), &OutcomeId::from("yes"));
    }

    #[test]
    fn approve_stores_sheet_and_timestamp() {
        let mut res = pending();
        let now = Utc::now();
        res.approve(SettlementSheet::empty(), now);

        assert!(res.is_approved());
        assert!(res.settlement().is_some());
        assert_eq!(res.resolved_at(), Some(now));
    }

    #[test]
    fn evidence_trail_survives_repeated_cycles() {
        let mut res = pending();
        res.dispute(UserId::from("a"), "r1", "e1");
        res.reconsider(UserId::from("creator"), "n1", None);
        res.dispute(UserId::from("b"), "r2", "e2");
        res.reconsider(UserId::from("creator"), "n2", None);

        assert_eq!(res.evidence().len(), 5);
        assert!(res.is_pending());
    }
}
