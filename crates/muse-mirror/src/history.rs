//! Mirror state: mode plus a capped ring of simulated distributions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use muse_types::payment::PaymentReceipt;
use muse_types::{unix_now, Amount, ProjectId};

use crate::mode::DistributionMode;
use crate::treasury::fabricate_receipt;

/// Maximum records the history ring retains.
pub const MAX_HISTORY: usize = 100;

/// Default number of records returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// One simulated distribution kept in the history ring.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributionRecord {
    /// Mode the simulation ran under.
    pub mode: DistributionMode,
    /// Target project.
    pub project_id: ProjectId,
    /// Inbound amount.
    pub total_amount: Amount,
    /// Sum of the fabricated payouts.
    pub distributed_amount: Amount,
    /// One fabricated receipt per contributor.
    pub receipts: Vec<PaymentReceipt>,
    /// Unix timestamp.
    pub timestamp: u64,
}

/// The client mirror: current mode and what it has simulated so far.
///
/// Holds no lock over the authoritative ledger and never reads it; a
/// mirror can always be stale relative to committed state.
#[derive(Debug, Default)]
pub struct Mirror {
    mode: DistributionMode,
    history: VecDeque<DistributionRecord>,
}

impl Mirror {
    /// Create a mirror starting in the given mode.
    pub fn new(mode: DistributionMode) -> Self {
        Self {
            mode,
            history: VecDeque::new(),
        }
    }

    /// The current mode.
    pub fn mode(&self) -> DistributionMode {
        self.mode
    }

    /// Switch modes.
    pub fn set_mode(&mut self, mode: DistributionMode) {
        tracing::info!(mode = mode.as_str(), "distribution mode changed");
        self.mode = mode;
    }

    /// Simulate distributing already-computed credits, without touching
    /// any ledger. Fabricates one receipt per contributor and records
    /// the run in the history ring.
    pub fn simulate_distribution(
        &mut self,
        project_id: &str,
        total_amount: Amount,
        credits: &[(String, Amount)],
    ) -> DistributionRecord {
        let receipts: Vec<PaymentReceipt> = credits
            .iter()
            .map(|(account, amount)| fabricate_receipt(self.mode, account, *amount))
            .collect();
        let distributed_amount = receipts.iter().map(|r| r.amount).sum();

        let record = DistributionRecord {
            mode: self.mode,
            project_id: project_id.to_string(),
            total_amount,
            distributed_amount,
            receipts,
            timestamp: unix_now(),
        };

        self.history.push_front(record.clone());
        self.history.truncate(MAX_HISTORY);
        record
    }

    /// The most recent records, newest first.
    pub fn history(&self, limit: usize) -> Vec<DistributionRecord> {
        self.history.iter().take(limit).cloned().collect()
    }
}
