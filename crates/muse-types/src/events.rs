//! Append-only ledger event records.
//!
//! Downstream consumers (UI, indexers) read these as a feed; the ledger
//! only ever appends.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, ProjectId};

/// One revenue distribution to a project.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEvent {
    /// Feed sequence number, assigned by the store.
    pub seq: u64,
    /// Target project.
    pub project_id: ProjectId,
    /// Inbound amount in micro-credits.
    pub amount: Amount,
    /// Amount actually credited to contributors (`amount` minus rounding loss).
    pub credited: Amount,
    /// Unix timestamp.
    pub timestamp: u64,
}

/// One contributor withdrawal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalEvent {
    /// Feed sequence number, assigned by the store.
    pub seq: u64,
    /// The withdrawing contributor.
    pub account: AccountId,
    /// Full balance paid out.
    pub amount: Amount,
    /// Receipt hash from the treasury backend.
    pub receipt_hash: String,
    /// Unix timestamp.
    pub timestamp: u64,
}
