//! Floating-point share preview.
//!
//! The UI shows each contributor's expected cut before anything is
//! submitted. Display math runs in `f64`, so a preview can differ from
//! the ledger's floor-division result by fractions of a micro-credit.
//! The ledger's integers win.

use serde::{Deserialize, Serialize};

use muse_types::AccountId;

/// One contributor's previewed cut.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SharePreview {
    /// The contributor account.
    pub account: AccountId,
    /// Their registered percentage.
    pub percentage: u8,
    /// `total * percentage / 100` in floating point.
    pub amount: f64,
}

/// Compute per-contributor preview amounts for a prospective distribution.
pub fn compute(total: f64, entries: &[(AccountId, u8)]) -> Vec<SharePreview> {
    entries
        .iter()
        .map(|(account, percentage)| SharePreview {
            account: account.clone(),
            percentage: *percentage,
            amount: total * f64::from(*percentage) / 100.0,
        })
        .collect()
}
