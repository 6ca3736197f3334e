//! The treasury seam.
//!
//! Withdrawals end in a transfer out of the system. How that transfer
//! happens (simulated, testnet rail, production rail) is decided by the
//! caller through this trait, never by branches inside the ledger.

use muse_types::payment::PaymentReceipt;
use muse_types::{AccountId, Amount};

/// A transfer failure reported by a treasury backend.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct TreasuryError(pub String);

/// A payout rail capable of moving funds to a contributor.
pub trait Treasury {
    /// Transfer `amount` micro-credits to `to`, returning a receipt.
    fn transfer(&self, to: &AccountId, amount: Amount)
        -> std::result::Result<PaymentReceipt, TreasuryError>;
}
