//! Payment receipts.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount};

/// Confirmation status of a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
}

/// Receipt returned by a treasury backend for one transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Transaction hash or backend-specific reference.
    pub hash: String,
    /// Receiving account.
    pub to: AccountId,
    /// Transferred amount in micro-credits.
    pub amount: Amount,
    /// Confirmation status.
    pub status: PaymentStatus,
    /// Network label the transfer ran on (e.g. "mock", "testnet").
    pub network: String,
    /// Unix timestamp.
    pub timestamp: u64,
}
