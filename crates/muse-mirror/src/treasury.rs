//! Simulated payout rail.
//!
//! Stands in for transfer infrastructure that is not wired up yet:
//! every transfer succeeds instantly with a fabricated receipt. The
//! receipt's `network` field records which mode fabricated it.

use muse_ledger::treasury::{Treasury, TreasuryError};
use muse_types::payment::{PaymentReceipt, PaymentStatus};
use muse_types::{unix_now, AccountId, Amount};

use crate::mode::DistributionMode;

/// A treasury that fabricates confirmed receipts instead of moving funds.
#[derive(Clone, Copy, Debug, Default)]
pub struct SimulatedTreasury {
    mode: DistributionMode,
}

impl SimulatedTreasury {
    /// Create a simulated treasury labelled with the given mode.
    pub fn new(mode: DistributionMode) -> Self {
        Self { mode }
    }

    /// The mode this treasury labels its receipts with.
    pub fn mode(&self) -> DistributionMode {
        self.mode
    }
}

impl Treasury for SimulatedTreasury {
    fn transfer(
        &self,
        to: &AccountId,
        amount: Amount,
    ) -> std::result::Result<PaymentReceipt, TreasuryError> {
        let receipt = fabricate_receipt(self.mode, to, amount);
        tracing::debug!(
            to = to.as_str(),
            amount,
            hash = receipt.hash.as_str(),
            "simulated transfer"
        );
        Ok(receipt)
    }
}

/// Build a confirmed receipt with a random transaction hash.
pub fn fabricate_receipt(mode: DistributionMode, to: &str, amount: Amount) -> PaymentReceipt {
    let bytes: [u8; 32] = rand::random();
    PaymentReceipt {
        hash: format!("0x{}", hex::encode(bytes)),
        to: to.to_string(),
        amount,
        status: PaymentStatus::Confirmed,
        network: mode.as_str().to_string(),
        timestamp: unix_now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_confirms_full_amount() {
        let treasury = SimulatedTreasury::new(DistributionMode::Mock);
        let receipt = treasury
            .transfer(&"alice".to_string(), 70)
            .expect("transfer");

        assert_eq!(receipt.to, "alice");
        assert_eq!(receipt.amount, 70);
        assert_eq!(receipt.status, PaymentStatus::Confirmed);
        assert_eq!(receipt.network, "mock");
    }

    #[test]
    fn test_receipt_hash_shape() {
        let receipt = fabricate_receipt(DistributionMode::Testnet, "bob", 1);
        assert!(receipt.hash.starts_with("0x"));
        assert_eq!(receipt.hash.len(), 66);
        assert_eq!(receipt.network, "testnet");
    }

    #[test]
    fn test_receipt_hashes_differ() {
        let a = fabricate_receipt(DistributionMode::Mock, "bob", 1);
        let b = fabricate_receipt(DistributionMode::Mock, "bob", 1);
        assert_ne!(a.hash, b.hash);
    }
}
