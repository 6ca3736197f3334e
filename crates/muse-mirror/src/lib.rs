//! # muse-mirror
//!
//! Best-effort client-side mirror of the split arithmetic, for UI
//! preview before an operation is submitted to the ledger.
//!
//! Nothing in this crate is a balance source of truth: previews use
//! floating-point arithmetic that may drift from the ledger's integer
//! accounting, simulated payouts fabricate their receipts, and the
//! history ring only remembers what this process simulated. Readers
//! must tolerate staleness.
//!
//! ## Modules
//!
//! - [`mode`] — The mock/testnet/production workflow switch
//! - [`preview`] — Floating-point share preview
//! - [`history`] — Capped ring of past simulated distributions
//! - [`treasury`] — Simulated payout rail ([`SimulatedTreasury`])

pub mod history;
pub mod mode;
pub mod preview;
pub mod treasury;

pub use history::{DistributionRecord, Mirror};
pub use mode::DistributionMode;
pub use preview::SharePreview;
pub use treasury::SimulatedTreasury;

/// Error types for mirror operations.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Unrecognized distribution mode string.
    #[error("unknown distribution mode: {0}")]
    UnknownMode(String),
}

/// Convenience result type for mirror operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
