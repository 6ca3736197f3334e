//! # muse-split
//!
//! Share tables and pro-rata split arithmetic.
//!
//! A project's revenue is divided among its contributors according to an
//! ordered table of integer percentages that must sum to exactly 100.
//!
//! ## Modules
//!
//! - [`table`] — Share table construction and validation
//! - [`arith`] — Floor-division split arithmetic and rounding-loss accounting

pub mod arith;
pub mod table;

pub use arith::{split, SplitOutcome};
pub use table::ShareTable;

/// Error types for share validation and split arithmetic.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// Contributor and share lists differ in length.
    #[error("contributor and share counts differ: {contributors} vs {shares}")]
    CountMismatch {
        /// Number of contributors supplied.
        contributors: usize,
        /// Number of shares supplied.
        shares: usize,
    },

    /// Share percentages do not sum to 100.
    #[error("total shares must equal 100, got {total}")]
    InvalidTotal {
        /// The actual total.
        total: u32,
    },

    /// A single share exceeds 100 percent.
    #[error("share for {account} exceeds 100: {share}")]
    ShareOutOfRange {
        /// The offending contributor.
        account: String,
        /// The offending percentage.
        share: u8,
    },

    /// The same contributor appears twice.
    #[error("duplicate contributor: {0}")]
    DuplicateContributor(String),

    /// No contributors were supplied.
    #[error("share table is empty")]
    Empty,

    /// Amount is zero.
    #[error("amount is zero")]
    ZeroAmount,

    /// Arithmetic overflow.
    #[error("arithmetic overflow in split calculation")]
    Overflow,
}

/// Convenience result type for split operations.
pub type Result<T> = std::result::Result<T, SplitError>;
