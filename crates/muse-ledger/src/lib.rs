//! # muse-ledger
//!
//! The authoritative revenue ledger: project registry, pro-rata revenue
//! distribution, and per-contributor escrow with withdrawal.
//!
//! A [`Ledger`] is constructed explicitly around a database connection
//! and passed to callers; there is no process-global instance. Every
//! mutating operation runs inside a single SQL transaction and either
//! fully commits or leaves no trace; `&mut self` receivers keep mutations
//! serial.
//!
//! ## Modules
//!
//! - [`ledger`] — The [`Ledger`] itself
//! - [`treasury`] — The [`Treasury`](treasury::Treasury) payout seam

pub mod ledger;
pub mod treasury;

pub use ledger::{Distribution, Ledger, Withdrawal};
pub use treasury::{Treasury, TreasuryError};

use muse_split::SplitError;

/// Error types for ledger operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A project with this id is already registered.
    #[error("project already exists: {0}")]
    DuplicateProject(String),

    /// No project with this id is registered.
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    /// The contributor/share listing failed validation.
    #[error("invalid shares: {0}")]
    InvalidShares(#[source] SplitError),

    /// The project has been deactivated and rejects new distributions.
    #[error("project is not active: {0}")]
    ProjectInactive(String),

    /// The caller's escrow balance is zero.
    #[error("no balance to withdraw for {0}")]
    NothingToWithdraw(String),

    /// The caller is not allowed to mutate the registry.
    #[error("caller is not the registry owner: {0}")]
    Unauthorized(String),

    /// Amount is zero.
    #[error("amount must be greater than zero")]
    ZeroAmount,

    /// Arithmetic overflow.
    #[error("arithmetic overflow in distribution")]
    Overflow,

    /// The treasury backend rejected the transfer.
    #[error("transfer failed: {0}")]
    Transfer(String),

    /// Underlying storage error.
    #[error(transparent)]
    Db(#[from] muse_db::DbError),
}

impl From<SplitError> for LedgerError {
    fn from(e: SplitError) -> Self {
        match e {
            SplitError::ZeroAmount => LedgerError::ZeroAmount,
            SplitError::Overflow => LedgerError::Overflow,
            other => LedgerError::InvalidShares(other),
        }
    }
}

/// Convenience result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
