//! Share table construction and validation.
//!
//! A [`ShareTable`] is an ordered list of (contributor, percentage) pairs.
//! Construction is the only way to obtain one, so a table in hand is
//! always valid: non-empty, unique contributors, every share at most 100,
//! and the shares summing to exactly 100.

use serde::{Deserialize, Serialize};

use muse_types::AccountId;

use crate::{Result, SplitError};

/// A validated contributor share listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareTable {
    entries: Vec<(AccountId, u8)>,
}

impl ShareTable {
    /// Build a table from parallel contributor and share lists.
    ///
    /// # Errors
    ///
    /// - [`SplitError::CountMismatch`] if the lists differ in length
    /// - [`SplitError::Empty`] if no contributors are supplied
    /// - [`SplitError::ShareOutOfRange`] if any single share exceeds 100
    /// - [`SplitError::DuplicateContributor`] if an account repeats
    /// - [`SplitError::InvalidTotal`] if the shares do not sum to 100
    pub fn new(contributors: Vec<AccountId>, shares: Vec<u8>) -> Result<Self> {
        if contributors.len() != shares.len() {
            return Err(SplitError::CountMismatch {
                contributors: contributors.len(),
                shares: shares.len(),
            });
        }
        if contributors.is_empty() {
            return Err(SplitError::Empty);
        }

        for (i, (account, &share)) in contributors.iter().zip(shares.iter()).enumerate() {
            if share > 100 {
                return Err(SplitError::ShareOutOfRange {
                    account: account.clone(),
                    share,
                });
            }
            if contributors[..i].contains(account) {
                return Err(SplitError::DuplicateContributor(account.clone()));
            }
        }

        let total: u32 = shares.iter().map(|&s| u32::from(s)).sum();
        if total != 100 {
            return Err(SplitError::InvalidTotal { total });
        }

        Ok(Self {
            entries: contributors.into_iter().zip(shares).collect(),
        })
    }

    /// The (contributor, share) pairs in registration order.
    pub fn entries(&self) -> &[(AccountId, u8)] {
        &self.entries
    }

    /// Iterate over (contributor, share) pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&AccountId, u8)> {
        self.entries.iter().map(|(a, s)| (a, *s))
    }

    /// Number of contributors.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A table can never be empty; kept for the usual pairing with `len`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The share percentage for an account, zero if not a contributor.
    pub fn share_of(&self, account: &str) -> u8 {
        self.entries
            .iter()
            .find(|(a, _)| a.as_str() == account)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    /// The contributor accounts in registration order.
    pub fn accounts(&self) -> Vec<AccountId> {
        self.entries.iter().map(|(a, _)| a.clone()).collect()
    }

    /// The share percentages in registration order.
    pub fn shares(&self) -> Vec<u8> {
        self.entries.iter().map(|(_, s)| *s).collect()
    }
}
