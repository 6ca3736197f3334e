//! Project records.

use serde::{Deserialize, Serialize};

use crate::{AccountId, Amount, ProjectId};

/// A registered project with its contributor share listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Opaque unique identifier, immutable once set.
    pub project_id: ProjectId,
    /// Display name.
    pub name: String,
    /// Ordered contributor accounts, unique within the project.
    pub contributors: Vec<AccountId>,
    /// Integer percentages parallel to `contributors`; always sums to 100.
    pub shares: Vec<u8>,
    /// Total revenue ever distributed to this project. Never decreases.
    pub total_distributed: Amount,
    /// Whether the project accepts new distributions. One-way once false.
    pub is_active: bool,
    /// Unix timestamp of registration.
    pub created_at: u64,
}

impl Project {
    /// Look up the share percentage for an account, zero if not a contributor.
    pub fn share_of(&self, account: &str) -> u8 {
        self.contributors
            .iter()
            .position(|c| c.as_str() == account)
            .map(|i| self.shares[i])
            .unwrap_or(0)
    }
}
