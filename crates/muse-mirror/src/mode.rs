//! The distribution mode switch.
//!
//! The mode is pure workflow control: it decides whether a payout is
//! attempted against a real rail or only simulated. It never changes
//! the accounting arithmetic.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::MirrorError;

/// Where a distribution's payouts are sent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionMode {
    /// Everything simulated in-process. The default.
    #[default]
    Mock,
    /// Transfers target the test network rail.
    Testnet,
    /// Transfers target the production rail.
    Production,
}

impl DistributionMode {
    /// The canonical string form (`"mock"`, `"testnet"`, `"production"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionMode::Mock => "mock",
            DistributionMode::Testnet => "testnet",
            DistributionMode::Production => "production",
        }
    }

    /// Whether this mode would attempt a transfer on a real rail.
    pub fn is_live(&self) -> bool {
        !matches!(self, DistributionMode::Mock)
    }
}

impl fmt::Display for DistributionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistributionMode {
    type Err = MirrorError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "mock" => Ok(DistributionMode::Mock),
            "testnet" => Ok(DistributionMode::Testnet),
            "production" => Ok(DistributionMode::Production),
            other => Err(MirrorError::UnknownMode(other.to_string())),
        }
    }
}
