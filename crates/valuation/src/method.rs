use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValuationError;

/// Accounting convention used to value remaining stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ValuationMethod {
    /// Oldest units leave first; remaining stock carries the newest costs.
    Fifo,
    /// Newest units leave first; remaining stock carries the oldest costs.
    Lifo,
    /// Remaining stock carries a blended cost recomputed on every receipt.
    Average,
}

impl ValuationMethod {
    pub const ALL: [ValuationMethod; 3] = [
        ValuationMethod::Fifo,
        ValuationMethod::Lifo,
        ValuationMethod::Average,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationMethod::Fifo => "FIFO",
            ValuationMethod::Lifo => "LIFO",
            ValuationMethod::Average => "AVERAGE",
        }
    }
}

impl core::fmt::Display for ValuationMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValuationMethod {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FIFO" => Ok(ValuationMethod::Fifo),
            "LIFO" => Ok(ValuationMethod::Lifo),
            "AVERAGE" | "AVG" => Ok(ValuationMethod::Average),
            _ => Err(ValuationError::UnknownMethod(s.to_string())),
        }
    }
}

/// What to do when an OUT event asks for more units than are on hand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverdrawPolicy {
    /// Drop the unmet portion and record it as shortfall; stock stops at zero.
    #[default]
    Absorb,
    /// Fail the computation with [`ValuationError::Overdrawn`].
    Reject,
}

impl OverdrawPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverdrawPolicy::Absorb => "absorb",
            OverdrawPolicy::Reject => "reject",
        }
    }
}

impl core::fmt::Display for OverdrawPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverdrawPolicy {
    type Err = ValuationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absorb" => Ok(OverdrawPolicy::Absorb),
            "reject" | "strict" => Ok(OverdrawPolicy::Reject),
            _ => Err(ValuationError::UnknownPolicy(s.to_string())),
        }
    }
}
