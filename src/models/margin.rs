use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{MarketError, Result};

// ---------------------------------------------------------------------------
// MarginStage: key for one handoff in the trading chain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarginStage {
    #[serde(rename = "tier1to2")]
    Tier1To2,
    #[serde(rename = "tier2to3")]
    Tier2To3,
    #[serde(rename = "tier3to4")]
    Tier3To4,
}

impl MarginStage {
    pub const ALL: [MarginStage; 3] = [
        MarginStage::Tier1To2,
        MarginStage::Tier2To3,
        MarginStage::Tier3To4,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MarginStage::Tier1To2 => "tier1to2",
            MarginStage::Tier2To3 => "tier2to3",
            MarginStage::Tier3To4 => "tier3to4",
        }
    }
}

impl fmt::Display for MarginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MarginStage {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self> {
        MarginStage::ALL
            .into_iter()
            .find(|stage| stage.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MarketError::InvalidArgument(format!("Unknown margin stage: {}", s)))
    }
}

// ---------------------------------------------------------------------------
// MarginConfig: the three markdown ratios
// ---------------------------------------------------------------------------

/// Fraction retained by the upper tier at each handoff.
///
/// Values are plain data: nothing here clamps them. Use
/// [`validate`](Self::validate) at write boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginConfig {
    pub tier1to2: f64,
    pub tier2to3: f64,
    pub tier3to4: f64,
}

impl Default for MarginConfig {
    fn default() -> Self {
        config::DEFAULT_MARGINS
    }
}

impl MarginConfig {
    pub fn new(tier1to2: f64, tier2to3: f64, tier3to4: f64) -> Self {
        Self {
            tier1to2,
            tier2to3,
            tier3to4,
        }
    }

    /// All ratios zero: every tier receives the base price.
    pub fn pass_through() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub fn get(&self, stage: MarginStage) -> f64 {
        match stage {
            MarginStage::Tier1To2 => self.tier1to2,
            MarginStage::Tier2To3 => self.tier2to3,
            MarginStage::Tier3To4 => self.tier3to4,
        }
    }

    /// Return a copy with one ratio replaced.
    pub fn with(mut self, stage: MarginStage, value: f64) -> Self {
        match stage {
            MarginStage::Tier1To2 => self.tier1to2 = value,
            MarginStage::Tier2To3 => self.tier2to3 = value,
            MarginStage::Tier3To4 => self.tier3to4 = value,
        }
        self
    }

    /// Ratios in cascade order.
    pub fn ratios(&self) -> [f64; 3] {
        [self.tier1to2, self.tier2to3, self.tier3to4]
    }

    /// Check every ratio lies in `[0, 1)`.
    pub fn validate(&self) -> Result<()> {
        for stage in MarginStage::ALL {
            check_ratio(stage, self.get(stage))?;
        }
        Ok(())
    }
}

pub(crate) fn check_ratio(stage: MarginStage, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(MarketError::InvalidMargin { stage, value })
    }
}
