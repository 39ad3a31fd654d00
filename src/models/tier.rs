use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarketError;

// ---------------------------------------------------------------------------
// Tier: position in the trading chain, top to bottom
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Aggregator / offtaker. Receives the base price.
    Aggregator,
    CollectionCenter,
    CollectionPoint,
    /// End consumer selling household waste.
    Consumer,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Aggregator,
        Tier::CollectionCenter,
        Tier::CollectionPoint,
        Tier::Consumer,
    ];

    /// 1-based position, 1 being the aggregator.
    pub fn level(&self) -> u8 {
        match self {
            Tier::Aggregator => 1,
            Tier::CollectionCenter => 2,
            Tier::CollectionPoint => 3,
            Tier::Consumer => 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Role: the actor viewing or editing prices
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Pelapak,
    BankSampahInduk,
    BankSampahUnit,
    Nasabah,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Pelapak,
        Role::BankSampahInduk,
        Role::BankSampahUnit,
        Role::Nasabah,
    ];

    pub fn tier(&self) -> Tier {
        match self {
            Role::Pelapak => Tier::Aggregator,
            Role::BankSampahInduk => Tier::CollectionCenter,
            Role::BankSampahUnit => Tier::CollectionPoint,
            Role::Nasabah => Tier::Consumer,
        }
    }

    /// Only the two upper tiers may change margin ratios.
    pub fn can_edit_margins(&self) -> bool {
        self.tier().level() <= 2
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Pelapak => "pelapak",
            Role::BankSampahInduk => "bank_sampah_induk",
            Role::BankSampahUnit => "bank_sampah_unit",
            Role::Nasabah => "nasabah",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| MarketError::InvalidArgument(format!("Unknown role: {}", s)))
    }
}
