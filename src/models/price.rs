use serde::{Deserialize, Serialize};

use super::item::WasteItem;
use super::tier::Tier;

// ---------------------------------------------------------------------------
// PriceVector: derived four-tier prices for one item
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceVector {
    pub tier1_price: f64,
    pub tier2_price: f64,
    pub tier3_price: f64,
    pub tier4_price: f64,
}

impl PriceVector {
    pub fn at(&self, tier: Tier) -> f64 {
        match tier {
            Tier::Aggregator => self.tier1_price,
            Tier::CollectionCenter => self.tier2_price,
            Tier::CollectionPoint => self.tier3_price,
            Tier::Consumer => self.tier4_price,
        }
    }

    /// Prices from the aggregator down to the consumer.
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.tier1_price,
            self.tier2_price,
            self.tier3_price,
            self.tier4_price,
        ]
    }
}

// ---------------------------------------------------------------------------
// PriceRow: one line of a rendered price table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRow {
    #[serde(flatten)]
    pub item: WasteItem,
    pub prices: PriceVector,
}
