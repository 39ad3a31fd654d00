use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MarketError;
use crate::format::format_rupiah;

// ---------------------------------------------------------------------------
// Category: display and filter grouping for catalog entries
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Paper,
    Plastic,
    Metal,
    Electronics,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Paper,
        Category::Plastic,
        Category::Metal,
        Category::Electronics,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Paper => "paper",
            Category::Plastic => "plastic",
            Category::Metal => "metal",
            Category::Electronics => "electronics",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the English names plus the Indonesian labels classifiers tend to
/// answer with (`kertas`, `plastik`, `logam`, `elektronik`, `lainnya`).
impl FromStr for Category {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "paper" | "kertas" => Ok(Category::Paper),
            "plastic" | "plastik" => Ok(Category::Plastic),
            "metal" | "logam" => Ok(Category::Metal),
            "electronics" | "electronic" | "elektronik" => Ok(Category::Electronics),
            "other" | "lainnya" | "lain-lain" => Ok(Category::Other),
            other => Err(MarketError::InvalidArgument(format!(
                "Unknown category: {}",
                other
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

/// Pricing unit. Only affects display; quantities are multiplied as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Set,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Set => "set",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// WasteItem: one sellable material entry in the catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteItem {
    pub code: String,
    pub name: String,
    pub category: Category,
    /// Price at the aggregator tier.
    pub base_price: f64,
    pub unit: Unit,
}

impl WasteItem {
    /// Render a price for this item, e.g. `"Rp 1.275/kg"`.
    pub fn price_label(&self, price: f64) -> String {
        format!("{}/{}", format_rupiah(price), self.unit)
    }
}
