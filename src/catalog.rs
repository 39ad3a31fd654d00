//! In-memory catalog index.

use std::collections::HashMap;

use crate::cascade::cascade;
use crate::error::{MarketError, Result};
use crate::models::{Category, MarginConfig, PriceRow, WasteItem};

/// Validated, order-preserving list of catalog items indexed by code.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<WasteItem>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog, rejecting duplicate codes and negative base prices.
    pub fn new(items: Vec<WasteItem>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            if item.base_price.is_nan() || item.base_price < 0.0 {
                return Err(MarketError::InvalidCatalog(format!(
                    "item '{}' has negative or non-numeric base price {}",
                    item.code, item.base_price
                )));
            }
            if index.insert(item.code.clone(), pos).is_some() {
                return Err(MarketError::InvalidCatalog(format!(
                    "duplicate item code '{}'",
                    item.code
                )));
            }
        }
        Ok(Self { items, index })
    }

    pub fn get(&self, code: &str) -> Option<&WasteItem> {
        self.index.get(code).map(|&pos| &self.items[pos])
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    pub fn items(&self) -> &[WasteItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in a category, in catalog order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = &WasteItem> {
        self.items.iter().filter(move |i| i.category == category)
    }

    /// First item of a category in catalog order.
    pub fn first_in_category(&self, category: Category) -> Option<&WasteItem> {
        self.in_category(category).next()
    }

    /// Price every item under the given margins.
    pub fn price_table(&self, margins: &MarginConfig) -> Vec<PriceRow> {
        self.items
            .iter()
            .map(|item| PriceRow {
                item: item.clone(),
                prices: cascade(item.base_price, margins),
            })
            .collect()
    }
}
