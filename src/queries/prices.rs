//! Price table queries: catalog items run through the cascade.

use serde::{Deserialize, Serialize};

use crate::cascade::cascade;
use crate::connection::Connection;
use crate::error::Result;
use crate::format::format_rupiah;
use crate::models::{Category, MarginConfig, PriceRow, PriceVector, Tier, Unit};
use crate::queries::catalog::CatalogQuery;

/// The price one tier sees for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierPrice {
    pub code: String,
    pub name: String,
    pub unit: Unit,
    pub price: f64,
}

/// Query interface for derived prices.
///
/// Bound to one margin config; build a new query after margins change.
pub struct PriceQuery<'a> {
    conn: &'a Connection,
    margins: MarginConfig,
}

impl<'a> PriceQuery<'a> {
    pub fn new(conn: &'a Connection, margins: MarginConfig) -> Self {
        Self { conn, margins }
    }

    pub fn margins(&self) -> &MarginConfig {
        &self.margins
    }

    /// Full four-tier price table, optionally for one category.
    pub fn table(&self, category: Option<Category>) -> Result<Vec<PriceRow>> {
        let items = CatalogQuery::new(self.conn).list(category)?;
        Ok(items
            .into_iter()
            .map(|item| PriceRow {
                prices: cascade(item.base_price, &self.margins),
                item,
            })
            .collect())
    }

    /// Price vector for one item code.
    pub fn get(&self, code: &str) -> Result<Option<PriceVector>> {
        let item = CatalogQuery::new(self.conn).get(code)?;
        Ok(item.map(|i| cascade(i.base_price, &self.margins)))
    }

    /// Prices as seen from one tier.
    pub fn for_tier(&self, tier: Tier, category: Option<Category>) -> Result<Vec<TierPrice>> {
        Ok(self
            .table(category)?
            .into_iter()
            .map(|row| TierPrice {
                price: row.prices.at(tier),
                code: row.item.code,
                name: row.item.name,
                unit: row.item.unit,
            })
            .collect())
    }

    /// One line per item, e.g. `"1.1 Kardus: Rp 1.500 / Rp 1.275 / Rp 1.020 / Rp 765 per kg"`.
    pub fn summary_lines(&self) -> Result<Vec<String>> {
        Ok(self
            .table(None)?
            .iter()
            .map(|row| {
                let prices: Vec<String> =
                    row.prices.as_array().iter().map(|p| format_rupiah(*p)).collect();
                format!(
                    "{} {}: {} per {}",
                    row.item.code,
                    row.item.name,
                    prices.join(" / "),
                    row.item.unit
                )
            })
            .collect())
    }
}
