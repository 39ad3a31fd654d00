//! Monetary totals over line entries.
//!
//! Lines whose code is not in the catalog contribute nothing. [`aggregate`]
//! reports those codes so callers can surface them; [`total_value`] drops
//! them silently.

use serde::{Deserialize, Serialize};

use crate::cascade::cascade;
use crate::catalog::Catalog;
use crate::models::{LineEntry, MarginConfig, Tier};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub total: f64,
    /// Codes of lines that were not found in the catalog, in input order.
    pub skipped: Vec<String>,
}

/// Sum `tier price * qty` over every line whose item is in the catalog.
pub fn aggregate<'a, I>(lines: I, catalog: &Catalog, margins: &MarginConfig, tier: Tier) -> Aggregate
where
    I: IntoIterator<Item = &'a LineEntry>,
{
    let mut total = 0.0;
    let mut skipped = Vec::new();

    for line in lines {
        match catalog.get(&line.code) {
            Some(item) => total += cascade(item.base_price, margins).at(tier) * line.qty,
            None => skipped.push(line.code.clone()),
        }
    }

    Aggregate { total, skipped }
}

/// Like [`aggregate`] but returns only the total.
pub fn total_value<'a, I>(lines: I, catalog: &Catalog, margins: &MarginConfig, tier: Tier) -> f64
where
    I: IntoIterator<Item = &'a LineEntry>,
{
    aggregate(lines, catalog, margins, tier).total
}
