//! Transaction queries backed by the cached `transactions.json` snapshot.
//!
//! Transactions carry nested line items, so they are filtered in memory
//! rather than through DuckDB.

use std::cmp::Reverse;
use std::collections::HashMap;

use chrono::DateTime;

use crate::aggregate::{aggregate, Aggregate};
use crate::catalog::Catalog;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{MarginConfig, Tier, TransactionRecord, TransactionStatus};

/// Filters for [`TransactionQuery::list`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter<'f> {
    pub status: Option<TransactionStatus>,
    pub party: Option<&'f str>,
    pub drop_point_id: Option<&'f str>,
}

pub struct TransactionQuery<'a> {
    conn: &'a Connection,
}

impl<'a> TransactionQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn load(&self) -> Result<Vec<TransactionRecord>> {
        self.conn.cache.borrow_mut().load_records("transactions")
    }

    /// Transactions matching the filter, newest first by instant, whatever
    /// UTC offset each timestamp carries. Unparseable timestamps sort last.
    pub fn list(&self, filter: &TransactionFilter<'_>) -> Result<Vec<TransactionRecord>> {
        let mut rows: Vec<TransactionRecord> = self
            .load()?
            .into_iter()
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.party.map_or(true, |p| t.party == p))
            .filter(|t| filter.drop_point_id.map_or(true, |d| t.drop_point_id == d))
            .collect();
        rows.sort_by_cached_key(|t| Reverse(DateTime::parse_from_rfc3339(&t.timestamp).ok()));
        Ok(rows)
    }

    pub fn get(&self, id: &str) -> Result<Option<TransactionRecord>> {
        Ok(self.load()?.into_iter().find(|t| t.id == id))
    }

    /// Number of transactions per status.
    pub fn status_counts(&self) -> Result<HashMap<TransactionStatus, usize>> {
        let mut counts = HashMap::new();
        for t in self.load()? {
            *counts.entry(t.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}

/// Value one transaction at a tier.
pub fn value_of(
    transaction: &TransactionRecord,
    catalog: &Catalog,
    margins: &MarginConfig,
    tier: Tier,
) -> Aggregate {
    aggregate(&transaction.items, catalog, margins, tier)
}

/// Sum the value of completed transactions at a tier. Pending and cancelled
/// transactions are excluded.
pub fn completed_total(
    transactions: &[TransactionRecord],
    catalog: &Catalog,
    margins: &MarginConfig,
    tier: Tier,
) -> Aggregate {
    let lines = transactions
        .iter()
        .filter(|t| t.status == TransactionStatus::Done)
        .flat_map(|t| t.items.iter());
    aggregate(lines, catalog, margins, tier)
}
