//! Catalog queries against the DuckDB `catalog` table.

use crate::catalog::Catalog;
use crate::connection::Connection;
use crate::error::Result;
use crate::models::{Category, WasteItem};
use crate::sql_builder::SqlBuilder;

/// Query interface for catalog items.
///
/// Results keep the order in which items were loaded (`rowid`), which is
/// the catalog's own order.
pub struct CatalogQuery<'a> {
    conn: &'a Connection,
}

impl<'a> CatalogQuery<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// All items, optionally restricted to one category.
    pub fn list(&self, category: Option<Category>) -> Result<Vec<WasteItem>> {
        self.conn.ensure_views(&["catalog"])?;

        let mut qb = SqlBuilder::new("catalog");
        if let Some(cat) = category {
            qb.where_eq("category", cat.as_str());
        }
        qb.order_by(&["rowid"]);

        let (sql, params) = qb.build();
        self.conn.execute_into(&sql, &params)
    }

    /// Look up one item by its code.
    pub fn get(&self, code: &str) -> Result<Option<WasteItem>> {
        self.conn.ensure_views(&["catalog"])?;

        let (sql, params) = SqlBuilder::new("catalog").where_eq("code", code).limit(1).build();
        Ok(self.conn.execute_into(&sql, &params)?.into_iter().next())
    }

    /// Case-insensitive substring search on item names.
    pub fn search(&self, name: &str) -> Result<Vec<WasteItem>> {
        self.conn.ensure_views(&["catalog"])?;

        let (sql, params) = SqlBuilder::new("catalog")
            .where_like("name", &format!("%{}%", name))
            .order_by(&["rowid"])
            .build();
        self.conn.execute_into(&sql, &params)
    }

    /// Number of items per category, for categories that have any.
    pub fn category_counts(&self) -> Result<Vec<(Category, usize)>> {
        self.conn.ensure_views(&["catalog"])?;

        let rows = self.conn.execute(
            "SELECT category, COUNT(*) AS n FROM catalog GROUP BY category ORDER BY MIN(rowid)",
            &[],
        )?;
        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let category = row
                .get("category")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .parse::<Category>()?;
            let n = row.get("n").and_then(|v| v.as_u64()).unwrap_or(0) as usize;
            counts.push((category, n));
        }
        Ok(counts)
    }

    /// Load the whole catalog into a validated in-memory index.
    pub fn snapshot(&self) -> Result<Catalog> {
        Catalog::new(self.list(None)?)
    }
}
