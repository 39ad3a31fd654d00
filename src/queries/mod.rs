//! Query modules for the marketplace SDK.
//!
//! Each query struct borrows a [`Connection`](crate::connection::Connection)
//! and returns typed models.

pub mod catalog;
pub mod drop_points;
pub mod prices;
pub mod transactions;

pub use catalog::CatalogQuery;
pub use drop_points::DropPointQuery;
pub use prices::{PriceQuery, TierPrice};
pub use transactions::{TransactionFilter, TransactionQuery};
