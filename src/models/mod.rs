pub mod chat;
pub mod drop_point;
pub mod item;
pub mod margin;
pub mod notice;
pub mod price;
pub mod scan;
pub mod tier;
pub mod transaction;

pub use chat::*;
pub use drop_point::*;
pub use item::*;
pub use margin::*;
pub use notice::*;
pub use price::*;
pub use scan::*;
pub use tier::*;
pub use transaction::*;
