//! Products domain module (catalog + stock).
//!
//! Business rules for sellable products and their finite stock, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{Product, ProductDetails, StockShortfall};
