//! Invoicing domain module.
//!
//! Invoices, their lines, the requested-quantities form and the pure pricing step that
//! turns locked product snapshots into a priced invoice. No IO, no storage.

pub mod draft;
pub mod invoice;
pub mod request;

pub use draft::{InvoiceDraft, PricingError};
pub use invoice::{Invoice, InvoiceLine};
pub use request::{RequestedLines, parse_quantity};
