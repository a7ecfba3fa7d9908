//! Infrastructure layer: configuration, storage, the invoice transaction manager and
//! reports.

pub mod config;
pub mod invoice_manager;
pub mod reports;
pub mod store;


pub use invoice_manager::{CreateInvoiceRequest, InvoiceError, InvoiceTransactionManager};
