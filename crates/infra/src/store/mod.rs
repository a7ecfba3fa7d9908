//! Storage seams: the transactional billing store and the maintenance repositories.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::{InMemoryStore, InMemoryUnitOfWork};
pub use postgres::{PostgresStore, PostgresUnitOfWork};
pub use r#trait::{
    BillingStore, ClientRepository, InvoiceQueries, ProductRepository, StockDecrement,
    StoreError, UnitOfWork, UserRepository,
};
