use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use billbook_auth::User;
use billbook_core::{ClientId, InvoiceId, ProductId};
use billbook_invoicing::Invoice;
use billbook_parties::Client;
use billbook_products::Product;

/// Storage operation error.
///
/// Infrastructure failures only; business rejections are decided above the store.
///
/// - **NotFound**: the row to update or delete does not exist
/// - **Conflict**: a constraint refused the write (duplicate key, row still referenced)
/// - **Contention**: isolation could not be obtained in time (lock timeout, deadlock,
///   serialization failure). Retrying the whole operation may succeed.
/// - **Backend**: anything else (connection, decoding, corrupt rows)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("contention: {0}")]
    Contention(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Outcome of a conditional stock decrement.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StockDecrement {
    /// Stock was decremented; `remaining` is the new level.
    Applied { remaining: u32 },
    /// Stock is lower than the requested amount; nothing changed.
    Insufficient { available: u32 },
    /// The product row does not exist.
    Missing,
}

/// Entry point to the transactional billing store.
#[async_trait]
pub trait BillingStore: Send + Sync {
    type Tx: UnitOfWork;

    /// Open a unit of work. Fails with `Contention` if isolation cannot be obtained.
    async fn begin(&self) -> Result<Self::Tx, StoreError>;
}

/// One all-or-nothing set of reads and writes.
///
/// Nothing written through a unit of work is visible to anyone else until `commit`
/// succeeds. Dropping it without committing discards every write.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn client_exists(&mut self, id: ClientId) -> Result<bool, StoreError>;

    /// Read a product and hold it exclusively until the unit of work ends.
    ///
    /// Callers lock products in ascending id order.
    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Decrement stock by `amount` unless that would take it below zero.
    async fn decrement_stock(
        &mut self,
        id: ProductId,
        amount: u32,
    ) -> Result<StockDecrement, StoreError>;

    /// Write the invoice header and all of its lines.
    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError>;

    async fn commit(self) -> Result<(), StoreError>;
}

/// Client maintenance.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn insert_client(&self, client: &Client) -> Result<(), StoreError>;

    /// Fails with `NotFound` when the client does not exist.
    async fn update_client(&self, client: &Client) -> Result<(), StoreError>;

    /// Fails with `NotFound` when absent and `Conflict` when an invoice references it.
    async fn delete_client(&self, id: ClientId) -> Result<(), StoreError>;

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, StoreError>;

    /// All clients ordered by name.
    async fn list_clients(&self) -> Result<Vec<Client>, StoreError>;
}

/// Product maintenance.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError>;

    /// Replace description, price and stock. Serializes with invoice creation on the
    /// same product.
    async fn update_product(&self, product: &Product) -> Result<(), StoreError>;

    /// Fails with `NotFound` when absent and `Conflict` when an invoice line references it.
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// All products ordered by description.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;
}

/// Read side of committed invoices.
#[async_trait]
pub trait InvoiceQueries: Send + Sync {
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError>;

    /// All invoices, newest issue date first.
    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError>;

    /// Invoices with `from <= issue_date <= to`, oldest first.
    async fn invoices_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, StoreError>;

    /// Invoices of one client, newest first.
    async fn invoices_for_client(&self, client_id: ClientId) -> Result<Vec<Invoice>, StoreError>;
}

/// Login identities.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is already taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    /// Lookup by normalized (trimmed, lowercase) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
}

#[async_trait]
impl<S> BillingStore for std::sync::Arc<S>
where
    S: BillingStore + ?Sized,
{
    type Tx = S::Tx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        (**self).begin().await
    }
}
