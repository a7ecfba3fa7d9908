use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::{Mutex, OwnedMutexGuard};

use billbook_auth::{User, normalize_email};
use billbook_core::{ClientId, InvoiceId, ProductId, UserId};
use billbook_invoicing::Invoice;
use billbook_parties::Client;
use billbook_products::Product;

use super::r#trait::{
    BillingStore, ClientRepository, InvoiceQueries, ProductRepository, StockDecrement,
    StoreError, UnitOfWork, UserRepository,
};

pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Tables {
    clients: HashMap<ClientId, Client>,
    products: HashMap<ProductId, Product>,
    invoices: HashMap<InvoiceId, Invoice>,
    users: HashMap<UserId, User>,
}

impl Tables {
    fn client_is_referenced(&self, id: ClientId) -> bool {
        self.invoices.values().any(|inv| inv.client_id() == id)
    }

    fn product_is_referenced(&self, id: ProductId) -> bool {
        self.invoices
            .values()
            .flat_map(|inv| inv.lines())
            .any(|line| line.product_id == id)
    }

    fn sorted_invoices<F>(&self, keep: F) -> Vec<Invoice>
    where
        F: Fn(&Invoice) -> bool,
    {
        let mut out: Vec<Invoice> = self.invoices.values().filter(|i| keep(i)).cloned().collect();
        out.sort_by(|a, b| {
            (a.issue_date(), a.id_typed()).cmp(&(b.issue_date(), b.id_typed()))
        });
        out
    }
}

/// In-memory billing store.
///
/// Intended for tests/dev. One async mutex guards every table, so a unit of work is
/// fully serialized with every other unit of work and with maintenance writes.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    lock_timeout: Duration,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_lock_timeout(DEFAULT_LOCK_TIMEOUT)
    }

    pub fn with_lock_timeout(lock_timeout: Duration) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            lock_timeout,
        }
    }

    async fn lock(&self) -> Result<OwnedMutexGuard<Tables>, StoreError> {
        tokio::time::timeout(self.lock_timeout, self.tables.clone().lock_owned())
            .await
            .map_err(|_| {
                StoreError::Contention(format!(
                    "store lock not acquired within {}ms",
                    self.lock_timeout.as_millis()
                ))
            })
    }
}

/// Unit of work over the in-memory tables.
///
/// Holds the table lock for its whole life. Decremented products and the invoice are
/// staged and only written to the tables by `commit`.
pub struct InMemoryUnitOfWork {
    tables: OwnedMutexGuard<Tables>,
    staged_products: BTreeMap<ProductId, Product>,
    staged_invoices: Vec<Invoice>,
}

impl InMemoryUnitOfWork {
    fn current_product(&self, id: ProductId) -> Option<&Product> {
        self.staged_products
            .get(&id)
            .or_else(|| self.tables.products.get(&id))
    }
}

#[async_trait]
impl BillingStore for InMemoryStore {
    type Tx = InMemoryUnitOfWork;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(InMemoryUnitOfWork {
            tables: self.lock().await?,
            staged_products: BTreeMap::new(),
            staged_invoices: Vec::new(),
        })
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn client_exists(&mut self, id: ClientId) -> Result<bool, StoreError> {
        Ok(self.tables.clients.contains_key(&id))
    }

    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.current_product(id).cloned())
    }

    async fn decrement_stock(
        &mut self,
        id: ProductId,
        amount: u32,
    ) -> Result<StockDecrement, StoreError> {
        let Some(product) = self.current_product(id) else {
            return Ok(StockDecrement::Missing);
        };
        let mut product = product.clone();
        match product.take_stock(amount) {
            Ok(remaining) => {
                self.staged_products.insert(id, product);
                Ok(StockDecrement::Applied { remaining })
            }
            Err(shortfall) => Ok(StockDecrement::Insufficient {
                available: shortfall.available,
            }),
        }
    }

    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError> {
        let id = invoice.id_typed();
        if self.tables.invoices.contains_key(&id)
            || self.staged_invoices.iter().any(|i| i.id_typed() == id)
        {
            return Err(StoreError::Conflict(format!("invoice {id} already exists")));
        }
        if !self.tables.clients.contains_key(&invoice.client_id()) {
            return Err(StoreError::Conflict(format!(
                "invoice references missing client {}",
                invoice.client_id()
            )));
        }
        self.staged_invoices.push(invoice.clone());
        Ok(())
    }

    async fn commit(mut self) -> Result<(), StoreError> {
        for (id, product) in std::mem::take(&mut self.staged_products) {
            self.tables.products.insert(id, product);
        }
        for invoice in std::mem::take(&mut self.staged_invoices) {
            self.tables.invoices.insert(invoice.id_typed(), invoice);
        }
        Ok(())
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn insert_client(&self, client: &Client) -> Result<(), StoreError> {
        let mut tables = self.lock().await?;
        if tables.clients.contains_key(&client.id_typed()) {
            return Err(StoreError::Conflict(format!(
                "client {} already exists",
                client.id_typed()
            )));
        }
        tables.clients.insert(client.id_typed(), client.clone());
        Ok(())
    }

    async fn update_client(&self, client: &Client) -> Result<(), StoreError> {
        let mut tables = self.lock().await?;
        let slot = tables
            .clients
            .get_mut(&client.id_typed())
            .ok_or(StoreError::NotFound)?;
        *slot = client.clone();
        Ok(())
    }

    async fn delete_client(&self, id: ClientId) -> Result<(), StoreError> {
        let mut tables = self.lock().await?;
        if !tables.clients.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if tables.client_is_referenced(id) {
            return Err(StoreError::Conflict(format!(
                "client {id} is referenced by invoices"
            )));
        }
        tables.clients.remove(&id);
        Ok(())
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        Ok(self.lock().await?.clients.get(&id).cloned())
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        let tables = self.lock().await?;
        let mut clients: Vec<Client> = tables.clients.values().cloned().collect();
        clients.sort_by(|a, b| a.name().cmp(b.name()).then(a.id_typed().cmp(&b.id_typed())));
        Ok(clients)
    }
}

#[async_trait]
impl ProductRepository for InMemoryStore {
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut tables = self.lock().await?;
        if tables.products.contains_key(&product.id_typed()) {
            return Err(StoreError::Conflict(format!(
                "product {} already exists",
                product.id_typed()
            )));
        }
        tables.products.insert(product.id_typed(), product.clone());
        Ok(())
    }

    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let mut tables = self.lock().await?;
        let slot = tables
            .products
            .get_mut(&product.id_typed())
            .ok_or(StoreError::NotFound)?;
        *slot = product.clone();
        Ok(())
    }

    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let mut tables = self.lock().await?;
        if !tables.products.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if tables.product_is_referenced(id) {
            return Err(StoreError::Conflict(format!(
                "product {id} is referenced by invoice lines"
            )));
        }
        tables.products.remove(&id);
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.lock().await?.products.get(&id).cloned())
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let tables = self.lock().await?;
        let mut products: Vec<Product> = tables.products.values().cloned().collect();
        products.sort_by(|a, b| {
            a.description()
                .cmp(b.description())
                .then(a.id_typed().cmp(&b.id_typed()))
        });
        Ok(products)
    }
}

#[async_trait]
impl InvoiceQueries for InMemoryStore {
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        Ok(self.lock().await?.invoices.get(&id).cloned())
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        let mut invoices = self.lock().await?.sorted_invoices(|_| true);
        invoices.reverse();
        Ok(invoices)
    }

    async fn invoices_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, StoreError> {
        Ok(self
            .lock()
            .await?
            .sorted_invoices(|i| from <= i.issue_date() && i.issue_date() <= to))
    }

    async fn invoices_for_client(&self, client_id: ClientId) -> Result<Vec<Invoice>, StoreError> {
        let mut invoices = self
            .lock()
            .await?
            .sorted_invoices(|i| i.client_id() == client_id);
        invoices.reverse();
        Ok(invoices)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.lock().await?;
        if tables.users.values().any(|u| u.email() == user.email()) {
            return Err(StoreError::Conflict(format!(
                "email {} already registered",
                user.email()
            )));
        }
        tables.users.insert(user.id_typed(), user.clone());
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = normalize_email(email);
        Ok(self
            .lock()
            .await?
            .users
            .values()
            .find(|u| u.email() == email)
            .cloned())
    }
}
