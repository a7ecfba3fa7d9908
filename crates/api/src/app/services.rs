use chrono::NaiveDate;
use thiserror::Error;

use billbook_auth::{AuthError, Password, Role, User};
use billbook_core::{ClientId, InvoiceId, ProductId, UserId};
use billbook_infra::config::{AdminSeed, AppConfig};
use billbook_infra::reports::{self, ClientReport, ReportError, SalesReport};
use billbook_infra::store::{
    ClientRepository, InMemoryStore, InvoiceQueries, PostgresStore, ProductRepository, StoreError,
    UserRepository,
};
use billbook_infra::{CreateInvoiceRequest, InvoiceError, InvoiceTransactionManager};
use billbook_invoicing::Invoice;
use billbook_parties::Client;
use billbook_products::Product;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Storage backend plus the invoice manager bound to it.
#[derive(Debug, Clone)]
pub enum AppServices {
    InMemory {
        store: InMemoryStore,
        invoices: InvoiceTransactionManager<InMemoryStore>,
    },
    Persistent {
        store: PostgresStore,
        invoices: InvoiceTransactionManager<PostgresStore>,
    },
}

macro_rules! with_store {
    ($services:expr, $store:ident => $body:expr) => {
        match $services {
            AppServices::InMemory { store: $store, .. } => $body,
            AppServices::Persistent { store: $store, .. } => $body,
        }
    };
}

/// Postgres when `DATABASE_URL` is configured (schema applied on startup), otherwise
/// the in-memory store.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    match &config.database {
        Some(database) => {
            let store = PostgresStore::connect(database, config.lock_timeout).await?;
            store.migrate().await?;
            tracing::info!("using PostgreSQL store");
            Ok(AppServices::persistent(store, config.conflict_retries))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data lives in memory only");
            Ok(AppServices::in_memory(
                InMemoryStore::with_lock_timeout(config.lock_timeout),
                config.conflict_retries,
            ))
        }
    }
}

impl AppServices {
    pub fn in_memory(store: InMemoryStore, max_attempts: u32) -> Self {
        let invoices = InvoiceTransactionManager::new(store.clone()).with_max_attempts(max_attempts);
        AppServices::InMemory { store, invoices }
    }

    pub fn persistent(store: PostgresStore, max_attempts: u32) -> Self {
        let invoices = InvoiceTransactionManager::new(store.clone()).with_max_attempts(max_attempts);
        AppServices::Persistent { store, invoices }
    }

    /// Create the admin user unless one with that email already exists.
    pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<(), ServiceError> {
        if self.find_user_by_email(&seed.email).await?.is_some() {
            tracing::debug!(email = %seed.email, "admin user already present");
            return Ok(());
        }

        let user = User::register(
            UserId::new(),
            "Administrator",
            &seed.email,
            &Password::new(seed.password.clone()),
            Role::admin(),
        )?;
        with_store!(self, store => store.insert_user(&user).await)?;
        tracing::info!(email = %user.email(), "seeded admin user");
        Ok(())
    }

    /// Storage reachability. The in-memory store is always reachable.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        match self {
            AppServices::InMemory { .. } => Ok(()),
            AppServices::Persistent { store, .. } => store.health_check().await,
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        with_store!(self, store => store.find_user_by_email(email).await)
    }

    pub async fn clients_list(&self) -> Result<Vec<Client>, StoreError> {
        with_store!(self, store => store.list_clients().await)
    }

    pub async fn client_get(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        with_store!(self, store => store.get_client(id).await)
    }

    pub async fn client_insert(&self, client: &Client) -> Result<(), StoreError> {
        with_store!(self, store => store.insert_client(client).await)
    }

    pub async fn client_update(&self, client: &Client) -> Result<(), StoreError> {
        with_store!(self, store => store.update_client(client).await)
    }

    pub async fn client_delete(&self, id: ClientId) -> Result<(), StoreError> {
        with_store!(self, store => store.delete_client(id).await)
    }

    pub async fn products_list(&self) -> Result<Vec<Product>, StoreError> {
        with_store!(self, store => store.list_products().await)
    }

    pub async fn product_get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        with_store!(self, store => store.get_product(id).await)
    }

    pub async fn product_insert(&self, product: &Product) -> Result<(), StoreError> {
        with_store!(self, store => store.insert_product(product).await)
    }

    pub async fn product_update(&self, product: &Product) -> Result<(), StoreError> {
        with_store!(self, store => store.update_product(product).await)
    }

    pub async fn product_delete(&self, id: ProductId) -> Result<(), StoreError> {
        with_store!(self, store => store.delete_product(id).await)
    }

    /// Create an invoice, retrying transient conflicts.
    pub async fn create_invoice(&self, request: &CreateInvoiceRequest) -> Result<Invoice, InvoiceError> {
        match self {
            AppServices::InMemory { invoices, .. } => invoices.create_invoice_with_retry(request).await,
            AppServices::Persistent { invoices, .. } => invoices.create_invoice_with_retry(request).await,
        }
    }

    pub async fn invoices_list(&self) -> Result<Vec<Invoice>, StoreError> {
        with_store!(self, store => store.list_invoices().await)
    }

    pub async fn invoice_get(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        with_store!(self, store => store.get_invoice(id).await)
    }

    pub async fn sales_report(&self, from: NaiveDate, to: NaiveDate) -> Result<SalesReport, ReportError> {
        with_store!(self, store => reports::sales_report(store, from, to).await)
    }

    pub async fn client_report(&self, client_id: ClientId) -> Result<ClientReport, ReportError> {
        with_store!(self, store => reports::client_report(store, client_id).await)
    }
}
