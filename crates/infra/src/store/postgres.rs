//! Postgres-backed billing store.
//!
//! One database transaction per unit of work. Products are row-locked with
//! `SELECT ... FOR UPDATE` and decremented with a conditional `UPDATE`, so stock can
//! never be oversold even when invoice creations race.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database | `40001` | `Contention` | serialization failure |
//! | Database | `40P01` | `Contention` | deadlock detected |
//! | Database | `55P03` | `Contention` | `lock_timeout` expired |
//! | Database | `23505` | `Conflict` | duplicate key (e.g. email) |
//! | Database | `23503` | `Conflict` | row still referenced / missing parent |
//! | Database | `23514` | `Conflict` | check constraint (e.g. `stock >= 0`) |
//! | PoolTimedOut | N/A | `Contention` | no connection available in time |
//! | anything else | N/A | `Backend` | network, decoding, pool closed |

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{FromRow, Postgres, Row, Transaction};
use tracing::instrument;
use uuid::Uuid;

use billbook_auth::{PasswordHashString, Role, User, normalize_email};
use billbook_core::{ClientId, InvoiceId, InvoiceLineId, Money, ProductId, UserId};
use billbook_invoicing::{Invoice, InvoiceLine};
use billbook_parties::{Client, ContactInfo};
use billbook_products::Product;

use crate::config::DatabaseConfig;

use super::r#trait::{
    BillingStore, ClientRepository, InvoiceQueries, ProductRepository, StockDecrement,
    StoreError, UnitOfWork, UserRepository,
};

const SCHEMA: &str = include_str!("../../migrations/0001_billing.sql");

/// Postgres billing store.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PostgresStore {
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    /// Open a connection pool.
    pub async fn connect(config: &DatabaseConfig, lock_timeout: Duration) -> Result<Self, StoreError> {
        tracing::info!(max_connections = config.max_connections, "connecting to PostgreSQL");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .connect(&config.url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        Ok(Self::new(pool, lock_timeout))
    }

    /// Create tables and indexes if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("health_check", e))?;
        Ok(())
    }

    async fn load_invoices(&self, headers: Vec<InvoiceRow>) -> Result<Vec<Invoice>, StoreError> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
        let rows = sqlx::query(
            r#"
            SELECT id, invoice_id, product_id, quantity, unit_price, subtotal
            FROM invoice_lines
            WHERE invoice_id = ANY($1)
            ORDER BY invoice_id, product_id
            "#,
        )
        .bind(&ids[..])
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_invoice_lines", e))?;

        let mut lines_by_invoice: HashMap<Uuid, Vec<InvoiceLine>> = HashMap::new();
        for row in rows {
            let line = InvoiceLineRow::from_row(&row).map_err(|e| decode_error("invoice_lines", e))?;
            let invoice_id = line.invoice_id;
            lines_by_invoice
                .entry(invoice_id)
                .or_default()
                .push(line.try_into()?);
        }

        headers
            .into_iter()
            .map(|h| {
                let lines = lines_by_invoice.remove(&h.id).unwrap_or_default();
                h.into_invoice(lines)
            })
            .collect()
    }

    async fn query_invoice_headers(
        &self,
        operation: &str,
        query: sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<Vec<Invoice>, StoreError> {
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;
        let headers = rows
            .iter()
            .map(|r| InvoiceRow::from_row(r).map_err(|e| decode_error("invoices", e)))
            .collect::<Result<Vec<_>, _>>()?;
        self.load_invoices(headers).await
    }
}

/// Unit of work backed by one Postgres transaction.
///
/// Dropping it uncommitted rolls the transaction back.
pub struct PostgresUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BillingStore for PostgresStore {
    type Tx = PostgresUnitOfWork;

    #[instrument(skip(self), fields(operation = "begin"), err)]
    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        // SET cannot take bind parameters; the value is an integer we format ourselves.
        let set_timeout = format!("SET LOCAL lock_timeout = '{}ms'", self.lock_timeout.as_millis());
        sqlx::query(&set_timeout)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("set_lock_timeout", e))?;

        Ok(PostgresUnitOfWork { tx })
    }
}

#[async_trait]
impl UnitOfWork for PostgresUnitOfWork {
    async fn client_exists(&mut self, id: ClientId) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT EXISTS (SELECT 1 FROM clients WHERE id = $1) AS found")
            .bind(id.as_uuid())
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("client_exists", e))?;
        row.try_get("found").map_err(|e| decode_error("clients", e))
    }

    #[instrument(skip(self), fields(operation = "lock_product", product_id = %id), err)]
    async fn lock_product(&mut self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, description, unit_price, stock
            FROM products
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("lock_product", e))?;

        match row {
            Some(row) => {
                let product = ProductRow::from_row(&row).map_err(|e| decode_error("products", e))?;
                Ok(Some(product.try_into()?))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(operation = "decrement_stock", product_id = %id), err)]
    async fn decrement_stock(
        &mut self,
        id: ProductId,
        amount: u32,
    ) -> Result<StockDecrement, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2
            WHERE id = $1 AND stock >= $2
            RETURNING stock
            "#,
        )
        .bind(id.as_uuid())
        .bind(i64::from(amount))
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        if let Some(row) = updated {
            let remaining: i64 = row.try_get("stock").map_err(|e| decode_error("products", e))?;
            return Ok(StockDecrement::Applied {
                remaining: stock_from_db(remaining)?,
            });
        }

        let current = sqlx::query("SELECT stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("decrement_stock", e))?;

        match current {
            Some(row) => {
                let available: i64 = row.try_get("stock").map_err(|e| decode_error("products", e))?;
                Ok(StockDecrement::Insufficient {
                    available: stock_from_db(available)?,
                })
            }
            None => Ok(StockDecrement::Missing),
        }
    }

    #[instrument(
        skip(self, invoice),
        fields(operation = "insert_invoice", invoice_id = %invoice.id_typed(), line_count = invoice.lines().len()),
        err
    )]
    async fn insert_invoice(&mut self, invoice: &Invoice) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (id, client_id, issue_date, total)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(invoice.id_typed().as_uuid())
        .bind(invoice.client_id().as_uuid())
        .bind(invoice.issue_date())
        .bind(invoice.total().cents())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| map_sqlx_error("insert_invoice", e))?;

        for line in invoice.lines() {
            sqlx::query(
                r#"
                INSERT INTO invoice_lines (id, invoice_id, product_id, quantity, unit_price, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(line.id.as_uuid())
            .bind(line.invoice_id.as_uuid())
            .bind(line.product_id.as_uuid())
            .bind(i64::from(line.quantity))
            .bind(line.unit_price.cents())
            .bind(line.subtotal.cents())
            .execute(&mut *self.tx)
            .await
            .map_err(|e| map_sqlx_error("insert_invoice_line", e))?;
        }

        Ok(())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx
            .commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }
}

#[async_trait]
impl ClientRepository for PostgresStore {
    #[instrument(skip(self, client), fields(operation = "insert_client", client_id = %client.id_typed()), err)]
    async fn insert_client(&self, client: &Client) -> Result<(), StoreError> {
        let contact = client.contact();
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, address, phone, email)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(client.id_typed().as_uuid())
        .bind(client.name())
        .bind(contact.address.as_deref())
        .bind(contact.phone.as_deref())
        .bind(contact.email.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_client", e))?;
        Ok(())
    }

    #[instrument(skip(self, client), fields(operation = "update_client", client_id = %client.id_typed()), err)]
    async fn update_client(&self, client: &Client) -> Result<(), StoreError> {
        let contact = client.contact();
        let result = sqlx::query(
            r#"
            UPDATE clients
            SET name = $2, address = $3, phone = $4, email = $5
            WHERE id = $1
            "#,
        )
        .bind(client.id_typed().as_uuid())
        .bind(client.name())
        .bind(contact.address.as_deref())
        .bind(contact.phone.as_deref())
        .bind(contact.email.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_client", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(operation = "delete_client", client_id = %id), err)]
    async fn delete_client(&self, id: ClientId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_client", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, StoreError> {
        let row = sqlx::query("SELECT id, name, address, phone, email FROM clients WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_client", e))?;

        row.map(|r| {
            ClientRow::from_row(&r)
                .map(Client::from)
                .map_err(|e| decode_error("clients", e))
        })
        .transpose()
    }

    async fn list_clients(&self) -> Result<Vec<Client>, StoreError> {
        let rows = sqlx::query("SELECT id, name, address, phone, email FROM clients ORDER BY name, id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_clients", e))?;

        rows.iter()
            .map(|r| {
                ClientRow::from_row(r)
                    .map(Client::from)
                    .map_err(|e| decode_error("clients", e))
            })
            .collect()
    }
}

#[async_trait]
impl ProductRepository for PostgresStore {
    #[instrument(skip(self, product), fields(operation = "insert_product", product_id = %product.id_typed()), err)]
    async fn insert_product(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (id, description, unit_price, stock)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.description())
        .bind(product.unit_price().cents())
        .bind(i64::from(product.stock()))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;
        Ok(())
    }

    #[instrument(skip(self, product), fields(operation = "update_product", product_id = %product.id_typed()), err)]
    async fn update_product(&self, product: &Product) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET description = $2, unit_price = $3, stock = $4
            WHERE id = $1
            "#,
        )
        .bind(product.id_typed().as_uuid())
        .bind(product.description())
        .bind(product.unit_price().cents())
        .bind(i64::from(product.stock()))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(operation = "delete_product", product_id = %id), err)]
    async fn delete_product(&self, id: ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query("SELECT id, description, unit_price, stock FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_product", e))?;

        match row {
            Some(r) => {
                let product = ProductRow::from_row(&r).map_err(|e| decode_error("products", e))?;
                Ok(Some(product.try_into()?))
            }
            None => Ok(None),
        }
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, description, unit_price, stock FROM products ORDER BY description, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;

        rows.iter()
            .map(|r| {
                ProductRow::from_row(r)
                    .map_err(|e| decode_error("products", e))
                    .and_then(Product::try_from)
            })
            .collect()
    }
}

#[async_trait]
impl InvoiceQueries for PostgresStore {
    async fn get_invoice(&self, id: InvoiceId) -> Result<Option<Invoice>, StoreError> {
        let invoices = self
            .query_invoice_headers(
                "get_invoice",
                sqlx::query("SELECT id, client_id, issue_date, total FROM invoices WHERE id = $1")
                    .bind(*id.as_uuid()),
            )
            .await?;
        Ok(invoices.into_iter().next())
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, StoreError> {
        self.query_invoice_headers(
            "list_invoices",
            sqlx::query(
                "SELECT id, client_id, issue_date, total FROM invoices ORDER BY issue_date DESC, id DESC",
            ),
        )
        .await
    }

    #[instrument(skip(self), fields(operation = "invoices_between"), err)]
    async fn invoices_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Invoice>, StoreError> {
        self.query_invoice_headers(
            "invoices_between",
            sqlx::query(
                r#"
                SELECT id, client_id, issue_date, total
                FROM invoices
                WHERE issue_date BETWEEN $1 AND $2
                ORDER BY issue_date, id
                "#,
            )
            .bind(from)
            .bind(to),
        )
        .await
    }

    async fn invoices_for_client(&self, client_id: ClientId) -> Result<Vec<Invoice>, StoreError> {
        self.query_invoice_headers(
            "invoices_for_client",
            sqlx::query(
                r#"
                SELECT id, client_id, issue_date, total
                FROM invoices
                WHERE client_id = $1
                ORDER BY issue_date DESC, id DESC
                "#,
            )
            .bind(*client_id.as_uuid()),
        )
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    #[instrument(skip(self, user), fields(operation = "insert_user", user_id = %user.id_typed()), err)]
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id_typed().as_uuid())
        .bind(user.name())
        .bind(user.email())
        .bind(user.password_hash().as_str())
        .bind(user.role().as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;
        Ok(())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.map(|r| {
            UserRow::from_row(&r)
                .map(User::from)
                .map_err(|e| decode_error("users", e))
        })
        .transpose()
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // serialization failure, deadlock, lock_timeout
                Some("40001") | Some("40P01") | Some("55P03") => StoreError::Contention(msg),
                // unique, foreign key, check
                Some("23505") | Some("23503") | Some("23514") => StoreError::Conflict(msg),
                _ => StoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Contention(format!("connection pool timed out in {}", operation))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Backend(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Backend(format!("sqlx error in {}: {}", operation, err)),
    }
}

fn decode_error(table: &str, err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("failed to decode {table} row: {err}"))
}

fn stock_from_db(stock: i64) -> Result<u32, StoreError> {
    u32::try_from(stock).map_err(|_| StoreError::Backend(format!("stock out of range: {stock}")))
}

// SQLx row types

#[derive(Debug)]
struct ClientRow {
    id: Uuid,
    name: String,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
}

impl<'r> FromRow<'r, PgRow> for ClientRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ClientRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            phone: row.try_get("phone")?,
            email: row.try_get("email")?,
        })
    }
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client::from_parts(
            ClientId::from_uuid(row.id),
            row.name,
            ContactInfo {
                address: row.address,
                phone: row.phone,
                email: row.email,
            },
        )
    }
}

#[derive(Debug)]
struct ProductRow {
    id: Uuid,
    description: String,
    unit_price: i64,
    stock: i64,
}

impl<'r> FromRow<'r, PgRow> for ProductRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ProductRow {
            id: row.try_get("id")?,
            description: row.try_get("description")?,
            unit_price: row.try_get("unit_price")?,
            stock: row.try_get("stock")?,
        })
    }
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product::from_parts(
            ProductId::from_uuid(row.id),
            row.description,
            Money::from_cents(row.unit_price),
            stock_from_db(row.stock)?,
        ))
    }
}

#[derive(Debug)]
struct InvoiceRow {
    id: Uuid,
    client_id: Uuid,
    issue_date: NaiveDate,
    total: i64,
}

impl<'r> FromRow<'r, PgRow> for InvoiceRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(InvoiceRow {
            id: row.try_get("id")?,
            client_id: row.try_get("client_id")?,
            issue_date: row.try_get("issue_date")?,
            total: row.try_get("total")?,
        })
    }
}

impl InvoiceRow {
    fn into_invoice(self, lines: Vec<InvoiceLine>) -> Result<Invoice, StoreError> {
        Invoice::from_parts(
            InvoiceId::from_uuid(self.id),
            ClientId::from_uuid(self.client_id),
            self.issue_date,
            Money::from_cents(self.total),
            lines,
        )
        .map_err(|e| StoreError::Backend(format!("corrupt invoice {}: {e}", self.id)))
    }
}

#[derive(Debug)]
struct InvoiceLineRow {
    id: Uuid,
    invoice_id: Uuid,
    product_id: Uuid,
    quantity: i64,
    unit_price: i64,
    subtotal: i64,
}

impl<'r> FromRow<'r, PgRow> for InvoiceLineRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(InvoiceLineRow {
            id: row.try_get("id")?,
            invoice_id: row.try_get("invoice_id")?,
            product_id: row.try_get("product_id")?,
            quantity: row.try_get("quantity")?,
            unit_price: row.try_get("unit_price")?,
            subtotal: row.try_get("subtotal")?,
        })
    }
}

impl TryFrom<InvoiceLineRow> for InvoiceLine {
    type Error = StoreError;

    fn try_from(row: InvoiceLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity)
            .map_err(|_| StoreError::Backend(format!("line {} quantity out of range", row.id)))?;
        Ok(InvoiceLine {
            id: InvoiceLineId::from_uuid(row.id),
            invoice_id: InvoiceId::from_uuid(row.invoice_id),
            product_id: ProductId::from_uuid(row.product_id),
            quantity,
            unit_price: Money::from_cents(row.unit_price),
            subtotal: Money::from_cents(row.subtotal),
        })
    }
}

#[derive(Debug)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
        })
    }
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User::from_parts(
            UserId::from_uuid(row.id),
            row.name,
            row.email,
            PasswordHashString::new(row.password_hash),
            Role::new(row.role),
        )
    }
}
