//! Invoice Transaction Manager.
//!
//! Creates an invoice atomically: resolve and lock every purchased product, price the
//! lines at the current unit price, check and decrement stock, write header and lines,
//! commit. Any failure drops the unit of work, which discards every write of the
//! attempt.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use tracing::instrument;

use billbook_core::{ClientId, InvoiceId, ProductId};
use billbook_invoicing::{Invoice, InvoiceDraft, PricingError, RequestedLines};

use crate::store::{BillingStore, StockDecrement, StoreError, UnitOfWork};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

const RETRY_BACKOFF: Duration = Duration::from_millis(10);

/// Input of `create_invoice`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInvoiceRequest {
    pub client_id: ClientId,
    pub lines: RequestedLines,
    /// Issue date; today (UTC) when `None`.
    pub as_of: Option<NaiveDate>,
}

impl CreateInvoiceRequest {
    pub fn new(client_id: ClientId, lines: RequestedLines) -> Self {
        Self {
            client_id,
            lines,
            as_of: None,
        }
    }

    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }
}

/// Why an invoice was not created. In every case nothing was persisted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("unknown client {0}")]
    UnknownClient(ClientId),

    #[error("unknown product {0}")]
    UnknownProduct(ProductId),

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("amount overflow pricing product {product_id}")]
    AmountOverflow { product_id: ProductId },

    /// Isolation could not be obtained; the whole call may be retried.
    #[error("transient conflict: {0}")]
    TransientConflict(String),

    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
}

impl InvoiceError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, InvoiceError::TransientConflict(_))
    }

    /// Missing units for an `InsufficientStock` rejection.
    pub fn shortfall(&self) -> Option<u32> {
        match self {
            InvoiceError::InsufficientStock {
                requested,
                available,
                ..
            } => Some(requested.saturating_sub(*available)),
            _ => None,
        }
    }
}

impl From<StoreError> for InvoiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Contention(msg) => InvoiceError::TransientConflict(msg),
            other => InvoiceError::PersistenceFailure(other.to_string()),
        }
    }
}

impl From<PricingError> for InvoiceError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::InsufficientStock {
                product_id,
                requested,
                available,
            } => InvoiceError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            PricingError::AmountOverflow { product_id } => {
                InvoiceError::AmountOverflow { product_id }
            }
        }
    }
}

/// Creates invoices against a [`BillingStore`].
#[derive(Debug, Clone)]
pub struct InvoiceTransactionManager<S> {
    store: S,
    max_attempts: u32,
}

impl<S: BillingStore> InvoiceTransactionManager<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Total attempts `create_invoice_with_retry` makes (at least one).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create one invoice, all-or-nothing.
    #[instrument(
        skip(self, request),
        fields(client_id = %request.client_id, line_count = request.lines.len())
    )]
    pub async fn create_invoice(&self, request: &CreateInvoiceRequest) -> Result<Invoice, InvoiceError> {
        let result = self.try_create(request).await;

        match &result {
            Ok(invoice) => {
                if invoice.is_empty() {
                    tracing::warn!(
                        invoice_id = %invoice.id_typed(),
                        "invoice created with no lines (total 0)"
                    );
                }
                tracing::info!(
                    invoice_id = %invoice.id_typed(),
                    total = %invoice.total(),
                    lines = invoice.lines().len(),
                    "invoice committed"
                );
            }
            Err(InvoiceError::PersistenceFailure(msg)) => {
                tracing::error!(error = %msg, "invoice persistence failed; rolled back");
            }
            Err(InvoiceError::TransientConflict(msg)) => {
                tracing::warn!(error = %msg, "invoice creation hit a transient conflict; rolled back");
            }
            Err(e) => {
                tracing::info!(error = %e, "invoice rejected");
            }
        }

        result
    }

    /// `create_invoice`, re-run from scratch on `TransientConflict` up to the configured
    /// number of attempts.
    pub async fn create_invoice_with_retry(
        &self,
        request: &CreateInvoiceRequest,
    ) -> Result<Invoice, InvoiceError> {
        let mut attempt = 1;
        loop {
            match self.create_invoice(request).await {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::warn!(attempt, max_attempts = self.max_attempts, "retrying invoice creation");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    async fn try_create(&self, request: &CreateInvoiceRequest) -> Result<Invoice, InvoiceError> {
        let mut tx = self.store.begin().await?;

        if !tx.client_exists(request.client_id).await? {
            return Err(InvoiceError::UnknownClient(request.client_id));
        }

        let issue_date = request.as_of.unwrap_or_else(|| Utc::now().date_naive());
        let mut draft = InvoiceDraft::new(InvoiceId::new(), request.client_id, issue_date);

        // Ascending id order: every concurrent caller takes row locks in the same order.
        for (product_id, quantity) in request.lines.purchased() {
            let product = tx
                .lock_product(product_id)
                .await?
                .ok_or(InvoiceError::UnknownProduct(product_id))?;
            draft.add_line(&product, quantity)?;
        }

        let invoice = draft.finish();

        for line in invoice.lines() {
            match tx.decrement_stock(line.product_id, line.quantity).await? {
                StockDecrement::Applied { .. } => {}
                StockDecrement::Insufficient { available } => {
                    return Err(InvoiceError::InsufficientStock {
                        product_id: line.product_id,
                        requested: line.quantity,
                        available,
                    });
                }
                StockDecrement::Missing => {
                    return Err(InvoiceError::UnknownProduct(line.product_id));
                }
            }
        }

        tx.insert_invoice(&invoice).await?;
        tx.commit().await?;

        Ok(invoice)
    }
}
