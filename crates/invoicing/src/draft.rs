use chrono::NaiveDate;
use thiserror::Error;

use billbook_core::{ClientId, InvoiceId, InvoiceLineId, Money, ProductId};
use billbook_products::Product;

use crate::invoice::{Invoice, InvoiceLine};

/// Why a line could not be priced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("amount overflow pricing product {product_id}")]
    AmountOverflow { product_id: ProductId },
}

/// An invoice being priced line by line.
///
/// Each line copies the product's current unit price. The running total is kept with
/// checked arithmetic, so the finished invoice satisfies `total == Σ subtotal`.
#[derive(Debug, Clone)]
pub struct InvoiceDraft {
    id: InvoiceId,
    client_id: ClientId,
    issue_date: NaiveDate,
    total: Money,
    lines: Vec<InvoiceLine>,
}

impl InvoiceDraft {
    pub fn new(id: InvoiceId, client_id: ClientId, issue_date: NaiveDate) -> Self {
        Self {
            id,
            client_id,
            issue_date,
            total: Money::ZERO,
            lines: Vec::new(),
        }
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    /// Price `quantity` units of `product` and append the line.
    ///
    /// Fails without touching the draft when stock is short or an amount overflows.
    pub fn add_line(&mut self, product: &Product, quantity: u32) -> Result<InvoiceLine, PricingError> {
        let product_id = product.id_typed();

        product
            .ensure_available(quantity)
            .map_err(|shortfall| PricingError::InsufficientStock {
                product_id,
                requested: shortfall.requested,
                available: shortfall.available,
            })?;

        let unit_price = product.unit_price();
        let subtotal = unit_price
            .checked_mul(quantity)
            .ok_or(PricingError::AmountOverflow { product_id })?;
        let total = self
            .total
            .checked_add(subtotal)
            .ok_or(PricingError::AmountOverflow { product_id })?;

        self.total = total;
        let line = InvoiceLine {
            id: InvoiceLineId::new(),
            invoice_id: self.id,
            product_id,
            quantity,
            unit_price,
            subtotal,
        };
        self.lines.push(line.clone());
        Ok(line)
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn finish(self) -> Invoice {
        Invoice::priced(self.id, self.client_id, self.issue_date, self.total, self.lines)
    }
}
