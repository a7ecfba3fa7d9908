use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billbook_core::{
    ClientId, DomainError, DomainResult, Entity, InvoiceId, InvoiceLineId, Money, ProductId,
};

/// One product-quantity-price entry of an invoice.
///
/// `unit_price` is the product price captured when the invoice was created; later price
/// edits never reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: InvoiceLineId,
    pub invoice_id: InvoiceId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

impl InvoiceLine {
    fn check(&self, invoice_id: InvoiceId) -> DomainResult<()> {
        if self.invoice_id != invoice_id {
            return Err(DomainError::invariant(format!(
                "line {} belongs to invoice {}, not {}",
                self.id, self.invoice_id, invoice_id
            )));
        }
        if self.quantity == 0 {
            return Err(DomainError::invariant(format!(
                "line {} has zero quantity",
                self.id
            )));
        }
        if self.unit_price.checked_mul(self.quantity) != Some(self.subtotal) {
            return Err(DomainError::invariant(format!(
                "line {} subtotal {} != {} x {}",
                self.id, self.subtotal, self.quantity, self.unit_price
            )));
        }
        Ok(())
    }
}

/// Entity: Invoice (header + lines).
///
/// Invariant: `total == Σ line.subtotal`. The total is never set independently; every
/// constructor either computes it or verifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    id: InvoiceId,
    client_id: ClientId,
    issue_date: NaiveDate,
    total: Money,
    lines: Vec<InvoiceLine>,
}

impl Invoice {
    pub(crate) fn priced(
        id: InvoiceId,
        client_id: ClientId,
        issue_date: NaiveDate,
        total: Money,
        lines: Vec<InvoiceLine>,
    ) -> Self {
        Self {
            id,
            client_id,
            issue_date,
            total,
            lines,
        }
    }

    /// Rebuild an invoice from stored rows, verifying the total and every line.
    pub fn from_parts(
        id: InvoiceId,
        client_id: ClientId,
        issue_date: NaiveDate,
        total: Money,
        lines: Vec<InvoiceLine>,
    ) -> DomainResult<Self> {
        for line in &lines {
            line.check(id)?;
        }

        let sum = Money::checked_sum(lines.iter().map(|l| l.subtotal))
            .ok_or_else(|| DomainError::invariant("invoice total overflow"))?;
        if sum != total {
            return Err(DomainError::invariant(format!(
                "invoice {id} total {total} != sum of lines {sum}"
            )));
        }

        Ok(Self::priced(id, client_id, issue_date, total, lines))
    }

    pub fn id_typed(&self) -> InvoiceId {
        self.id
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn issue_date(&self) -> NaiveDate {
        self.issue_date
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn lines(&self) -> &[InvoiceLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> InvoiceId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn line(invoice_id: InvoiceId, quantity: u32, price: i64) -> InvoiceLine {
        let unit_price = Money::from_cents(price);
        InvoiceLine {
            id: InvoiceLineId::new(),
            invoice_id,
            product_id: ProductId::new(),
            quantity,
            unit_price,
            subtotal: unit_price.checked_mul(quantity).unwrap(),
        }
    }

    #[test]
    fn from_parts_accepts_consistent_rows() {
        let id = InvoiceId::new();
        let lines = vec![line(id, 3, 500), line(id, 1, 250)];
        let invoice =
            Invoice::from_parts(id, ClientId::new(), date(), Money::from_cents(1750), lines)
                .unwrap();
        assert_eq!(invoice.total(), Money::from_cents(1750));
        assert_eq!(invoice.lines().len(), 2);
    }

    #[test]
    fn from_parts_rejects_total_mismatch() {
        let id = InvoiceId::new();
        let err = Invoice::from_parts(
            id,
            ClientId::new(),
            date(),
            Money::from_cents(999),
            vec![line(id, 3, 500)],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn from_parts_rejects_line_of_other_invoice() {
        let id = InvoiceId::new();
        let other = line(InvoiceId::new(), 1, 100);
        let err = Invoice::from_parts(id, ClientId::new(), date(), Money::from_cents(100), vec![
            other,
        ])
        .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn from_parts_rejects_wrong_subtotal() {
        let id = InvoiceId::new();
        let mut bad = line(id, 2, 100);
        bad.subtotal = Money::from_cents(150);
        assert!(
            Invoice::from_parts(id, ClientId::new(), date(), Money::from_cents(150), vec![bad])
                .is_err()
        );
    }

    #[test]
    fn empty_invoice_has_zero_total() {
        let invoice =
            Invoice::from_parts(InvoiceId::new(), ClientId::new(), date(), Money::ZERO, vec![])
                .unwrap();
        assert!(invoice.is_empty());
        assert_eq!(invoice.total(), Money::ZERO);
    }
}
