//! Sales and per-client reports over committed invoices.

use chrono::NaiveDate;
use thiserror::Error;

use billbook_core::{ClientId, Money};
use billbook_invoicing::Invoice;
use billbook_parties::Client;

use crate::store::{ClientRepository, InvoiceQueries, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("client {0} not found")]
    UnknownClient(ClientId),

    #[error("report total overflow")]
    Overflow,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Invoices issued in an inclusive date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub invoices: Vec<Invoice>,
    pub total: Money,
}

/// Every invoice of one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientReport {
    pub client: Client,
    pub invoices: Vec<Invoice>,
    pub total: Money,
}

fn sum_totals(invoices: &[Invoice]) -> Result<Money, ReportError> {
    Money::checked_sum(invoices.iter().map(Invoice::total)).ok_or(ReportError::Overflow)
}

pub async fn sales_report<Q>(store: &Q, from: NaiveDate, to: NaiveDate) -> Result<SalesReport, ReportError>
where
    Q: InvoiceQueries + ?Sized,
{
    if from > to {
        return Err(ReportError::Validation(format!(
            "start date {from} is after end date {to}"
        )));
    }

    let invoices = store.invoices_between(from, to).await?;
    let total = sum_totals(&invoices)?;
    Ok(SalesReport {
        from,
        to,
        invoices,
        total,
    })
}

pub async fn client_report<Q>(store: &Q, client_id: ClientId) -> Result<ClientReport, ReportError>
where
    Q: InvoiceQueries + ClientRepository + ?Sized,
{
    let client = store
        .get_client(client_id)
        .await?
        .ok_or(ReportError::UnknownClient(client_id))?;

    let invoices = store.invoices_for_client(client_id).await?;
    let total = sum_totals(&invoices)?;
    Ok(ClientReport {
        client,
        invoices,
        total,
    })
}
