use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{Value, json};

use billbook_core::{ClientId, DomainError, DomainResult, Money, ProductId};
use billbook_infra::CreateInvoiceRequest;
use billbook_infra::reports::{ClientReport, SalesReport};
use billbook_invoicing::{Invoice, InvoiceLine, RequestedLines};
use billbook_parties::{Client, ClientDetails, ContactInfo};
use billbook_products::{Product, ProductDetails};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ClientRequest {
    pub name: String,
    #[serde(default)]
    pub contact: ContactInfo,
}

impl From<ClientRequest> for ClientDetails {
    fn from(body: ClientRequest) -> Self {
        ClientDetails {
            name: body.name,
            contact: body.contact,
        }
    }
}

/// Amount as decimal text (`"5.50"`) or a JSON number (`5.5`).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Text(String),
    Number(serde_json::Number),
}

impl AmountInput {
    pub fn to_money(&self) -> DomainResult<Money> {
        match self {
            AmountInput::Text(text) => text.parse(),
            AmountInput::Number(n) => n.to_string().parse(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub description: String,
    pub unit_price: AmountInput,
    #[serde(default)]
    pub stock: i64,
}

impl ProductRequest {
    pub fn into_details(self) -> DomainResult<ProductDetails> {
        Ok(ProductDetails {
            unit_price: self.unit_price.to_money()?,
            description: self.description,
            stock: self.stock,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceBody {
    pub client_id: String,
    /// Product id → quantity as typed on the sale form (number or text).
    #[serde(default)]
    pub quantities: BTreeMap<String, Value>,
    pub as_of: Option<NaiveDate>,
}

impl CreateInvoiceBody {
    /// Keys must be product ids, each naming a distinct product. Values that are not
    /// positive whole numbers are skipped, like an untouched quantity field.
    pub fn into_request(self) -> DomainResult<CreateInvoiceRequest> {
        let client_id: ClientId = self.client_id.parse()?;

        let mut seen = BTreeSet::new();
        let mut fields = Vec::with_capacity(self.quantities.len());
        for (key, value) in self.quantities {
            let product_id: ProductId = key.parse()?;
            // Keys differing only in UUID spelling (case, braces) name one product.
            if !seen.insert(product_id) {
                return Err(DomainError::validation(format!(
                    "product {product_id} is listed more than once"
                )));
            }
            let raw = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                _ => continue,
            };
            fields.push((product_id, raw));
        }

        let request = CreateInvoiceRequest::new(client_id, RequestedLines::from_form(fields));
        Ok(match self.as_of {
            Some(date) => request.as_of(date),
            None => request,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SalesReportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse().map_err(crate::app::errors::domain_error_to_response)
}

// -------------------------
// Response mapping
// -------------------------

pub fn client_to_json(client: &Client) -> Value {
    let contact = client.contact();
    json!({
        "id": client.id_typed().to_string(),
        "name": client.name(),
        "contact": {
            "address": contact.address,
            "phone": contact.phone,
            "email": contact.email,
        },
    })
}

pub fn product_to_json(product: &Product) -> Value {
    json!({
        "id": product.id_typed().to_string(),
        "description": product.description(),
        "unit_price": product.unit_price().to_string(),
        "unit_price_cents": product.unit_price().cents(),
        "stock": product.stock(),
    })
}

fn line_to_json(line: &InvoiceLine) -> Value {
    json!({
        "id": line.id.to_string(),
        "product_id": line.product_id.to_string(),
        "quantity": line.quantity,
        "unit_price": line.unit_price.to_string(),
        "subtotal": line.subtotal.to_string(),
        "subtotal_cents": line.subtotal.cents(),
    })
}

pub fn invoice_to_json(invoice: &Invoice) -> Value {
    json!({
        "id": invoice.id_typed().to_string(),
        "client_id": invoice.client_id().to_string(),
        "issue_date": invoice.issue_date().to_string(),
        "total": invoice.total().to_string(),
        "total_cents": invoice.total().cents(),
        "lines": invoice.lines().iter().map(line_to_json).collect::<Vec<_>>(),
    })
}

/// Invoice with its client embedded. `client` is null if the client row is gone.
pub fn invoice_detail_to_json(invoice: &Invoice, client: Option<&Client>) -> Value {
    let mut body = invoice_to_json(invoice);
    body["client"] = client.map(client_to_json).unwrap_or(Value::Null);
    body
}

pub fn sales_report_to_json(report: &SalesReport) -> Value {
    json!({
        "from": report.from.to_string(),
        "to": report.to.to_string(),
        "invoice_count": report.invoices.len(),
        "total": report.total.to_string(),
        "total_cents": report.total.cents(),
        "invoices": report.invoices.iter().map(invoice_to_json).collect::<Vec<_>>(),
    })
}

pub fn client_report_to_json(report: &ClientReport) -> Value {
    json!({
        "client": client_to_json(&report.client),
        "invoice_count": report.invoices.len(),
        "total": report.total.to_string(),
        "total_cents": report.total.cents(),
        "invoices": report.invoices.iter().map(invoice_to_json).collect::<Vec<_>>(),
    })
}
