use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use billbook_core::InvoiceId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/:id", get(get_invoice))
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::CreateInvoiceBody>,
) -> Response {
    let request = match body.into_request() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    tracing::debug!(user_id = %user.user_id(), client_id = %request.client_id, "create invoice requested");

    match services.create_invoice(&request).await {
        Ok(invoice) => (StatusCode::CREATED, Json(dto::invoice_to_json(&invoice))).into_response(),
        Err(e) => errors::invoice_error_to_response(e),
    }
}

pub async fn list_invoices(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.invoices_list().await {
        Ok(invoices) => {
            let items = invoices.iter().map(dto::invoice_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: InvoiceId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let invoice = match services.invoice_get(id).await {
        Ok(Some(invoice)) => invoice,
        Ok(None) => return errors::not_found("invoice"),
        Err(e) => return errors::store_error_to_response(e),
    };

    match services.client_get(invoice.client_id()).await {
        Ok(client) => (
            StatusCode::OK,
            Json(dto::invoice_detail_to_json(&invoice, client.as_ref())),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}
