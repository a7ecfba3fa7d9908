use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use billbook_core::DomainError;
use billbook_infra::InvoiceError;
use billbook_infra::reports::ReportError;
use billbook_infra::store::StoreError;

pub fn invoice_error_to_response(err: InvoiceError) -> Response {
    match err {
        InvoiceError::UnknownClient(id) => json_error(
            StatusCode::NOT_FOUND,
            "unknown_client",
            format!("client {id} does not exist"),
        ),
        InvoiceError::UnknownProduct(id) => json_error(
            StatusCode::NOT_FOUND,
            "unknown_product",
            format!("product {id} does not exist"),
        ),
        InvoiceError::InsufficientStock {
            product_id,
            requested,
            available,
        } => (
            StatusCode::CONFLICT,
            axum::Json(json!({
                "error": "insufficient_stock",
                "message": format!("only {available} of product {product_id} in stock, {requested} requested"),
                "product_id": product_id.to_string(),
                "requested": requested,
                "available": available,
            })),
        )
            .into_response(),
        InvoiceError::AmountOverflow { product_id } => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "amount_overflow",
            format!("invoice amount overflows pricing product {product_id}"),
        ),
        InvoiceError::TransientConflict(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "transient_conflict", msg)
        }
        InvoiceError::PersistenceFailure(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "persistence_failure", msg)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Contention(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "transient_conflict", msg)
        }
        StoreError::Backend(msg) => {
            tracing::error!(error = %msg, "store backend failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
    }
}

pub fn report_error_to_response(err: ReportError) -> Response {
    match err {
        ReportError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        ReportError::UnknownClient(id) => json_error(
            StatusCode::NOT_FOUND,
            "unknown_client",
            format!("client {id} does not exist"),
        ),
        ReportError::Overflow => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "amount_overflow",
            "report total overflows",
        ),
        ReportError::Store(e) => store_error_to_response(e),
    }
}

pub fn not_found(what: &str) -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
