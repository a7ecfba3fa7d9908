use axum::{routing::get, Router};

pub mod auth;
pub mod clients;
pub mod invoices;
pub mod products;
pub mod reports;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(auth::whoami))
        .nest("/clients", clients::router())
        .nest("/products", products::router())
        .nest("/invoices", invoices::router())
        .nest("/reports", reports::router())
}
