//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection and the operations handlers call
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower::ServiceBuilder;

use billbook_auth::{Hs256JwtValidator, TokenIssuer};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the API tests).
pub fn build_app(services: services::AppServices, jwt_secret: &str, token_ttl: chrono::Duration) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services);
    let issuer = Arc::new(TokenIssuer::new(jwt_secret.as_bytes(), token_ttl));

    // Protected routes: require a valid bearer token.
    let protected = routes::router()
        .layer(Extension(services.clone()))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    let public = Router::new()
        .route("/health", get(routes::system::health))
        .route("/login", post(routes::auth::login))
        .layer(
            ServiceBuilder::new()
                .layer(Extension(services))
                .layer(Extension(issuer)),
        );

    Router::new().merge(public).merge(protected)
}
