use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use billbook_auth::{Password, TokenIssuer};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(issuer): Extension<Arc<TokenIssuer>>,
    Json(body): Json<dto::LoginRequest>,
) -> Response {
    let user = match services.find_user_by_email(&body.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::info!("login rejected: unknown email");
            return invalid_credentials();
        }
        Err(e) => return errors::store_error_to_response(e),
    };

    if user.authenticate(&Password::new(body.password)).is_err() {
        tracing::info!(user_id = %user.id_typed(), "login rejected: wrong password");
        return invalid_credentials();
    }

    let issued = issuer
        .claims_for(&user, Utc::now())
        .and_then(|claims| issuer.encode(&claims).map(|token| (token, claims.expires_at)));
    let (token, expires_at) = match issued {
        Ok(issued) => issued,
        Err(e) => {
            tracing::error!(error = %e, "failed to issue token");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string());
        }
    };

    tracing::info!(user_id = %user.id_typed(), "user logged in");
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "token_type": "Bearer",
            "expires_at": expires_at.to_rfc3339(),
        })),
    )
        .into_response()
}

fn invalid_credentials() -> Response {
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "invalid email or password",
    )
}

pub async fn whoami(Extension(user): Extension<UserContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": user.user_id().to_string(),
        "email": user.email(),
        "role": user.role().as_str(),
    }))
}
