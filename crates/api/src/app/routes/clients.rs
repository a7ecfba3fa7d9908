use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use billbook_core::ClientId;
use billbook_parties::{Client, ClientDetails};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", get(get_client).put(update_client).delete(delete_client))
}

pub async fn list_clients(Extension(services): Extension<Arc<AppServices>>) -> Response {
    match services.clients_list().await {
        Ok(clients) => {
            let items = clients.iter().map(dto::client_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ClientRequest>,
) -> Response {
    let client = match Client::register(ClientId::new(), ClientDetails::from(body)) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if let Err(e) = services.client_insert(&client).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(client_id = %client.id_typed(), "client created");
    (StatusCode::CREATED, Json(dto::client_to_json(&client))).into_response()
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ClientId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.client_get(id).await {
        Ok(Some(client)) => (StatusCode::OK, Json(dto::client_to_json(&client))).into_response(),
        Ok(None) => errors::not_found("client"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::ClientRequest>,
) -> Response {
    let id: ClientId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let mut client = match services.client_get(id).await {
        Ok(Some(client)) => client,
        Ok(None) => return errors::not_found("client"),
        Err(e) => return errors::store_error_to_response(e),
    };

    if let Err(e) = client.update(ClientDetails::from(body)) {
        return errors::domain_error_to_response(e);
    }

    match services.client_update(&client).await {
        Ok(()) => (StatusCode::OK, Json(dto::client_to_json(&client))).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ClientId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.client_delete(id).await {
        Ok(()) => {
            tracing::info!(client_id = %id, "client deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}
