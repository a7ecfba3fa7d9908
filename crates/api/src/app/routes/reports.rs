use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use billbook_core::ClientId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/sales", get(sales_report))
        .route("/clients/:id", get(client_report))
}

/// `GET /reports/sales?from=YYYY-MM-DD&to=YYYY-MM-DD` (both dates inclusive).
pub async fn sales_report(
    Extension(services): Extension<Arc<AppServices>>,
    Query(range): Query<dto::SalesReportQuery>,
) -> Response {
    match services.sales_report(range.from, range.to).await {
        Ok(report) => (StatusCode::OK, Json(dto::sales_report_to_json(&report))).into_response(),
        Err(e) => errors::report_error_to_response(e),
    }
}

pub async fn client_report(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id: ClientId = match dto::parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services.client_report(id).await {
        Ok(report) => (StatusCode::OK, Json(dto::client_report_to_json(&report))).into_response(),
        Err(e) => errors::report_error_to_response(e),
    }
}
