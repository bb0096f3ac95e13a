use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use osdesk_billing::order_totals;
use osdesk_core::ClientId;
use osdesk_parties::ClientDetails;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", get(get_client).patch(update_client).delete(delete_client))
        .route("/:id/orders", get(client_orders))
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::ClientListParams>,
) -> axum::response::Response {
    match services.list_clients(params.q.as_deref()).await {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<ClientDetails>,
) -> axum::response::Response {
    match services.create_client(body).await {
        Ok(client) => (StatusCode::CREATED, Json(client)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.get_client(id).await {
        Ok(client) => (StatusCode::OK, Json(client)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<ClientDetails>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.update_client(id, body).await {
        Ok(client) => (StatusCode::OK, Json(client)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.delete_client(id).await {
        Ok(removed) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "deleted": id,
                "orders_removed": removed.orders,
                "lines_removed": removed.lines,
            })),
        )
            .into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// The client's orders, newest first, each with subtotal and total.
pub async fn client_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: ClientId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (client, orders) = match services.client_orders(id).await {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };

    let items = orders
        .iter()
        .map(|detail| {
            let totals = order_totals(detail);
            serde_json::json!({
                "id": detail.order.id,
                "created_at": detail.order.created_at,
                "status": detail.order.status,
                "status_label": detail.order.status.label(),
                "subtotal": totals.subtotal,
                "total": totals.total,
            })
        })
        .collect::<Vec<_>>();

    (StatusCode::OK, Json(serde_json::json!({ "client": client, "items": items }))).into_response()
}
