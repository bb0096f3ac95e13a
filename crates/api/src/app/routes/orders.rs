use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use osdesk_billing::{SearchSummary, sum_all};
use osdesk_core::OrderId;
use osdesk_orders::{EditOutcome, OrderQuery};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(search_orders).post(create_order))
        .route("/status/:status", get(orders_by_status))
        .route("/:id", get(get_order).patch(edit_order))
        .route("/:id/pdf", get(order_pdf))
}

/// Paginated search plus per-status sums over the returned page.
pub async fn search_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::OrderSearchParams>,
) -> axum::response::Response {
    let query = OrderQuery::from_raw(
        params.q.as_deref(),
        params.status.as_deref(),
        params.month.as_deref(),
        params.page,
    );

    let page = match services.search_orders(&query).await {
        Ok(p) => p,
        Err(e) => return errors::service_error_to_response(e),
    };

    let mut body = dto::page_to_json(&page);
    body["summary"] = serde_json::json!(SearchSummary::of(&page.items));
    (StatusCode::OK, Json(body)).into_response()
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let input = match body.into_domain() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    match services.create_order(input, Utc::now()).await {
        Ok(detail) => (StatusCode::CREATED, Json(dto::order_detail_to_json(&detail))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.order_detail(id).await {
        Ok(detail) => (StatusCode::OK, Json(dto::order_detail_to_json(&detail))).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn edit_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::EditOrderRequest>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let edit = match body.into_domain() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let (outcome, detail) = match services.edit_order(id, edit).await {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };

    let mut body = dto::order_detail_to_json(&detail);
    match outcome {
        EditOutcome::LineRemoved(line) => body["removed_line"] = serde_json::json!(line.id),
        EditOutcome::Updated { added_line } => body["added_line"] = serde_json::json!(added_line),
    }
    (StatusCode::OK, Json(body)).into_response()
}

/// Orders with one status, with the sum for that status.
pub async fn orders_by_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(status): Path<String>,
) -> axum::response::Response {
    let (status, orders) = match services.orders_with_status(&status).await {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };

    let breakdown = sum_all(&orders);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": status,
            "status_label": status.label(),
            "total": breakdown.get(status),
            "items": orders.iter().map(dto::order_summary_to_json).collect::<Vec<_>>(),
        })),
    )
        .into_response()
}

pub async fn order_pdf(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: OrderId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let doc = match services.render_order(id).await {
        Ok(d) => d,
        Err(e) => return errors::service_error_to_response(e),
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, doc.content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename={}", doc.file_name)),
        ],
        doc.bytes,
    )
        .into_response()
}
