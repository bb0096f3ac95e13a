use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use osdesk_billing::MonthPeriod;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub async fn dashboard(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.dashboard(Utc::now()).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// Billing for one calendar month; missing `year`/`month` default to the
/// current one.
pub async fn monthly(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::MonthlyReportParams>,
) -> axum::response::Response {
    let current = MonthPeriod::containing(Utc::now());
    let period = match MonthPeriod::new(
        params.year.unwrap_or(current.year),
        params.month.unwrap_or(current.month),
    ) {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.monthly_report(period).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
