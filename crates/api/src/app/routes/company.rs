use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use osdesk_parties::CompanyDetails;

use crate::app::errors;
use crate::app::services::AppServices;

/// The company profile, or `null` when none has been saved yet.
pub async fn get_company(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.company().await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn save_company(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<CompanyDetails>,
) -> axum::response::Response {
    match services.save_company(body).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
