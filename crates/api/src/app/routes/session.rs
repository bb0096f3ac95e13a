use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::SessionContext;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "username and password are required",
        );
    }

    let now = Utc::now();
    let (token, user) = match services.login(&body.username, &body.password, now).await {
        Ok(v) => v,
        Err(e) => return errors::service_error_to_response(e),
    };

    let tokens = services.tokens();
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "token": token,
            "token_type": "Bearer",
            "expires_at": now + tokens.ttl,
            "user": user,
        })),
    )
        .into_response()
}

/// Tokens are stateless; logging out is the client discarding its token.
pub async fn logout(Extension(session): Extension<SessionContext>) -> axum::response::Response {
    tracing::info!(user_id = %session.user_id(), "session closed");
    (StatusCode::OK, Json(serde_json::json!({ "logged_out": true }))).into_response()
}
