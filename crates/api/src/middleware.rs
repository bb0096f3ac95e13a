use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use osdesk_auth::{TokenConfig, validate_token};

use crate::app::errors;
use crate::context::SessionContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenConfig>,
}

/// Reject requests without a valid bearer token; otherwise attach the
/// [`SessionContext`].
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_bearer(req.headers()) else {
        return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "missing bearer token");
    };

    let claims = match validate_token(token, &state.tokens) {
        Ok(c) => c,
        Err(e) => {
            tracing::debug!(error = %e, "rejected session token");
            return errors::json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid or expired session");
        }
    };

    req.extensions_mut()
        .insert(SessionContext::new(claims.sub, claims.username));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let token = headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?
        .trim();

    (!token.is_empty()).then_some(token)
}
