use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use osdesk_auth::AuthError;
use osdesk_core::DomainError;
use osdesk_infra::StoreError;

use crate::app::services::ServiceError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Domain(e) => domain_error_to_response(e),
        other => {
            tracing::error!(error = %other, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "storage failure")
        }
    }
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid username or password")
        }
        AuthError::InvalidToken(_) => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid or expired session")
        }
        AuthError::Domain(e) => domain_error_to_response(e),
        AuthError::Hashing(msg) => {
            tracing::error!(error = %msg, "password hashing failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "auth_error", "password hashing failed")
        }
    }
}

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::Store(e) => store_error_to_response(e),
        ServiceError::Auth(e) => auth_error_to_response(e),
        ServiceError::Render(e) => {
            tracing::error!(error = %e, "document rendering failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "render_error", "failed to generate document")
        }
    }
}

/// Parse a path/body identifier, answering 400 on malformed input.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: std::str::FromStr<Err = DomainError>,
{
    raw.parse().map_err(domain_error_to_response)
}

#[cfg(test)]
mod tests {
    use osdesk_core::OrderId;

    use super::*;

    #[test]
    fn maps_status_codes() {
        assert_eq!(
            domain_error_to_response(DomainError::validation("Invalid status")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            domain_error_to_response(DomainError::conflict("cannot delete the signed-in user")).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(store_error_to_response(StoreError::NotFound("order")).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            store_error_to_response(StoreError::Conflict("tax id".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(store_error_to_response(StoreError::Poisoned).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(auth_error_to_response(AuthError::InvalidCredentials).status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id::<OrderId>("nope").is_err());
        assert!(parse_id::<OrderId>(&OrderId::new().to_string()).is_ok());
    }
}
