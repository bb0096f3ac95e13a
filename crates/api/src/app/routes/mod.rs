use axum::{
    routing::{get, post},
    Router,
};

pub mod clients;
pub mod company;
pub mod orders;
pub mod products;
pub mod reports;
pub mod session;
pub mod system;
pub mod users;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/logout", post(session::logout))
        .route("/dashboard", get(reports::dashboard))
        .route("/reports/monthly", get(reports::monthly))
        .route("/company", get(company::get_company).put(company::save_company))
        .nest("/users", users::router())
        .nest("/clients", clients::router())
        .nest("/products", products::router())
        .nest("/orders", orders::router())
}
