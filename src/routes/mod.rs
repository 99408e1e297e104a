pub mod auth;
pub mod dashboards;
pub mod organograma;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/verify-email", post(auth::verify_email))
        .route("/api/auth/resend-verification", post(auth::resend_verification))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/auth/request-reset-code", post(auth::request_reset_code))
        .route(
            "/api/auth/reset-password-with-code",
            post(auth::reset_password_with_code),
        )
        // Dashboards
        .route(
            "/api/dashboards",
            get(dashboards::list).post(dashboards::create),
        )
        .route(
            "/api/dashboards/{id}",
            get(dashboards::get)
                .put(dashboards::update)
                .delete(dashboards::delete),
        )
        // Organisational chart
        .route(
            "/api/organograma/colaboradores",
            get(organograma::list_colaboradores),
        )
}
