pub mod auth;
pub mod cleanup;
pub mod client;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::Router;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::email::Mailer;
use crate::rate_limit::{FailureLimiter, ResendCooldown};
use crate::state::{AppState, SharedState};

pub fn build_app(pool: PgPool, config: Config, mailer: Arc<dyn Mailer>) -> (Router, SharedState) {
    let cors = cors_layer(&config.cors_origins);
    let max_body_size = config.max_body_size;
    let cooldown = Duration::from_secs(config.resend_cooldown_secs);

    let state: SharedState = Arc::new(AppState {
        pool,
        resend_cooldown: ResendCooldown::new(cooldown),
        reset_cooldown: ResendCooldown::new(cooldown),
        login_limiter: FailureLimiter::for_login(),
        code_limiter: FailureLimiter::for_codes(),
        mailer,
        config,
    });

    let app = Router::new()
        .merge(routes::api_routes())
        .route("/health", axum::routing::get(health))
        .layer(
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("x-content-type-options"),
                    HeaderValue::from_static("nosniff"),
                ))
                .layer(SetResponseHeaderLayer::overriding(
                    HeaderName::from_static("referrer-policy"),
                    HeaderValue::from_static("strict-origin-when-cross-origin"),
                ))
                .layer(TraceLayer::new_for_http())
                // CorsLayer needs an inner body with Default, so the limit sits outside it
                .layer(RequestBodyLimitLayer::new(max_body_size))
                .layer(cors),
        )
        .with_state(state.clone());

    (app, state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{origin}': {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn health() -> &'static str {
    "ok"
}
