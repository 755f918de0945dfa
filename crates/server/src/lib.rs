//! hospital-server library crate
//!
//! Exposes `build_app` and `config` for integration tests.
//! The actual binary entrypoint is in `main.rs`.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
mod middleware;
mod openapi;
mod routes;

use axum::{Extension, Router, extract::FromRef, middleware as axum_mw, routing::get};
use deadpool_postgres::Pool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::TokenKeys;
use config::Config;
pub use routes::auth::CookieSettings;

/// Shared handler state. Handlers extract the part they need through `FromRef`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: Pool,
    pub tokens: TokenKeys,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(pool: Pool, config: &Config) -> Self {
        Self {
            pool,
            tokens: TokenKeys::new(&config.jwt_secret, config.jwt_expire),
            cookies: CookieSettings {
                days: config.jwt_cookie_expire_days,
                secure: config.is_production(),
            },
        }
    }
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(pool: Pool, config: &Config) -> Router {
    let state = AppState::new(pool, config);
    let rate_limiter = middleware::create_rate_limiter(config.rate_limit_rps);

    let api = routes::api_routes(state.clone())
        .layer(axum_mw::from_fn(middleware::rate_limit_middleware))
        .layer(Extension(rate_limiter));

    // build_recorder() + set_global_recorder() so a second build_app (as in
    // the integration tests) keeps the first recorder instead of panicking
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let public_routes = Router::new()
        .route("/", get(routes::root::get))
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(Extension(prometheus_handle))
        .merge(openapi::router());

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .nest("/api/v1", api)
        .merge(public_routes)
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
