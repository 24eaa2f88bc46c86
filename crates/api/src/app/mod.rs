//! HTTP API application wiring (axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store/mailer/client wiring behind one shared struct
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request parameter types and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: AppConfig) -> Router {
    let services = Arc::new(services::build_services(config).await);
    app_with_services(services)
}

/// Router over explicitly constructed services (tests inject stores/mailers
/// here).
pub fn app_with_services(services: Arc<services::AppServices>) -> Router {
    let auth_state = middleware::AuthState { jwt: services.jwt.clone() };

    // Protected routes: require a valid session.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
