use axum::{
    Router,
    routing::{get, post},
};

pub mod actions;
pub mod auth;
pub mod invoices;
pub mod places;
pub mod system;

/// Routes that work without a session (sign-in flow, parsing, address
/// lookups — the parse endpoints are deliberately open, matching the
/// product's behavior).
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/signin", post(auth::signin))
        .route("/auth/verify", post(auth::verify))
        .route("/invoice/parse/text", post(actions::parse_text))
        .route("/invoice/parse/file", post(actions::parse_file))
        .nest("/places", places::router())
}

/// Router for all session-scoped endpoints.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/signout", post(auth::signout))
        .route("/invoice/generate", post(actions::generate))
        .route("/invoice/export", post(actions::export))
        .route("/invoice/send", post(actions::send))
        .route("/invoice/email", post(actions::email))
        .nest("/invoices", invoices::router())
}
