use axum::{routing::get, Router};

pub mod auth;
pub mod common;
pub mod members;
pub mod memberships;
pub mod system;
pub mod trainers;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(auth::router())
}

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .merge(trainers::router())
        .merge(members::router())
        .merge(memberships::router())
}
