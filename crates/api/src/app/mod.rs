//! HTTP application wiring.
//!
//! - `state.rs`: service construction (stores, identity, broker, worker)
//! - `routes/`: handlers, one file per domain area
//! - `dto.rs`: response DTOs and query-parameter mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod state;

/// Build the full router. Public reads stay open; every mutating or
/// caller-scoped route goes through the bearer middleware first.
pub fn build_app(state: Arc<state::AppState>) -> Router {
    let protected = routes::protected_router()
        .layer(axum::middleware::from_fn(middleware::require_bearer));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(state))
}
