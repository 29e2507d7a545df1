use axum::Router;
use axum::routing::get;

pub mod applications;
pub mod jobs;
pub mod system;

pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(jobs::public_router())
}

pub fn protected_router() -> Router {
    jobs::protected_router().merge(applications::router())
}
