use crate::AppState;
use axum::Router;

pub mod actions;
pub mod policy;
pub mod privacy;
pub mod providers;

/// API v1 routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/actions", actions::routes())
        .nest("/providers", providers::routes())
        .nest("/policy", policy::routes())
        .nest("/privacy", privacy::routes())
}
