use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod customer;
pub mod doc;
pub mod health;
pub mod professional;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/customer", customer::router())
        .nest("/professional", professional::router())
}
