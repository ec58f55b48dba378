use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod dishes;
pub mod doc;
pub mod health;
pub mod orders;
pub mod params;
pub mod restaurants;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .merge(users::router())
        .nest("/admin", admin::router())
        .nest("/restaurants", restaurants::router())
        .nest("/dishes", dishes::router())
        .nest("/orders", orders::router())
}
