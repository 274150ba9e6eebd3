pub mod auth;
pub mod events;
pub mod gifts;
pub mod health;
pub mod invites;

use axum::Router;

use crate::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(events::router())
        .merge(gifts::router())
        .merge(invites::router())
}
