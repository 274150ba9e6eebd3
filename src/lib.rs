pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod invite_token;
pub mod models;
pub mod reservation;
pub mod routes;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::auth::jwt::JwtKeys;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub jwt: JwtKeys,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        let jwt = JwtKeys::new(&config.jwt_secret, config.token_ttl_hours);
        Self {
            db,
            config: Arc::new(config),
            jwt,
        }
    }
}

/// Builds the full application: API routes, the optional static front-end
/// (which hosts the guest invite page), CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let mut router = routes::api_router();

    if let Some(dir) = state.config.static_dir.as_deref() {
        let index = Path::new(dir).join("index.html");
        router = router.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    router
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
