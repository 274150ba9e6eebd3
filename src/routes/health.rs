use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/health", get(health))
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    let db_ok = match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(&state.db).await {
        Ok(one) => one == 1,
        Err(e) => {
            tracing::warn!("health check query failed: {e}");
            false
        }
    };
    let status = if db_ok { "ok" } else { "degraded" };
    Json(json!({ "status": status, "db": db_ok }))
}
