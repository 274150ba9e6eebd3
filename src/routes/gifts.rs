use axum::extract::{Path, State};
use axum::routing::{delete, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::models::gift::{Reservation, ReserveGiftRequest};
use crate::reservation;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/gifts/reserve", post(reserve_gift))
        .route("/api/gifts/{gift_id}/reservation", delete(cancel_reservation))
}

/// Reserves on behalf of the caller. A `user_id` in the body, if present, must
/// be the caller's own.
async fn reserve_gift(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<ReserveGiftRequest>, AppError>,
) -> Result<Json<Reservation>, AppError> {
    if body.user_id.is_some_and(|id| id != auth.user_id) {
        return Err(AppError::Forbidden);
    }

    let reservation = reservation::reserve_gift(&state.db, body.event_gift_id, auth.user_id).await?;
    Ok(Json(reservation))
}

async fn cancel_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(gift_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    reservation::cancel_reservation(&state.db, gift_id, auth.user_id).await?;
    Ok(Json(json!({ "cancelled": gift_id })))
}
