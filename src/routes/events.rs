use axum::extract::{Path, State};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::{json, Value};

use crate::auth::middleware::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::invite_token;
use crate::models::event::{CreateEventRequest, EventListResponse, EventView, UpdateEventRequest};
use crate::models::gift::{GiftView, NewGift};
use crate::models::invited::{Invited, NewInvited};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/events", post(create_event).get(list_events))
        .route(
            "/api/events/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/api/events/{id}/invited", post(add_invited))
        .route("/api/events/{id}/invited/{invite_id}", delete(remove_invited))
        .route("/api/events/{id}/gifts", post(add_gift))
        .route("/api/events/{id}/gifts/{gift_id}", delete(remove_gift))
}

async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<CreateEventRequest>, AppError>,
) -> Result<Json<EventView>, AppError> {
    body.validate().map_err(AppError::BadRequest)?;

    let event = db::events::create_with_children(&state.db, auth.user_id, body).await?;
    let view = db::events::load_view(&state.db, event).await?;
    Ok(Json(view))
}

async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<EventListResponse>, AppError> {
    let events = db::events::list_by_owner(&state.db, auth.user_id).await?;
    let events = db::events::load_views(&state.db, events).await?;
    Ok(Json(EventListResponse { events }))
}

async fn get_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<EventView>, AppError> {
    let event = db::events::fetch_owned(&state.db, id, auth.user_id).await?;
    Ok(Json(db::events::load_view(&state.db, event).await?))
}

async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    WithRejection(Json(body), _): WithRejection<Json<UpdateEventRequest>, AppError>,
) -> Result<Json<EventView>, AppError> {
    let current = db::events::fetch_owned(&state.db, id, auth.user_id).await?;
    body.validate_against(&current).map_err(AppError::BadRequest)?;

    let event = db::events::update(&state.db, id, body).await?;
    tracing::info!(event_id = id, "event updated");
    Ok(Json(db::events::load_view(&state.db, event).await?))
}

async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    db::events::fetch_owned(&state.db, id, auth.user_id).await?;
    db::events::delete(&state.db, id).await?;

    tracing::info!(event_id = id, "event deleted");
    Ok(Json(json!({ "deleted": id })))
}

async fn add_invited(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    WithRejection(Json(body), _): WithRejection<Json<NewInvited>, AppError>,
) -> Result<Json<Invited>, AppError> {
    db::events::fetch_owned(&state.db, id, auth.user_id).await?;
    body.validate().map_err(AppError::BadRequest)?;

    let token = invite_token::new_invite_token();
    let invited = db::invited::insert(&state.db, id, &body, &token).await?;

    tracing::info!(event_id = id, invite_id = invited.id, "guest invited");
    Ok(Json(invited))
}

async fn remove_invited(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, invite_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, AppError> {
    db::events::fetch_owned(&state.db, id, auth.user_id).await?;

    if !db::invited::delete(&state.db, id, invite_id).await? {
        return Err(AppError::NotFound("Guest not found".into()));
    }
    Ok(Json(json!({ "deleted": invite_id })))
}

async fn add_gift(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    WithRejection(Json(body), _): WithRejection<Json<NewGift>, AppError>,
) -> Result<Json<GiftView>, AppError> {
    db::events::fetch_owned(&state.db, id, auth.user_id).await?;
    body.validate().map_err(AppError::BadRequest)?;

    let gift = db::gifts::insert(&state.db, id, &body).await?;
    tracing::info!(event_id = id, gift_id = gift.id, max = gift.max_reservations, "gift added");

    Ok(Json(GiftView {
        gift,
        reservations: vec![],
    }))
}

async fn remove_gift(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, gift_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, AppError> {
    db::events::fetch_owned(&state.db, id, auth.user_id).await?;

    if !db::gifts::delete(&state.db, id, gift_id).await? {
        return Err(AppError::NotFound("Gift not found".into()));
    }
    Ok(Json(json!({ "deleted": gift_id })))
}
