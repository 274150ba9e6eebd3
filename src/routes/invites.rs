use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;

use crate::db;
use crate::error::AppError;
use crate::invite_token;
use crate::models::event::PublicEventView;
use crate::models::invited::{Invited, RespondInviteRequest};
use crate::AppState;

/// Guest-facing routes. The invite token is the only credential.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invites/{token}/event", get(resolve_invite_event))
        .route("/invites/{token}/respond", post(respond_to_invite))
}

fn invite_not_found() -> AppError {
    AppError::NotFound("Invite not found".into())
}

async fn resolve_invite_event(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<PublicEventView>, AppError> {
    if !invite_token::is_well_formed(&token) {
        return Err(invite_not_found());
    }

    let guest = db::invited::find_by_token(&state.db, &token)
        .await?
        .ok_or_else(invite_not_found)?;

    let event = db::events::fetch(&state.db, guest.event_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;
    let view = db::events::load_view(&state.db, event).await?;

    Ok(Json(PublicEventView::for_guest(&view, &guest)))
}

async fn respond_to_invite(
    State(state): State<AppState>,
    Path(token): Path<String>,
    WithRejection(Json(body), _): WithRejection<Json<RespondInviteRequest>, AppError>,
) -> Result<Json<Invited>, AppError> {
    if !invite_token::is_well_formed(&token) {
        return Err(invite_not_found());
    }

    let invite = db::invited::respond(&state.db, &token, body.accepted)
        .await?
        .ok_or_else(invite_not_found)?;

    tracing::info!(invite_id = invite.id, accepted = body.accepted, "invite answered");
    Ok(Json(invite))
}
