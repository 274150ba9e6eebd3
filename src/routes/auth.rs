use axum::extract::State;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;

use crate::auth::middleware::AuthUser;
use crate::auth::{self, password};
use crate::db;
use crate::error::AppError;
use crate::models::user::{
    ChangeCredentialRequest, LoginRequest, LoginResponse, PushTokenRequest, RegisterRequest,
    UserResponse,
};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/api/me", get(me))
        .route("/api/me/password", put(change_credential))
        .route("/api/me/push-token", put(set_push_token))
}

async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<Json<UserResponse>, AppError> {
    let user = auth::register(&state.db, body).await?;
    Ok(Json(UserResponse::from(user)))
}

async fn login(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = body.email.trim().to_lowercase();

    let user = db::users::find_by_email(&state.db, &email)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !password::verify_credential(&body.credential, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }

    let (token, expires_at) = state.jwt.create_token(user.id)?;
    tracing::info!(user_id = user.id, "login succeeded");

    Ok(Json(LoginResponse { token, expires_at }))
}

async fn me(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserResponse>, AppError> {
    let user = db::users::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    Ok(Json(UserResponse::from(user)))
}

async fn change_credential(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<ChangeCredentialRequest>, AppError>,
) -> Result<Json<UserResponse>, AppError> {
    let user = db::users::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !password::verify_credential(&body.current_credential, &user.password_hash)? {
        return Err(AppError::InvalidCredentials);
    }
    password::check_strength(&body.new_credential)?;

    let hash = password::hash_credential(&body.new_credential)?;
    let updated = db::users::update_password_hash(&state.db, user.id, &hash).await?;
    tracing::info!(user_id = updated.id, "credential changed");

    Ok(Json(UserResponse::from(updated)))
}

async fn set_push_token(
    State(state): State<AppState>,
    auth: AuthUser,
    WithRejection(Json(body), _): WithRejection<Json<PushTokenRequest>, AppError>,
) -> Result<Json<UserResponse>, AppError> {
    let token = body
        .push_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let user = db::users::set_push_token(&state.db, auth.user_id, token).await?;
    Ok(Json(UserResponse::from(user)))
}
