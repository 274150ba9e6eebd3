use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::reservation::ReservationError;

#[derive(Debug)]
pub enum AppError {
    InvalidCredentials,
    Unauthorized,
    Forbidden,
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Reservation(ReservationError),
    Internal(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "Invalid email or credential"),
            Self::Unauthorized => write!(f, "Authentication required"),
            Self::Forbidden => write!(f, "Not permitted for this user"),
            Self::BadRequest(msg) => write!(f, "{msg}"),
            Self::NotFound(msg) => write!(f, "{msg}"),
            Self::Conflict(msg) => write!(f, "{msg}"),
            Self::Reservation(e) => write!(f, "{e}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
            Self::Database(e) => write!(f, "Database error: {e}"),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Reservation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) | Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("{self}");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), "{message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        Self::Database(e)
    }
}

/// Malformed or mistyped bodies are validation failures like any other.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<ReservationError> for AppError {
    fn from(e: ReservationError) -> Self {
        Self::Reservation(e)
    }
}

/// Turns constraint violations into client errors: unique violations become
/// `Conflict` keyed by constraint name, foreign key and check violations
/// become `BadRequest`. Anything else stays a database error.
pub fn map_constraint_violation(e: sqlx::Error) -> AppError {
    let sqlx::Error::Database(db_err) = &e else {
        return AppError::Database(e);
    };

    if db_err.is_unique_violation() {
        let message = match db_err.constraint() {
            Some("users_email_key") => "Email already registered",
            Some("users_tax_id_key") => "Tax ID already registered",
            Some("invited_token_key") => "Invite token collision, please retry",
            _ => "Duplicate value",
        };
        return AppError::Conflict(message.into());
    }
    if db_err.is_foreign_key_violation() {
        return AppError::BadRequest("Referenced user does not exist".into());
    }
    if db_err.is_check_violation() {
        return AppError::BadRequest(format!("Invalid value: {}", db_err.message()));
    }
    AppError::Database(e)
}
