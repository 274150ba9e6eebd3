pub mod jwt;
pub mod middleware;
pub mod password;

use sqlx::PgPool;

use crate::db;
use crate::error::AppError;
use crate::models::user::{NewUser, RegisterRequest, User};

/// Validates a registration, hashes its credential and stores the user.
pub async fn register(pool: &PgPool, req: RegisterRequest) -> Result<User, AppError> {
    let req = req.normalized().map_err(AppError::BadRequest)?;
    password::check_strength(&req.credential)?;

    let new_user = NewUser {
        password_hash: password::hash_credential(&req.credential)?,
        full_name: req.full_name,
        tax_id: req.tax_id,
        email: req.email,
        phone: req.phone,
        push_token: req.push_token,
    };

    let user = db::users::insert(pool, &new_user).await?;
    tracing::info!(user_id = user.id, "user registered");
    Ok(user)
}
