use sqlx::PgPool;

use crate::error::{map_constraint_violation, AppError};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str =
    "id, full_name, tax_id, email, phone, password_hash, push_token, created_at, updated_at";

pub async fn insert(pool: &PgPool, user: &NewUser) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (full_name, tax_id, email, phone, password_hash, push_token)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING {USER_COLUMNS}"
    ))
    .bind(&user.full_name)
    .bind(&user.tax_id)
    .bind(&user.email)
    .bind(&user.phone)
    .bind(&user.password_hash)
    .bind(&user.push_token)
    .fetch_one(pool)
    .await
    .map_err(map_constraint_violation)
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, AppError> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn update_password_hash(pool: &PgPool, id: i64, hash: &str) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET password_hash = $1, updated_at = now()
         WHERE id = $2
         RETURNING {USER_COLUMNS}"
    ))
    .bind(hash)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))
}

pub async fn set_push_token(
    pool: &PgPool,
    id: i64,
    push_token: Option<&str>,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET push_token = $1, updated_at = now()
         WHERE id = $2
         RETURNING {USER_COLUMNS}"
    ))
    .bind(push_token)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".into()))
}
