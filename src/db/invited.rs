use chrono::Utc;
use sqlx::{PgExecutor, PgPool};

use crate::error::{map_constraint_violation, AppError};
use crate::models::invited::{Invited, NewInvited};

const INVITED_COLUMNS: &str =
    "id, event_id, user_id, name, token, accepted, responded_at, created_at, updated_at";

pub async fn insert<'e>(
    db: impl PgExecutor<'e>,
    event_id: i64,
    guest: &NewInvited,
    token: &str,
) -> Result<Invited, AppError> {
    sqlx::query_as::<_, Invited>(&format!(
        "INSERT INTO invited (event_id, user_id, name, token)
         VALUES ($1, $2, $3, $4)
         RETURNING {INVITED_COLUMNS}"
    ))
    .bind(event_id)
    .bind(guest.user_id)
    .bind(guest.name.trim())
    .bind(token)
    .fetch_one(db)
    .await
    .map_err(map_constraint_violation)
}

pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Invited>, AppError> {
    let invite = sqlx::query_as::<_, Invited>(&format!(
        "SELECT {INVITED_COLUMNS} FROM invited WHERE token = $1"
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(invite)
}

/// Records the guest's answer, replacing any earlier one.
pub async fn respond(
    pool: &PgPool,
    token: &str,
    accepted: bool,
) -> Result<Option<Invited>, AppError> {
    let invite = sqlx::query_as::<_, Invited>(&format!(
        "UPDATE invited SET accepted = $1, responded_at = $2, updated_at = now()
         WHERE token = $3
         RETURNING {INVITED_COLUMNS}"
    ))
    .bind(accepted)
    .bind(Utc::now())
    .bind(token)
    .fetch_optional(pool)
    .await?;
    Ok(invite)
}

pub async fn delete(pool: &PgPool, event_id: i64, invite_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM invited WHERE id = $1 AND event_id = $2")
        .bind(invite_id)
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
