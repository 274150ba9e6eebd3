use sqlx::{PgExecutor, PgPool};

use crate::error::{map_constraint_violation, AppError};
use crate::models::gift::{Gift, NewGift};

pub async fn insert<'e>(
    db: impl PgExecutor<'e>,
    event_id: i64,
    gift: &NewGift,
) -> Result<Gift, AppError> {
    sqlx::query_as::<_, Gift>(
        "INSERT INTO gifts (event_id, name, link, max_reservations)
         VALUES ($1, $2, $3, $4)
         RETURNING id, event_id, name, link, max_reservations, created_at",
    )
    .bind(event_id)
    .bind(gift.name.trim())
    .bind(gift.link())
    .bind(gift.max_reservations())
    .fetch_one(db)
    .await
    .map_err(map_constraint_violation)
}

pub async fn delete(pool: &PgPool, event_id: i64, gift_id: i64) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM gifts WHERE id = $1 AND event_id = $2")
        .bind(gift_id)
        .bind(event_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
