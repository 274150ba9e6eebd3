//! Gift reservations.
//!
//! A gift never holds more reservations than its `max_reservations`, and a
//! user holds at most one reservation per gift. The check and the insert run
//! in one transaction holding a row lock on the gift, so concurrent attempts
//! on the same gift are serialised. The `(gift_id, user_id)` unique
//! constraint backs the duplicate rule.

use sqlx::PgPool;

use crate::error::AppError;
use crate::models::gift::Reservation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationError {
    CapacityExceeded,
    DuplicateReservation,
}

impl std::fmt::Display for ReservationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded => write!(f, "Reservation limit reached for this gift"),
            Self::DuplicateReservation => write!(f, "User already reserved this gift"),
        }
    }
}

impl std::error::Error for ReservationError {}

/// Decides whether `user_id` may add a reservation given the current holders.
/// A repeat attempt by an existing holder reports the duplicate even when the
/// gift is also full.
pub fn check(
    max_reservations: i32,
    holders: &[i64],
    user_id: i64,
) -> Result<(), ReservationError> {
    if holders.contains(&user_id) {
        return Err(ReservationError::DuplicateReservation);
    }
    if holders.len() as i64 >= i64::from(max_reservations) {
        return Err(ReservationError::CapacityExceeded);
    }
    Ok(())
}

pub async fn reserve_gift(
    pool: &PgPool,
    gift_id: i64,
    user_id: i64,
) -> Result<Reservation, AppError> {
    let mut tx = pool.begin().await?;

    let max_reservations: i32 =
        sqlx::query_scalar("SELECT max_reservations FROM gifts WHERE id = $1 FOR UPDATE")
            .bind(gift_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Gift not found".into()))?;

    let holders: Vec<i64> =
        sqlx::query_scalar("SELECT user_id FROM reservations WHERE gift_id = $1")
            .bind(gift_id)
            .fetch_all(&mut *tx)
            .await?;

    if let Err(e) = check(max_reservations, &holders, user_id) {
        tracing::info!(gift_id, user_id, reason = %e, "reservation refused");
        return Err(e.into());
    }

    let reservation = sqlx::query_as::<_, Reservation>(
        "INSERT INTO reservations (gift_id, user_id)
         VALUES ($1, $2)
         RETURNING id, gift_id, user_id, created_at",
    )
    .bind(gift_id)
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::Reservation(ReservationError::DuplicateReservation)
        }
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::NotFound("User not found".into())
        }
        _ => AppError::Database(e),
    })?;

    tx.commit().await?;

    tracing::info!(gift_id, user_id, reservation_id = reservation.id, "gift reserved");
    Ok(reservation)
}

/// Releases the caller's own reservation on a gift.
pub async fn cancel_reservation(pool: &PgPool, gift_id: i64, user_id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM reservations WHERE gift_id = $1 AND user_id = $2")
        .bind(gift_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Reservation not found".into()));
    }

    tracing::info!(gift_id, user_id, "reservation cancelled");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_reservation_fits() {
        assert_eq!(check(1, &[], 10), Ok(()));
    }

    #[test]
    fn full_gift_refuses_new_user() {
        assert_eq!(check(1, &[10], 11), Err(ReservationError::CapacityExceeded));
        assert_eq!(check(2, &[10, 12], 11), Err(ReservationError::CapacityExceeded));
    }

    #[test]
    fn holder_cannot_reserve_twice() {
        assert_eq!(check(3, &[10], 10), Err(ReservationError::DuplicateReservation));
    }

    #[test]
    fn duplicate_wins_over_capacity() {
        assert_eq!(check(1, &[10], 10), Err(ReservationError::DuplicateReservation));
    }

    #[test]
    fn scenario_single_slot_gift() {
        let mut holders = Vec::new();
        assert!(check(1, &holders, 1).is_ok());
        holders.push(1);
        assert_eq!(check(1, &holders, 1), Err(ReservationError::DuplicateReservation));
        assert_eq!(check(1, &holders, 2), Err(ReservationError::CapacityExceeded));
    }

    #[test]
    fn over_capacity_state_still_refuses() {
        assert_eq!(check(1, &[1, 2], 3), Err(ReservationError::CapacityExceeded));
    }
}
