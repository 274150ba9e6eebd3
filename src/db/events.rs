use std::collections::HashMap;

use sqlx::{PgExecutor, PgPool};

use crate::error::{map_constraint_violation, AppError};
use crate::invite_token;
use crate::models::event::{non_blank, CreateEventRequest, Event, EventView, UpdateEventRequest};
use crate::models::gift::{Gift, GiftView, Reservation};
use crate::models::invited::Invited;

use super::{gifts, invited};

const EVENT_COLUMNS: &str = "id, owner_id, event_type, title, description, pix_key, \
     starts_at, ends_at, address, created_at, updated_at";

pub async fn fetch<'e>(db: impl PgExecutor<'e>, id: i64) -> Result<Option<Event>, AppError> {
    let event = sqlx::query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(event)
}

/// Loads an event and checks that `user_id` owns it.
pub async fn fetch_owned(pool: &PgPool, id: i64, user_id: i64) -> Result<Event, AppError> {
    let event = fetch(pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    if event.owner_id != user_id {
        tracing::warn!(event_id = id, user_id, owner_id = event.owner_id, "ownership check failed");
        return Err(AppError::Forbidden);
    }
    Ok(event)
}

pub async fn list_by_owner(pool: &PgPool, owner_id: i64) -> Result<Vec<Event>, AppError> {
    let events = sqlx::query_as::<_, Event>(&format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE owner_id = $1 ORDER BY starts_at, id"
    ))
    .bind(owner_id)
    .fetch_all(pool)
    .await?;
    Ok(events)
}

/// Attaches guests, gifts and reservations to each event with one query per
/// table.
pub async fn load_views(pool: &PgPool, events: Vec<Event>) -> Result<Vec<EventView>, AppError> {
    if events.is_empty() {
        return Ok(vec![]);
    }

    let event_ids: Vec<i64> = events.iter().map(|e| e.id).collect();

    let guests = sqlx::query_as::<_, Invited>(
        "SELECT id, event_id, user_id, name, token, accepted, responded_at, created_at, updated_at
         FROM invited WHERE event_id = ANY($1) ORDER BY id",
    )
    .bind(&event_ids)
    .fetch_all(pool)
    .await?;

    let gift_rows = sqlx::query_as::<_, Gift>(
        "SELECT id, event_id, name, link, max_reservations, created_at
         FROM gifts WHERE event_id = ANY($1) ORDER BY id",
    )
    .bind(&event_ids)
    .fetch_all(pool)
    .await?;

    let gift_ids: Vec<i64> = gift_rows.iter().map(|g| g.id).collect();
    let reservations = if gift_ids.is_empty() {
        vec![]
    } else {
        sqlx::query_as::<_, Reservation>(
            "SELECT id, gift_id, user_id, created_at
             FROM reservations WHERE gift_id = ANY($1) ORDER BY id",
        )
        .bind(&gift_ids)
        .fetch_all(pool)
        .await?
    };

    Ok(assemble(events, guests, gift_rows, reservations))
}

pub async fn load_view(pool: &PgPool, event: Event) -> Result<EventView, AppError> {
    load_views(pool, vec![event])
        .await?
        .pop()
        .ok_or_else(|| AppError::Internal("event vanished while loading".into()))
}

fn assemble(
    events: Vec<Event>,
    guests: Vec<Invited>,
    gift_rows: Vec<Gift>,
    reservations: Vec<Reservation>,
) -> Vec<EventView> {
    let mut reservations_by_gift: HashMap<i64, Vec<Reservation>> = HashMap::new();
    for r in reservations {
        reservations_by_gift.entry(r.gift_id).or_default().push(r);
    }

    let mut gifts_by_event: HashMap<i64, Vec<GiftView>> = HashMap::new();
    for gift in gift_rows {
        let reservations = reservations_by_gift.remove(&gift.id).unwrap_or_default();
        gifts_by_event
            .entry(gift.event_id)
            .or_default()
            .push(GiftView { gift, reservations });
    }

    let mut guests_by_event: HashMap<i64, Vec<Invited>> = HashMap::new();
    for guest in guests {
        guests_by_event.entry(guest.event_id).or_default().push(guest);
    }

    events
        .into_iter()
        .map(|event| EventView {
            invited: guests_by_event.remove(&event.id).unwrap_or_default(),
            gifts: gifts_by_event.remove(&event.id).unwrap_or_default(),
            event,
        })
        .collect()
}

/// Inserts the event with all of its guests and gifts in one transaction.
pub async fn create_with_children(
    pool: &PgPool,
    owner_id: i64,
    req: CreateEventRequest,
) -> Result<Event, AppError> {
    let mut tx = pool.begin().await?;

    let event = sqlx::query_as::<_, Event>(&format!(
        "INSERT INTO events (owner_id, event_type, title, description, pix_key, starts_at, ends_at, address)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(owner_id)
    .bind(req.event_type)
    .bind(req.title.trim())
    .bind(non_blank(req.description))
    .bind(non_blank(req.pix_key))
    .bind(req.starts_at)
    .bind(req.ends_at)
    .bind(req.address.trim())
    .fetch_one(&mut *tx)
    .await
    .map_err(map_constraint_violation)?;

    for guest in &req.invited {
        let token = invite_token::new_invite_token();
        invited::insert(&mut *tx, event.id, guest, &token).await?;
    }

    for gift in &req.gifts {
        gifts::insert(&mut *tx, event.id, gift).await?;
    }

    tx.commit().await?;

    tracing::info!(
        event_id = event.id,
        owner_id,
        guests = req.invited.len(),
        gifts = req.gifts.len(),
        "event created"
    );
    Ok(event)
}

pub async fn update(pool: &PgPool, id: i64, req: UpdateEventRequest) -> Result<Event, AppError> {
    let has_description = req.description.is_some();
    let has_pix_key = req.pix_key.is_some();
    let has_ends_at = req.ends_at.is_some();

    let event = sqlx::query_as::<_, Event>(&format!(
        "UPDATE events SET
           event_type = COALESCE($1, event_type),
           title = COALESCE($2, title),
           description = CASE WHEN $3 THEN $4 ELSE description END,
           pix_key = CASE WHEN $5 THEN $6 ELSE pix_key END,
           starts_at = COALESCE($7, starts_at),
           ends_at = CASE WHEN $8 THEN $9 ELSE ends_at END,
           address = COALESCE($10, address),
           updated_at = now()
         WHERE id = $11
         RETURNING {EVENT_COLUMNS}"
    ))
    .bind(req.event_type)
    .bind(req.title.map(|t| t.trim().to_string()))
    .bind(has_description)
    .bind(non_blank(req.description.flatten()))
    .bind(has_pix_key)
    .bind(non_blank(req.pix_key.flatten()))
    .bind(req.starts_at)
    .bind(has_ends_at)
    .bind(req.ends_at.flatten())
    .bind(req.address.map(|a| a.trim().to_string()))
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(map_constraint_violation)?
    .ok_or_else(|| AppError::NotFound("Event not found".into()))?;

    Ok(event)
}

/// Guests, gifts and reservations go with the event through `ON DELETE CASCADE`.
pub async fn delete(pool: &PgPool, id: i64) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Event not found".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventType;
    use chrono::Utc;

    fn event(id: i64) -> Event {
        let now = Utc::now();
        Event {
            id,
            owner_id: 1,
            event_type: EventType::Boy,
            title: format!("event-{id}"),
            description: None,
            pix_key: None,
            starts_at: now,
            ends_at: None,
            address: "Rua C".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn gift(id: i64, event_id: i64) -> Gift {
        Gift {
            id,
            event_id,
            name: format!("gift-{id}"),
            link: None,
            max_reservations: 2,
            created_at: Utc::now(),
        }
    }

    fn reservation(id: i64, gift_id: i64) -> Reservation {
        Reservation {
            id,
            gift_id,
            user_id: id,
            created_at: Utc::now(),
        }
    }

    fn guest(id: i64, event_id: i64) -> Invited {
        let now = Utc::now();
        Invited {
            id,
            event_id,
            user_id: None,
            name: format!("guest-{id}"),
            token: format!("tok-{id}"),
            accepted: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn assemble_groups_children_under_their_parents() {
        let views = assemble(
            vec![event(1), event(2)],
            vec![guest(10, 1), guest(11, 2), guest(12, 1)],
            vec![gift(20, 2), gift(21, 1)],
            vec![reservation(30, 20), reservation(31, 20), reservation(32, 21)],
        );

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].event.id, 1);
        assert_eq!(views[0].invited.iter().map(|g| g.id).collect::<Vec<_>>(), vec![10, 12]);
        assert_eq!(views[0].gifts.len(), 1);
        assert_eq!(views[0].gifts[0].reservations.len(), 1);

        assert_eq!(views[1].invited.len(), 1);
        assert_eq!(views[1].gifts[0].gift.id, 20);
        assert_eq!(views[1].gifts[0].reservations.len(), 2);
    }

    #[test]
    fn assemble_keeps_childless_events() {
        let views = assemble(vec![event(5)], vec![], vec![], vec![]);
        assert_eq!(views.len(), 1);
        assert!(views[0].invited.is_empty());
        assert!(views[0].gifts.is_empty());
    }
}
