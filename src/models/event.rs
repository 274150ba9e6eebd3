use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

use super::gift::{GiftView, NewGift, PublicGift};
use super::invited::{GuestSummary, Invited, NewInvited};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Boy,
    Girl,
    #[default]
    NotDefined,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: i64,
    pub owner_id: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub title: String,
    pub description: Option<String>,
    pub pix_key: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An event with guests and gifts eagerly loaded.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub invited: Vec<Invited>,
    pub gifts: Vec<GiftView>,
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub events: Vec<EventView>,
}

/// The event as seen through an invite token: no guest list, no owner, and
/// only gifts that can still be reserved.
#[derive(Debug, Serialize)]
pub struct PublicEventView {
    pub id: i64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub title: String,
    pub description: Option<String>,
    pub pix_key: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub address: String,
    pub guest: GuestSummary,
    pub gifts: Vec<PublicGift>,
}

impl PublicEventView {
    pub fn for_guest(view: &EventView, guest: &Invited) -> Self {
        let event = &view.event;
        Self {
            id: event.id,
            event_type: event.event_type,
            title: event.title.clone(),
            description: event.description.clone(),
            pix_key: event.pix_key.clone(),
            starts_at: event.starts_at,
            ends_at: event.ends_at,
            address: event.address.clone(),
            guest: GuestSummary::from(guest),
            gifts: view
                .gifts
                .iter()
                .filter(|g| g.is_available())
                .map(PublicGift::from)
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    pub title: String,
    pub description: Option<String>,
    pub pix_key: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub address: String,
    #[serde(default)]
    pub invited: Vec<NewInvited>,
    #[serde(default)]
    pub gifts: Vec<NewGift>,
}

impl CreateEventRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title is required".into());
        }
        if self.address.trim().is_empty() {
            return Err("Address is required".into());
        }
        check_window(self.starts_at, self.ends_at)?;
        for guest in &self.invited {
            guest.validate()?;
        }
        for gift in &self.gifts {
            gift.validate()?;
        }
        Ok(())
    }
}

/// Partial update. Absent fields keep their value; nullable fields can be
/// cleared with an explicit `null`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateEventRequest {
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub pix_key: Option<Option<String>>,
    pub starts_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "nullable")]
    pub ends_at: Option<Option<DateTime<Utc>>>,
    pub address: Option<String>,
}

impl UpdateEventRequest {
    /// Validates the request against the event it would modify.
    pub fn validate_against(&self, current: &Event) -> Result<(), String> {
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err("Title cannot be empty".into());
        }
        if self.address.as_deref().is_some_and(|a| a.trim().is_empty()) {
            return Err("Address cannot be empty".into());
        }
        let starts_at = self.starts_at.unwrap_or(current.starts_at);
        let ends_at = match self.ends_at {
            Some(value) => value,
            None => current.ends_at,
        };
        check_window(starts_at, ends_at)
    }
}

fn check_window(starts_at: DateTime<Utc>, ends_at: Option<DateTime<Utc>>) -> Result<(), String> {
    match ends_at {
        Some(end) if end < starts_at => Err("Event cannot end before it starts".into()),
        _ => Ok(()),
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Blank strings are stored as NULL.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::gift::{Gift, Reservation};
    use chrono::Duration;
    use serde_json::json;

    fn event() -> Event {
        let now = Utc::now();
        Event {
            id: 7,
            owner_id: 1,
            event_type: EventType::Girl,
            title: "Chá da Ana".into(),
            description: None,
            pix_key: Some("ana@pix".into()),
            starts_at: now,
            ends_at: Some(now + Duration::hours(3)),
            address: "Rua A, 1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn guest(id: i64, name: &str) -> Invited {
        let now = Utc::now();
        Invited {
            id,
            event_id: 7,
            user_id: None,
            name: name.into(),
            token: format!("token-{id}"),
            accepted: None,
            responded_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn gift(id: i64, max: i32, reserved: i64) -> GiftView {
        let now = Utc::now();
        GiftView {
            gift: Gift {
                id,
                event_id: 7,
                name: format!("gift-{id}"),
                link: None,
                max_reservations: max,
                created_at: now,
            },
            reservations: (0..reserved)
                .map(|u| Reservation {
                    id: id * 100 + u,
                    gift_id: id,
                    user_id: u,
                    created_at: now,
                })
                .collect(),
        }
    }

    #[test]
    fn event_type_uses_snake_case() {
        assert_eq!(serde_json::to_value(EventType::NotDefined).unwrap(), "not_defined");
        let parsed: EventType = serde_json::from_value(json!("boy")).unwrap();
        assert_eq!(parsed, EventType::Boy);
    }

    #[test]
    fn public_view_filters_full_gifts_and_hides_guests() {
        let view = EventView {
            event: event(),
            invited: vec![guest(1, "Bia"), guest(2, "Caio")],
            gifts: vec![gift(1, 1, 1), gift(2, 2, 1), gift(3, 1, 0)],
        };

        let public = PublicEventView::for_guest(&view, &view.invited[0]);
        let ids: Vec<i64> = public.gifts.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![2, 3]);

        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("invited").is_none());
        assert!(json.get("owner_id").is_none());
        assert_eq!(json["guest"]["name"], "Bia");
        assert!(json["guest"].get("token").is_none());
        assert_eq!(json["type"], "girl");
    }

    #[test]
    fn single_views_are_bare_and_lists_are_wrapped() {
        let view = EventView {
            event: event(),
            invited: vec![guest(1, "Bia")],
            gifts: vec![gift(1, 2, 1)],
        };

        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("event").is_none());
        assert_eq!(json["id"], 7);
        assert_eq!(json["title"], "Chá da Ana");
        assert_eq!(json["invited"][0]["token"], "token-1");
        assert_eq!(json["gifts"][0]["reservations"].as_array().unwrap().len(), 1);

        let listed = serde_json::to_value(EventListResponse { events: vec![view] }).unwrap();
        assert_eq!(listed["events"].as_array().unwrap().len(), 1);
        assert_eq!(listed["events"][0]["id"], 7);
    }

    #[test]
    fn create_request_defaults() {
        let req: CreateEventRequest = serde_json::from_value(json!({
            "title": "Chá",
            "starts_at": "2026-11-01T15:00:00Z",
            "address": "Rua B, 2"
        }))
        .unwrap();
        assert_eq!(req.event_type, EventType::NotDefined);
        assert!(req.invited.is_empty());
        assert!(req.gifts.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rejects_inverted_window() {
        let req: CreateEventRequest = serde_json::from_value(json!({
            "type": "boy",
            "title": "Chá",
            "starts_at": "2026-11-01T15:00:00Z",
            "ends_at": "2026-11-01T14:00:00Z",
            "address": "Rua B, 2"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn create_request_rejects_nameless_guest() {
        let req: CreateEventRequest = serde_json::from_value(json!({
            "title": "Chá",
            "starts_at": "2026-11-01T15:00:00Z",
            "address": "Rua B, 2",
            "invited": [{ "name": " " }]
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_distinguishes_null_from_absent() {
        let req: UpdateEventRequest =
            serde_json::from_value(json!({ "description": null })).unwrap();
        assert_eq!(req.description, Some(None));
        assert_eq!(req.pix_key, None);
        assert_eq!(req.ends_at, None);
    }

    #[test]
    fn update_window_is_checked_against_current_event() {
        let current = event();
        let req = UpdateEventRequest {
            starts_at: Some(current.ends_at.unwrap() + Duration::hours(1)),
            ..Default::default()
        };
        assert!(req.validate_against(&current).is_err());

        let req = UpdateEventRequest {
            starts_at: Some(current.ends_at.unwrap() + Duration::hours(1)),
            ends_at: Some(None),
            ..Default::default()
        };
        assert!(req.validate_against(&current).is_ok());
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank(Some("  x ".into())), Some("x".into()));
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(None), None);
    }
}
