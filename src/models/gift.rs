use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Gift {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub link: Option<String>,
    pub max_reservations: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reservation {
    pub id: i64,
    pub gift_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A gift together with every reservation held on it.
#[derive(Debug, Clone, Serialize)]
pub struct GiftView {
    #[serde(flatten)]
    pub gift: Gift,
    pub reservations: Vec<Reservation>,
}

impl GiftView {
    pub fn reserved(&self) -> i64 {
        self.reservations.len() as i64
    }

    pub fn remaining(&self) -> i64 {
        (i64::from(self.gift.max_reservations) - self.reserved()).max(0)
    }

    pub fn is_available(&self) -> bool {
        self.remaining() > 0
    }
}

/// What a guest sees of a gift: capacity, never who reserved it.
#[derive(Debug, Clone, Serialize)]
pub struct PublicGift {
    pub id: i64,
    pub name: String,
    pub link: Option<String>,
    pub max_reservations: i32,
    pub reserved: i64,
    pub remaining: i64,
}

impl From<&GiftView> for PublicGift {
    fn from(view: &GiftView) -> Self {
        Self {
            id: view.gift.id,
            name: view.gift.name.clone(),
            link: view.gift.link.clone(),
            max_reservations: view.gift.max_reservations,
            reserved: view.reserved(),
            remaining: view.remaining(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewGift {
    pub name: String,
    pub link: Option<String>,
    /// Accepts a number or a numeric string.
    #[serde(default)]
    pub max_reservations: Option<Value>,
}

impl NewGift {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Gift name is required".into());
        }
        Ok(())
    }

    pub fn link(&self) -> Option<String> {
        self.link
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }

    pub fn max_reservations(&self) -> i32 {
        resolve_max_reservations(self.max_reservations.as_ref())
    }
}

/// Missing, non-positive or unparseable capacities all become 1.
pub fn resolve_max_reservations(raw: Option<&Value>) -> i32 {
    let parsed = match raw {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };

    match parsed {
        Some(n) if n > 0 => i32::try_from(n).unwrap_or(i32::MAX),
        _ => 1,
    }
}

#[derive(Debug, Deserialize)]
pub struct ReserveGiftRequest {
    pub event_gift_id: i64,
    pub user_id: Option<i64>,
}
