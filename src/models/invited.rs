use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Invited {
    pub id: i64,
    pub event_id: i64,
    pub user_id: Option<i64>,
    pub name: String,
    pub token: String,
    pub accepted: Option<bool>,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct NewInvited {
    pub user_id: Option<i64>,
    pub name: String,
}

impl NewInvited {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Guest name is required".into());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct RespondInviteRequest {
    pub accepted: bool,
}

/// The resolving guest's own invite, without the token.
#[derive(Debug, Serialize)]
pub struct GuestSummary {
    pub name: String,
    pub accepted: Option<bool>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl From<&Invited> for GuestSummary {
    fn from(inv: &Invited) -> Self {
        Self {
            name: inv.name.clone(),
            accepted: inv.accepted,
            responded_at: inv.responded_at,
        }
    }
}
