use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub push_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub full_name: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub has_push_token: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            tax_id: u.tax_id,
            email: u.email,
            phone: u.phone,
            has_push_token: u.push_token.is_some(),
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    #[serde(alias = "password")]
    pub credential: String,
    pub push_token: Option<String>,
}

/// A registration that passed validation, with the credential already hashed.
#[derive(Debug)]
pub struct NewUser {
    pub full_name: String,
    pub tax_id: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub push_token: Option<String>,
}

impl RegisterRequest {
    /// Trims every field, lowercases the email and keeps only the digits of
    /// the tax ID.
    pub fn normalized(self) -> Result<Self, String> {
        let full_name = self.full_name.trim().to_string();
        let email = self.email.trim().to_lowercase();
        let phone = self.phone.trim().to_string();
        let tax_id: String = self.tax_id.chars().filter(char::is_ascii_digit).collect();
        let push_token = self
            .push_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        if full_name.is_empty() {
            return Err("Full name is required".into());
        }
        if !is_plausible_email(&email) {
            return Err("A valid email is required".into());
        }
        if tax_id.is_empty() {
            return Err("Tax ID must contain digits".into());
        }
        if phone.is_empty() {
            return Err("Phone is required".into());
        }

        Ok(Self {
            full_name,
            tax_id,
            email,
            phone,
            credential: self.credential,
            push_token,
        })
    }
}

pub fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(alias = "password")]
    pub credential: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeCredentialRequest {
    pub current_credential: String,
    pub new_credential: String,
}

#[derive(Debug, Deserialize)]
pub struct PushTokenRequest {
    pub push_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            full_name: "  Maria Silva ".into(),
            tax_id: "123.456.789-09".into(),
            email: " Maria@Example.COM ".into(),
            phone: " +55 11 99999-0000 ".into(),
            credential: "hunter22hunter".into(),
            push_token: Some("   ".into()),
        }
    }

    #[test]
    fn normalization_cleans_fields() {
        let r = request().normalized().unwrap();
        assert_eq!(r.full_name, "Maria Silva");
        assert_eq!(r.tax_id, "12345678909");
        assert_eq!(r.email, "maria@example.com");
        assert_eq!(r.phone, "+55 11 99999-0000");
        assert_eq!(r.push_token, None);
    }

    #[test]
    fn normalization_rejects_missing_fields() {
        let mut r = request();
        r.full_name = " ".into();
        assert!(r.normalized().is_err());

        let mut r = request();
        r.tax_id = "abc".into();
        assert!(r.normalized().is_err());

        let mut r = request();
        r.email = "nobody".into();
        assert!(r.normalized().is_err());
    }

    #[test]
    fn email_plausibility() {
        assert!(is_plausible_email("a@b.co"));
        assert!(!is_plausible_email("@b.co"));
        assert!(!is_plausible_email("a@localhost"));
        assert!(!is_plausible_email("a@.com"));
    }

    #[test]
    fn password_is_accepted_as_credential_alias() {
        let login: LoginRequest =
            serde_json::from_str(r#"{"email":"a@b.co","password":"secret"}"#).unwrap();
        assert_eq!(login.credential, "secret");
    }

    #[test]
    fn response_carries_timestamps_but_no_secrets() {
        let created_at = DateTime::parse_from_rfc3339("2026-01-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339("2026-02-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let user = User {
            id: 3,
            full_name: "Maria Silva".into(),
            tax_id: "12345678909".into(),
            email: "maria@example.com".into(),
            phone: "11999990000".into(),
            password_hash: "$argon2id$v=19$secret".into(),
            push_token: Some("device".into()),
            created_at,
            updated_at,
        };

        let json = serde_json::to_value(UserResponse::from(user)).unwrap();
        assert_eq!(json["updated_at"], "2026-02-01T10:00:00Z");
        assert_eq!(json["has_push_token"], true);
        assert!(json.get("password_hash").is_none());
        assert!(json.get("push_token").is_none());
    }
}
