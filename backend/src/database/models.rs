//! Rust structs that represent database table mappings.
//!
//! These models define the structure of data as it is stored in and retrieved
//! from the database. Note that these may differ from API-specific models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Role assigned to a user. No exposed endpoint accepts this field, so a
/// user's role never changes through the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// Never serialized into any API response. `None` marks an account
    /// provisioned through the identity provider with no usable password.
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,
    pub name: Option<String>,
    pub bio: String,
    pub phone: String,
    pub profile_picture_url: String,
    pub is_public: bool,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Insert payload for a new user record.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUser {
    #[validate(length(min = 1, message = "User ID is required"))]
    pub id: String,

    #[validate(
        email(message = "Must be a valid email"),
        length(max = 255, message = "Email too long")
    )]
    pub email: String,

    /// `None` for accounts provisioned via third-party login.
    pub password_hash: Option<String>,

    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: "0192aa00-0000-7000-8000-000000000001".to_string(),
            email: "a@x.com".to_string(),
            password_hash: Some("$2b$12$secret".to_string()),
            name: Some("A".to_string()),
            bio: " ".to_string(),
            phone: " ".to_string(),
            profile_picture_url: " ".to_string(),
            is_public: true,
            role: UserRole::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).expect("serialize");
        let object = json.as_object().expect("object");
        assert!(!object.contains_key("passwordHash"));
        assert!(!object.contains_key("password_hash"));
        // The full-record view does include the role.
        assert_eq!(json["role"], "admin");
        assert_eq!(json["profilePictureUrl"], " ");
    }
}
