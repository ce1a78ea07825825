//! Request and response shapes for the profile endpoints.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::models::User;

/// Public-shaped profile view.
///
/// Deliberately omits the role field in addition to the password hash;
/// this is the view every user gets of their own record.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: String,
    pub bio: String,
    pub phone: String,
    pub profile_picture_url: String,
    pub is_public: bool,
}

impl From<User> for PublicProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            bio: user.bio,
            phone: user.phone,
            profile_picture_url: user.profile_picture_url,
            is_public: user.is_public,
        }
    }
}

/// Partial profile update payload.
///
/// Only the mutable profile fields exist here; role, email, and password
/// cannot be expressed in this request at all.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(max = 255, message = "Name too long"))]
    pub name: Option<String>,

    pub bio: Option<String>,

    #[validate(length(max = 32, message = "Phone number too long"))]
    pub phone: Option<String>,

    pub profile_picture_url: Option<String>,

    pub is_public: Option<bool>,
}
