//! Role-sensitive read and update of user profile records.
//!
//! Built on top of the authentication middleware: every caller here has
//! already been resolved to a stored user.

use crate::api::profile::models::{PublicProfile, UpdateProfileRequest};
use crate::database::models::User;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use sqlx::SqlitePool;
use validator::Validate;

pub struct ProfileService<'a> {
    /// Shared database connection pool
    pool: &'a SqlitePool,
}

impl<'a> ProfileService<'a> {
    /// Creates a new ProfileService instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// The acting user's own profile, public-shaped.
    ///
    /// The view carries neither the password hash nor the role, even though
    /// the viewer is the subject.
    pub async fn get_own_profile(&self, user_id: &str) -> ServiceResult<PublicProfile> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        Ok(PublicProfile::from(user))
    }

    /// The acting user's full record, including the role field.
    ///
    /// Route-level authorization restricts this to admins; the record type
    /// itself keeps the password hash out of the serialized form.
    pub async fn get_own_admin_profile(&self, user_id: &str) -> ServiceResult<User> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        Ok(user)
    }

    /// Partial update of the acting user's mutable profile fields.
    ///
    /// Supplied fields overwrite, unsupplied fields retain their prior
    /// value. Role and email are not reachable through this path.
    pub async fn update_own_profile(
        &self,
        user_id: &str,
        update: UpdateProfileRequest,
    ) -> ServiceResult<PublicProfile> {
        if let Err(validation_errors) = update.validate() {
            let error_messages: Vec<String> = validation_errors
                .field_errors()
                .into_iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |error| {
                        format!(
                            "{}: {}",
                            field,
                            error.message.as_ref().unwrap_or(&"Invalid value".into())
                        )
                    })
                })
                .collect();
            return Err(ServiceError::validation(error_messages.join(", ")));
        }

        let repo = UserRepository::new(self.pool);
        let current = repo
            .get_user_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        let name = update.name.or(current.name);
        let bio = update.bio.unwrap_or(current.bio);
        let phone = update.phone.unwrap_or(current.phone);
        let profile_picture_url = update.profile_picture_url.unwrap_or(current.profile_picture_url);
        let is_public = update.is_public.unwrap_or(current.is_public);

        let updated = repo
            .update_profile(
                user_id,
                name.as_deref(),
                &bio,
                &phone,
                &profile_picture_url,
                is_public,
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id))?;

        Ok(PublicProfile::from(updated))
    }

    /// All profiles visible to the acting user.
    ///
    /// Admins see every record; everyone else only sees public profiles.
    /// The password hash is excluded from serialization either way.
    pub async fn list_profiles(&self, acting_user: &User) -> ServiceResult<Vec<User>> {
        let repo = UserRepository::new(self.pool);
        let users = if acting_user.is_admin() {
            repo.list_users().await?
        } else {
            repo.list_public_users().await?
        };

        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{CreateUser, UserRole};
    use crate::database::test_util::memory_pool;
    use uuid::Uuid;

    async fn seed_user(pool: &SqlitePool, email: &str) -> User {
        UserRepository::new(pool)
            .create_user(CreateUser {
                id: Uuid::now_v7().to_string(),
                email: email.to_string(),
                password_hash: Some("$2b$12$hash".to_string()),
                name: Some("Seed".to_string()),
            })
            .await
            .expect("seed user")
    }

    async fn promote_to_admin(pool: &SqlitePool, id: &str) {
        sqlx::query("UPDATE users SET role = 'admin' WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await
            .expect("promote");
    }

    #[tokio::test]
    async fn own_profile_is_public_shaped() {
        let pool = memory_pool().await;
        let user = seed_user(&pool, "a@x.com").await;

        let profile = ProfileService::new(&pool)
            .get_own_profile(&user.id)
            .await
            .expect("profile");
        assert_eq!(profile.email, "a@x.com");

        let json = serde_json::to_value(&profile).expect("serialize");
        let object = json.as_object().expect("object");
        assert!(!object.contains_key("role"));
        assert!(!object.contains_key("passwordHash"));
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let pool = memory_pool().await;
        let err = ProfileService::new(&pool)
            .get_own_profile("no-such-id")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { .. }));
    }

    #[tokio::test]
    async fn partial_update_retains_unsupplied_fields() {
        let pool = memory_pool().await;
        let user = seed_user(&pool, "a@x.com").await;

        let update = UpdateProfileRequest {
            bio: Some("hello".to_string()),
            is_public: Some(false),
            ..Default::default()
        };
        let profile = ProfileService::new(&pool)
            .update_own_profile(&user.id, update)
            .await
            .expect("update");

        assert_eq!(profile.bio, "hello");
        assert!(!profile.is_public);
        assert_eq!(profile.name.as_deref(), Some("Seed"));
        assert_eq!(profile.phone, " ");
    }

    #[tokio::test]
    async fn update_with_role_field_has_no_effect_on_stored_role() {
        let pool = memory_pool().await;
        let user = seed_user(&pool, "a@x.com").await;

        // A client smuggling a role into the update payload: the field is
        // not part of the request type and is dropped on deserialization.
        let update: UpdateProfileRequest = serde_json::from_value(serde_json::json!({
            "name": "Renamed",
            "role": "admin",
            "email": "other@x.com"
        }))
        .expect("deserialize");

        ProfileService::new(&pool)
            .update_own_profile(&user.id, update)
            .await
            .expect("update");

        let stored = UserRepository::new(&pool)
            .get_user_by_id(&user.id)
            .await
            .expect("query")
            .expect("found");
        assert_eq!(stored.role, UserRole::User);
        assert_eq!(stored.email, "a@x.com");
        assert_eq!(stored.name.as_deref(), Some("Renamed"));
    }

    #[tokio::test]
    async fn listing_is_role_gated() {
        let pool = memory_pool().await;
        let admin = seed_user(&pool, "admin@x.com").await;
        promote_to_admin(&pool, &admin.id).await;
        let visible = seed_user(&pool, "pub@x.com").await;
        let hidden = seed_user(&pool, "priv@x.com").await;

        let service = ProfileService::new(&pool);
        service
            .update_own_profile(
                &hidden.id,
                UpdateProfileRequest {
                    is_public: Some(false),
                    ..Default::default()
                },
            )
            .await
            .expect("hide");

        let admin = UserRepository::new(&pool)
            .get_user_by_id(&admin.id)
            .await
            .expect("query")
            .expect("found");
        let all = service.list_profiles(&admin).await.expect("list");
        assert_eq!(all.len(), 3);

        let seen_by_user = service.list_profiles(&visible).await.expect("list");
        assert_eq!(seen_by_user.len(), 2);
        assert!(seen_by_user.iter().all(|u| u.is_public));
    }
}
