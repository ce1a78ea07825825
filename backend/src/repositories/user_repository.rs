//! Database repository for user management operations.
//!
//! Provides CRUD operations for user records keyed by id and by unique email.

use crate::database::models::{CreateUser, User};
use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;

/// Repository for user database operations.
///
/// Handles all persistence operations for the User entity. Single-record
/// create/read/update atomicity is provided by the store itself.
pub struct UserRepository<'a> {
    /// Shared SQLite connection pool
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Creates a new UserRepository instance.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a new user in the database.
    ///
    /// # Arguments
    /// * `user` - CreateUser DTO containing user details
    ///
    /// # Returns
    /// The newly created User with all fields populated
    ///
    /// The unique index on `email` rejects a duplicate insert even when the
    /// caller's existence check raced another registration.
    pub async fn create_user(&self, user: CreateUser) -> Result<User> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (id, email, password_hash, name, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) \
             RETURNING *",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(created)
    }

    /// Retrieves a user by their unique identifier.
    ///
    /// # Arguments
    /// * `id` - User ID (UUID format)
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Retrieves a user by their email.
    ///
    /// # Arguments
    /// * `email` - Email to search for
    ///
    /// # Returns
    /// `Some(User)` if found, `None` otherwise
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;

        Ok(user)
    }

    /// Checks if an email already exists in the system.
    ///
    /// # Arguments
    /// * `email` - Email to check
    ///
    /// # Returns
    /// `true` if a user with this email exists
    pub async fn email_exists(&self, email: &str) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(self.pool)
            .await?;

        Ok(count > 0)
    }

    /// Overwrites the mutable profile fields of a user.
    ///
    /// Callers resolve partial updates against the current record first;
    /// this writes final values. Role, email, and password are not
    /// reachable through this statement.
    pub async fn update_profile(
        &self,
        id: &str,
        name: Option<&str>,
        bio: &str,
        phone: &str,
        profile_picture_url: &str,
        is_public: bool,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET name = ?, bio = ?, phone = ?, profile_picture_url = ?, \
             is_public = ?, updated_at = ? WHERE id = ? \
             RETURNING *",
        )
        .bind(name)
        .bind(bio)
        .bind(phone)
        .bind(profile_picture_url)
        .bind(is_public)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Retrieves all users, oldest first.
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
            .fetch_all(self.pool)
            .await?;

        Ok(users)
    }

    /// Retrieves only users whose profile is public, oldest first.
    pub async fn list_public_users(&self) -> Result<Vec<User>> {
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE is_public = 1 ORDER BY id")
                .fetch_all(self.pool)
                .await?;

        Ok(users)
    }
}
