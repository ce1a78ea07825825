//! Core business logic for the authentication system.

use std::sync::Arc;

use crate::auth::AuthContext;
use crate::auth::models::{LoginRequest, RegisterRequest};
use crate::database::models::CreateUser;
use crate::errors::{ServiceError, ServiceResult};
use crate::repositories::user_repository::UserRepository;
use crate::services::identity_provider::IdentityProvider;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::{hash_password, verify_password};
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

/// Authentication service orchestrating registration, password login, and
/// third-party login.
///
/// Holds no state of its own across requests; the token service and the
/// identity provider bridge arrive as injected collaborators.
pub struct AuthService<'a> {
    pool: &'a SqlitePool,
    jwt: Arc<JwtUtils>,
    identity_provider: Arc<dyn IdentityProvider>,
}

impl<'a> AuthService<'a> {
    /// Create a new AuthService instance
    pub fn new(pool: &'a SqlitePool, ctx: &AuthContext) -> Self {
        AuthService {
            pool,
            jwt: ctx.jwt.clone(),
            identity_provider: ctx.identity_provider.clone(),
        }
    }

    /// Register a new user with a password credential.
    ///
    /// The email existence check is best-effort; a concurrent registration
    /// of the same email is ultimately rejected by the store's unique index.
    pub async fn register(&self, request: RegisterRequest) -> ServiceResult<()> {
        if let Err(validation_errors) = request.validate() {
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
        if repo.email_exists(&request.email).await? {
            return Err(ServiceError::already_exists("User", &request.email));
        }

        // bcrypt is CPU-bound; keep it off the async worker threads.
        let password = request.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| ServiceError::internal(format!("Hashing task failed: {}", e)))??;

        let user = repo
            .create_user(CreateUser {
                id: Uuid::now_v7().to_string(),
                email: request.email,
                password_hash: Some(password_hash),
                name: request.name,
            })
            .await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(())
    }

    /// Authenticate with email and password, returning a fresh bearer token.
    ///
    /// Unknown email, wrong password, and password-less (provider-provisioned)
    /// accounts all produce the same `InvalidCredentials` error.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<String> {
        let repo = UserRepository::new(self.pool);
        let user = repo
            .get_user_by_email(&request.email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let hash = user
            .password_hash
            .clone()
            .ok_or(ServiceError::InvalidCredentials)?;

        let password = request.password;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ServiceError::internal(format!("Verification task failed: {}", e)))??;

        if !matches {
            return Err(ServiceError::InvalidCredentials);
        }

        let token = self.jwt.generate_token(&user.id)?;
        tracing::info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// URL of the identity provider's consent screen.
    pub fn login_redirect_url(&self) -> String {
        self.identity_provider.authorization_url()
    }

    /// Complete a third-party login: redeem the callback code, find or
    /// provision the user, and issue a token.
    ///
    /// Provisioned accounts carry no password hash and can only ever log in
    /// through the provider.
    pub async fn oauth_callback(&self, code: Option<&str>) -> ServiceResult<String> {
        let identity = match code {
            Some(code) => self.identity_provider.fetch_identity(code).await?,
            None => None,
        };

        let identity =
            identity.ok_or_else(|| ServiceError::not_found("User data", "identity provider"))?;

        let repo = UserRepository::new(self.pool);
        let user = match repo.get_user_by_email(&identity.email).await? {
            Some(user) => user,
            None => {
                let created = repo
                    .create_user(CreateUser {
                        id: Uuid::now_v7().to_string(),
                        email: identity.email.clone(),
                        password_hash: None,
                        name: identity.name.clone(),
                    })
                    .await?;
                tracing::info!(user_id = %created.id, "user provisioned via identity provider");
                created
            }
        };

        let token = self.jwt.generate_token(&user.id)?;
        tracing::info!(user_id = %user.id, "user logged in via identity provider");
        Ok(token)
    }
}
