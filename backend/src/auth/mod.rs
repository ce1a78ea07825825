//! Authentication module for managing user accounts, sessions, and access control.
//!
//! This module provides the public interface for user authentication-related
//! functionalities such as registration, password and third-party login,
//! token issuance, and authorization middleware.

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use crate::config::Config;
use crate::services::identity_provider::{GoogleProvider, IdentityProvider};
use crate::utils::jwt::JwtUtils;

/// Collaborators shared by the authentication flows.
///
/// Constructed once at startup and injected into the router as an
/// extension; nothing here is a process-wide singleton.
#[derive(Clone)]
pub struct AuthContext {
    pub jwt: Arc<JwtUtils>,
    pub identity_provider: Arc<dyn IdentityProvider>,
    pub cookie: CookieSettings,
}

/// Attributes of the session cookie set by the login flows.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Secure flag; off in local development.
    pub secure: bool,
    /// Cookie lifetime, kept equal to the token expiry.
    pub max_age_seconds: u64,
}

impl AuthContext {
    pub fn new(
        jwt: Arc<JwtUtils>,
        identity_provider: Arc<dyn IdentityProvider>,
        cookie: CookieSettings,
    ) -> Self {
        Self {
            jwt,
            identity_provider,
            cookie,
        }
    }

    /// Builds the production collaborators from configuration.
    pub fn from_config(config: &Config) -> Self {
        let jwt = Arc::new(JwtUtils::new(
            &config.jwt_secret,
            chrono::Duration::seconds(config.jwt_expires_in_seconds as i64),
        ));
        let identity_provider: Arc<dyn IdentityProvider> = Arc::new(GoogleProvider::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.google_callback_url.clone(),
        ));

        Self::new(
            jwt,
            identity_provider,
            CookieSettings {
                secure: config.cookie_secure(),
                max_age_seconds: config.jwt_expires_in_seconds,
            },
        )
    }
}
