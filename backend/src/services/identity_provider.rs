//! Bridge to the third-party identity provider.
//!
//! The service only ever sees a normalized external identity (email plus
//! display name); everything provider-specific lives behind the
//! `IdentityProvider` trait so the auth flow can be exercised against a
//! stand-in implementation.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::{ServiceError, ServiceResult};

const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_ENDPOINT: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Normalized identity returned by a provider after a completed login.
#[derive(Debug, Clone)]
pub struct ExternalIdentity {
    pub email: String,
    pub name: Option<String>,
}

/// External OAuth2 identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to for the provider's consent screen.
    fn authorization_url(&self) -> String;

    /// Redeem the callback authorization code for the user's identity.
    ///
    /// `Ok(None)` means the provider completed the exchange but returned no
    /// usable identity (no email claim).
    async fn fetch_identity(&self, code: &str) -> ServiceResult<Option<ExternalIdentity>>;
}

/// Google OAuth2 implementation of [`IdentityProvider`].
pub struct GoogleProvider {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    callback_url: String,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    email: Option<String>,
    name: Option<String>,
}

impl GoogleProvider {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
        }
    }

    async fn exchange_code(&self, code: &str) -> ServiceResult<String> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.callback_url),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ];

        let response = self
            .http
            .post(GOOGLE_TOKEN_ENDPOINT)
            .form(&params)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| ServiceError::external_service(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ServiceError::external_service(format!(
                "Token endpoint returned {}",
                response.status()
            )));
        }

        let tokens: TokenExchangeResponse = response.json().await.map_err(|e| {
            ServiceError::external_service(format!("Malformed token response: {}", e))
        })?;

        Ok(tokens.access_token)
    }
}

#[async_trait]
impl IdentityProvider for GoogleProvider {
    fn authorization_url(&self) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope={}",
            GOOGLE_AUTH_ENDPOINT,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.callback_url),
            urlencoding::encode("profile email"),
        )
    }

    async fn fetch_identity(&self, code: &str) -> ServiceResult<Option<ExternalIdentity>> {
        let access_token = self.exchange_code(code).await?;

        let response = self
            .http
            .get(GOOGLE_USERINFO_ENDPOINT)
            .bearer_auth(&access_token)
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| {
                ServiceError::external_service(format!("Userinfo request failed: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(ServiceError::external_service(format!(
                "Userinfo endpoint returned {}",
                response.status()
            )));
        }

        let info: UserInfoResponse = response.json().await.map_err(|e| {
            ServiceError::external_service(format!("Malformed userinfo response: {}", e))
        })?;

        Ok(info.email.map(|email| ExternalIdentity {
            email,
            name: info.name,
        }))
    }
}

/// Fixed-response provider for exercising the auth flow in tests.
#[cfg(test)]
pub struct StaticIdentityProvider {
    pub identity: Option<ExternalIdentity>,
    pub fail: bool,
}

#[cfg(test)]
#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    fn authorization_url(&self) -> String {
        "https://idp.test/authorize?response_type=code".to_string()
    }

    async fn fetch_identity(&self, _code: &str) -> ServiceResult<Option<ExternalIdentity>> {
        if self.fail {
            return Err(ServiceError::external_service("provider unavailable"));
        }
        Ok(self.identity.clone())
    }
}
