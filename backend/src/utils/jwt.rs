//! JWT token utilities for authentication and authorization.
//!
//! Provides secure token creation, validation, and claims management. Tokens
//! bind nothing but the user identifier and expire after a fixed window;
//! there is no server-side session state and no revocation.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ServiceError;

/// Why a token failed verification. Callers at the HTTP boundary must
/// collapse every kind into the same generic unauthorized response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("expired token")]
    Expired,
    #[error("bad signature")]
    BadSignature,
}

/// Identity claim carried by a token: only the user id.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserClaim {
    pub id: String,
}

/// JWT claims structure. The `user.id` nesting is the service's wire format.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub user: UserClaim,
    /// Token expiration timestamp
    pub exp: usize,
    /// Token issued at timestamp
    pub iat: usize,
}

/// JWT token utility for creating and validating tokens.
///
/// Constructed once at startup from configuration and injected into the
/// handlers; holds the signing secret for the lifetime of the process.
pub struct JwtUtils {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expires_in: Duration,
}

impl JwtUtils {
    /// Create a new JwtUtils instance from the server-held secret.
    pub fn new(secret: &str, expires_in: Duration) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtUtils {
            encoding_key,
            decoding_key,
            validation,
            expires_in,
        }
    }

    /// Generate a new signed token for the given user id.
    pub fn generate_token(&self, user_id: &str) -> Result<String, ServiceError> {
        let now = Utc::now();
        let exp = now + self.expires_in;

        let claims = Claims {
            user: UserClaim {
                id: user_id.to_string(),
            },
            exp: exp.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::internal(format!("Token generation failed: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })
    }
}
