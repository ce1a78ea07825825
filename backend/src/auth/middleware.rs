//! Middleware for protecting authenticated routes and handling authorization.
//!
//! This module contains logic for validating bearer tokens and enforcing
//! role requirements across the API endpoints. Every failure mode of token
//! verification collapses into the same unauthorized response so the client
//! learns nothing about why a token was rejected.

use crate::auth::AuthContext;
use crate::database::models::User;
use crate::repositories::user_repository::UserRepository;
use axum::{
    extract::Request,
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sqlx::SqlitePool;

/// Bearer token authentication middleware.
///
/// Verifies the token from the Authorization header, loads the acting user,
/// and attaches it to the request for downstream handlers. The session
/// cookie is not consulted here; protected reads authenticate via the
/// header channel only.
pub async fn require_auth(mut request: Request, next: Next) -> Result<Response, StatusCode> {
    // Extract Authorization header
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Check if it's a Bearer token
    if !auth_header.starts_with("Bearer ") {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let token = &auth_header[7..]; // Remove "Bearer " prefix

    let ctx = request
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;
    let pool = request
        .extensions()
        .get::<SqlitePool>()
        .cloned()
        .ok_or(StatusCode::INTERNAL_SERVER_ERROR)?;

    // Malformed, expired, and forged tokens are all the same to the client.
    let claims = match ctx.jwt.validate_token(token) {
        Ok(claims) => claims,
        Err(_) => return Err(StatusCode::UNAUTHORIZED),
    };

    let user = UserRepository::new(&pool)
        .get_user_by_id(&claims.user.id)
        .await
        .map_err(|e| {
            tracing::error!("User lookup failed during authentication: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // Add the loaded user to request extensions for use in handlers
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Admin role authorization middleware.
///
/// Runs after `require_auth`; expects the acting user in the request
/// extensions.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, StatusCode> {
    let user = request
        .extensions()
        .get::<User>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !user.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}
