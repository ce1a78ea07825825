//! Handler functions for authentication-related API endpoints.
//!
//! These functions process incoming HTTP requests for registration, login,
//! third-party login, and logout, parse request data, and interact with the
//! `auth::service` for core business logic.
//!
//! Two channels carry the session token: the password login returns it in
//! the response body and sets it as a cookie, while the provider callback
//! sets only the cookie. Protected reads authenticate with the header.

use crate::api::common::service_error_to_http;
use crate::auth::models::*;
use crate::auth::service::AuthService;
use crate::auth::{AuthContext, CookieSettings};
use crate::errors::ServiceError;
use axum::{
    body::Body,
    extract::{Extension, Json, Query},
    http::{StatusCode, header::LOCATION},
    response::{Json as ResponseJson, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sqlx::SqlitePool;

/// Name of the session cookie set by the login flows.
pub const AUTH_COOKIE: &str = "token";

fn auth_cookie(settings: &CookieSettings, token: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(settings.secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(settings.max_age_seconds as i64))
        .build()
}

/// Handle user registration request
#[axum::debug_handler]
pub async fn register(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, ResponseJson<MessageResponse>), (StatusCode, String)> {
    AuthService::new(&pool, &ctx)
        .register(payload)
        .await
        .map_err(service_error_to_http)?;

    Ok((
        StatusCode::CREATED,
        ResponseJson(MessageResponse::new("User registered successfully")),
    ))
}

/// Handle password login request
#[axum::debug_handler]
pub async fn login(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<AuthContext>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, ResponseJson<TokenResponse>), (StatusCode, String)> {
    let token = AuthService::new(&pool, &ctx)
        .login(payload)
        .await
        .map_err(service_error_to_http)?;

    let jar = jar.add(auth_cookie(&ctx.cookie, token.clone()));
    Ok((jar, ResponseJson(TokenResponse { token })))
}

/// Redirect the browser to the identity provider's consent screen
#[axum::debug_handler]
pub async fn login_google(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Response, (StatusCode, String)> {
    let url = AuthService::new(&pool, &ctx).login_redirect_url();

    Response::builder()
        .status(StatusCode::FOUND)
        .header(LOCATION, url)
        .body(Body::empty())
        .map_err(|e| {
            service_error_to_http(ServiceError::internal(format!(
                "Redirect response failed: {}",
                e
            )))
        })
}

/// Handle the identity provider callback
#[axum::debug_handler]
pub async fn google_callback(
    Extension(pool): Extension<SqlitePool>,
    Extension(ctx): Extension<AuthContext>,
    jar: CookieJar,
    Query(params): Query<OauthCallbackParams>,
) -> Result<(StatusCode, CookieJar, ResponseJson<MessageResponse>), (StatusCode, String)> {
    if let Some(error) = params.error {
        tracing::error!(error = %error, "identity provider returned an error");
        return Err(service_error_to_http(ServiceError::external_service(error)));
    }

    let token = AuthService::new(&pool, &ctx)
        .oauth_callback(params.code.as_deref())
        .await
        .map_err(service_error_to_http)?;

    // The cookie is the only channel here; the body never carries the token.
    let jar = jar.add(auth_cookie(&ctx.cookie, token));
    Ok((
        StatusCode::CREATED,
        jar,
        ResponseJson(MessageResponse::new("User logged in successfully")),
    ))
}

/// Handle logout request (client-side session teardown)
///
/// Clearing the cookie is all this does; an already-issued token stays
/// valid until its natural expiry.
#[axum::debug_handler]
pub async fn logout(jar: CookieJar) -> (CookieJar, ResponseJson<MessageResponse>) {
    let jar = jar.remove(Cookie::build((AUTH_COOKIE, "")).path("/").build());
    (jar, ResponseJson(MessageResponse::new("Logged out successfully")))
}
