//! Main entry point for the ProfileGate backend.
//!
//! This file initializes the Axum web server, sets up the database
//! connection, constructs the authentication collaborators, and registers
//! all API routes and middleware.
//! It orchestrates the application's startup and defines its overall structure.

mod api;
mod auth;
mod config;
mod database;
mod errors;
mod repositories;
mod services;
mod utils;

use crate::api::common::ApiResponse;
use crate::auth::AuthContext;
use axum::{Extension, Router, response::Json, routing::get};
use config::Config;
use database::Database;
use sqlx::SqlitePool;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("backend=debug,axum=info")),
        )
        .init();

    let config = Config::from_env().unwrap();
    let db = Database::new(&config).await.unwrap();
    let pool = db.pool().clone();
    let ctx = AuthContext::from_config(&config);

    let app = app(pool, ctx);

    let bind_address = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await.unwrap();

    info!("Starting ProfileGate server on port {}", config.server_port);
    axum::serve(listener, app).await.unwrap();
}

/// Assembles the application router around its injected collaborators.
fn app(pool: SqlitePool, ctx: AuthContext) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .nest("/api/auth", auth::routes::auth_router())
        .nest("/api/profile", api::profile::routes::profile_router())
        .layer(Extension(pool))
        .layer(Extension(ctx))
}

async fn root_handler() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::success(
        serde_json::json!({
            "service": "ProfileGate Backend",
            "version": "0.1.0"
        }),
        "Welcome to the ProfileGate API",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CookieSettings;
    use crate::database::test_util::memory_pool;
    use crate::services::identity_provider::{ExternalIdentity, StaticIdentityProvider};
    use crate::utils::jwt::JwtUtils;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn test_app() -> (Router, SqlitePool) {
        let pool = memory_pool().await;
        let ctx = AuthContext::new(
            Arc::new(JwtUtils::new("test-secret", chrono::Duration::seconds(3600))),
            Arc::new(StaticIdentityProvider {
                identity: Some(ExternalIdentity {
                    email: "oauth@x.com".to_string(),
                    name: Some("OAuth User".to_string()),
                }),
                fail: false,
            }),
            CookieSettings {
                secure: false,
                max_age_seconds: 3600,
            },
        );
        (app(pool.clone(), ctx), pool)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn bearer_request(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn response_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register_and_login(app: &Router, email: &str, password: &str) -> String {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({"email": email, "password": password, "name": "A"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({"email": email, "password": password}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response_json(response).await["token"]
            .as_str()
            .expect("token in body")
            .to_string()
    }

    #[tokio::test]
    async fn register_login_and_read_own_profile() {
        let (app, _pool) = test_app().await;
        let token = register_and_login(&app, "a@x.com", "pw1").await;

        let response = app
            .clone()
            .oneshot(bearer_request("GET", "/api/profile/user-self", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["data"]["email"], "a@x.com");
        let data = body["data"].as_object().unwrap();
        assert!(!data.contains_key("role"));
        assert!(!data.contains_key("passwordHash"));
    }

    #[tokio::test]
    async fn login_sets_the_session_cookie() {
        let (app, _pool) = test_app().await;
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/register",
                json!({"email": "a@x.com", "password": "pw1", "name": "A"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({"email": "a@x.com", "password": "pw1"}),
            ))
            .await
            .unwrap();

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("cookie set")
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
    }

    #[tokio::test]
    async fn missing_and_invalid_tokens_are_unauthorized() {
        let (app, _pool) = test_app().await;

        let no_token = Request::builder()
            .method("GET")
            .uri("/api/profile/user-self")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(no_token).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .clone()
            .oneshot(bearer_request("GET", "/api/profile/user-self", "garbage"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_email_return_the_same_response() {
        let (app, _pool) = test_app().await;
        register_and_login(&app, "a@x.com", "pw1").await;

        let wrong_password = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({"email": "a@x.com", "password": "bad"}),
            ))
            .await
            .unwrap();
        let unknown_email = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/auth/login",
                json!({"email": "ghost@x.com", "password": "pw1"}),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
        let first = response_json(wrong_password).await;
        let second = response_json(unknown_email).await;
        assert_eq!(first["message"], second["message"]);
    }

    #[tokio::test]
    async fn admin_route_is_role_gated() {
        let (app, pool) = test_app().await;
        let token = register_and_login(&app, "a@x.com", "pw1").await;

        let response = app
            .clone()
            .oneshot(bearer_request("GET", "/api/profile/user-admin", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        sqlx::query("UPDATE users SET role = 'admin' WHERE email = ?")
            .bind("a@x.com")
            .execute(&pool)
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(bearer_request("GET", "/api/profile/user-admin", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["data"]["role"], "admin");
        assert!(!body["data"].as_object().unwrap().contains_key("passwordHash"));
    }

    #[tokio::test]
    async fn profile_update_cannot_touch_the_role() {
        let (app, pool) = test_app().await;
        let token = register_and_login(&app, "a@x.com", "pw1").await;

        let mut request = json_request(
            "PUT",
            "/api/profile/user-self-update",
            json!({"bio": "hello", "role": "admin"}),
        );
        request
            .headers_mut()
            .insert(header::AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let role: String = sqlx::query_scalar("SELECT role FROM users WHERE email = ?")
            .bind("a@x.com")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(role, "user");

        let body = response_json(response).await;
        assert_eq!(body["data"]["bio"], "hello");
    }

    #[tokio::test]
    async fn listing_hides_private_profiles_from_non_admins() {
        let (app, pool) = test_app().await;
        let token = register_and_login(&app, "a@x.com", "pw1").await;
        register_and_login(&app, "b@x.com", "pw2").await;
        sqlx::query("UPDATE users SET is_public = 0 WHERE email = ?")
            .bind("b@x.com")
            .execute(&pool)
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(bearer_request("GET", "/api/profile/users", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        let users = body["data"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["email"], "a@x.com");
        assert!(users.iter().all(|u| u["isPublic"] == true));
    }

    #[tokio::test]
    async fn provider_login_redirects_and_callback_sets_only_the_cookie() {
        let (app, _pool) = test_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/auth/login/google")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(response.headers().contains_key(header::LOCATION));

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/auth/login/google/callback?code=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("cookie set")
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));

        let body = response_json(response).await;
        assert!(body.get("token").is_none());
        assert_eq!(body["message"], "User logged in successfully");
    }

    #[tokio::test]
    async fn logout_clears_the_cookie() {
        let (app, _pool) = test_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/auth/logout")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("removal cookie")
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("token="));
        assert!(cookie.contains("Max-Age=0"));
    }
}
