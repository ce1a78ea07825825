//! Defines the HTTP routes specifically for authentication.
//!
//! These routes handle user registration, password login, third-party
//! login, and logout. They are designed to be nested into the main Axum
//! router.

use crate::auth::handlers::*;
use axum::{
    Router,
    routing::{get, post},
};

/// Creates the authentication router with all auth-related routes
pub fn auth_router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/login/google", get(login_google))
        .route("/login/google/callback", get(google_callback))
        .route("/logout", get(logout))
}
