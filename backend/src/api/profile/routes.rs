//! Defines the HTTP routes for user profile access.
//!
//! Every route composes the authentication guard; the admin profile route
//! additionally requires the admin role. These are designed to be nested
//! into the main Axum router.

use super::handlers::{get_user_admin, get_user_self, list_users, update_user_self};
use crate::auth::middleware::{require_admin, require_auth};
use axum::{
    Router, middleware,
    routing::{get, put},
};

/// Creates the profile router with all profile-related routes
pub fn profile_router() -> Router {
    Router::new()
        .route("/user-self", get(get_user_self))
        .route(
            "/user-admin",
            get(get_user_admin).layer(middleware::from_fn(require_admin)),
        )
        .route("/user-self-update", put(update_user_self))
        .route("/users", get(list_users))
        .layer(middleware::from_fn(require_auth))
}
