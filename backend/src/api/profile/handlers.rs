//! Handler functions for the profile API endpoints.
//!
//! Every handler here runs behind the authentication middleware, which has
//! already verified the bearer token and attached the acting user to the
//! request. Handlers re-read the record through the profile service and
//! map service errors at the boundary.

use crate::api::common::{ApiResponse, service_error_to_http};
use crate::api::profile::models::{PublicProfile, UpdateProfileRequest};
use crate::database::models::User;
use crate::services::profile_service::ProfileService;
use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::Json as ResponseJson,
};
use sqlx::SqlitePool;

/// The acting user's own profile, without the role field.
#[axum::debug_handler]
pub async fn get_user_self(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<PublicProfile>>, (StatusCode, String)> {
    let profile = ProfileService::new(&pool)
        .get_own_profile(&user.id)
        .await
        .map_err(service_error_to_http)?;

    Ok(ResponseJson(ApiResponse::success(
        profile,
        "Profile retrieved successfully",
    )))
}

/// The acting admin's full record, role included.
#[axum::debug_handler]
pub async fn get_user_admin(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<User>>, (StatusCode, String)> {
    let record = ProfileService::new(&pool)
        .get_own_admin_profile(&user.id)
        .await
        .map_err(service_error_to_http)?;

    Ok(ResponseJson(ApiResponse::success(
        record,
        "Profile retrieved successfully",
    )))
}

/// Partial update of the acting user's profile.
#[axum::debug_handler]
pub async fn update_user_self(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<ResponseJson<ApiResponse<PublicProfile>>, (StatusCode, String)> {
    let profile = ProfileService::new(&pool)
        .update_own_profile(&user.id, payload)
        .await
        .map_err(service_error_to_http)?;

    tracing::info!(user_id = %user.id, "profile updated");

    Ok(ResponseJson(ApiResponse::success(
        profile,
        "Profile updated successfully",
    )))
}

/// All profiles visible to the acting user.
#[axum::debug_handler]
pub async fn list_users(
    Extension(pool): Extension<SqlitePool>,
    Extension(user): Extension<User>,
) -> Result<ResponseJson<ApiResponse<Vec<User>>>, (StatusCode, String)> {
    let users = ProfileService::new(&pool)
        .list_profiles(&user)
        .await
        .map_err(service_error_to_http)?;

    Ok(ResponseJson(ApiResponse::success(
        users,
        "Users retrieved successfully",
    )))
}
