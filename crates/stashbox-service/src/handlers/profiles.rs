//! User profile handlers.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use stashbox_core::Profile;
use stashbox_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Profile response.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User ID.
    pub user_id: String,
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Photo URL, if set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Created timestamp.
    pub created_at: String,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            photo_url: profile.photo_url.clone(),
            created_at: profile.created_at.to_rfc3339(),
        }
    }
}

/// Create-or-update profile request.
#[derive(Debug, Deserialize)]
pub struct UpsertProfileRequest {
    /// Email address.
    pub email: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Photo URL.
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Create or update the current user's profile.
pub async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Json(body): Json<UpsertProfileRequest>,
) -> Result<Json<ProfileResponse>, ApiError> {
    // Keep the original creation time across updates.
    let created_at = state
        .store
        .get_profile(&auth.user_id)?
        .map_or_else(Utc::now, |p| p.created_at);

    let profile = Profile {
        user_id: auth.user_id,
        email: body.email,
        first_name: body.first_name,
        last_name: body.last_name,
        photo_url: body.photo_url,
        created_at,
    };
    state.store.put_profile(&profile)?;

    tracing::info!(user_id = %auth.user_id, "Profile saved");

    Ok(Json(ProfileResponse::from(&profile)))
}

/// Get the current user's profile.
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<ProfileResponse>, ApiError> {
    let profile = state
        .store
        .get_profile(&auth.user_id)?
        .ok_or_else(|| ApiError::NotFound("Profile not found".into()))?;

    Ok(Json(ProfileResponse::from(&profile)))
}

/// Delete the current user's profile.
pub async fn delete_profile(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_profile(&auth.user_id)?;

    tracing::info!(user_id = %auth.user_id, "Profile deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}
