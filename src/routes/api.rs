// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile, interest and profile picture routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ProfileUpdate, UserProfile};
use crate::services::profile::{DEFAULT_INTERESTS, INTEREST_VOCABULARY};
use crate::services::upload::{validate_image, MAX_UPLOAD_BYTES};
use crate::services::ProfileSeed;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Request bodies above this are cut off before reaching the handler, so
/// images slightly over the upload limit still get a descriptive error.
const PHOTO_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Routes that do not require a signed-in user.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/interests", get(get_interests))
}

/// API routes (require authentication).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me).patch(update_me))
        .route("/api/me/interests", put(set_interests))
        .route("/api/me/interests/toggle", post(toggle_interest))
        .route(
            "/api/me/photo",
            post(upload_photo).layer(DefaultBodyLimit::max(PHOTO_BODY_LIMIT)),
        )
}

// ─── Interests ───────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InterestsResponse {
    pub vocabulary: Vec<String>,
    pub defaults: Vec<String>,
}

async fn get_interests() -> Json<InterestsResponse> {
    Json(InterestsResponse {
        vocabulary: INTEREST_VOCABULARY.iter().map(|s| s.to_string()).collect(),
        defaults: DEFAULT_INTERESTS.iter().map(|s| s.to_string()).collect(),
    })
}

// ─── User Profile ────────────────────────────────────────────

/// Current user's profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub field_of_study: Option<String>,
    pub bio: Option<String>,
    pub organization: Option<String>,
    pub interests: Vec<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<UserProfile> for ProfileResponse {
    fn from(profile: UserProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            photo_url: profile.photo_url,
            field_of_study: profile.field_of_study,
            bio: profile.bio,
            organization: profile.organization,
            interests: profile.interests.into_iter().collect(),
            created_at: profile.created_at.map(format_utc_rfc3339),
            updated_at: profile.updated_at.map(format_utc_rfc3339),
        }
    }
}

pub(crate) fn seed_from(user: &AuthUser) -> ProfileSeed {
    ProfileSeed {
        name: user.name.clone(),
        email: user.email.clone(),
        photo_url: user.picture.clone(),
    }
}

/// Load the caller's profile, creating it from token claims on first use.
pub(crate) async fn load_profile(state: &AppState, user: &AuthUser) -> Result<UserProfile> {
    state
        .profiles
        .get_or_create_with(&user.uid, seed_from(user))
        .await
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    Ok(Json(load_profile(&state, &user).await?.into()))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .update(&user.uid, seed_from(&user), update)
        .await?;
    Ok(Json(profile.into()))
}

// ─── Interest Editing ────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetInterestsRequest {
    pub interests: BTreeSet<String>,
}

#[derive(Deserialize)]
pub struct ToggleInterestRequest {
    pub interest: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct InterestsUpdateResponse {
    pub interests: Vec<String>,
}

async fn set_interests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<SetInterestsRequest>,
) -> Result<Json<InterestsUpdateResponse>> {
    let interests = state
        .profiles
        .set_interests(&user.uid, seed_from(&user), request.interests)
        .await?;

    Ok(Json(InterestsUpdateResponse {
        interests: interests.into_iter().collect(),
    }))
}

async fn toggle_interest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ToggleInterestRequest>,
) -> Result<Json<InterestsUpdateResponse>> {
    let interests = state
        .profiles
        .toggle_interest(&user.uid, seed_from(&user), &request.interest)
        .await?;

    Ok(Json(InterestsUpdateResponse {
        interests: interests.into_iter().collect(),
    }))
}

// ─── Profile Picture ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PhotoUploadResponse {
    #[serde(rename = "photoURL")]
    pub photo_url: String,
    /// Progress percentages reported while uploading
    pub progress: Vec<u8>,
}

/// Upload a new profile picture from the raw request body.
async fn upload_photo(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<PhotoUploadResponse>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    // Reject bad input before touching the store or the bucket.
    validate_image(content_type, body.len())?;

    load_profile(&state, &user).await?;
    let task = state.uploads.start_upload(&user.uid, content_type, body)?;

    let (progress, result) = task.complete().await;
    let photo_url = result?;

    Ok(Json(PhotoUploadResponse {
        photo_url,
        progress,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_response_orders_interests() {
        let profile = UserProfile {
            id: "uid".to_string(),
            name: "Ada".to_string(),
            email: String::new(),
            photo_url: None,
            field_of_study: None,
            bio: None,
            organization: None,
            interests: ["NLP", "AI Ethics", "Deep Learning"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            created_at: None,
            updated_at: None,
        };

        let response = ProfileResponse::from(profile);
        assert_eq!(response.interests, vec!["AI Ethics", "Deep Learning", "NLP"]);
        assert!(response.created_at.is_none());
    }
}
