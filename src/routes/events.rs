// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event feed, event detail and recommendation routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AttendeeProfile, EventRecord, MatchResult};
use crate::routes::api::load_profile;
use crate::services::events::upcoming;
use crate::services::recommend::recommend;
use crate::time_utils::{date_label, format_utc_rfc3339, location_label, time_label};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Largest `limit` accepted by the recommendations endpoint.
const MAX_RECOMMENDATIONS: usize = 20;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/events", get(get_event_feed))
        .route("/api/events/upcoming", get(get_upcoming))
        .route("/api/events/{id}", get(get_event))
        .route("/api/events/{id}/attendees", get(get_attendees))
        .route("/api/recommendations", get(get_recommendations))
}

// ─── Views ───────────────────────────────────────────────────

/// Event as rendered by the client, with display labels filled in.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventView {
    pub id: String,
    pub title: String,
    /// RFC3339, absent when the date is not set
    pub date: Option<String>,
    pub date_label: String,
    pub time: Option<String>,
    pub time_label: String,
    pub location: Option<String>,
    pub location_label: String,
    pub tags: Vec<String>,
    pub attendee_count: Option<u32>,
    pub is_public: bool,
    #[serde(rename = "imageURL")]
    pub image_url: Option<String>,
}

impl From<&EventRecord> for EventView {
    fn from(event: &EventRecord) -> Self {
        Self {
            id: event.id.clone(),
            title: event.title.clone(),
            date: event.date.map(format_utc_rfc3339),
            date_label: date_label(event.date),
            time: event.time.clone(),
            time_label: time_label(event.time.as_deref()),
            location: event.location.clone(),
            location_label: location_label(event.location.as_deref()),
            tags: event.tags.clone(),
            attendee_count: event.attendee_count,
            is_public: event.is_public,
            image_url: event.image_url.clone(),
        }
    }
}

/// Live feed state.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventFeedResponse {
    pub loading: bool,
    pub events: Vec<EventView>,
    pub error: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EventListResponse {
    pub events: Vec<EventView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AttendeeView {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub organization: Option<String>,
}

impl From<AttendeeProfile> for AttendeeView {
    fn from(joined: AttendeeProfile) -> Self {
        Self {
            id: joined.attendee.id,
            user_id: joined.attendee.user_id,
            name: joined.user.name,
            photo_url: joined.user.photo_url,
            organization: joined.user.organization,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AttendeesResponse {
    pub attendees: Vec<AttendeeView>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecommendationView {
    pub event: EventView,
    pub match_score: u8,
}

impl From<&MatchResult> for RecommendationView {
    fn from(result: &MatchResult) -> Self {
        Self {
            event: EventView::from(&result.event),
            match_score: result.match_score,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecommendationsResponse {
    pub interests: Vec<String>,
    pub recommendations: Vec<RecommendationView>,
}

// ─── Handlers ────────────────────────────────────────────────

/// Current state of the live events feed.
async fn get_event_feed(State(state): State<Arc<AppState>>) -> Json<EventFeedResponse> {
    let feed = state.event_feed.snapshot();

    Json(EventFeedResponse {
        loading: feed.loading,
        events: feed.data.iter().map(EventView::from).collect(),
        error: feed.error,
    })
}

/// Events in the next week, from the live feed.
async fn get_upcoming(State(state): State<Arc<AppState>>) -> Json<EventListResponse> {
    let feed = state.event_feed.snapshot();
    let events = upcoming(&feed.data, chrono::Utc::now());

    Json(EventListResponse {
        events: events.iter().map(EventView::from).collect(),
    })
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EventView>> {
    let event = state
        .events
        .get_event(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {}", id)))?;

    Ok(Json(EventView::from(&event)))
}

async fn get_attendees(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<AttendeesResponse>> {
    if state.events.get_event(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("Event {}", id)));
    }

    let attendees = state.events.attendees_with_profiles(&id).await?;

    Ok(Json(AttendeesResponse {
        attendees: attendees.into_iter().map(AttendeeView::from).collect(),
    }))
}

#[derive(Deserialize)]
pub struct RecommendationParams {
    pub limit: Option<usize>,
}

/// Public events ranked by how well they match the caller's interests.
async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<RecommendationsResponse>> {
    let top_n = match params.limit {
        Some(n) if (1..=MAX_RECOMMENDATIONS).contains(&n) => n,
        Some(n) => {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}, got {}",
                MAX_RECOMMENDATIONS, n
            )))
        }
        None => state.config.recommendation_top_n,
    };

    let profile = load_profile(&state, &user).await?;
    let pool = state
        .events
        .public_pool(state.config.recommendation_pool)
        .await?;

    let matches = recommend(&profile.interests, &pool, top_n);

    tracing::info!(
        uid = %user.uid,
        pool = pool.len(),
        returned = matches.len(),
        "Served recommendations"
    );

    Ok(Json(RecommendationsResponse {
        interests: profile.interests.into_iter().collect(),
        recommendations: matches.iter().map(RecommendationView::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_event_view_fills_labels() {
        let mut event = EventRecord::new("e1", "Vision Day");
        event.date = chrono::Utc.with_ymd_and_hms(2024, 3, 5, 18, 0, 0).single();
        event.location = Some("Room 101".to_string());

        let view = EventView::from(&event);
        assert_eq!(view.date.as_deref(), Some("2024-03-05T18:00:00Z"));
        assert_eq!(view.date_label, "Tuesday, March 5, 2024");
        assert_eq!(view.time_label, "Time TBD");
        assert_eq!(view.location_label, "Room 101");

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["dateLabel"], "Tuesday, March 5, 2024");
        assert!(json.get("imageURL").is_some());
        assert_eq!(json["isPublic"], false);
    }
}
