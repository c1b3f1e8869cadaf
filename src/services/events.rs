// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event lookups and the upcoming-events window.

use crate::db::{EventStore, ProfileStore, StoreError};
use crate::models::{AttendeeProfile, EventRecord};
use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Days ahead covered by the upcoming-events list.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;
/// Maximum entries in the upcoming-events list.
pub const UPCOMING_LIMIT: usize = 2;

/// Profile reads in flight while joining attendees.
const ATTENDEE_FETCH_CONCURRENCY: usize = 8;

#[derive(Clone)]
pub struct EventService {
    events: Arc<dyn EventStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl EventService {
    pub fn new(events: Arc<dyn EventStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { events, profiles }
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>, StoreError> {
        self.events.get_event(event_id).await
    }

    /// Public events considered for recommendation, soonest first.
    pub async fn public_pool(&self, limit: u32) -> Result<Vec<EventRecord>, StoreError> {
        self.events.list_public_events(limit).await
    }

    /// Attendees of an event with their profiles, in attendance order.
    ///
    /// Attendees whose profile no longer exists are skipped.
    pub async fn attendees_with_profiles(
        &self,
        event_id: &str,
    ) -> Result<Vec<AttendeeProfile>, StoreError> {
        let attendees = self.events.list_attendees(event_id).await?;
        let total = attendees.len();

        let joined: Vec<AttendeeProfile> = stream::iter(attendees)
            .map(|attendee| {
                let profiles = Arc::clone(&self.profiles);
                async move {
                    let user = profiles.get_profile(&attendee.user_id).await?;
                    Ok::<_, StoreError>(user.map(|user| AttendeeProfile { attendee, user }))
                }
            })
            .buffered(ATTENDEE_FETCH_CONCURRENCY)
            .try_filter_map(|joined| async move { Ok(joined) })
            .try_collect()
            .await?;

        if joined.len() < total {
            tracing::debug!(
                event_id,
                missing = total - joined.len(),
                "Skipped attendees without a profile"
            );
        }

        Ok(joined)
    }
}

/// Events dated strictly between `now` and `now + 7 days`, first two in
/// input order. Undated events are never upcoming.
pub fn upcoming(events: &[EventRecord], now: DateTime<Utc>) -> Vec<EventRecord> {
    let horizon = now + Duration::days(UPCOMING_WINDOW_DAYS);

    events
        .iter()
        .filter(|event| matches!(event.date, Some(date) if date > now && date < horizon))
        .take(UPCOMING_LIMIT)
        .cloned()
        .collect()
}
