// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EventScout: event discovery backend.
//!
//! This crate provides the API behind the event-discovery web client:
//! user profiles and interests, a live feed of events, interest-based
//! recommendations, profile picture upload and a scripted assistant for
//! drafting new events.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use db::{EventStore, ProfileStore};
use models::EventRecord;
use services::{
    AssistantSessions, EventService, FirebaseTokenVerifier, LiveQuery, ProfileService,
    UploadService,
};
use std::sync::Arc;
use storage::ObjectStore;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub profiles: ProfileService,
    pub events: EventService,
    /// Live snapshot of the events collection, ordered by date.
    pub event_feed: LiveQuery<EventRecord>,
    pub uploads: UploadService,
    pub verifier: Arc<FirebaseTokenVerifier>,
    pub assistant: AssistantSessions,
}

impl AppState {
    /// Wire services over the given backends and start the live events feed.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(
        config: Config,
        profile_store: Arc<dyn ProfileStore>,
        event_store: Arc<dyn EventStore>,
        objects: Arc<dyn ObjectStore>,
        verifier: Arc<FirebaseTokenVerifier>,
    ) -> Self {
        let profiles = ProfileService::new(profile_store.clone());
        let events = EventService::new(event_store.clone(), profile_store);
        let uploads = UploadService::new(objects, profiles.clone());

        let limit = config.event_feed_limit;
        let event_feed = LiveQuery::spawn("events", async move {
            event_store.subscribe_events(limit).await
        });

        Self {
            config,
            profiles,
            events,
            event_feed,
            uploads,
            verifier,
            assistant: AssistantSessions::new(),
        }
    }
}
