// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod assistant;
pub mod events;
pub mod firebase_auth;
pub mod live_query;
pub mod profile;
pub mod recommend;
pub mod upload;

pub use assistant::{AssistantSessions, EventDraft};
pub use events::EventService;
pub use firebase_auth::{AuthError, AuthUser, FirebaseTokenVerifier};
pub use live_query::{LiveQuery, LiveQueryState};
pub use profile::{ProfileSeed, ProfileService};
pub use upload::{UploadError, UploadService};
