//! Database layer (Firestore, plus an in-memory store for local runs and tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::models::{Attendee, EventRecord, ProfileUpdate, UserProfile};
use async_trait::async_trait;
use futures_util::stream::BoxStream;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const EVENTS: &str = "events";
    /// Subcollection under `events/{eventId}`
    pub const ATTENDEES: &str = "attendees";
}

/// Errors from the document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to connect to store: {0}")]
    Connect(String),

    #[error("Store read failed: {0}")]
    Read(String),

    #[error("Store write failed: {0}")]
    Write(String),

    #[error("Store not connected (offline mode)")]
    Offline,
}

/// A standing query: every item is the full current result set.
///
/// Dropping the stream releases the underlying subscription.
pub type SnapshotStream<T> = BoxStream<'static, Result<Vec<T>, StoreError>>;

/// Profile documents (`users/{identity}`).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Get a profile by identity.
    async fn get_profile(&self, identity: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Create or overwrite a whole profile.
    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    /// Write only the fields present in `update` (last writer wins per field).
    async fn update_profile(&self, identity: &str, update: &ProfileUpdate)
        -> Result<(), StoreError>;
}

/// Event documents (`events/{eventId}` and their attendees).
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Events ordered by date ascending.
    async fn list_events(&self, limit: u32) -> Result<Vec<EventRecord>, StoreError>;

    /// Public events ordered by date ascending.
    async fn list_public_events(&self, limit: u32) -> Result<Vec<EventRecord>, StoreError>;

    async fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>, StoreError>;

    async fn list_attendees(&self, event_id: &str) -> Result<Vec<Attendee>, StoreError>;

    /// Subscribe to events ordered by date ascending, receiving a full
    /// snapshot on every change.
    async fn subscribe_events(&self, limit: u32) -> Result<SnapshotStream<EventRecord>, StoreError>;
}
