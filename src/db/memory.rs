//! In-memory document store for local development and tests.
//!
//! Mirrors the Firestore wrapper's semantics: events come back ordered by
//! date ascending (undated events first, as Firestore orders nulls before
//! timestamps), profile updates merge only the provided fields, and
//! subscriptions deliver full snapshots.

use crate::db::{EventStore, ProfileStore, SnapshotStream, StoreError};
use crate::models::{Attendee, EventRecord, ProfileUpdate, UserProfile};
use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::{stream, StreamExt};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// In-memory store. Cloning shares the underlying data.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    profiles: DashMap<String, UserProfile>,
    /// Event list; every write notifies subscribers.
    events: watch::Sender<Vec<EventRecord>>,
    attendees: DashMap<String, Vec<Attendee>>,
    next_id: AtomicU64,
    fail_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                profiles: DashMap::new(),
                events,
                attendees: DashMap::new(),
                next_id: AtomicU64::new(1),
                fail_writes: AtomicBool::new(false),
            }),
        }
    }

    /// Insert or replace an event, assigning an ID if it has none.
    /// Returns the event ID.
    pub fn upsert_event(&self, mut event: EventRecord) -> String {
        if event.id.is_empty() {
            let n = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            event.id = format!("event-{}", n);
        }
        let id = event.id.clone();

        self.inner.events.send_modify(|events| {
            match events.iter_mut().find(|e| e.id == event.id) {
                Some(existing) => *existing = event,
                None => events.push(event),
            }
            // Stable: events with equal dates keep insertion order.
            events.sort_by(|a, b| a.date.cmp(&b.date));
        });

        id
    }

    /// Remove an event. Returns whether it existed.
    pub fn remove_event(&self, event_id: &str) -> bool {
        let mut removed = false;
        self.inner.events.send_modify(|events| {
            let before = events.len();
            events.retain(|e| e.id != event_id);
            removed = events.len() != before;
        });
        removed
    }

    pub fn add_attendee(&self, event_id: &str, user_id: &str) {
        let mut list = self.inner.attendees.entry(event_id.to_string()).or_default();
        let id = format!("attendee-{}", list.len() + 1);
        list.push(Attendee {
            id,
            user_id: user_id.to_string(),
        });
    }

    /// Make every subsequent write fail (simulates a permission/transport error).
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of open event subscriptions.
    pub fn active_subscriptions(&self) -> usize {
        self.inner.events.receiver_count()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.inner.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("permission denied".to_string()));
        }
        Ok(())
    }

    fn ordered_events(&self, limit: u32, public_only: bool) -> Vec<EventRecord> {
        take_events(&self.inner.events.borrow(), limit, public_only)
    }
}

fn take_events(events: &[EventRecord], limit: u32, public_only: bool) -> Vec<EventRecord> {
    events
        .iter()
        .filter(|e| !public_only || e.is_public)
        .take(limit as usize)
        .cloned()
        .collect()
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, identity: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .inner
            .profiles
            .get(identity)
            .map(|entry| entry.value().clone()))
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.check_writable()?;
        self.inner
            .profiles
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        identity: &str,
        update: &ProfileUpdate,
    ) -> Result<(), StoreError> {
        self.check_writable()?;
        let mut entry = self
            .inner
            .profiles
            .entry(identity.to_string())
            .or_insert_with(|| UserProfile {
                id: identity.to_string(),
                name: String::new(),
                email: String::new(),
                photo_url: None,
                field_of_study: None,
                bio: None,
                organization: None,
                interests: Default::default(),
                created_at: None,
                updated_at: None,
            });
        update.apply_to(entry.value_mut());
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn list_events(&self, limit: u32) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.ordered_events(limit, false))
    }

    async fn list_public_events(&self, limit: u32) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self.ordered_events(limit, true))
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>, StoreError> {
        Ok(self
            .inner
            .events
            .borrow()
            .iter()
            .find(|e| e.id == event_id)
            .cloned())
    }

    async fn list_attendees(&self, event_id: &str) -> Result<Vec<Attendee>, StoreError> {
        Ok(self
            .inner
            .attendees
            .get(event_id)
            .map(|list| list.value().clone())
            .unwrap_or_default())
    }

    async fn subscribe_events(&self, limit: u32) -> Result<SnapshotStream<EventRecord>, StoreError> {
        let mut rx = self.inner.events.subscribe();
        let initial = take_events(&rx.borrow_and_update(), limit, false);

        let changes = stream::unfold(rx, move |mut rx| async move {
            rx.changed().await.ok()?;
            let snapshot = take_events(&rx.borrow_and_update(), limit, false);
            Some((Ok(snapshot), rx))
        });

        Ok(stream::once(async move { Ok(initial) })
            .chain(changes)
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dated(title: &str, day: u32) -> EventRecord {
        let mut event = EventRecord::new("", title);
        event.date = chrono::Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).single();
        event
    }

    #[tokio::test]
    async fn test_events_ordered_by_date() {
        let store = MemoryStore::new();
        store.upsert_event(dated("Later", 20));
        store.upsert_event(dated("Sooner", 5));
        store.upsert_event(EventRecord::new("", "Undated"));

        let titles: Vec<String> = store
            .list_events(10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();

        assert_eq!(titles, vec!["Undated", "Sooner", "Later"]);
    }

    #[tokio::test]
    async fn test_public_filter_and_limit() {
        let store = MemoryStore::new();
        for day in 1..=5 {
            let mut event = dated(&format!("Event {}", day), day);
            event.is_public = day % 2 == 1;
            store.upsert_event(event);
        }

        let public = store.list_public_events(2).await.unwrap();
        assert_eq!(public.len(), 2);
        assert!(public.iter().all(|e| e.is_public));
        assert_eq!(public[0].title, "Event 1");
        assert_eq!(public[1].title, "Event 3");
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_event() {
        let store = MemoryStore::new();
        let id = store.upsert_event(dated("Draft", 1));

        let mut renamed = dated("Final", 1);
        renamed.id = id.clone();
        store.upsert_event(renamed);

        let events = store.list_events(10).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Final");
        assert!(store.remove_event(&id));
        assert!(!store.remove_event(&id));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_profile_untouched() {
        let store = MemoryStore::new();
        store
            .update_profile("uid", &ProfileUpdate::photo("https://a"))
            .await
            .unwrap();

        store.set_fail_writes(true);
        let err = store
            .update_profile("uid", &ProfileUpdate::photo("https://b"))
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Write(_)));
        let profile = store.get_profile("uid").await.unwrap().unwrap();
        assert_eq!(profile.photo_url.as_deref(), Some("https://a"));
    }
}
