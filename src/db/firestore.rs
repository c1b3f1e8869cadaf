// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile documents, partial updates)
//! - Events (ordered queries, public filter, live snapshots)
//! - Attendees (subcollection under each event)

use crate::db::{collections, EventStore, ProfileStore, SnapshotStream, StoreError};
use crate::models::{Attendee, EventRecord, ProfileUpdate, UserProfile};
use async_trait::async_trait;
use firestore::{FirestoreListenerTarget, FirestoreMemListenStateStorage, FirestoreQueryDirection};
use futures_util::{stream, StreamExt};
use tokio::sync::mpsc;

/// Listener target ID for the live events query.
const EVENTS_LISTEN_TARGET: u32 = 1;
/// Snapshots buffered between the listener pump and the consumer.
const SNAPSHOT_BUFFER: usize = 4;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, StoreError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| StoreError::Connect(e.to_string()))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, StoreError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| StoreError::Connect(format!("Firestore Emulator: {}", e)))?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, StoreError> {
        self.client.as_ref().ok_or(StoreError::Offline)
    }

    /// Query events ordered by date, optionally restricted to public ones.
    async fn query_events(&self, limit: u32, public_only: bool) -> Result<Vec<EventRecord>, StoreError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::EVENTS);

        let query = if public_only {
            query.filter(|q| q.field("isPublic").eq(true))
        } else {
            query
        };

        query
            .order_by([("date", FirestoreQueryDirection::Ascending)])
            .limit(limit)
            .obj()
            .query()
            .await
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    /// Write a whole event document. Used by seeding scripts and tests;
    /// the API never writes events.
    pub async fn put_event(&self, event: &EventRecord) -> Result<(), StoreError> {
        let _: EventRecord = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::EVENTS)
            .document_id(&event.id)
            .object(event)
            .execute()
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    /// Record an attendee under `events/{eventId}/attendees`.
    pub async fn put_attendee(&self, event_id: &str, attendee: &Attendee) -> Result<(), StoreError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::EVENTS, event_id)
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let _: Attendee = client
            .fluent()
            .update()
            .in_col(collections::ATTENDEES)
            .document_id(&attendee.id)
            .parent(&parent_path)
            .object(attendee)
            .execute()
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for FirestoreDb {
    async fn get_profile(&self, identity: &str) -> Result<Option<UserProfile>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(identity)
            .await
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    async fn put_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        let _: UserProfile = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }

    async fn update_profile(
        &self,
        identity: &str,
        update: &ProfileUpdate,
    ) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }

        // The field mask keeps fields absent from `update` untouched.
        let _: UserProfile = self
            .get_client()?
            .fluent()
            .update()
            .fields(update.field_paths())
            .in_col(collections::USERS)
            .document_id(identity)
            .object(update)
            .execute()
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for FirestoreDb {
    async fn list_events(&self, limit: u32) -> Result<Vec<EventRecord>, StoreError> {
        self.query_events(limit, false).await
    }

    async fn list_public_events(&self, limit: u32) -> Result<Vec<EventRecord>, StoreError> {
        self.query_events(limit, true).await
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<EventRecord>, StoreError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::EVENTS)
            .obj()
            .one(event_id)
            .await
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    async fn list_attendees(&self, event_id: &str) -> Result<Vec<Attendee>, StoreError> {
        let client = self.get_client()?;
        let parent_path = client
            .parent_path(collections::EVENTS, event_id)
            .map_err(|e| StoreError::Read(e.to_string()))?;

        client
            .fluent()
            .select()
            .from(collections::ATTENDEES)
            .parent(&parent_path)
            .obj()
            .query()
            .await
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    /// Firestore's listener delivers per-document changes. Every change only
    /// marks the query dirty; a pump task re-reads the ordered query and
    /// forwards the whole result, so consumers always see full snapshots.
    /// The listener is shut down once the returned stream is dropped.
    async fn subscribe_events(&self, limit: u32) -> Result<SnapshotStream<EventRecord>, StoreError> {
        let client = self.get_client()?;

        let mut listener = client
            .create_listener(FirestoreMemListenStateStorage::new())
            .await
            .map_err(|e| StoreError::Read(format!("Failed to create listener: {}", e)))?;

        client
            .fluent()
            .select()
            .from(collections::EVENTS)
            .order_by([("date", FirestoreQueryDirection::Ascending)])
            .limit(limit)
            .listen()
            .add_target(FirestoreListenerTarget::new(EVENTS_LISTEN_TARGET), &mut listener)
            .map_err(|e| StoreError::Read(format!("Failed to add listen target: {}", e)))?;

        // Capacity 1: pings arriving while a re-read is pending coalesce.
        let (dirty_tx, mut dirty_rx) = mpsc::channel::<()>(1);
        let _ = dirty_tx.try_send(());

        listener
            .start(move |_event| {
                let dirty_tx = dirty_tx.clone();
                async move {
                    let _ = dirty_tx.try_send(());
                    Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
                }
            })
            .await
            .map_err(|e| StoreError::Read(format!("Failed to start listener: {}", e)))?;

        tracing::debug!(limit, "Events listener started");

        let (snapshot_tx, snapshot_rx) = mpsc::channel(SNAPSHOT_BUFFER);
        let db = self.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = snapshot_tx.closed() => break,
                    dirty = dirty_rx.recv() => {
                        if dirty.is_none() {
                            break;
                        }
                        let snapshot = db.query_events(limit, false).await;
                        let failed = snapshot.is_err();
                        if snapshot_tx.send(snapshot).await.is_err() || failed {
                            break;
                        }
                    }
                }
            }

            if let Err(e) = listener.shutdown().await {
                tracing::warn!(error = %e, "Failed to shut down events listener");
            }
            tracing::debug!("Events listener released");
        });

        Ok(stream::unfold(snapshot_rx, |mut rx| async move {
            rx.recv().await.map(|snapshot| (snapshot, rx))
        })
        .boxed())
    }
}
