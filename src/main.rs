// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! EventScout API Server
//!
//! Serves profiles, the live event feed and interest-based recommendations
//! for the event-discovery web client.

use anyhow::Context;
use eventscout::{
    config::{Config, StoreBackend},
    db::{EventStore, FirestoreDb, MemoryStore, ProfileStore},
    services::FirebaseTokenVerifier,
    storage::{GcsStore, MemoryObjectStore, ObjectStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        backend = ?config.store_backend,
        "Starting EventScout API"
    );

    let (profile_store, event_store, objects): (
        Arc<dyn ProfileStore>,
        Arc<dyn EventStore>,
        Arc<dyn ObjectStore>,
    ) = match config.store_backend {
        StoreBackend::Firestore => {
            let db = FirestoreDb::new(&config.gcp_project_id)
                .await
                .context("Failed to connect to Firestore")?;
            let objects = GcsStore::new(config.storage_bucket.clone())
                .await
                .context("Failed to initialize Cloud Storage")?;
            (Arc::new(db.clone()), Arc::new(db), Arc::new(objects))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            let store = MemoryStore::new();
            (
                Arc::new(store.clone()),
                Arc::new(store),
                Arc::new(MemoryObjectStore::new()),
            )
        }
    };

    let verifier = Arc::new(
        FirebaseTokenVerifier::new(&config).context("Failed to initialize token verifier")?,
    );

    // Build shared state (starts the live events feed)
    let state = Arc::new(AppState::new(
        config.clone(),
        profile_store,
        event_store,
        objects,
        verifier,
    ));

    // Build router
    let app = eventscout::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eventscout=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
