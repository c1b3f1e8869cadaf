// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Live query: keeps the latest full snapshot of a standing store query.
//!
//! A background task drains a [`SnapshotStream`] into a `watch` channel, so
//! readers always observe one whole snapshot (latest wins) and never a mix
//! of two. Dropping the [`LiveQuery`] aborts the task, which drops the
//! stream and with it the store subscription.

use crate::db::{SnapshotStream, StoreError};
use futures_util::StreamExt;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Observable state of a live query.
#[derive(Debug)]
pub struct LiveQueryState<T> {
    /// True until the first snapshot (or an error) arrives.
    pub loading: bool,
    /// Last full snapshot; empty until the first one arrives.
    pub data: Arc<Vec<T>>,
    /// Set once the subscription fails; terminal.
    pub error: Option<String>,
}

impl<T> Default for LiveQueryState<T> {
    fn default() -> Self {
        Self {
            loading: true,
            data: Arc::new(Vec::new()),
            error: None,
        }
    }
}

impl<T> Clone for LiveQueryState<T> {
    fn clone(&self) -> Self {
        Self {
            loading: self.loading,
            data: Arc::clone(&self.data),
            error: self.error.clone(),
        }
    }
}

/// Handle to a running live query. The subscription lives exactly as long
/// as this handle.
pub struct LiveQuery<T> {
    state: watch::Receiver<LiveQueryState<T>>,
    task: JoinHandle<()>,
}

impl<T> LiveQuery<T>
where
    T: Send + Sync + 'static,
{
    /// Start a live query. `open` establishes the subscription; a failure
    /// there is reported through [`LiveQueryState::error`].
    pub fn spawn<F>(name: &'static str, open: F) -> Self
    where
        F: Future<Output = Result<SnapshotStream<T>, StoreError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(LiveQueryState::default());
        let task = tokio::spawn(drive(name, open, tx));
        Self { state: rx, task }
    }

    /// Current state.
    pub fn snapshot(&self) -> LiveQueryState<T> {
        self.state.borrow().clone()
    }

    /// A receiver that is notified on every state change.
    pub fn watch(&self) -> watch::Receiver<LiveQueryState<T>> {
        self.state.clone()
    }

    /// Wait until the query has stopped loading.
    pub async fn settled(&self) -> LiveQueryState<T> {
        let mut rx = self.state.clone();
        let state = match rx.wait_for(|state| !state.loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        };
        state
    }

    /// Whether the subscription is still delivering snapshots.
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drive<T, F>(name: &'static str, open: F, tx: watch::Sender<LiveQueryState<T>>)
where
    F: Future<Output = Result<SnapshotStream<T>, StoreError>>,
{
    let mut stream = match open.await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::error!(query = name, error = %e, "Failed to establish live query");
            fail(&tx, e);
            return;
        }
    };

    tracing::debug!(query = name, "Live query established");

    while let Some(item) = stream.next().await {
        match item {
            Ok(snapshot) => {
                tracing::debug!(query = name, count = snapshot.len(), "Snapshot received");
                tx.send_replace(LiveQueryState {
                    loading: false,
                    data: Arc::new(snapshot),
                    error: None,
                });
            }
            Err(e) => {
                tracing::error!(query = name, error = %e, "Live query failed");
                fail(&tx, e);
                return;
            }
        }
    }

    // Store closed the subscription without an error.
    tx.send_modify(|state| state.loading = false);
    tracing::debug!(query = name, "Live query ended");
}

/// Record a terminal error, keeping the last good data.
fn fail<T>(tx: &watch::Sender<LiveQueryState<T>>, error: StoreError) {
    tx.send_modify(|state| {
        state.loading = false;
        state.error = Some(error.to_string());
    });
}
