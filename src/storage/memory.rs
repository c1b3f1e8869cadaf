//! In-memory object store for local runs and tests.

use super::{percent, ObjectStore};
use crate::services::upload::UploadError;
use async_trait::async_trait;
use axum::body::Bytes;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Bytes reported per progress step.
const PROGRESS_STEP: usize = 64 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Bytes,
}

/// Cloning shares the stored objects.
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<String, StoredObject>>,
    fail_uploads: Arc<AtomicBool>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.get(path).map(|o| o.value().clone())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Make every subsequent upload fail with a transport error.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        data: Bytes,
        progress: mpsc::UnboundedSender<u8>,
    ) -> Result<String, UploadError> {
        let total = data.len();
        let _ = progress.send(0);

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(UploadError::Transport("connection reset".to_string()));
        }

        let mut done = 0;
        while done < total {
            done = (done + PROGRESS_STEP).min(total);
            let _ = progress.send(percent(done, total));
            tokio::task::yield_now().await;
        }

        self.objects.insert(
            path.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );

        Ok(format!("memory://{}", path))
    }
}
