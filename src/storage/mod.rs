//! Object storage for uploaded files (Cloud Storage, plus an in-memory store).

pub mod gcs;
pub mod memory;

pub use gcs::GcsStore;
pub use memory::MemoryObjectStore;

use crate::services::upload::UploadError;
use async_trait::async_trait;
use axum::body::Bytes;
use tokio::sync::mpsc;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` at `path`, overwriting any existing object, and return
    /// the URL it can be downloaded from.
    ///
    /// Progress percentages (0..=100, non-decreasing) are sent on `progress`
    /// as the upload proceeds; the sender is dropped when the upload ends.
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        data: Bytes,
        progress: mpsc::UnboundedSender<u8>,
    ) -> Result<String, UploadError>;
}

/// Percentage of `total` covered by `done`, rounded down.
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}
