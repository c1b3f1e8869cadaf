// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile picture upload.
//!
//! Input is validated before anything touches the network. Once started, an
//! upload runs to completion or failure in its own task; dropping the
//! [`UploadTask`] only stops observing it.

use crate::db::StoreError;
use crate::services::profile::ProfileService;
use crate::storage::ObjectStore;
use axum::body::Bytes;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Largest accepted image (5 MiB).
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Object prefix for profile pictures.
pub const PROFILE_PICTURES_PREFIX: &str = "profile_pictures";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Image is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),

    #[error("Upload is empty")]
    Empty,

    #[error("Upload failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Object path for a user's picture. One object per identity, overwritten
/// by every upload.
pub fn profile_picture_path(identity: &str) -> String {
    format!("{}/{}", PROFILE_PICTURES_PREFIX, identity)
}

/// Check an upload before starting it.
pub fn validate_image(content_type: &str, size: usize) -> Result<(), UploadError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !essence.starts_with("image/") {
        return Err(UploadError::UnsupportedType(content_type.to_string()));
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(UploadError::TooLarge {
            size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}

/// A running upload.
pub struct UploadTask {
    progress: mpsc::UnboundedReceiver<u8>,
    handle: JoinHandle<Result<String, UploadError>>,
}

impl UploadTask {
    /// Next progress percentage, or `None` once the upload stopped reporting.
    pub async fn next_progress(&mut self) -> Option<u8> {
        self.progress.recv().await
    }

    /// Wait for the upload to finish, returning the stored picture URL.
    pub async fn finish(self) -> Result<String, UploadError> {
        self.handle
            .await
            .map_err(|e| UploadError::Transport(format!("Upload task failed: {}", e)))?
    }

    /// Collect every progress value, then wait for the result.
    pub async fn complete(mut self) -> (Vec<u8>, Result<String, UploadError>) {
        let mut seen = Vec::new();
        while let Some(percent) = self.next_progress().await {
            seen.push(percent);
        }
        (seen, self.finish().await)
    }
}

#[derive(Clone)]
pub struct UploadService {
    objects: Arc<dyn ObjectStore>,
    profiles: ProfileService,
}

impl UploadService {
    pub fn new(objects: Arc<dyn ObjectStore>, profiles: ProfileService) -> Self {
        Self { objects, profiles }
    }

    /// Validate and start uploading a new profile picture.
    ///
    /// On success the picture's URL is written to the profile's `photoURL`.
    /// A transport failure leaves the profile untouched and is not retried.
    pub fn start_upload(
        &self,
        identity: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<UploadTask, UploadError> {
        validate_image(content_type, data.len())?;

        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let objects = Arc::clone(&self.objects);
        let profiles = self.profiles.clone();
        let identity = identity.to_string();
        let content_type = content_type.to_string();
        let path = profile_picture_path(&identity);
        let size = data.len();

        tracing::info!(identity = %identity, size, content_type = %content_type, "Starting profile picture upload");

        let handle = tokio::spawn(async move {
            let url = match objects
                .put_object(&path, &content_type, data, progress_tx)
                .await
            {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!(identity = %identity, error = %e, "Profile picture upload failed");
                    return Err(e);
                }
            };

            profiles.set_photo(&identity, &url).await?;

            tracing::info!(identity = %identity, "Profile picture updated");
            Ok(url)
        });

        Ok(UploadTask {
            progress: progress_rx,
            handle,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_rejects_before_upload() {
        assert!(validate_image("image/png", 1024).is_ok());
        assert!(validate_image("image/jpeg; charset=binary", 10).is_ok());
        assert!(validate_image("IMAGE/GIF", MAX_UPLOAD_BYTES).is_ok());

        assert_eq!(
            validate_image("application/pdf", 10),
            Err(UploadError::UnsupportedType("application/pdf".to_string()))
        );
        assert_eq!(validate_image("image/png", 0), Err(UploadError::Empty));
        assert!(matches!(
            validate_image("image/png", MAX_UPLOAD_BYTES + 1),
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_object_path_is_per_identity() {
        assert_eq!(profile_picture_path("uid-42"), "profile_pictures/uid-42");
    }
}
