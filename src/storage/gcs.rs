// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cloud Storage uploads using the JSON API's resumable protocol.
//!
//! A session is opened with one POST, then the object is sent in chunks
//! with `Content-Range`. GCS answers 308 for every chunk except the last.

use super::{percent, ObjectStore};
use crate::services::upload::UploadError;
use anyhow::Context;
use async_trait::async_trait;
use axum::body::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::sync::mpsc;

const UPLOAD_BASE: &str = "https://storage.googleapis.com/upload/storage/v1/b";
const DOWNLOAD_BASE: &str = "https://firebasestorage.googleapis.com/v0/b";
const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

/// Chunk size; GCS requires multiples of 256 KiB for all but the last chunk.
const CHUNK_SIZE: usize = 256 * 1024;
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GcsStore {
    http: reqwest::Client,
    bucket: String,
    auth: gcloud_sdk::GoogleAuthTokenGenerator,
}

impl GcsStore {
    /// Create a store for `bucket` using Application Default Credentials.
    pub async fn new(bucket: impl Into<String>) -> anyhow::Result<Self> {
        let bucket = bucket.into();

        // 308 is part of the protocol, not a redirect to follow.
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed building storage HTTP client")?;

        let auth = gcloud_sdk::GoogleAuthTokenGenerator::new(
            gcloud_sdk::TokenSourceType::Default,
            vec![STORAGE_SCOPE.to_string()],
        )
        .await
        .context("failed initializing storage credentials")?;

        tracing::info!(bucket = %bucket, "Initialized Cloud Storage client");

        Ok(Self { http, bucket, auth })
    }

    async fn authorization(&self) -> Result<String, UploadError> {
        let token = self
            .auth
            .create_token()
            .await
            .map_err(|e| UploadError::Transport(format!("storage credentials: {}", e)))?;
        Ok(format!(
            "{} {}",
            token.token_type,
            token.token.as_sensitive_str()
        ))
    }

    /// Open a resumable session and return its URI.
    async fn start_session(
        &self,
        authorization: &str,
        path: &str,
        content_type: &str,
        size: usize,
    ) -> Result<String, UploadError> {
        let url = format!(
            "{}/{}/o?uploadType=resumable&name={}",
            UPLOAD_BASE,
            self.bucket,
            urlencoding::encode(path)
        );

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, authorization)
            .header("X-Upload-Content-Type", content_type)
            .header("X-Upload-Content-Length", size.to_string())
            .json(&serde_json::json!({ "contentType": content_type }))
            .send()
            .await
            .map_err(|e| UploadError::Transport(format!("session request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Transport(format!(
                "session request returned {}: {}",
                status, body
            )));
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| UploadError::Transport("session response had no Location".to_string()))
    }
}

/// Firebase download URL for an object.
fn download_url(bucket: &str, path: &str) -> String {
    format!(
        "{}/{}/o/{}?alt=media",
        DOWNLOAD_BASE,
        bucket,
        urlencoding::encode(path)
    )
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn put_object(
        &self,
        path: &str,
        content_type: &str,
        data: Bytes,
        progress: mpsc::UnboundedSender<u8>,
    ) -> Result<String, UploadError> {
        let total = data.len();
        let authorization = self.authorization().await?;
        let session = self
            .start_session(&authorization, path, content_type, total)
            .await?;

        let _ = progress.send(0);

        let mut offset = 0;
        while offset < total {
            let end = (offset + CHUNK_SIZE).min(total);
            let chunk = data.slice(offset..end);

            let response = self
                .http
                .put(&session)
                .header(CONTENT_TYPE, content_type)
                .header(CONTENT_RANGE, format!("bytes {}-{}/{}", offset, end - 1, total))
                .body(chunk)
                .send()
                .await
                .map_err(|e| UploadError::Transport(format!("chunk upload failed: {}", e)))?;

            let status = response.status();
            let last = end == total;
            let accepted = if last {
                status.is_success()
            } else {
                status == StatusCode::PERMANENT_REDIRECT
            };
            if !accepted {
                let body = response.text().await.unwrap_or_default();
                return Err(UploadError::Transport(format!(
                    "chunk {}-{} returned {}: {}",
                    offset, end, status, body
                )));
            }

            offset = end;
            let _ = progress.send(percent(offset, total));
            tracing::debug!(path, offset, total, "Uploaded chunk");
        }

        Ok(download_url(&self.bucket, path))
    }
}
