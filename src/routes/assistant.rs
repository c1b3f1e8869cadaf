// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event-creation assistant routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::services::assistant::{EventDraft, GREETING};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/assistant", get(start_draft).post(send_message))
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AssistantResponse {
    pub reply: String,
    pub draft: EventDraft,
}

#[derive(Deserialize)]
pub struct AssistantMessage {
    pub message: String,
}

/// Start a fresh draft, discarding any previous one.
async fn start_draft(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<AssistantResponse> {
    let draft = state.assistant.reset(&user.uid);
    Json(AssistantResponse {
        reply: GREETING.to_string(),
        draft,
    })
}

async fn send_message(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AssistantMessage>,
) -> Result<Json<AssistantResponse>> {
    let (draft, reply) = state.assistant.send(&user.uid, &request.message)?;
    Ok(Json(AssistantResponse { reply, draft }))
}
