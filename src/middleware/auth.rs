// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token authentication middleware.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

pub use crate::services::firebase_auth::AuthUser;

/// Cookie the web client sets with the current ID token.
pub const SESSION_COOKIE: &str = "__session";

/// Middleware that requires a valid ID token and inserts the [`AuthUser`]
/// into request extensions.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let user = match jar.get(SESSION_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => state.verifier.verify(cookie.value()).await,
        _ => match request.headers().get(header::AUTHORIZATION) {
            Some(value) => state.verifier.verify_header(Some(value)).await,
            None => return Err(AppError::Unauthorized),
        },
    }?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
