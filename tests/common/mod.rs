// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request};
use eventscout::config::Config;
use eventscout::db::{FirestoreDb, MemoryStore};
use eventscout::routes::create_router;
use eventscout::services::firebase_auth::FirebaseClaims;
use eventscout::services::FirebaseTokenVerifier;
use eventscout::storage::MemoryObjectStore;
use eventscout::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test app over in-memory backends, with handles to seed and inspect them.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: MemoryStore,
    pub objects: MemoryObjectStore,
}

/// Create a test app with in-memory store and object store.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(MemoryStore::new())
}

/// Create a test app over an already seeded store.
#[allow(dead_code)]
pub fn create_test_app_with(store: MemoryStore) -> TestApp {
    let config = Config::test_default();
    let objects = MemoryObjectStore::new();
    let verifier = Arc::new(
        FirebaseTokenVerifier::new(&config).expect("Failed to create token verifier"),
    );

    let state = Arc::new(AppState::new(
        config,
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(objects.clone()),
        verifier,
    ));

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        objects,
    }
}

fn now_secs() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}

/// Claims for a valid token for the test project.
#[allow(dead_code)]
pub fn test_claims(uid: &str) -> FirebaseClaims {
    let config = Config::test_default();
    let now = now_secs();
    FirebaseClaims {
        iss: format!("https://securetoken.google.com/{}", config.gcp_project_id),
        aud: config.gcp_project_id,
        sub: uid.to_string(),
        exp: now + 3600,
        iat: Some(now),
        email: Some(format!("{}@example.com", uid)),
        name: None,
        picture: None,
    }
}

/// Sign claims with the test configuration's shared secret.
#[allow(dead_code)]
pub fn sign_token(claims: &FirebaseClaims) -> String {
    let secret = Config::test_default()
        .auth_shared_secret
        .expect("test config has a shared secret");
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Create a valid ID token for `uid`.
#[allow(dead_code)]
pub fn create_test_token(uid: &str) -> String {
    sign_token(&test_claims(uid))
}

/// Build an authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed_request(method: &str, uri: &str, uid: &str, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", create_test_token(uid)));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
