// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firebase ID token verification.

use crate::config::Config;
use anyhow::Context;
use axum::http::HeaderValue;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};

const JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";
const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);
const CLOCK_SKEW_SECS: u64 = 60;

/// Signed-in user extracted from a valid ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Firebase UID; also the profile document ID.
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

/// Token verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The token is missing, malformed, expired or issued for another project.
    #[error("{0}")]
    Rejected(String),
    /// Signing keys could not be fetched.
    #[error("Auth provider unavailable: {0}")]
    Transient(String),
}

enum VerifierMode {
    /// Google-published RS256 keys.
    Jwks,
    /// HS256 tokens signed with a local secret (development and tests).
    SharedSecret(Arc<DecodingKey>),
}

#[derive(Clone)]
struct JwksCacheEntry {
    keys_by_kid: HashMap<String, Arc<DecodingKey>>,
    expires_at: Instant,
}

/// Verifier for Firebase Authentication ID tokens.
pub struct FirebaseTokenVerifier {
    http_client: reqwest::Client,
    project_id: String,
    issuer: String,
    mode: VerifierMode,
    jwks_cache: RwLock<Option<JwksCacheEntry>>,
    refresh_lock: Mutex<()>,
}

impl FirebaseTokenVerifier {
    /// Create a verifier for the configured project. Uses the shared secret
    /// if one is configured, Google's JWKS otherwise.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        match &config.auth_shared_secret {
            Some(secret) => {
                tracing::warn!("Verifying ID tokens with a shared secret (development mode)");
                Self::with_shared_secret(&config.gcp_project_id, secret.as_bytes())
            }
            None => Self::with_mode(&config.gcp_project_id, VerifierMode::Jwks),
        }
    }

    /// Create a verifier for HS256 tokens signed with `secret`.
    pub fn with_shared_secret(project_id: &str, secret: &[u8]) -> anyhow::Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("shared secret must not be empty");
        }
        Self::with_mode(
            project_id,
            VerifierMode::SharedSecret(Arc::new(DecodingKey::from_secret(secret))),
        )
    }

    fn with_mode(project_id: &str, mode: VerifierMode) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building token verifier HTTP client")?;

        let issuer = format!("{}{}", ISSUER_PREFIX, project_id);
        tracing::info!(issuer = %issuer, "Initialized Firebase token verifier");

        Ok(Self {
            http_client,
            project_id: project_id.to_string(),
            issuer,
            mode,
            jwks_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Verify a bearer token from an Authorization header.
    pub async fn verify_header(&self, auth_header: Option<&HeaderValue>) -> Result<AuthUser, AuthError> {
        let token = extract_bearer_token(auth_header)?;
        self.verify(token).await
    }

    /// Verify a raw ID token.
    pub async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let header = decode_header(token)
            .map_err(|e| AuthError::Rejected(format!("invalid JWT header: {e}")))?;

        let (algorithm, decoding_key) = match &self.mode {
            VerifierMode::SharedSecret(key) => (Algorithm::HS256, Arc::clone(key)),
            VerifierMode::Jwks => {
                let kid = header
                    .kid
                    .as_deref()
                    .ok_or_else(|| AuthError::Rejected("missing JWT kid".to_string()))?;
                (Algorithm::RS256, self.decoding_key_for_kid(kid).await?)
            }
        };

        if header.alg != algorithm {
            return Err(AuthError::Rejected(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let mut validation = Validation::new(algorithm);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.leeway = CLOCK_SKEW_SECS;

        let claims = decode::<FirebaseClaims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| AuthError::Rejected(format!("JWT validation failed: {e}")))?
            .claims;

        validate_iat(claims.iat)?;

        if claims.sub.is_empty() {
            return Err(AuthError::Rejected("empty sub claim".to_string()));
        }

        tracing::debug!(uid = %claims.sub, "Verified ID token");

        Ok(AuthUser {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
        })
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, AuthError> {
        if let Some(key) = self.lookup_cached_key(kid).await {
            return Ok(key);
        }

        // Keys rotate; an unknown kid forces one refresh before rejecting.
        for force_refresh in [false, true] {
            self.refresh_jwks(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(AuthError::Rejected(format!(
            "JWT kid not found in JWKS after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.jwks_cache.read().await;
        let now = Instant::now();
        cache
            .as_ref()
            .filter(|entry| entry.expires_at > now)
            .and_then(|entry| entry.keys_by_kid.get(kid))
            .cloned()
    }

    async fn refresh_jwks(&self, force_refresh: bool) -> Result<(), AuthError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh {
            let cache = self.jwks_cache.read().await;
            if cache
                .as_ref()
                .is_some_and(|entry| entry.expires_at > Instant::now())
            {
                return Ok(());
            }
        }

        tracing::debug!("Refreshing Firebase JWKS cache");

        let response = self
            .http_client
            .get(JWKS_URL)
            .send()
            .await
            .map_err(|e| AuthError::Transient(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AuthError::Transient(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let ttl = cache_ttl_from_headers(response.headers(), DEFAULT_CACHE_TTL);

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| AuthError::Transient(format!("invalid JWKS JSON: {e}")))?;

        let keys_by_kid = usable_keys(jwks);
        if keys_by_kid.is_empty() {
            return Err(AuthError::Transient(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        *self.jwks_cache.write().await = Some(JwksCacheEntry {
            keys_by_kid,
            expires_at: Instant::now() + ttl,
        });

        tracing::debug!(ttl_secs = ttl.as_secs(), "Firebase JWKS cache refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

/// ID token claims. Also used to mint shared-secret tokens in tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirebaseClaims {
    pub iss: String,
    pub aud: String,
    pub sub: String,
    pub exp: usize,
    pub iat: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}

fn usable_keys(jwks: Jwks) -> HashMap<String, Arc<DecodingKey>> {
    let mut keys_by_kid = HashMap::new();

    for jwk in jwks.keys {
        if jwk.kty != "RSA" || jwk.kid.trim().is_empty() {
            continue;
        }
        if jwk.alg.as_deref().is_some_and(|alg| alg != "RS256") {
            continue;
        }
        if jwk.use_.as_deref().is_some_and(|use_| use_ != "sig") {
            continue;
        }

        match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
            Ok(key) => {
                keys_by_kid.insert(jwk.kid, Arc::new(key));
            }
            Err(e) => {
                tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
            }
        }
    }

    keys_by_kid
}

pub fn extract_bearer_token(auth_header: Option<&HeaderValue>) -> Result<&str, AuthError> {
    let value = auth_header
        .ok_or_else(|| AuthError::Rejected("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| AuthError::Rejected("invalid Authorization header".to_string()))?;

    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        AuthError::Rejected("Authorization header must be Bearer token".to_string())
    })?;

    if token.is_empty() {
        return Err(AuthError::Rejected("Bearer token is empty".to_string()));
    }

    Ok(token)
}

fn validate_iat(iat: Option<usize>) -> Result<(), AuthError> {
    let Some(iat) = iat else {
        return Err(AuthError::Rejected("missing iat claim".to_string()));
    };

    if iat as u64 > now_unix_secs() + CLOCK_SKEW_SECS {
        return Err(AuthError::Rejected("iat claim is in the future".to_string()));
    }

    Ok(())
}

fn cache_ttl_from_headers(headers: &reqwest::header::HeaderMap, fallback: Duration) -> Duration {
    headers
        .get(CACHE_CONTROL)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_cache_control_max_age)
        .map(Duration::from_secs)
        .unwrap_or(fallback)
}

fn parse_cache_control_max_age(value: &str) -> Option<u64> {
    value
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|raw| raw.trim_matches('"').parse::<u64>().ok())
}

pub(crate) fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
