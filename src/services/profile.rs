// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile access: lazy creation, partial updates and interest editing.
//!
//! Writes are last-writer-wins per field. Toggling an interest reads the
//! set, flips one tag and writes the whole set back, so two concurrent
//! toggles can lose one of the changes.

use crate::db::{ProfileStore, StoreError};
use crate::error::{AppError, Result};
use crate::models::{ProfileUpdate, UserProfile};
use std::collections::BTreeSet;
use std::sync::Arc;
use validator::Validate;

/// Interests given to a profile created without any.
pub const DEFAULT_INTERESTS: [&str; 3] = ["Deep Learning", "NLP", "AI Ethics"];

/// The controlled vocabulary of interest tags.
pub const INTEREST_VOCABULARY: [&str; 20] = [
    "Deep Learning",
    "NLP",
    "Computer Vision",
    "AI Ethics",
    "Reinforcement Learning",
    "Neural Networks",
    "Machine Learning",
    "Data Science",
    "Robotics",
    "Generative AI",
    "Large Language Models",
    "AI in Healthcare",
    "AI in Finance",
    "AI in Education",
    "Explainable AI",
    "Edge AI",
    "AI Hardware",
    "Quantum Computing",
    "Autonomous Systems",
    "Human-AI Interaction",
];

pub fn default_interests() -> BTreeSet<String> {
    DEFAULT_INTERESTS.iter().map(|s| s.to_string()).collect()
}

pub fn is_known_interest(tag: &str) -> bool {
    INTEREST_VOCABULARY.contains(&tag)
}

/// Identity details from the auth provider used to fill a new profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileSeed {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

impl ProfileSeed {
    /// Display name: token name, else the email's local part, else "User".
    fn display_name(&self) -> String {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| {
                self.email
                    .as_deref()
                    .and_then(|e| e.split('@').next())
                    .filter(|local| !local.is_empty())
            })
            .unwrap_or("User")
            .to_string()
    }

    fn into_profile(self, identity: &str) -> UserProfile {
        UserProfile {
            id: identity.to_string(),
            name: self.display_name(),
            email: self.email.unwrap_or_default(),
            photo_url: self.photo_url,
            field_of_study: None,
            bio: None,
            organization: None,
            interests: default_interests(),
            created_at: Some(chrono::Utc::now()),
            updated_at: None,
        }
    }
}

/// Reads and writes user profiles.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn ProfileStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Get a profile, creating a defaulted one if none exists.
    pub async fn get_or_create(&self, identity: &str) -> Result<UserProfile> {
        self.get_or_create_with(identity, ProfileSeed::default())
            .await
    }

    /// Like [`Self::get_or_create`], filling a new profile from `seed`.
    pub async fn get_or_create_with(
        &self,
        identity: &str,
        seed: ProfileSeed,
    ) -> Result<UserProfile> {
        if let Some(profile) = self.store.get_profile(identity).await? {
            return Ok(profile);
        }

        let profile = seed.into_profile(identity);
        self.store.put_profile(&profile).await?;

        tracing::info!(identity = %identity, "Created default profile");
        Ok(profile)
    }

    /// Apply a partial update and return the resulting profile. A missing
    /// profile is created from `seed` first.
    pub async fn update(
        &self,
        identity: &str,
        seed: ProfileSeed,
        mut update: ProfileUpdate,
    ) -> Result<UserProfile> {
        update
            .validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        if let Some(interests) = &update.interests {
            validate_interests(interests)?;
        }
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        let mut profile = self.get_or_create_with(identity, seed).await?;

        update.updated_at = Some(chrono::Utc::now());
        self.store.update_profile(identity, &update).await?;
        update.apply_to(&mut profile);

        tracing::info!(
            identity = %identity,
            fields = ?update.field_paths(),
            "Profile updated"
        );
        Ok(profile)
    }

    /// Replace the whole interest set.
    pub async fn set_interests(
        &self,
        identity: &str,
        seed: ProfileSeed,
        interests: BTreeSet<String>,
    ) -> Result<BTreeSet<String>> {
        let profile = self
            .update(identity, seed, ProfileUpdate::interests(interests))
            .await?;
        Ok(profile.interests)
    }

    /// Add the interest if absent, remove it if present.
    pub async fn toggle_interest(
        &self,
        identity: &str,
        seed: ProfileSeed,
        interest: &str,
    ) -> Result<BTreeSet<String>> {
        if !is_known_interest(interest) {
            return Err(AppError::BadRequest(format!("Unknown interest: {}", interest)));
        }

        let mut interests = self.get_or_create_with(identity, seed).await?.interests;
        if !interests.remove(interest) {
            interests.insert(interest.to_string());
        }

        let mut update = ProfileUpdate::interests(interests.clone());
        update.updated_at = Some(chrono::Utc::now());
        self.store.update_profile(identity, &update).await?;

        tracing::debug!(identity = %identity, interest, count = interests.len(), "Interest toggled");
        Ok(interests)
    }

    /// Record a new profile picture URL.
    pub async fn set_photo(&self, identity: &str, url: &str) -> std::result::Result<(), StoreError> {
        self.store
            .update_profile(identity, &ProfileUpdate::photo(url))
            .await
    }
}

fn validate_interests(interests: &BTreeSet<String>) -> Result<()> {
    match interests.iter().find(|tag| !is_known_interest(tag)) {
        Some(unknown) => Err(AppError::BadRequest(format!("Unknown interest: {}", unknown))),
        None => Ok(()),
    }
}
