//! User profile model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use validator::Validate;

/// User profile stored in Firestore at `users/{identity}`.
///
/// Field names follow the web client's documents (`name`, `photoURL`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Auth provider UID (also the document ID, never stored as a field)
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Email address (empty if the provider did not share one)
    #[serde(default)]
    pub email: String,
    /// Profile picture URL
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Selected interest tags; a null list or non-string entries read as absent
    #[serde(default, deserialize_with = "super::event::lenient_tags")]
    pub interests: BTreeSet<String>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial profile update. Only fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub field_of_study: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 1000))]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 200))]
    pub organization: Option<String>,
    /// Set only by the upload flow; clients cannot write it directly.
    #[serde(
        rename = "photoURL",
        default,
        skip_deserializing,
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = 2048))]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<BTreeSet<String>>,
    /// Stamped by the service; clients cannot set it.
    #[serde(
        skip_deserializing,
        skip_serializing_if = "Option::is_none",
        serialize_with = "firestore::serialize_as_optional_timestamp::serialize"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProfileUpdate {
    /// Update that replaces only the interest set.
    pub fn interests(interests: BTreeSet<String>) -> Self {
        Self {
            interests: Some(interests),
            ..Default::default()
        }
    }

    /// Update that replaces only the profile picture URL.
    pub fn photo(url: impl Into<String>) -> Self {
        Self {
            photo_url: Some(url.into()),
            ..Default::default()
        }
    }

    /// Firestore field paths covered by this update (the write mask).
    pub fn field_paths(&self) -> Vec<&'static str> {
        let mut paths = Vec::new();
        if self.name.is_some() {
            paths.push("name");
        }
        if self.field_of_study.is_some() {
            paths.push("fieldOfStudy");
        }
        if self.bio.is_some() {
            paths.push("bio");
        }
        if self.organization.is_some() {
            paths.push("organization");
        }
        if self.photo_url.is_some() {
            paths.push("photoURL");
        }
        if self.interests.is_some() {
            paths.push("interests");
        }
        if self.updated_at.is_some() {
            paths.push("updatedAt");
        }
        paths
    }

    pub fn is_empty(&self) -> bool {
        self.field_paths().is_empty()
    }

    /// Apply the provided fields to an in-memory profile.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(name) = &self.name {
            profile.name = name.clone();
        }
        if let Some(field_of_study) = &self.field_of_study {
            profile.field_of_study = Some(field_of_study.clone());
        }
        if let Some(bio) = &self.bio {
            profile.bio = Some(bio.clone());
        }
        if let Some(organization) = &self.organization {
            profile.organization = Some(organization.clone());
        }
        if let Some(photo_url) = &self.photo_url {
            profile.photo_url = Some(photo_url.clone());
        }
        if let Some(interests) = &self.interests {
            profile.interests = interests.clone();
        }
        if let Some(updated_at) = self.updated_at {
            profile.updated_at = Some(updated_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_profile() -> UserProfile {
        UserProfile {
            id: "uid-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            photo_url: None,
            field_of_study: None,
            bio: Some("old bio".to_string()),
            organization: None,
            interests: BTreeSet::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_field_paths_only_cover_provided_fields() {
        let update = ProfileUpdate {
            bio: Some("new".to_string()),
            interests: Some(BTreeSet::from(["NLP".to_string()])),
            ..Default::default()
        };

        assert_eq!(update.field_paths(), vec!["bio", "interests"]);
        assert!(!update.is_empty());
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_apply_leaves_unset_fields_alone() {
        let mut profile = empty_profile();
        ProfileUpdate {
            organization: Some("UW".to_string()),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.organization.as_deref(), Some("UW"));
        assert_eq!(profile.bio.as_deref(), Some("old bio"));
        assert_eq!(profile.name, "Ada");
    }

    #[test]
    fn test_validation_limits() {
        let ok = ProfileUpdate {
            name: Some("Grace".to_string()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let empty_name = ProfileUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_name.validate().is_err());

        let long_bio = ProfileUpdate {
            bio: Some("x".repeat(1001)),
            ..Default::default()
        };
        assert!(long_bio.validate().is_err());
    }

    #[test]
    fn test_malformed_interests_read_as_empty_or_skipped() {
        let null: UserProfile =
            serde_json::from_str(r#"{"name":"Ada","interests":null}"#).unwrap();
        assert!(null.interests.is_empty());

        let mixed: UserProfile =
            serde_json::from_str(r#"{"name":"Ada","interests":["NLP",3,null,"Robotics"]}"#)
                .unwrap();
        assert_eq!(
            mixed.interests.into_iter().collect::<Vec<_>>(),
            vec!["NLP", "Robotics"]
        );

        let missing: UserProfile = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert!(missing.interests.is_empty());
    }

    #[test]
    fn test_client_cannot_set_updated_at() {
        let update: ProfileUpdate =
            serde_json::from_str(r#"{"bio":"hi","updatedAt":"2024-01-01T00:00:00Z"}"#).unwrap();
        assert_eq!(update.bio.as_deref(), Some("hi"));
        assert!(update.updated_at.is_none());

        let update: ProfileUpdate =
            serde_json::from_str(r#"{"photoURL":"https://evil.example/x.png"}"#).unwrap();
        assert!(update.photo_url.is_none());
        assert!(update.is_empty());
    }
}
