// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event, attendee and match models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::UserProfile;

/// Event record stored in Firestore at `events/{eventId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    /// Document ID assigned by the store
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Event date; `None` is shown as "Date TBD"
    #[serde(default, with = "firestore::serialize_as_optional_timestamp")]
    pub date: Option<DateTime<Utc>>,
    /// Free-form time range, e.g. "2:00 PM - 4:00 PM"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Topic labels, in display order
    #[serde(default, deserialize_with = "lenient_tags")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendee_count: Option<u32>,
    /// Only public events are eligible for recommendation
    #[serde(default)]
    pub is_public: bool,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl EventRecord {
    /// Minimal event with a title, used when seeding stores.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            date: None,
            time: None,
            location: None,
            tags: Vec::new(),
            attendee_count: None,
            is_public: false,
            image_url: None,
        }
    }
}

/// Attendance record at `events/{eventId}/attendees/{attendeeId}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub id: String,
    pub user_id: String,
}

/// Attendee joined with the attending user's profile.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendeeProfile {
    pub attendee: Attendee,
    pub user: UserProfile,
}

/// An event together with its computed match score (0..=100).
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub event: EventRecord,
    pub match_score: u8,
}

/// Deserialize a tag list, skipping entries that are not strings.
///
/// Older documents were written by hand and may contain numbers or nulls
/// in `tags`; a missing or null list is treated as empty.
pub(super) fn lenient_tags<'de, D, C>(deserializer: D) -> Result<C, D::Error>
where
    D: Deserializer<'de>,
    C: FromIterator<String>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TagEntry {
        Tag(String),
        Other(serde::de::IgnoredAny),
    }

    let entries: Option<Vec<TagEntry>> = Option::deserialize(deserializer)?;

    Ok(entries
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| match entry {
            TagEntry::Tag(tag) => Some(tag),
            TagEntry::Other(_) => None,
        })
        .collect())
}
