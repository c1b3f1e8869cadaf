// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running and
//! FIRESTORE_EMULATOR_HOST to point at it. The emulator database is shared
//! between tests, so every test works under unique IDs.

use chrono::TimeZone;
use eventscout::db::{EventStore, FirestoreDb, ProfileStore, StoreError};
use eventscout::models::{Attendee, EventRecord, ProfileUpdate, UserProfile};
use std::collections::BTreeSet;

mod common;
use common::test_db;

/// Unique suffix for test isolation.
fn unique_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}

fn test_profile(id: &str) -> UserProfile {
    UserProfile {
        id: id.to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        photo_url: None,
        field_of_study: Some("Mathematics".to_string()),
        bio: None,
        organization: Some("Analytical Engines".to_string()),
        interests: ["NLP", "Robotics"].iter().map(|s| s.to_string()).collect(),
        created_at: chrono::Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single(),
        updated_at: None,
    }
}

#[tokio::test]
async fn test_profile_roundtrip() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");
    assert!(db.get_profile(&id).await.unwrap().is_none());

    let profile = test_profile(&id);
    db.put_profile(&profile).await.unwrap();

    let fetched = db.get_profile(&id).await.unwrap().unwrap();
    assert_eq!(fetched.id, id);
    assert_eq!(fetched.name, "Ada");
    assert_eq!(fetched.interests, profile.interests);
    assert_eq!(fetched.created_at, profile.created_at);
}

#[tokio::test]
async fn test_update_writes_only_given_fields() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");
    db.put_profile(&test_profile(&id)).await.unwrap();

    let interests: BTreeSet<String> = ["Computer Vision".to_string()].into_iter().collect();
    db.update_profile(&id, &ProfileUpdate::interests(interests.clone()))
        .await
        .unwrap();
    db.update_profile(&id, &ProfileUpdate::photo("https://example.com/a.png"))
        .await
        .unwrap();

    let fetched = db.get_profile(&id).await.unwrap().unwrap();
    assert_eq!(fetched.interests, interests);
    assert_eq!(fetched.photo_url.as_deref(), Some("https://example.com/a.png"));
    // Untouched by either update.
    assert_eq!(fetched.field_of_study.as_deref(), Some("Mathematics"));
    assert_eq!(fetched.organization.as_deref(), Some("Analytical Engines"));
    assert_eq!(fetched.name, "Ada");
}

#[tokio::test]
async fn test_update_creates_missing_profile() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("user");
    db.update_profile(&id, &ProfileUpdate::photo("https://example.com/b.png"))
        .await
        .unwrap();

    let fetched = db.get_profile(&id).await.unwrap().unwrap();
    assert_eq!(fetched.photo_url.as_deref(), Some("https://example.com/b.png"));
    assert!(fetched.interests.is_empty());
}

#[tokio::test]
async fn test_events_ordering_and_public_filter() {
    require_emulator!();

    let db = test_db().await;
    let run = unique_id("run");

    // Far-future dates keep these after any other test's events.
    for (n, day, public) in [(1, 20, true), (2, 5, false), (3, 12, true)] {
        let mut event = EventRecord::new(format!("{}-{}", run, n), format!("{} #{}", run, n));
        event.date = chrono::Utc.with_ymd_and_hms(2999, 1, day, 12, 0, 0).single();
        event.is_public = public;
        event.tags = vec!["NLP".to_string()];
        db.put_event(&event).await.unwrap();
    }

    let ours = |events: Vec<EventRecord>| -> Vec<String> {
        events
            .into_iter()
            .filter(|e| e.title.starts_with(&run))
            .map(|e| e.id)
            .collect()
    };

    let all = ours(db.list_events(1000).await.unwrap());
    assert_eq!(
        all,
        vec![format!("{}-2", run), format!("{}-3", run), format!("{}-1", run)]
    );

    let public = ours(db.list_public_events(1000).await.unwrap());
    assert_eq!(public, vec![format!("{}-3", run), format!("{}-1", run)]);

    let fetched = db.get_event(&format!("{}-3", run)).await.unwrap().unwrap();
    assert_eq!(fetched.tags, vec!["NLP"]);
    assert!(fetched.is_public);
}

#[tokio::test]
async fn test_attendees_subcollection() {
    require_emulator!();

    let db = test_db().await;
    let event_id = unique_id("event");
    db.put_event(&EventRecord::new(event_id.clone(), "Attended"))
        .await
        .unwrap();

    for uid in ["ada", "grace"] {
        db.put_attendee(
            &event_id,
            &Attendee {
                id: format!("att-{}", uid),
                user_id: uid.to_string(),
            },
        )
        .await
        .unwrap();
    }

    let mut user_ids: Vec<String> = db
        .list_attendees(&event_id)
        .await
        .unwrap()
        .into_iter()
        .map(|a| a.user_id)
        .collect();
    user_ids.sort();
    assert_eq!(user_ids, vec!["ada", "grace"]);

    assert!(db.list_attendees(&unique_id("empty")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_offline_client_reports_offline() {
    let db = FirestoreDb::new_mock();

    assert_eq!(db.get_profile("x").await.unwrap_err(), StoreError::Offline);
    assert_eq!(db.list_events(10).await.unwrap_err(), StoreError::Offline);
    assert!(matches!(
        db.subscribe_events(10).await.err(),
        Some(StoreError::Offline)
    ));
}
