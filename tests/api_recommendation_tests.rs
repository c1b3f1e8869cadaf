// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event feed and recommendation endpoints over the in-memory store.

use axum::http::StatusCode;
use chrono::{Duration, TimeZone, Utc};
use eventscout::db::{MemoryStore, ProfileStore};
use eventscout::models::{EventRecord, UserProfile};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{authed_request, body_json, create_test_app_with};

fn public_event(title: &str, day: u32, tags: &[&str]) -> EventRecord {
    let mut event = EventRecord::new("", title);
    event.date = Utc.with_ymd_and_hms(2030, 3, day, 17, 0, 0).single();
    event.tags = tags.iter().map(|t| t.to_string()).collect();
    event.is_public = true;
    event
}

async fn seed_profile(store: &MemoryStore, uid: &str, interests: &[&str]) {
    store
        .put_profile(&UserProfile {
            id: uid.to_string(),
            name: uid.to_string(),
            email: String::new(),
            photo_url: None,
            field_of_study: None,
            bio: None,
            organization: None,
            interests: interests.iter().map(|t| t.to_string()).collect(),
            created_at: None,
            updated_at: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_recommendations_ranked_and_filtered() {
    let store = MemoryStore::new();
    seed_profile(&store, "reader", &["NLP", "AI Ethics"]).await;

    store.upsert_event(public_event("Robots only", 1, &["Robotics"]));
    store.upsert_event(public_event("Half match", 2, &["NLP", "Robotics"]));
    store.upsert_event(public_event("Full match", 3, &["AI Ethics", "NLP"]));
    let mut private = public_event("Private full match", 4, &["AI Ethics", "NLP"]);
    private.is_public = false;
    store.upsert_event(private);

    let app = create_test_app_with(store);
    let response = app
        .router
        .oneshot(authed_request("GET", "/api/recommendations", "reader", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let recs = body["recommendations"].as_array().unwrap();

    assert_eq!(recs.len(), 2);
    assert_eq!(recs[0]["event"]["title"], "Full match");
    assert_eq!(recs[0]["matchScore"], 100);
    assert_eq!(recs[1]["event"]["title"], "Half match");
    assert_eq!(recs[1]["matchScore"], 50);
}

#[tokio::test]
async fn test_recommendation_ties_keep_date_order() {
    let store = MemoryStore::new();
    seed_profile(&store, "reader", &["NLP"]).await;
    // Inserted out of order; the store orders by date.
    store.upsert_event(public_event("Later", 5, &["NLP"]));
    store.upsert_event(public_event("Sooner", 1, &["NLP"]));

    let app = create_test_app_with(store);
    let body = body_json(
        app.router
            .oneshot(authed_request("GET", "/api/recommendations", "reader", None))
            .await
            .unwrap(),
    )
    .await;

    let titles: Vec<&str> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["event"]["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Sooner", "Later"]);
}

#[tokio::test]
async fn test_recommendation_limit() {
    let store = MemoryStore::new();
    seed_profile(&store, "reader", &["NLP"]).await;
    for day in 1..=6 {
        store.upsert_event(public_event(&format!("E{}", day), day, &["NLP"]));
    }

    let app = create_test_app_with(store);

    let default = body_json(
        app.router
            .clone()
            .oneshot(authed_request("GET", "/api/recommendations", "reader", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(default["recommendations"].as_array().unwrap().len(), 3);

    let five = body_json(
        app.router
            .clone()
            .oneshot(authed_request("GET", "/api/recommendations?limit=5", "reader", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(five["recommendations"].as_array().unwrap().len(), 5);

    for bad in ["0", "21"] {
        let response = app
            .router
            .clone()
            .oneshot(authed_request(
                "GET",
                &format!("/api/recommendations?limit={}", bad),
                "reader",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_empty_interests_get_no_recommendations() {
    let store = MemoryStore::new();
    seed_profile(&store, "reader", &[]).await;
    store.upsert_event(public_event("Anything", 1, &["NLP"]));

    let app = create_test_app_with(store);
    let body = body_json(
        app.router
            .oneshot(authed_request("GET", "/api/recommendations", "reader", None))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(body["recommendations"], json!([]));
    assert_eq!(body["interests"], json!([]));
}

#[tokio::test]
async fn test_event_feed_reflects_store() {
    let store = MemoryStore::new();
    store.upsert_event(public_event("First", 2, &[]));

    let app = create_test_app_with(store.clone());
    app.state.event_feed.settled().await;

    let body = body_json(
        app.router
            .clone()
            .oneshot(authed_request("GET", "/api/events", "viewer", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["loading"], false);
    assert_eq!(body["error"], serde_json::Value::Null);
    assert_eq!(body["events"].as_array().unwrap().len(), 1);
    assert_eq!(body["events"][0]["dateLabel"], "Saturday, March 2, 2030");
    assert_eq!(body["events"][0]["locationLabel"], "Location TBD");

    store.upsert_event(public_event("Zeroth", 1, &[]));
    let mut rx = app.state.event_feed.watch();
    rx.wait_for(|s| s.data.len() == 2).await.unwrap();

    let body = body_json(
        app.router
            .oneshot(authed_request("GET", "/api/events", "viewer", None))
            .await
            .unwrap(),
    )
    .await;
    let titles: Vec<&str> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Zeroth", "First"]);
}

#[tokio::test]
async fn test_upcoming_events_from_feed() {
    let store = MemoryStore::new();
    let now = Utc::now();
    for (title, offset_hours) in [("Past", -5), ("Soon", 24), ("Next", 48), ("Third", 72), ("Far", 24 * 10)] {
        let mut event = EventRecord::new("", title);
        event.date = Some(now + Duration::hours(offset_hours));
        store.upsert_event(event);
    }

    let app = create_test_app_with(store);
    app.state.event_feed.settled().await;

    let body = body_json(
        app.router
            .oneshot(authed_request("GET", "/api/events/upcoming", "viewer", None))
            .await
            .unwrap(),
    )
    .await;

    let titles: Vec<&str> = body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Soon", "Next"]);
}

#[tokio::test]
async fn test_event_detail_and_attendees() {
    let store = MemoryStore::new();
    let id = store.upsert_event(public_event("Meetup", 3, &["NLP"]));
    seed_profile(&store, "grace", &[]).await;
    store.add_attendee(&id, "grace");
    store.add_attendee(&id, "deleted-user");

    let app = create_test_app_with(store);

    let event = body_json(
        app.router
            .clone()
            .oneshot(authed_request("GET", &format!("/api/events/{}", id), "viewer", None))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(event["title"], "Meetup");
    assert_eq!(event["id"], id.as_str());

    let attendees = body_json(
        app.router
            .clone()
            .oneshot(authed_request(
                "GET",
                &format!("/api/events/{}/attendees", id),
                "viewer",
                None,
            ))
            .await
            .unwrap(),
    )
    .await;
    let list = attendees["attendees"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["userId"], "grace");

    let missing = app
        .router
        .oneshot(authed_request("GET", "/api/events/nope", "viewer", None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
