// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interest-based event recommendation.
//!
//! The score is the share of the *user's* interests covered by an event's
//! tags, not a symmetric similarity: a user with one interest scores 100 on
//! any event carrying that tag, however many other tags the event has.

use crate::models::{EventRecord, MatchResult};
use std::collections::{BTreeSet, HashSet};

/// Number of recommendations returned when the caller does not ask for more.
pub const DEFAULT_TOP_N: usize = 3;

/// Percentage (0..=100) of `interests` matched by `tags`, rounded half up.
///
/// Tags are treated as a set: repeating a tag does not raise the score, and
/// reordering tags does not change it.
pub fn match_score(interests: &BTreeSet<String>, tags: &[String]) -> u8 {
    let matching: HashSet<&str> = tags
        .iter()
        .map(String::as_str)
        .filter(|tag| interests.contains(*tag))
        .collect();

    let matched = matching.len();
    let total = interests.len().max(1);

    // round(100 * matched / total) in integers; matched <= total keeps it <= 100.
    ((200 * matched + total) / (2 * total)) as u8
}

/// Rank public events by how many of the user's interests they cover.
///
/// Events scoring 0 are dropped, the rest are sorted by score descending
/// with ties kept in input order, and at most `top_n` are returned.
pub fn recommend(
    interests: &BTreeSet<String>,
    events: &[EventRecord],
    top_n: usize,
) -> Vec<MatchResult> {
    if interests.is_empty() || events.is_empty() || top_n == 0 {
        return Vec::new();
    }

    let mut matches: Vec<MatchResult> = events
        .iter()
        .filter(|event| event.is_public)
        .filter_map(|event| {
            let score = match_score(interests, &event.tags);
            (score > 0).then(|| MatchResult {
                event: event.clone(),
                match_score: score,
            })
        })
        .collect();

    // sort_by is stable, so equal scores stay soonest-first.
    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches.truncate(top_n);

    tracing::debug!(
        interests = interests.len(),
        candidates = events.len(),
        returned = matches.len(),
        "Computed recommendations"
    );

    matches
}
