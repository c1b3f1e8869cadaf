// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting and event display labels.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Long date label, e.g. "Friday, March 1, 2024", or "Date TBD".
pub fn date_label(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%A, %B %-d, %Y").to_string(),
        None => "Date TBD".to_string(),
    }
}

pub fn time_label(time: Option<&str>) -> String {
    non_blank(time).unwrap_or("Time TBD").to_string()
}

pub fn location_label(location: Option<&str>) -> String {
    non_blank(location).unwrap_or("Location TBD").to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
