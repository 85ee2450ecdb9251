//! Date-indexed game lookup over a resolved schedule document.
//!
//! Schedule dates are listed as `MM/DD/YYYY HH:MM:SS` in the league's local
//! calendar, so a caller's date may sit a day off. Lookups widen the match to
//! a symmetric window of `fuzzy_days` around the requested date.

use std::collections::HashSet;

use chrono::{Days, NaiveDate};
use serde_json::Value;

use courtside_core::Error;

use super::ScheduleLayout;

/// Game ids scheduled within `fuzzy_days` of `date`.
///
/// Ids are ordered by window offset (earliest day first), then by their
/// position in the document. Duplicates keep their first occurrence.
/// Entries whose date cannot be parsed are skipped.
pub fn ids_for_date(document: &Value, date: NaiveDate, fuzzy_days: u32, layout: &ScheduleLayout) -> Vec<String> {
    let Some(entries) = document.get(&layout.section).and_then(|s| s.get(&layout.dates_field)).and_then(Value::as_array)
    else {
        return Vec::new();
    };

    let window = window(date, fuzzy_days);
    let mut buckets: Vec<Vec<String>> = vec![Vec::new(); window.len()];

    for entry in entries {
        let raw = entry.get("gameDate").and_then(Value::as_str).unwrap_or_default();
        let Some(day) = parse_listing_date(raw, &layout.date_format) else {
            tracing::warn!(raw, "skipping schedule entry with unparseable date");
            continue;
        };
        let Some(slot) = window.iter().position(|d| *d == day) else {
            continue;
        };

        let games = entry.get("games").and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default();
        buckets[slot].extend(games.iter().filter_map(game_id));
    }

    let mut seen = HashSet::new();
    buckets.into_iter().flatten().filter(|id| seen.insert(id.clone())).collect()
}

/// Parse a caller-supplied `YYYY-MM-DD` date.
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| Error::InvalidInput(format!("date must be YYYY-MM-DD, got {input:?}: {e}")))
}

fn window(date: NaiveDate, fuzzy_days: u32) -> Vec<NaiveDate> {
    let span = Days::new(u64::from(fuzzy_days));
    let start = date.checked_sub_days(span).unwrap_or(date);
    let end = date.checked_add_days(span).unwrap_or(date);
    start.iter_days().take_while(|d| *d <= end).collect()
}

fn parse_listing_date(raw: &str, format: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    NaiveDate::parse_from_str(token, format).ok()
}

fn game_id(game: &Value) -> Option<String> {
    match game.get("gameId")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}
