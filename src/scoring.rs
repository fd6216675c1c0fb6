//! Keyword relevance scoring for captures

use crate::types::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Maximum number of captures returned by a ranking call
pub const MAX_RESULTS: usize = 10;

const PHRASE_BONUS: u32 = 10;
const TITLE_WORD_WEIGHT: u32 = 5;
const CONTENT_WORD_WEIGHT: u32 = 2;
const RECENCY_BONUS: u32 = 1;
const RECENCY_WINDOW_DAYS: f64 = 7.0;
const MIN_WORD_CHARS: usize = 3;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Rank captures against a query using the current time for recency
pub fn rank(query: &str, candidates: &[Capture]) -> Vec<ScoredCapture> {
    rank_at(query, candidates, Utc::now())
}

/// Rank captures against a query.
///
/// Returns at most [`MAX_RESULTS`] captures with a positive score, highest
/// first. Equal scores keep their input order. An empty (or whitespace-only)
/// query matches every capture through the phrase bonus.
pub fn rank_at(query: &str, candidates: &[Capture], now: DateTime<Utc>) -> Vec<ScoredCapture> {
    let query_lower = query.trim().to_lowercase();
    let words = query_words(&query_lower);

    let mut scored: Vec<ScoredCapture> = candidates
        .iter()
        .filter_map(|capture| {
            let relevance_score = score_capture(capture, &query_lower, &words, now);
            (relevance_score > 0).then(|| ScoredCapture {
                capture: capture.clone(),
                relevance_score,
            })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
    scored.truncate(MAX_RESULTS);

    debug!(
        "Ranked {} candidates for '{}': {} retained, {} word(s)",
        candidates.len(),
        query_lower,
        scored.len(),
        words.len()
    );

    scored
}

/// Split a lowercased query into scoring words (3+ chars, duplicates kept)
pub fn query_words(query_lower: &str) -> Vec<&str> {
    query_lower
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_CHARS)
        .collect()
}

/// Score one capture. `query_lower` must already be trimmed and lowercased.
pub fn score_capture(
    capture: &Capture,
    query_lower: &str,
    words: &[&str],
    now: DateTime<Utc>,
) -> u32 {
    let title = capture.title_or_empty().to_lowercase();
    let content = capture.content_or_empty().to_lowercase();
    let combined = format!("{} {}", title, content);

    let mut score: u32 = 0;

    if combined.contains(query_lower) {
        score = score.saturating_add(PHRASE_BONUS);
    }

    // a repeated query word scores once per copy; count its hits only once
    let mut copies: HashMap<&str, usize> = HashMap::new();
    for word in words {
        *copies.entry(*word).or_insert(0) += 1;
    }

    for (word, n) in copies {
        let title_hits = count_occurrences(&title, word);
        let content_hits = count_occurrences(&content, word);
        score = score.saturating_add(weighted(TITLE_WORD_WEIGHT, title_hits, n));
        score = score.saturating_add(weighted(CONTENT_WORD_WEIGHT, content_hits, n));
    }

    if is_recent(capture.created_at, now) {
        score = score.saturating_add(RECENCY_BONUS);
    }

    score
}

/// `weight * hits * copies`, pinned at `u32::MAX`
fn weighted(weight: u32, hits: usize, copies: usize) -> u32 {
    to_u32(hits)
        .saturating_mul(weight)
        .saturating_mul(to_u32(copies))
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Non-overlapping literal occurrences, no word boundaries
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack.matches(needle).count()
}

fn is_recent(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let elapsed_ms = (now - created_at).num_milliseconds() as f64;
    elapsed_ms / 1000.0 / SECONDS_PER_DAY < RECENCY_WINDOW_DAYS
}
