//! Context selection: ranked captures with a recency fallback

use crate::scoring::{rank_at, MAX_RESULTS};
use crate::types::*;
use chrono::{DateTime, Utc};
use tracing::debug;

/// Captures to place in the prompt for `query`.
///
/// Uses the ranked captures when any score above zero. When nothing matches
/// a non-empty pool, falls back to the most recently created captures so the
/// model still sees something useful.
pub fn select_context(query: &str, candidates: &[Capture], now: DateTime<Utc>) -> Vec<Capture> {
    let ranked = rank_at(query, candidates, now);

    if ranked.is_empty() && !candidates.is_empty() {
        debug!(
            "No capture matched '{}'; using {} most recent of {}",
            query,
            MAX_RESULTS.min(candidates.len()),
            candidates.len()
        );
        return most_recent(candidates, MAX_RESULTS);
    }

    ranked.into_iter().map(|scored| scored.capture).collect()
}

/// Newest `limit` captures, newest first
pub fn most_recent(candidates: &[Capture], limit: usize) -> Vec<Capture> {
    let mut recent: Vec<&Capture> = candidates.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.into_iter().take(limit).cloned().collect()
}
