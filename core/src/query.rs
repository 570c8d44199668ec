use crate::error::QueryError;
use crate::index::TicketIndex;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const DEFAULT_TOP_K: usize = 3;
pub const DEFAULT_THRESHOLD: f64 = 0.10;

const CATEGORY_BOOST: f64 = 1.25;
const CATEGORY_PENALTY: f64 = 0.90;

/// Validated ranking parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryParams {
    top_k: usize,
    threshold: f64,
}

impl QueryParams {
    pub fn new(top_k: usize, threshold: f64) -> Result<Self, QueryError> {
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(QueryError::InvalidThreshold(threshold));
        }
        Ok(Self { top_k, threshold })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for QueryParams {
    fn default() -> Self {
        Self { top_k: DEFAULT_TOP_K, threshold: DEFAULT_THRESHOLD }
    }
}

/// A ranked historical ticket offered as a candidate resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub ticket_id: i64,
    pub description: String,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub resolution: String,
    /// Adjusted similarity in [0, 1], rounded to 4 decimals.
    pub similarity_score: f64,
}

/// Boost a score when the ticket's category is named in the query, dampen it otherwise.
///
/// `query_lower` must already be lowercased. Categories that are absent or
/// empty always take the penalty.
pub fn adjust_for_category(score: f64, category: Option<&str>, query_lower: &str) -> f64 {
    let category = category.map(str::to_lowercase).unwrap_or_default();
    if !category.is_empty() && query_lower.contains(&category) {
        (score * CATEGORY_BOOST).min(1.0)
    } else {
        score * CATEGORY_PENALTY
    }
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

impl TicketIndex {
    /// Rank historical tickets against a new description.
    ///
    /// Returns at most `top_k` results whose adjusted score is at least
    /// `threshold`, best first. Equal scores keep index order. Text with no
    /// vocabulary overlap scores zero everywhere.
    pub fn query(&self, description: &str, params: &QueryParams) -> Vec<SuggestionResult> {
        let started = Instant::now();
        let query_lower = description.to_lowercase();

        let mut ranked: Vec<(usize, f64)> = self
            .similarities(description)
            .into_iter()
            .enumerate()
            .map(|(pos, raw)| {
                let category = self.tickets[pos].category.as_deref();
                (pos, adjust_for_category(raw.clamp(0.0, 1.0), category, &query_lower))
            })
            .collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let results: Vec<SuggestionResult> = ranked
            .into_iter()
            .filter(|&(_, score)| score >= params.threshold)
            .take(params.top_k)
            .map(|(pos, score)| {
                let t = &self.tickets[pos];
                SuggestionResult {
                    ticket_id: t.id,
                    description: t.raw_description.clone(),
                    category: t.category.clone(),
                    priority: t.priority.clone(),
                    resolution: t.resolution_text.clone(),
                    similarity_score: round4(score),
                }
            })
            .collect();

        tracing::debug!(
            hits = results.len(),
            top_k = params.top_k,
            threshold = params.threshold,
            elapsed_us = started.elapsed().as_micros() as u64,
            "query ranked"
        );
        results
    }

    /// Query with the default `top_k` and `threshold`.
    pub fn suggest(&self, description: &str) -> Vec<SuggestionResult> {
        self.query(description, &QueryParams::default())
    }
}
