//! Cohort percentile ranking
//!
//! This module builds the distribution of overall scores across a population
//! snapshot and ranks a subject's score against it. Peers whose BMI cannot be
//! computed are dropped from the cohort rather than failing the request.

use crate::scoring::{round_to_one, score_profile};
use crate::types::Profile;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default minimum cohort size before percentiles are reported
pub const DEFAULT_MIN_COHORT_SIZE: usize = 10;

/// Tolerance for scores that should compare equal to the subject's own score
pub const PERCENTILE_EPSILON: f64 = 1e-6;

/// Percentile outcome for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortSnapshot {
    pub percentile: Option<f64>,
    pub warning: Option<String>,
}

/// Sorted overall scores of every peer with a computable BMI
///
/// The distribution can be rebuilt per request or precomputed and refreshed
/// periodically; rank lookups are a binary search either way.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreDistribution {
    scores: Vec<f64>,
}

impl ScoreDistribution {
    /// Score every peer in the snapshot, skipping peers with invalid metrics
    pub fn from_population(population: &[Profile]) -> Self {
        let mut scores: Vec<f64> = population
            .iter()
            .filter_map(|peer| match score_profile(peer) {
                Ok(scores) => Some(scores.overall_score),
                Err(e) => {
                    debug!(
                        client_id = %peer.client_id,
                        error = %e,
                        "Excluding peer from cohort"
                    );
                    None
                }
            })
            .collect();

        scores.sort_by(|a, b| a.total_cmp(b));
        Self { scores }
    }

    /// Number of peers in the cohort
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Percentage of the cohort scoring at or below `score`, one decimal
    pub fn percentile_of(&self, score: f64) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let at_or_below = self
            .scores
            .partition_point(|peer| *peer <= score + PERCENTILE_EPSILON);
        Some(round_to_one(at_or_below as f64 * 100.0 / self.scores.len() as f64))
    }

    /// Rank `score`, or explain why the cohort is too small to do so
    pub fn snapshot(&self, score: f64, min_cohort_size: usize) -> CohortSnapshot {
        if self.scores.len() < min_cohort_size || self.scores.is_empty() {
            warn!(
                cohort_size = self.scores.len(),
                min_cohort_size, "Cohort too small for percentile"
            );
            return CohortSnapshot {
                percentile: None,
                warning: Some(format!(
                    "Need at least {min_cohort_size} profiles for percentile comparison."
                )),
            };
        }

        CohortSnapshot {
            percentile: self.percentile_of(score),
            warning: None,
        }
    }
}
