//! Insight engine
//!
//! This module provides the public API for building health insights.
//! It orchestrates scoring, cohort ranking and recommendation selection.

use crate::cohort::ScoreDistribution;
use crate::config::InsightConfig;
use crate::error::InsightError;
use crate::recommendation::{Recommendation, RecommendationContext};
use crate::scoring::{round_to_one, score_profile, ProfileScores};
use crate::store::ProfileStore;
use crate::types::{ClientId, InsightResult, Profile};
use tracing::debug;

/// Build the insight result for `profile` against a population snapshot.
///
/// Stages:
/// 1. Score the subject (fails if its BMI cannot be computed)
/// 2. Score every peer and rank the subject within the cohort
/// 3. Select a recommendation
///
/// The result depends only on the inputs, so an unchanged snapshot always
/// yields the same result.
pub fn build_insights(
    profile: &Profile,
    population: &[Profile],
    config: &InsightConfig,
) -> Result<InsightResult, InsightError> {
    // Stage 1: Subject scores
    let scores = score_profile(profile)?;
    Ok(assemble(profile, scores, population, config))
}

/// Stages 2 and 3 for a subject that already scored successfully
fn assemble(
    profile: &Profile,
    scores: ProfileScores,
    population: &[Profile],
    config: &InsightConfig,
) -> InsightResult {
    // Stage 2: Cohort percentile
    let distribution = ScoreDistribution::from_population(population);
    let cohort = distribution.snapshot(scores.overall_score, config.min_cohort_size);

    // Stage 3: Recommendation
    let recommendation = Recommendation::select(&RecommendationContext::new(profile, &scores));

    debug!(
        client_id = %profile.client_id,
        health_index = scores.health_index,
        plan_alignment_index = scores.plan_alignment_index,
        overall_score = scores.overall_score,
        cohort_size = distribution.len(),
        rule = recommendation.rule(),
        "Built health insights"
    );

    InsightResult {
        bmi: Some(round_to_one(scores.bmi)),
        bmi_category: scores.category,
        health_index: scores.health_index,
        plan_alignment_index: scores.plan_alignment_index,
        overall_score: scores.overall_score,
        percentile: cohort.percentile,
        cohort_warning: cohort.warning,
        recommendation: recommendation.message(),
    }
}

/// Insight engine bound to a profile store.
///
/// Holds no mutable state; concurrent requests may share one engine.
pub struct InsightEngine<S> {
    store: S,
    config: InsightConfig,
}

impl<S: ProfileStore> InsightEngine<S> {
    pub fn new(store: S, config: InsightConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &InsightConfig {
        &self.config
    }

    /// Score a profile against the store's current population
    pub fn build_insights(&self, profile: &Profile) -> Result<InsightResult, InsightError> {
        // Validate the subject before paying for the population fetch
        let scores = score_profile(profile)?;
        let population = self.store.fetch_all()?;
        Ok(assemble(profile, scores, &population, &self.config))
    }

    /// Look up a client's profile and score it
    pub fn insights_for(&self, client_id: &ClientId) -> Result<InsightResult, InsightError> {
        let profile = self
            .store
            .find(client_id)?
            .ok_or_else(|| InsightError::ProfileNotFound(client_id.to_string()))?;
        self.build_insights(&profile)
    }

    /// Serialize insights for a client to JSON
    pub fn insights_json(&self, client_id: &ClientId) -> Result<String, InsightError> {
        let result = self.insights_for(client_id)?;
        serde_json::to_string_pretty(&result).map_err(InsightError::Json)
    }
}
