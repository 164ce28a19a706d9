//! Engine configuration
//!
//! Settings are read from the environment so deployments can tune them
//! without code changes; tests construct them directly.

use crate::cohort::DEFAULT_MIN_COHORT_SIZE;
use crate::error::InsightError;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the minimum cohort size
pub const MIN_COHORT_SIZE_ENV: &str = "FITNESS_MIN_COHORT_SIZE";
/// Environment variable overriding the research sample size floor
pub const MIN_SAMPLE_SIZE_ENV: &str = "FITNESS_RESEARCH_MIN_SAMPLE_SIZE";

/// Default sample size floor for research aggregations
pub const DEFAULT_MIN_SAMPLE_SIZE: usize = 3;

/// Insight engine settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Peers with a computable BMI required before percentiles are reported
    pub min_cohort_size: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            min_cohort_size: DEFAULT_MIN_COHORT_SIZE,
        }
    }
}

impl InsightConfig {
    pub fn with_min_cohort_size(min_cohort_size: usize) -> Result<Self, InsightError> {
        Ok(Self {
            min_cohort_size: positive(MIN_COHORT_SIZE_ENV, min_cohort_size)?,
        })
    }

    /// Load from process environment, falling back to defaults
    pub fn from_env() -> Result<Self, InsightError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InsightError> {
        match lookup(MIN_COHORT_SIZE_ENV) {
            Some(raw) => Self::with_min_cohort_size(parse_usize(MIN_COHORT_SIZE_ENV, &raw)?),
            None => Ok(Self::default()),
        }
    }
}

/// Research aggregation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchConfig {
    /// Profiles required before demographics are reported
    pub min_sample_size: usize,
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            min_sample_size: DEFAULT_MIN_SAMPLE_SIZE,
        }
    }
}

impl ResearchConfig {
    pub fn from_env() -> Result<Self, InsightError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, InsightError> {
        match lookup(MIN_SAMPLE_SIZE_ENV) {
            Some(raw) => Ok(Self {
                min_sample_size: positive(MIN_SAMPLE_SIZE_ENV, parse_usize(MIN_SAMPLE_SIZE_ENV, &raw)?)?,
            }),
            None => Ok(Self::default()),
        }
    }
}

fn parse_usize(key: &str, raw: &str) -> Result<usize, InsightError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|e| InsightError::InvalidConfig(format!("{key}={raw:?}: {e}")))
}

fn positive(key: &str, value: usize) -> Result<usize, InsightError> {
    if value == 0 {
        return Err(InsightError::InvalidConfig(format!("{key} must be at least 1")));
    }
    Ok(value)
}
