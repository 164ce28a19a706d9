//! Anonymized research aggregations
//!
//! Population-level summaries for research clients. Output never carries
//! client identifiers or names.

use crate::calculator::{calculate_age, calculate_bmi};
use crate::config::ResearchConfig;
use crate::error::InsightError;
use crate::scoring::categorize_bmi;
use crate::store::ResearcherStore;
use crate::types::{
    BmiCategory, ClientId, ClientKind, FitnessGoal, NewResearcher, Profile, Researcher,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Reject callers that are not research clients
pub fn require_research_access(client_id: &ClientId) -> Result<(), InsightError> {
    match client_id.kind() {
        ClientKind::Research => Ok(()),
        ClientKind::Mobile => Err(InsightError::Forbidden(
            "Mobile clients are not authorized to access research endpoints. \
             Research endpoints are restricted to research clients only."
                .to_string(),
        )),
    }
}

/// Register a research client under a fresh `research-` id
///
/// The email is trimmed and lower-cased before the uniqueness check.
pub fn register_researcher(
    store: &impl ResearcherStore,
    request: NewResearcher,
) -> Result<Researcher, InsightError> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(InsightError::InvalidInput("name is required".to_string()));
    }
    let email = request.email.trim().to_lowercase();
    if email.is_empty() {
        return Err(InsightError::InvalidInput("email is required".to_string()));
    }
    if !is_valid_email(&email) {
        return Err(InsightError::InvalidInput("email must be valid".to_string()));
    }

    let saved = store.insert_researcher(Researcher {
        client_id: ClientId::generate(ClientKind::Research),
        name: name.to_string(),
        email,
    })?;
    info!(client_id = %saved.client_id, "Registered researcher");
    Ok(saved)
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeDistribution {
    pub average_age: f64,
    pub age_ranges: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderDistribution {
    #[serde(flatten)]
    pub counts: BTreeMap<String, u64>,
    pub percentage: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalCharacteristics {
    pub average_weight: f64,
    pub average_height: f64,
    pub weight_range: ValueRange,
    pub height_range: ValueRange,
}

/// Who the users are
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub sample_size: usize,
    pub age_distribution: AgeDistribution,
    pub gender_distribution: GenderDistribution,
    pub physical_characteristics: PhysicalCharacteristics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    #[serde(rename = "averageBMI")]
    pub average_bmi: f64,
    pub bmi_distribution: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanMetrics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_target_change: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_duration_weeks: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_training_frequency: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub plan_strategies: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSegment {
    pub count: usize,
    pub health_metrics: HealthMetrics,
    pub plan_metrics: PlanMetrics,
}

/// What the users are doing, grouped by goal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationHealth {
    pub total_profiles: usize,
    pub goal_segments: BTreeMap<String, GoalSegment>,
}

/// Demographic breakdown of the population
pub fn demographics(
    client_id: &ClientId,
    population: &[Profile],
    today: NaiveDate,
    config: &ResearchConfig,
) -> Result<Demographics, InsightError> {
    require_research_access(client_id)?;

    if population.len() < config.min_sample_size {
        return Err(InsightError::InsufficientData(format!(
            "Not enough data to compute metrics yet. Create at least {} profiles.",
            config.min_sample_size
        )));
    }

    let weights: Vec<f64> = population
        .iter()
        .filter_map(|p| p.weight_kg)
        .filter(|w| w.is_finite())
        .collect();
    let heights: Vec<f64> = population
        .iter()
        .filter_map(|p| p.height_cm)
        .filter(|h| h.is_finite())
        .collect();
    let ages: Vec<u32> = population
        .iter()
        .filter_map(|p| p.birth_date)
        .filter_map(|birth| calculate_age(birth, today))
        .collect();

    if weights.is_empty() || heights.is_empty() || ages.is_empty() {
        return Err(InsightError::InsufficientData(
            "Not enough complete data to compute demographics. \
             Ensure weight, height, and birthDate are provided."
                .to_string(),
        ));
    }

    let mut age_ranges = BTreeMap::new();
    for &age in &ages {
        *age_ranges.entry(age_range(age).to_string()).or_insert(0) += 1;
    }
    let average_age = mean(ages.iter().map(|&a| f64::from(a)));

    let mut gender_counts: BTreeMap<String, u64> = BTreeMap::new();
    for gender in population.iter().filter_map(|p| p.gender) {
        *gender_counts.entry(gender.as_str().to_string()).or_insert(0) += 1;
    }
    let with_gender: u64 = gender_counts.values().sum();
    let percentage = gender_counts
        .iter()
        .map(|(gender, &count)| {
            (gender.clone(), round_to_two(count as f64 * 100.0 / with_gender as f64))
        })
        .collect();

    Ok(Demographics {
        sample_size: population.len(),
        age_distribution: AgeDistribution {
            average_age: round_to_two(average_age),
            age_ranges,
        },
        gender_distribution: GenderDistribution {
            counts: gender_counts,
            percentage,
        },
        physical_characteristics: PhysicalCharacteristics {
            average_weight: round_to_two(mean(weights.iter().copied())),
            average_height: round_to_two(mean(heights.iter().copied())),
            weight_range: range(&weights),
            height_range: range(&heights),
        },
    })
}

/// Health and plan metrics per fitness goal
pub fn population_health(
    client_id: &ClientId,
    population: &[Profile],
) -> Result<PopulationHealth, InsightError> {
    require_research_access(client_id)?;

    if population.is_empty() {
        return Err(InsightError::InsufficientData(
            "Not enough data to compute research metrics yet. Create some person profiles first."
                .to_string(),
        ));
    }

    let mut by_goal: BTreeMap<FitnessGoal, Vec<&Profile>> = BTreeMap::new();
    for profile in population {
        if let Some(goal) = profile.goal {
            by_goal.entry(goal).or_default().push(profile);
        }
    }

    let cutters = by_goal.get(&FitnessGoal::Cut).filter(|v| !v.is_empty());
    let bulkers = by_goal.get(&FitnessGoal::Bulk).filter(|v| !v.is_empty());
    let (cutters, bulkers) = match (cutters, bulkers) {
        (Some(c), Some(b)) => (c, b),
        _ => {
            return Err(InsightError::InsufficientData(
                "Not enough CUT and BULK data to produce population health metrics. \
                 Create more person profiles with both goals."
                    .to_string(),
            ))
        }
    };

    let mut goal_segments = BTreeMap::new();
    goal_segments.insert(FitnessGoal::Cut.as_str().to_string(), goal_segment(cutters)?);
    goal_segments.insert(FitnessGoal::Bulk.as_str().to_string(), goal_segment(bulkers)?);

    Ok(PopulationHealth {
        total_profiles: population.len(),
        goal_segments,
    })
}

fn goal_segment(people: &[&Profile]) -> Result<GoalSegment, InsightError> {
    let bmis: Vec<f64> = people
        .iter()
        .filter_map(|p| calculate_bmi(p.weight_kg, p.height_cm).ok())
        .collect();

    if bmis.is_empty() {
        return Err(InsightError::InsufficientData(
            "Not enough complete data to compute health metrics.".to_string(),
        ));
    }

    let mut bmi_distribution = BTreeMap::new();
    for &bmi in &bmis {
        let bucket = match categorize_bmi(Some(bmi)) {
            BmiCategory::Underweight => "underweight",
            BmiCategory::NormalWeight => "normal",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese | BmiCategory::Unknown => "obese",
        };
        *bmi_distribution.entry(bucket.to_string()).or_insert(0) += 1;
    }

    let mut plan_strategies = BTreeMap::new();
    for strategy in people.iter().filter_map(|p| p.plan_strategy) {
        *plan_strategies.entry(strategy.as_str().to_string()).or_insert(0) += 1;
    }

    Ok(GoalSegment {
        count: people.len(),
        health_metrics: HealthMetrics {
            average_bmi: round_to_two(mean(bmis.iter().copied())),
            bmi_distribution,
        },
        plan_metrics: PlanMetrics {
            average_target_change: optional_mean(people.iter().filter_map(|p| p.target_change_kg)),
            average_duration_weeks: optional_mean(
                people
                    .iter()
                    .filter_map(|p| p.target_duration_weeks)
                    .map(f64::from),
            ),
            average_training_frequency: optional_mean(
                people
                    .iter()
                    .filter_map(|p| p.training_frequency_per_week)
                    .map(f64::from),
            ),
            plan_strategies,
        },
    })
}

fn age_range(age: u32) -> &'static str {
    match age {
        0..=25 => "18-25",
        26..=35 => "26-35",
        36..=45 => "36-45",
        _ => "46+",
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

fn optional_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let avg = mean(values);
    (!avg.is_nan()).then(|| round_to_two(avg))
}

fn range(values: &[f64]) -> ValueRange {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    ValueRange {
        min: round_to_two(min),
        max: round_to_two(max),
    }
}

fn round_to_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
