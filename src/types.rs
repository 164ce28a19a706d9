//! Core types for the fitness insight engine
//!
//! This module defines the profile data the engine reads, the client identity
//! threaded through every operation, and the insight result it produces.

use crate::error::InsightError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kind of client owning an identity key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientKind {
    Mobile,
    Research,
}

impl ClientKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ClientKind::Mobile => "mobile",
            ClientKind::Research => "research",
        }
    }
}

/// Opaque client identity key, e.g. `mobile-3f2a...` or `research-tool1`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    /// Generate a fresh key for the given client kind
    pub fn generate(kind: ClientKind) -> Self {
        Self(format!("{}-{}", kind.prefix(), Uuid::new_v4().simple()))
    }

    /// Parse and validate a raw key supplied by a caller
    pub fn parse(raw: &str) -> Result<Self, InsightError> {
        let raw = raw.trim();
        let valid = [ClientKind::Mobile, ClientKind::Research]
            .iter()
            .any(|kind| {
                raw.strip_prefix(kind.prefix())
                    .and_then(|rest| rest.strip_prefix('-'))
                    .is_some_and(|suffix| !suffix.is_empty())
            });

        if valid {
            Ok(Self(raw.to_string()))
        } else {
            Err(InsightError::InvalidInput(format!(
                "client id '{raw}' must start with 'mobile-' or 'research-'"
            )))
        }
    }

    /// Kind derived from the key prefix; unknown prefixes are treated as mobile
    pub fn kind(&self) -> ClientKind {
        if self.0.starts_with("research-") {
            ClientKind::Research
        } else {
            ClientKind::Mobile
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "MALE",
            Gender::Female => "FEMALE",
        }
    }
}

/// Body composition goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FitnessGoal {
    Cut,
    Bulk,
}

impl FitnessGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::Cut => "CUT",
            FitnessGoal::Bulk => "BULK",
        }
    }
}

/// Whether a plan emphasizes workouts, diet, or both
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PlanStrategy {
    Workout,
    Diet,
    Both,
}

impl PlanStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStrategy::Workout => "WORKOUT",
            PlanStrategy::Diet => "DIET",
            PlanStrategy::Both => "BOTH",
        }
    }

    /// Workout-driven strategies are judged on the stricter training thresholds
    pub fn includes_workout(&self) -> bool {
        matches!(self, PlanStrategy::Workout | PlanStrategy::Both)
    }
}

/// BMI classification with fixed WHO thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    #[serde(rename = "Underweight")]
    Underweight,
    #[serde(rename = "Normal weight")]
    NormalWeight,
    #[serde(rename = "Overweight")]
    Overweight,
    #[serde(rename = "Obese")]
    Obese,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl BmiCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::NormalWeight => "Normal weight",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
            BmiCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored fitness profile
///
/// Every plan and metric field is optional on the wire so that a malformed
/// stored row still loads. Weight and height are checked when the profile is
/// scored; negative session and week counts read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub client_id: ClientId,
    pub name: String,
    /// Body weight (kg)
    #[serde(rename = "weight", default)]
    pub weight_kg: Option<f64>,
    /// Height (cm)
    #[serde(rename = "height", default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub goal: Option<FitnessGoal>,
    #[serde(default)]
    pub plan_strategy: Option<PlanStrategy>,
    /// Planned change in body weight (kg); only the magnitude is scored
    #[serde(default)]
    pub target_change_kg: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub target_duration_weeks: Option<u32>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub training_frequency_per_week: Option<u32>,
}

/// Read a stored count that may be negative or fractional, clamped into `u32`
fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, f64::from(u32::MAX)) as u32))
}

impl Profile {
    /// Create a profile with body metrics only and no goal plan
    pub fn new(client_id: ClientId, name: impl Into<String>, weight_kg: f64, height_cm: f64) -> Self {
        Self {
            client_id,
            name: name.into(),
            weight_kg: Some(weight_kg),
            height_cm: Some(height_cm),
            birth_date: None,
            gender: None,
            goal: None,
            plan_strategy: None,
            target_change_kg: None,
            target_duration_weeks: None,
            training_frequency_per_week: None,
        }
    }

    /// Weekly rate of change (kg/week), if both target and duration are usable
    pub fn weekly_change_kg(&self) -> Option<f64> {
        match (self.target_change_kg, self.target_duration_weeks) {
            (Some(change), Some(weeks)) if change.abs() > 0.0 && weeks > 0 => {
                Some(change.abs() / f64::from(weeks))
            }
            _ => None,
        }
    }

    /// Training sessions per week, treating an unset frequency as zero
    pub fn training_frequency(&self) -> u32 {
        self.training_frequency_per_week.unwrap_or(0)
    }
}

/// Registration payload for a new profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProfile {
    pub name: String,
    #[serde(rename = "weight")]
    pub weight_kg: f64,
    #[serde(rename = "height")]
    pub height_cm: f64,
    pub birth_date: NaiveDate,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Replacement body metrics for an existing profile
pub type ProfileUpdate = NewProfile;

/// Goal plan settings attached to a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPlan {
    pub goal: FitnessGoal,
    pub plan_strategy: PlanStrategy,
    pub target_change_kg: f64,
    pub target_duration_weeks: u32,
    pub training_frequency_per_week: u32,
}

/// Registered research client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Researcher {
    pub client_id: ClientId,
    pub name: String,
    /// Stored trimmed and lower-cased; unique across researchers
    pub email: String,
}

/// Registration payload for a research client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewResearcher {
    pub name: String,
    pub email: String,
}

/// Derived, never persisted health insight for one profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    /// BMI rounded to one decimal
    pub bmi: Option<f64>,
    pub bmi_category: BmiCategory,
    /// Health index (0-100)
    pub health_index: f64,
    /// Plan alignment index (0-100)
    pub plan_alignment_index: f64,
    /// Blended score (0-100)
    pub overall_score: f64,
    /// Cohort percentile (0-100), absent when the cohort is too small
    pub percentile: Option<f64>,
    /// Explains a missing percentile
    pub cohort_warning: Option<String>,
    pub recommendation: String,
}
