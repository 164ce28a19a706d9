//! Body metric calculations
//!
//! BMI, Harris-Benedict BMR, activity-scaled calorie needs and the calorie
//! targets derived from a profile's goal plan.

use crate::error::InsightError;
use crate::plan_details::{plan_details, PlanDetails};
use crate::scoring::categorize_bmi;
use crate::types::{BmiCategory, FitnessGoal, Gender, Profile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Heights at or above this are rejected as implausible (cm)
pub const MAX_HEIGHT_CM: f64 = 300.0;
/// Weights at or above this are rejected as implausible (kg)
pub const MAX_WEIGHT_KG: f64 = 500.0;

/// Energy content of one kilogram of body weight change (kcal)
pub const CALORIES_PER_KG: f64 = 7700.0;
const DAYS_PER_WEEK: f64 = 7.0;
/// Largest daily deficit a cut plan may prescribe (kcal)
pub const MAX_DAILY_CALORIE_DEFICIT: f64 = 1500.0;
/// Largest daily surplus a bulk plan may prescribe (kcal)
pub const MAX_DAILY_CALORIE_SURPLUS: f64 = 1000.0;

/// Calculate BMI: weight (kg) / height (m)^2
///
/// Fails with `InvalidInput` when either value is missing, non-positive,
/// not finite, or physiologically implausible.
pub fn calculate_bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> Result<f64, InsightError> {
    let weight = weight_kg.ok_or_else(|| InsightError::InvalidInput("weight is required".to_string()))?;
    let height = height_cm.ok_or_else(|| InsightError::InvalidInput("height is required".to_string()))?;

    if !weight.is_finite() || weight <= 0.0 {
        return Err(InsightError::InvalidInput(format!(
            "weight must be a positive number, got {weight}"
        )));
    }
    if !height.is_finite() || height <= 0.0 {
        return Err(InsightError::InvalidInput(format!(
            "height must be a positive number, got {height}"
        )));
    }
    if weight >= MAX_WEIGHT_KG {
        return Err(InsightError::InvalidInput(format!(
            "weight {weight} kg is outside the supported range"
        )));
    }
    if height >= MAX_HEIGHT_CM {
        return Err(InsightError::InvalidInput(format!(
            "height {height} cm is outside the supported range"
        )));
    }

    let height_m = height / 100.0;
    Ok(weight / (height_m * height_m))
}

/// Calculate Basal Metabolic Rate with the Harris-Benedict equation
///
/// Men:   88.362 + 13.397 x kg + 4.799 x cm - 5.677 x years
/// Women: 447.593 + 9.247 x kg + 3.098 x cm - 4.330 x years
///
/// Returns `None` when any input is missing.
pub fn calculate_bmr(
    weight_kg: Option<f64>,
    height_cm: Option<f64>,
    age_years: Option<u32>,
    is_male: bool,
) -> Option<f64> {
    let (weight, height, age) = (weight_kg?, height_cm?, f64::from(age_years?));

    let bmr = if is_male {
        88.362 + (13.397 * weight) + (4.799 * height) - (5.677 * age)
    } else {
        447.593 + (9.247 * weight) + (3.098 * height) - (4.330 * age)
    };
    Some(bmr)
}

/// Activity multiplier for a weekly training frequency
pub fn activity_factor(weekly_training_freq: u32) -> f64 {
    match weekly_training_freq {
        0 => 1.2,
        1..=2 => 1.375,
        3..=4 => 1.55,
        5..=6 => 1.725,
        _ => 1.9,
    }
}

/// Calculate daily calorie needs: BMR x activity factor
pub fn calculate_daily_calorie_needs(bmr: Option<f64>, weekly_training_freq: Option<u32>) -> Option<f64> {
    Some(bmr? * activity_factor(weekly_training_freq?))
}

/// Whole years between `birth_date` and `today`; `None` for future birth dates
pub fn calculate_age(birth_date: NaiveDate, today: NaiveDate) -> Option<u32> {
    today.years_since(birth_date)
}

/// BMI of a stored profile with its category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiReport {
    pub bmi: f64,
    pub category: BmiCategory,
}

/// Build a BMI report for a profile
pub fn bmi_report(profile: &Profile) -> Result<BmiReport, InsightError> {
    let bmi = calculate_bmi(profile.weight_kg, profile.height_cm)?;
    Ok(BmiReport {
        bmi,
        category: categorize_bmi(Some(bmi)),
    })
}

/// Daily calorie targets for a profile's goal plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaloriePlan {
    pub bmr: f64,
    pub maintenance_calories: f64,
    /// Negative for a deficit, positive for a surplus
    pub calorie_adjustment_per_day: f64,
    pub recommended_daily_calories: f64,
    #[serde(flatten)]
    pub plan_details: PlanDetails,
}

/// Compute calorie targets from the profile's metrics and goal plan
pub fn calorie_plan(profile: &Profile, today: NaiveDate) -> Result<CaloriePlan, InsightError> {
    let frequency = profile.training_frequency_per_week.ok_or_else(|| {
        InsightError::MissingField("trainingFrequencyPerWeek; set it with a goal plan first".to_string())
    })?;
    if profile.plan_strategy.is_none() {
        return Err(InsightError::MissingField("planStrategy".to_string()));
    }
    let (target_change, weeks) = match (profile.target_change_kg, profile.target_duration_weeks) {
        (Some(change), Some(weeks)) => (change, weeks),
        _ => {
            return Err(InsightError::MissingField(
                "targetChangeKg and targetDurationWeeks".to_string(),
            ))
        }
    };
    if weeks == 0 {
        return Err(InsightError::InvalidInput(
            "targetDurationWeeks must be greater than 0".to_string(),
        ));
    }
    let birth_date = profile
        .birth_date
        .ok_or_else(|| InsightError::MissingField("birthDate".to_string()))?;

    // Validates weight and height before they feed the BMR formula
    calculate_bmi(profile.weight_kg, profile.height_cm)?;

    let age = calculate_age(birth_date, today)
        .ok_or_else(|| InsightError::InvalidInput("birthDate is in the future".to_string()))?;
    let is_male = profile.gender == Some(Gender::Male);

    let bmr = calculate_bmr(profile.weight_kg, profile.height_cm, Some(age), is_male)
        .ok_or_else(|| InsightError::InsufficientData("unable to compute BMR".to_string()))?;
    let maintenance = calculate_daily_calorie_needs(Some(bmr), Some(frequency))
        .ok_or_else(|| InsightError::InsufficientData("unable to compute calorie needs".to_string()))?;

    let is_cut = profile.goal == Some(FitnessGoal::Cut);
    let adjustment = daily_calorie_change(target_change, weeks).min(daily_calorie_cap(profile.goal));

    let (signed_adjustment, recommended) = if is_cut {
        (-adjustment, (maintenance - adjustment).max(0.0))
    } else {
        (adjustment, maintenance + adjustment)
    };

    Ok(CaloriePlan {
        bmr,
        maintenance_calories: maintenance,
        calorie_adjustment_per_day: signed_adjustment,
        recommended_daily_calories: recommended,
        plan_details: plan_details(profile),
    })
}

/// Uncapped daily energy change needed to move `change_kg` over `weeks`
pub fn daily_calorie_change(change_kg: f64, weeks: u32) -> f64 {
    change_kg.abs() * CALORIES_PER_KG / f64::from(weeks) / DAYS_PER_WEEK
}

/// Largest daily adjustment allowed for a goal; cuts get the deficit cap
pub fn daily_calorie_cap(goal: Option<FitnessGoal>) -> f64 {
    match goal {
        Some(FitnessGoal::Cut) => MAX_DAILY_CALORIE_DEFICIT,
        _ => MAX_DAILY_CALORIE_SURPLUS,
    }
}
