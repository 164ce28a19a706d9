//! Diet and workout guidance for a goal plan
//!
//! The plan strategy decides which guidance applies: DIET and BOTH get a diet
//! plan, WORKOUT and BOTH get a workout plan.

use crate::calculator::{daily_calorie_cap, daily_calorie_change};
use crate::types::{FitnessGoal, PlanStrategy, Profile};
use serde::{Deserialize, Serialize};

/// Daily adjustment assumed when the plan has no usable target or duration (kcal)
pub const DEFAULT_PLAN_ADJUSTMENT: f64 = 300.0;
/// Calorie figures in guidance are rounded to this step (kcal)
pub const CALORIE_ROUNDING_STEP: f64 = 10.0;
/// Sessions assumed when no training frequency is set
pub const DEFAULT_WEEKLY_WORKOUTS: u32 = 4;
const MIN_WEEKLY_WORKOUTS: u32 = 1;

/// Guidance text attached to calorie and insight responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diet_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout_plan: Option<String>,
}

/// Build the guidance that applies to the profile's plan strategy
pub fn plan_details(profile: &Profile) -> PlanDetails {
    let Some(strategy) = profile.plan_strategy else {
        return PlanDetails::default();
    };

    PlanDetails {
        diet_plan: matches!(strategy, PlanStrategy::Diet | PlanStrategy::Both)
            .then(|| diet_plan(profile)),
        workout_plan: strategy.includes_workout().then(|| workout_plan(profile)),
    }
}

fn diet_plan(profile: &Profile) -> String {
    let Some(goal) = profile.goal else {
        return "Maintain a balanced meal plan with lean protein, whole grains, and plenty of vegetables."
            .to_string();
    };

    let uncapped = match (profile.target_change_kg, profile.target_duration_weeks) {
        (Some(change), Some(weeks)) if weeks > 0 => daily_calorie_change(change, weeks),
        _ => DEFAULT_PLAN_ADJUSTMENT,
    };
    let cap = daily_calorie_cap(Some(goal));
    let adjustment = round_calories(uncapped.min(cap));
    let capped = uncapped > cap;

    match (goal, capped) {
        (FitnessGoal::Cut, false) => format!(
            "Aim for about {adjustment:.0} kcal deficit per day with high-protein, veggie-rich meals \
             and adequate hydration."
        ),
        (FitnessGoal::Cut, true) => format!(
            "Aim for about {adjustment:.0} kcal deficit per day (capped at maximum safe deficit) \
             with high-protein, veggie-rich meals and adequate hydration. \
             Your original plan would require {:.0} kcal/day deficit, which is unsafe. \
             Consider extending your duration or reducing your target change.",
            round_calories(uncapped)
        ),
        (FitnessGoal::Bulk, false) => format!(
            "Target roughly {adjustment:.0} kcal surplus daily using lean proteins, complex carbs, \
             and healthy fats spread across meals."
        ),
        (FitnessGoal::Bulk, true) => format!(
            "Target roughly {adjustment:.0} kcal surplus daily (capped at maximum safe surplus) \
             using lean proteins, complex carbs, and healthy fats spread across meals. \
             Your original plan would require {:.0} kcal/day surplus, which may lead to excessive \
             fat gain. Consider extending your duration or reducing your target change.",
            round_calories(uncapped)
        ),
    }
}

fn workout_plan(profile: &Profile) -> String {
    let frequency = profile
        .training_frequency_per_week
        .unwrap_or(DEFAULT_WEEKLY_WORKOUTS)
        .max(MIN_WEEKLY_WORKOUTS);

    match profile.goal {
        None => format!(
            "Schedule {frequency} total-body sessions each week combining strength, mobility, \
             and light cardio."
        ),
        Some(FitnessGoal::Cut) => format!(
            "Schedule {frequency} weekly sessions mixing strength and cardio \
             (e.g., 3 strength, {} cardio) to support fat loss.",
            (frequency / 2).max(1)
        ),
        Some(FitnessGoal::Bulk) => format!(
            "Plan {frequency} strength-focused sessions emphasising progressive overload, \
             plus mobility work for recovery."
        ),
    }
}

fn round_calories(kcal: f64) -> f64 {
    (kcal / CALORIE_ROUNDING_STEP).round() * CALORIE_ROUNDING_STEP
}
