//! Profile scoring
//!
//! This module derives the per-profile scores the insight engine reports:
//! - BMI category
//! - Health index (BMI baseline + training + strategy)
//! - Plan alignment index (goal suitability + intensity + consistency + balance)
//! - Overall score (weighted blend of the two indices)
//!
//! Every function here is pure; the same profile always yields the same scores.

use crate::calculator::calculate_bmi;
use crate::error::InsightError;
use crate::types::{BmiCategory, FitnessGoal, PlanStrategy, Profile};

/// BMI below which a profile is underweight
pub const BMI_UNDERWEIGHT: f64 = 18.5;
/// BMI below which a profile is normal weight
pub const BMI_NORMAL: f64 = 25.0;
/// BMI below which a profile is overweight; obese at or above
pub const BMI_OVERWEIGHT: f64 = 30.0;

pub const MAX_SCORE: f64 = 100.0;
/// Share of the health index in the overall score
pub const HEALTH_WEIGHT: f64 = 0.6;
/// Share of the plan alignment index in the overall score
pub const PLAN_WEIGHT: f64 = 0.4;

const TRAINING_SCORE_MAX: f64 = 20.0;
const TRAINING_SCORE_STEP: f64 = 4.0;

/// Scores derived from a single profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileScores {
    pub bmi: f64,
    pub category: BmiCategory,
    pub health_index: f64,
    pub plan_alignment_index: f64,
    pub overall_score: f64,
}

/// Score a profile; fails if its BMI cannot be computed
pub fn score_profile(profile: &Profile) -> Result<ProfileScores, InsightError> {
    let bmi = calculate_bmi(profile.weight_kg, profile.height_cm)?;
    let category = categorize_bmi(Some(bmi));
    let health_index = health_index(profile, category);
    let plan_alignment_index = plan_alignment_index(profile, category);

    Ok(ProfileScores {
        bmi,
        category,
        health_index,
        plan_alignment_index,
        overall_score: overall_score(health_index, plan_alignment_index),
    })
}

/// Classify a BMI value; missing or NaN values are `Unknown`
pub fn categorize_bmi(bmi: Option<f64>) -> BmiCategory {
    match bmi {
        None => BmiCategory::Unknown,
        Some(v) if v.is_nan() => BmiCategory::Unknown,
        Some(v) if v < BMI_UNDERWEIGHT => BmiCategory::Underweight,
        Some(v) if v < BMI_NORMAL => BmiCategory::NormalWeight,
        Some(v) if v < BMI_OVERWEIGHT => BmiCategory::Overweight,
        Some(_) => BmiCategory::Obese,
    }
}

/// Health index (0-100): BMI baseline + training + strategy
pub fn health_index(profile: &Profile, category: BmiCategory) -> f64 {
    let total = bmi_baseline_score(category)
        + training_score(profile.training_frequency())
        + strategy_score(profile.plan_strategy, profile.goal);
    round_to_one(clamp(total, 0.0, MAX_SCORE))
}

/// Baseline reflects health risk: obesity weighs heavier than overweight,
/// underweight heavier than overweight
fn bmi_baseline_score(category: BmiCategory) -> f64 {
    match category {
        BmiCategory::Underweight => 45.0,
        BmiCategory::NormalWeight => 70.0,
        BmiCategory::Overweight => 55.0,
        BmiCategory::Obese | BmiCategory::Unknown => 35.0,
    }
}

/// Four points per weekly session, capped at five sessions
fn training_score(frequency: u32) -> f64 {
    (f64::from(frequency) * TRAINING_SCORE_STEP).min(TRAINING_SCORE_MAX)
}

fn strategy_score(strategy: Option<PlanStrategy>, goal: Option<FitnessGoal>) -> f64 {
    match (strategy, goal) {
        (None, _) => 5.0,
        (Some(PlanStrategy::Both), _) => 10.0,
        (Some(PlanStrategy::Workout), Some(FitnessGoal::Bulk)) => 8.0,
        (Some(PlanStrategy::Diet), Some(FitnessGoal::Cut)) => 8.0,
        (Some(PlanStrategy::Workout | PlanStrategy::Diet), _) => 5.0,
    }
}

/// Plan alignment index (0-100): how well the goal plan suits the profile
pub fn plan_alignment_index(profile: &Profile, category: BmiCategory) -> f64 {
    let total = goal_suitability_score(profile.goal, category)
        + plan_intensity_score(profile.weekly_change_kg())
        + training_consistency_score(profile.plan_strategy, profile.training_frequency())
        + strategy_balance_score(profile.plan_strategy, category);
    round_to_one(clamp(total, 0.0, MAX_SCORE))
}

fn goal_suitability_score(goal: Option<FitnessGoal>, category: BmiCategory) -> f64 {
    match (goal, category) {
        (None, _) => 20.0,
        (Some(FitnessGoal::Cut), BmiCategory::Obese) => 40.0,
        (Some(FitnessGoal::Cut), BmiCategory::Overweight) => 35.0,
        (Some(FitnessGoal::Cut), BmiCategory::NormalWeight) => 20.0,
        (Some(FitnessGoal::Cut), _) => 5.0,
        (Some(FitnessGoal::Bulk), BmiCategory::Underweight) => 40.0,
        (Some(FitnessGoal::Bulk), BmiCategory::NormalWeight) => 30.0,
        (Some(FitnessGoal::Bulk), BmiCategory::Overweight) => 15.0,
        (Some(FitnessGoal::Bulk), _) => 5.0,
    }
}

/// Steady 0.2-0.7 kg/week plans score best; 1 kg/week or faster is penalized
fn plan_intensity_score(weekly_change_kg: Option<f64>) -> f64 {
    match weekly_change_kg {
        None => 15.0,
        Some(rate) if rate >= 1.0 => 10.0,
        Some(rate) if rate >= 0.7 => 20.0,
        Some(rate) if rate >= 0.2 => 30.0,
        Some(_) => 18.0,
    }
}

fn training_consistency_score(strategy: Option<PlanStrategy>, frequency: u32) -> f64 {
    if strategy.is_some_and(|s| s.includes_workout()) {
        match frequency {
            f if f >= 5 => 20.0,
            f if f >= 3 => 17.0,
            f if f >= 1 => 12.0,
            _ => 5.0,
        }
    } else {
        match frequency {
            f if f >= 4 => 16.0,
            f if f >= 2 => 12.0,
            f if f >= 1 => 8.0,
            _ => 6.0,
        }
    }
}

fn strategy_balance_score(strategy: Option<PlanStrategy>, category: BmiCategory) -> f64 {
    match (strategy, category) {
        (None, _) => 5.0,
        (Some(PlanStrategy::Both), _) => 10.0,
        (Some(PlanStrategy::Diet), BmiCategory::Overweight | BmiCategory::Obese) => 8.0,
        (Some(PlanStrategy::Diet), _) => 6.0,
        (Some(PlanStrategy::Workout), BmiCategory::Underweight) => 8.0,
        (Some(PlanStrategy::Workout), _) => 6.0,
    }
}

/// Overall score: clamp(health x 0.6 + plan x 0.4, 0, 100), one decimal
pub fn overall_score(health_index: f64, plan_alignment_index: f64) -> f64 {
    round_to_one(clamp(
        health_index * HEALTH_WEIGHT + plan_alignment_index * PLAN_WEIGHT,
        0.0,
        MAX_SCORE,
    ))
}

pub fn round_to_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClientId;
    use pretty_assertions::assert_eq;

    fn profile(weight: f64, height: f64) -> Profile {
        Profile::new(ClientId::parse("mobile-score").unwrap(), "Score", weight, height)
    }

    fn with_plan(
        mut p: Profile,
        goal: Option<FitnessGoal>,
        strategy: Option<PlanStrategy>,
        change: Option<f64>,
        weeks: Option<u32>,
        frequency: Option<u32>,
    ) -> Profile {
        p.goal = goal;
        p.plan_strategy = strategy;
        p.target_change_kg = change;
        p.target_duration_weeks = weeks;
        p.training_frequency_per_week = frequency;
        p
    }

    #[test]
    fn test_categorize_bmi_thresholds() {
        assert_eq!(categorize_bmi(Some(18.4)), BmiCategory::Underweight);
        assert_eq!(categorize_bmi(Some(18.5)), BmiCategory::NormalWeight);
        assert_eq!(categorize_bmi(Some(24.99)), BmiCategory::NormalWeight);
        assert_eq!(categorize_bmi(Some(25.0)), BmiCategory::Overweight);
        assert_eq!(categorize_bmi(Some(30.0)), BmiCategory::Obese);
        assert_eq!(categorize_bmi(None), BmiCategory::Unknown);
        assert_eq!(categorize_bmi(Some(f64::NAN)), BmiCategory::Unknown);
    }

    #[test]
    fn test_normal_weight_scenario() {
        let scores = score_profile(&profile(70.0, 175.0)).unwrap();
        assert!((scores.bmi - 22.86).abs() < 0.01);
        assert_eq!(scores.category, BmiCategory::NormalWeight);
    }

    #[test]
    fn test_obese_scenario() {
        let scores = score_profile(&profile(110.0, 170.0)).unwrap();
        assert!((scores.bmi - 38.06).abs() < 0.01);
        assert_eq!(scores.category, BmiCategory::Obese);
    }

    #[test]
    fn test_health_index_components() {
        // Normal 70 + training min(20, 6*4) + BOTH 10 = 100
        let p = with_plan(profile(70.0, 175.0), None, Some(PlanStrategy::Both), None, None, Some(6));
        assert_eq!(health_index(&p, BmiCategory::NormalWeight), 100.0);

        // Obese 35 + 0 + no strategy 5 = 40
        let p = profile(110.0, 170.0);
        assert_eq!(health_index(&p, BmiCategory::Obese), 40.0);

        // Overweight 55 + 3*4 + DIET matching CUT 8 = 75
        let p = with_plan(
            profile(85.0, 175.0),
            Some(FitnessGoal::Cut),
            Some(PlanStrategy::Diet),
            None,
            None,
            Some(3),
        );
        assert_eq!(health_index(&p, BmiCategory::Overweight), 75.0);

        // Underweight 45 + 4 + WORKOUT mismatching CUT 5 = 54
        let p = with_plan(
            profile(50.0, 175.0),
            Some(FitnessGoal::Cut),
            Some(PlanStrategy::Workout),
            None,
            None,
            Some(1),
        );
        assert_eq!(health_index(&p, BmiCategory::Underweight), 54.0);
    }

    #[test]
    fn test_strategy_score_matching() {
        assert_eq!(strategy_score(Some(PlanStrategy::Workout), Some(FitnessGoal::Bulk)), 8.0);
        assert_eq!(strategy_score(Some(PlanStrategy::Workout), Some(FitnessGoal::Cut)), 5.0);
        assert_eq!(strategy_score(Some(PlanStrategy::Diet), Some(FitnessGoal::Cut)), 8.0);
        assert_eq!(strategy_score(Some(PlanStrategy::Diet), None), 5.0);
        assert_eq!(strategy_score(None, Some(FitnessGoal::Cut)), 5.0);
    }

    #[test]
    fn test_goal_suitability() {
        assert_eq!(goal_suitability_score(Some(FitnessGoal::Cut), BmiCategory::Obese), 40.0);
        assert_eq!(goal_suitability_score(Some(FitnessGoal::Cut), BmiCategory::Overweight), 35.0);
        assert_eq!(goal_suitability_score(Some(FitnessGoal::Cut), BmiCategory::NormalWeight), 20.0);
        assert_eq!(goal_suitability_score(Some(FitnessGoal::Cut), BmiCategory::Underweight), 5.0);
        assert_eq!(goal_suitability_score(Some(FitnessGoal::Bulk), BmiCategory::Underweight), 40.0);
        assert_eq!(goal_suitability_score(Some(FitnessGoal::Bulk), BmiCategory::NormalWeight), 30.0);
        assert_eq!(goal_suitability_score(Some(FitnessGoal::Bulk), BmiCategory::Overweight), 15.0);
        assert_eq!(goal_suitability_score(Some(FitnessGoal::Bulk), BmiCategory::Obese), 5.0);
        assert_eq!(goal_suitability_score(None, BmiCategory::Obese), 20.0);
    }

    #[test]
    fn test_plan_intensity_bands() {
        assert_eq!(plan_intensity_score(None), 15.0);
        assert_eq!(plan_intensity_score(Some(1.5)), 10.0);
        assert_eq!(plan_intensity_score(Some(1.0)), 10.0);
        assert_eq!(plan_intensity_score(Some(0.8)), 20.0);
        assert_eq!(plan_intensity_score(Some(0.5)), 30.0);
        assert_eq!(plan_intensity_score(Some(0.2)), 30.0);
        assert_eq!(plan_intensity_score(Some(0.1)), 18.0);
    }

    #[test]
    fn test_training_consistency() {
        assert_eq!(training_consistency_score(Some(PlanStrategy::Workout), 5), 20.0);
        assert_eq!(training_consistency_score(Some(PlanStrategy::Both), 3), 17.0);
        assert_eq!(training_consistency_score(Some(PlanStrategy::Both), 1), 12.0);
        assert_eq!(training_consistency_score(Some(PlanStrategy::Workout), 0), 5.0);
        assert_eq!(training_consistency_score(Some(PlanStrategy::Diet), 4), 16.0);
        assert_eq!(training_consistency_score(None, 2), 12.0);
        assert_eq!(training_consistency_score(Some(PlanStrategy::Diet), 1), 8.0);
        assert_eq!(training_consistency_score(None, 0), 6.0);
    }

    #[test]
    fn test_strategy_balance() {
        assert_eq!(strategy_balance_score(Some(PlanStrategy::Both), BmiCategory::Obese), 10.0);
        assert_eq!(strategy_balance_score(Some(PlanStrategy::Diet), BmiCategory::Obese), 8.0);
        assert_eq!(strategy_balance_score(Some(PlanStrategy::Diet), BmiCategory::NormalWeight), 6.0);
        assert_eq!(strategy_balance_score(Some(PlanStrategy::Workout), BmiCategory::Underweight), 8.0);
        assert_eq!(strategy_balance_score(Some(PlanStrategy::Workout), BmiCategory::Overweight), 6.0);
        assert_eq!(strategy_balance_score(None, BmiCategory::Overweight), 5.0);
    }

    #[test]
    fn test_plan_alignment_balanced_profile() {
        // No goal 20 + 0.3 kg/week 30 + BOTH at 5 sessions 20 + BOTH 10 = 80
        let p = with_plan(
            profile(70.0, 175.0),
            None,
            Some(PlanStrategy::Both),
            Some(3.0),
            Some(10),
            Some(5),
        );
        assert_eq!(plan_alignment_index(&p, BmiCategory::NormalWeight), 80.0);
    }

    #[test]
    fn test_overall_score_blend() {
        assert_eq!(overall_score(100.0, 80.0), 92.0);
        assert_eq!(overall_score(40.0, 46.0), 42.4);
        assert_eq!(overall_score(0.0, 0.0), 0.0);
        assert_eq!(overall_score(100.0, 100.0), 100.0);
    }

    #[test]
    fn test_scores_stay_in_range() {
        let goals = [None, Some(FitnessGoal::Cut), Some(FitnessGoal::Bulk)];
        let strategies = [
            None,
            Some(PlanStrategy::Workout),
            Some(PlanStrategy::Diet),
            Some(PlanStrategy::Both),
        ];
        let bodies = [(45.0, 180.0), (70.0, 175.0), (85.0, 175.0), (140.0, 165.0)];

        for &(w, h) in &bodies {
            for &goal in &goals {
                for &strategy in &strategies {
                    for frequency in [None, Some(0), Some(3), Some(14)] {
                        let p = with_plan(profile(w, h), goal, strategy, Some(6.0), Some(8), frequency);
                        let s = score_profile(&p).unwrap();
                        assert!((0.0..=100.0).contains(&s.health_index));
                        assert!((0.0..=100.0).contains(&s.plan_alignment_index));
                        assert!((0.0..=100.0).contains(&s.overall_score));
                        let expected = round_to_one(
                            s.health_index * HEALTH_WEIGHT + s.plan_alignment_index * PLAN_WEIGHT,
                        );
                        assert_eq!(s.overall_score, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_invalid_profile_fails() {
        assert!(score_profile(&profile(70.0, 0.0)).is_err());
    }
}
