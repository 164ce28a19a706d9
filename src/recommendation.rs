//! Recommendation selection
//!
//! Recommendations are chosen by an ordered rule set; the first rule that
//! matches wins. Each rule is a variant of [`Recommendation`] so the
//! precedence can be tested rule by rule.

use crate::scoring::ProfileScores;
use crate::types::{BmiCategory, FitnessGoal, Profile};

/// Weekly loss above which a cut is flagged as very aggressive (kg/week)
pub const CUT_RATE_WARNING: f64 = 0.9;
/// Weekly gain above which a bulk is flagged as adding fat (kg/week)
pub const BULK_RATE_WARNING: f64 = 0.6;
pub const SCORE_STRONG_THRESHOLD: f64 = 80.0;
pub const PLAN_ALIGNMENT_STRONG_THRESHOLD: f64 = 70.0;
pub const SCORE_LOW_THRESHOLD: f64 = 50.0;

/// Inputs the rules look at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationContext {
    pub goal: Option<FitnessGoal>,
    pub bmi: f64,
    pub category: BmiCategory,
    pub weekly_change_kg: Option<f64>,
    pub training_frequency: u32,
    pub plan_alignment_index: f64,
    pub overall_score: f64,
}

impl RecommendationContext {
    pub fn new(profile: &Profile, scores: &ProfileScores) -> Self {
        Self {
            goal: profile.goal,
            bmi: scores.bmi,
            category: scores.category,
            weekly_change_kg: profile.weekly_change_kg(),
            training_frequency: profile.training_frequency(),
            plan_alignment_index: scores.plan_alignment_index,
            overall_score: scores.overall_score,
        }
    }
}

/// Matched recommendation rule, in precedence order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recommendation {
    BulkWhileObese { bmi: f64 },
    CutWhileUnderweight { bmi: f64 },
    AggressiveCut { weekly_change_kg: f64 },
    SteadyCut { training_frequency: u32 },
    AggressiveBulk { weekly_change_kg: f64 },
    LeanBulk,
    SolidBalance,
    TrendingLow,
    StayConsistent,
}

impl Recommendation {
    /// Select the first matching rule
    pub fn select(ctx: &RecommendationContext) -> Self {
        match (ctx.goal, ctx.category) {
            (Some(FitnessGoal::Bulk), BmiCategory::Obese) => {
                Recommendation::BulkWhileObese { bmi: ctx.bmi }
            }
            (Some(FitnessGoal::Cut), BmiCategory::Underweight) => {
                Recommendation::CutWhileUnderweight { bmi: ctx.bmi }
            }
            (Some(FitnessGoal::Cut), _) => match ctx.weekly_change_kg {
                Some(rate) if rate > CUT_RATE_WARNING => {
                    Recommendation::AggressiveCut { weekly_change_kg: rate }
                }
                _ => Recommendation::SteadyCut {
                    training_frequency: ctx.training_frequency,
                },
            },
            (Some(FitnessGoal::Bulk), _) => match ctx.weekly_change_kg {
                Some(rate) if rate > BULK_RATE_WARNING => {
                    Recommendation::AggressiveBulk { weekly_change_kg: rate }
                }
                _ => Recommendation::LeanBulk,
            },
            (None, _)
                if ctx.overall_score >= SCORE_STRONG_THRESHOLD
                    && ctx.plan_alignment_index >= PLAN_ALIGNMENT_STRONG_THRESHOLD =>
            {
                Recommendation::SolidBalance
            }
            (None, _) if ctx.overall_score < SCORE_LOW_THRESHOLD => Recommendation::TrendingLow,
            (None, _) => Recommendation::StayConsistent,
        }
    }

    /// Stable rule name, used in logs
    pub fn rule(&self) -> &'static str {
        match self {
            Recommendation::BulkWhileObese { .. } => "bulk_while_obese",
            Recommendation::CutWhileUnderweight { .. } => "cut_while_underweight",
            Recommendation::AggressiveCut { .. } => "aggressive_cut",
            Recommendation::SteadyCut { .. } => "steady_cut",
            Recommendation::AggressiveBulk { .. } => "aggressive_bulk",
            Recommendation::LeanBulk => "lean_bulk",
            Recommendation::SolidBalance => "solid_balance",
            Recommendation::TrendingLow => "trending_low",
            Recommendation::StayConsistent => "stay_consistent",
        }
    }

    /// User-facing message
    pub fn message(&self) -> String {
        match self {
            Recommendation::BulkWhileObese { bmi } => format!(
                "Keep bulking cautiously: BMI is {bmi:.1} (obese). \
                 Consider a short CUT phase before resuming bulk work."
            ),
            Recommendation::CutWhileUnderweight { bmi } => format!(
                "Keep prioritising recovery: BMI is {bmi:.1} (underweight). \
                 Shift toward maintenance or a lean bulk to rebuild."
            ),
            Recommendation::AggressiveCut { weekly_change_kg } => format!(
                "Cut target ({weekly_change_kg:.2} kg/week) is very aggressive. \
                 Slow the deficit to avoid burnout."
            ),
            Recommendation::SteadyCut { training_frequency } => format!(
                "Cutting effort is on track. Keep protein high and aim for \
                 {training_frequency} focused sessions each week."
            ),
            Recommendation::AggressiveBulk { weekly_change_kg } => format!(
                "Bulk rate ({weekly_change_kg:.2} kg/week) may add unnecessary fat. \
                 Dial the surplus back slightly."
            ),
            Recommendation::LeanBulk => {
                "Lean bulk focus looks good. Prioritize progressive overload and adequate sleep."
                    .to_string()
            }
            Recommendation::SolidBalance => {
                "Solid balance between health metrics and your plan. Maintain the current approach."
                    .to_string()
            }
            Recommendation::TrendingLow => {
                "Overall score is trending low. Revisit goals and add structured training \
                 for a steadier trajectory."
                    .to_string()
            }
            Recommendation::StayConsistent => {
                "Stay consistent with the plan and review progress every few weeks.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(goal: Option<FitnessGoal>, bmi: f64, category: BmiCategory) -> RecommendationContext {
        RecommendationContext {
            goal,
            bmi,
            category,
            weekly_change_kg: None,
            training_frequency: 3,
            plan_alignment_index: 60.0,
            overall_score: 65.0,
        }
    }

    #[test]
    fn test_bulk_while_obese_wins_over_rate_rules() {
        let mut c = ctx(Some(FitnessGoal::Bulk), 38.06, BmiCategory::Obese);
        c.weekly_change_kg = Some(1.2);
        let rec = Recommendation::select(&c);
        assert_eq!(rec, Recommendation::BulkWhileObese { bmi: 38.06 });

        let message = rec.message();
        assert!(message.contains("obese"));
        assert!(message.contains("CUT"));
        assert!(message.contains("38.1"));
    }

    #[test]
    fn test_cut_while_underweight() {
        let mut c = ctx(Some(FitnessGoal::Cut), 17.24, BmiCategory::Underweight);
        c.weekly_change_kg = Some(2.0);
        let rec = Recommendation::select(&c);
        assert_eq!(rec, Recommendation::CutWhileUnderweight { bmi: 17.24 });
        assert!(rec.message().contains("17.2"));
        assert!(rec.message().contains("lean bulk"));
    }

    #[test]
    fn test_aggressive_cut() {
        let mut c = ctx(Some(FitnessGoal::Cut), 27.0, BmiCategory::Overweight);
        c.weekly_change_kg = Some(1.5);
        let rec = Recommendation::select(&c);
        assert_eq!(rec.rule(), "aggressive_cut");
        assert!(rec.message().contains("very aggressive"));
        assert!(rec.message().contains("1.50 kg/week"));
    }

    #[test]
    fn test_steady_cut_at_threshold() {
        let mut c = ctx(Some(FitnessGoal::Cut), 27.0, BmiCategory::Overweight);
        c.weekly_change_kg = Some(0.9);
        let rec = Recommendation::select(&c);
        assert_eq!(rec, Recommendation::SteadyCut { training_frequency: 3 });
        assert!(rec.message().contains("3 focused sessions"));
    }

    #[test]
    fn test_bulk_rules() {
        let mut c = ctx(Some(FitnessGoal::Bulk), 21.0, BmiCategory::NormalWeight);
        c.weekly_change_kg = Some(0.75);
        let rec = Recommendation::select(&c);
        assert!(rec.message().contains("may add unnecessary fat"));
        assert!(rec.message().contains("0.75"));

        c.weekly_change_kg = Some(0.5);
        assert_eq!(Recommendation::select(&c), Recommendation::LeanBulk);

        c.weekly_change_kg = None;
        assert_eq!(Recommendation::select(&c), Recommendation::LeanBulk);
    }

    #[test]
    fn test_no_goal_rules() {
        let mut c = ctx(None, 22.0, BmiCategory::NormalWeight);
        c.overall_score = 92.0;
        c.plan_alignment_index = 80.0;
        let rec = Recommendation::select(&c);
        assert!(rec.message().contains("Solid balance"));

        // Strong score but weak alignment falls through
        c.plan_alignment_index = 69.9;
        assert_eq!(Recommendation::select(&c), Recommendation::StayConsistent);

        c.overall_score = 42.4;
        assert_eq!(Recommendation::select(&c), Recommendation::TrendingLow);
        assert!(Recommendation::TrendingLow.message().contains("trending low"));
    }
}
