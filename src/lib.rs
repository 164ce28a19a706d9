//! Fitness Insight - Health scoring engine for fitness profiles
//!
//! Scores a stored profile through a deterministic pipeline: BMI validation →
//! health index → plan alignment index → overall score → cohort percentile →
//! recommendation.
//!
//! ## Modules
//!
//! - **Engine**: Build insight results against a population snapshot
//! - **Calculator**: BMI, BMR and calorie targets
//! - **Plan details**: Diet and workout guidance for a goal plan
//! - **Profiles / Store**: Registration, goal plans and profile and researcher persistence
//! - **Research**: Anonymized population aggregations for research clients

pub mod calculator;
pub mod cohort;
pub mod config;
pub mod engine;
pub mod error;
pub mod plan_details;
pub mod profiles;
pub mod recommendation;
pub mod research;
pub mod scoring;
pub mod store;
pub mod types;

pub use config::{InsightConfig, ResearchConfig};
pub use engine::{build_insights, InsightEngine};
pub use error::InsightError;
pub use plan_details::PlanDetails;
pub use store::{InMemoryProfileStore, InMemoryResearcherStore, ProfileStore, ResearcherStore};
pub use types::{
    BmiCategory, ClientId, ClientKind, FitnessGoal, Gender, GoalPlan, InsightResult, NewProfile,
    NewResearcher, PlanStrategy, Profile, ProfileUpdate, Researcher,
};

/// Engine version reported by the CLI
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name reported by the CLI
pub const PRODUCER_NAME: &str = "fitness-insight";
