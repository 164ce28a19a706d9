//! Profile registration and maintenance
//!
//! Validates caller input before it reaches the store. The client identity is
//! passed explicitly to every operation.

use crate::calculator::calculate_bmi;
use crate::error::InsightError;
use crate::store::ProfileStore;
use crate::types::{
    ClientId, ClientKind, FitnessGoal, GoalPlan, NewProfile, Profile, ProfileUpdate,
};
use chrono::NaiveDate;
use tracing::info;

/// Upper bound accepted for weekly training sessions
pub const MAX_TRAINING_FREQUENCY: u32 = 14;

/// Lowest weight a cut plan may end at (kg)
pub const MIN_HEALTHY_WEIGHT_KG: f64 = 30.0;
/// Highest weight a bulk plan may end at (kg)
pub const MAX_REASONABLE_WEIGHT_KG: f64 = 200.0;
/// Lowest BMI a cut plan may end at
pub const MIN_HEALTHY_BMI: f64 = 15.0;
/// Highest BMI a bulk plan may end at
pub const MAX_REASONABLE_BMI: f64 = 50.0;

/// Register a new profile under a freshly generated mobile client id
pub fn register(
    store: &impl ProfileStore,
    request: NewProfile,
    today: NaiveDate,
) -> Result<Profile, InsightError> {
    validate_metrics(&request, today)?;

    let mut profile = Profile::new(
        ClientId::generate(ClientKind::Mobile),
        request.name.trim(),
        request.weight_kg,
        request.height_cm,
    );
    profile.birth_date = Some(request.birth_date);
    profile.gender = request.gender;

    let saved = store.save(profile)?;
    info!(client_id = %saved.client_id, "Registered profile");
    Ok(saved)
}

/// Fetch the profile owned by `client_id`
pub fn profile(store: &impl ProfileStore, client_id: &ClientId) -> Result<Profile, InsightError> {
    store
        .find(client_id)?
        .ok_or_else(|| InsightError::ProfileNotFound(client_id.to_string()))
}

/// Replace the body metrics of an existing profile
pub fn update_metrics(
    store: &impl ProfileStore,
    client_id: &ClientId,
    update: ProfileUpdate,
    today: NaiveDate,
) -> Result<Profile, InsightError> {
    validate_metrics(&update, today)?;

    let mut existing = profile(store, client_id)?;
    existing.name = update.name.trim().to_string();
    existing.weight_kg = Some(update.weight_kg);
    existing.height_cm = Some(update.height_cm);
    existing.birth_date = Some(update.birth_date);
    if update.gender.is_some() {
        existing.gender = update.gender;
    }

    store.save(existing)
}

/// Attach or replace the goal plan of an existing profile
pub fn configure_plan(
    store: &impl ProfileStore,
    client_id: &ClientId,
    plan: GoalPlan,
) -> Result<Profile, InsightError> {
    if !plan.target_change_kg.is_finite() || plan.target_change_kg <= 0.0 {
        return Err(InsightError::InvalidInput(
            "targetChangeKg must be greater than 0".to_string(),
        ));
    }
    if plan.target_duration_weeks == 0 {
        return Err(InsightError::InvalidInput(
            "targetDurationWeeks must be greater than 0".to_string(),
        ));
    }
    if plan.training_frequency_per_week > MAX_TRAINING_FREQUENCY {
        return Err(InsightError::InvalidInput(format!(
            "trainingFrequencyPerWeek must be between 0 and {MAX_TRAINING_FREQUENCY}"
        )));
    }

    let mut existing = profile(store, client_id)?;
    check_target_weight(&existing, &plan)?;
    existing.goal = Some(plan.goal);
    existing.plan_strategy = Some(plan.plan_strategy);
    existing.target_change_kg = Some(plan.target_change_kg);
    existing.target_duration_weeks = Some(plan.target_duration_weeks);
    existing.training_frequency_per_week = Some(plan.training_frequency_per_week);

    store.save(existing)
}

/// Delete a client's profile, returning whether one existed
pub fn delete(store: &impl ProfileStore, client_id: &ClientId) -> Result<bool, InsightError> {
    let removed = store.remove(client_id)?;
    if removed {
        info!(client_id = %client_id, "Deleted profile");
    }
    Ok(removed)
}

/// Reject plans whose end weight or BMI would leave the safe range
fn check_target_weight(profile: &Profile, plan: &GoalPlan) -> Result<(), InsightError> {
    let Some(current) = profile.weight_kg else {
        return Ok(());
    };
    let change = plan.target_change_kg.abs();
    let target_bmi = |target: f64| {
        profile
            .height_cm
            .filter(|h| *h > 0.0)
            .map(|h| target / ((h / 100.0) * (h / 100.0)))
    };

    match plan.goal {
        FitnessGoal::Cut => {
            let target = current - change;
            if target < MIN_HEALTHY_WEIGHT_KG {
                return Err(InsightError::InvalidInput(format!(
                    "Target weight ({target:.1} kg) is below the minimum healthy weight \
                     ({MIN_HEALTHY_WEIGHT_KG:.1} kg). Losing {change:.1} kg from your current \
                     weight of {current:.1} kg would be unsafe. \
                     Please set a more realistic target weight."
                )));
            }
            if let Some(bmi) = target_bmi(target).filter(|bmi| *bmi < MIN_HEALTHY_BMI) {
                return Err(InsightError::InvalidInput(format!(
                    "Target BMI ({bmi:.1}) would be below the minimum healthy BMI \
                     ({MIN_HEALTHY_BMI:.1}). Losing {change:.1} kg from your current weight of \
                     {current:.1} kg would result in an unsafe BMI. \
                     Please set a more realistic target weight."
                )));
            }
        }
        FitnessGoal::Bulk => {
            let target = current + change;
            if target > MAX_REASONABLE_WEIGHT_KG {
                return Err(InsightError::InvalidInput(format!(
                    "Target weight ({target:.1} kg) exceeds the maximum reasonable weight \
                     ({MAX_REASONABLE_WEIGHT_KG:.1} kg). Gaining {change:.1} kg from your current \
                     weight of {current:.1} kg would be excessive. \
                     Please set a more realistic target weight."
                )));
            }
            if let Some(bmi) = target_bmi(target).filter(|bmi| *bmi > MAX_REASONABLE_BMI) {
                return Err(InsightError::InvalidInput(format!(
                    "Target BMI ({bmi:.1}) would exceed the maximum reasonable BMI \
                     ({MAX_REASONABLE_BMI:.1}). Gaining {change:.1} kg from your current weight of \
                     {current:.1} kg would result in an unsafe BMI. \
                     Please set a more realistic target weight."
                )));
            }
        }
    }
    Ok(())
}

fn validate_metrics(request: &NewProfile, today: NaiveDate) -> Result<(), InsightError> {
    if request.name.trim().is_empty() {
        return Err(InsightError::InvalidInput("name is required".to_string()));
    }
    calculate_bmi(Some(request.weight_kg), Some(request.height_cm))?;
    if request.birth_date > today {
        return Err(InsightError::InvalidInput(
            "birthDate cannot be in the future".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryProfileStore;
    use crate::types::{Gender, PlanStrategy};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn request(name: &str, weight: f64, height: f64) -> NewProfile {
        NewProfile {
            name: name.to_string(),
            weight_kg: weight,
            height_cm: height,
            birth_date: NaiveDate::from_ymd_opt(1995, 3, 14).unwrap(),
            gender: Some(Gender::Female),
        }
    }

    fn plan() -> GoalPlan {
        GoalPlan {
            goal: FitnessGoal::Cut,
            plan_strategy: PlanStrategy::Diet,
            target_change_kg: 5.0,
            target_duration_weeks: 10,
            training_frequency_per_week: 3,
        }
    }

    #[test]
    fn test_register_assigns_mobile_id() {
        let store = InMemoryProfileStore::new();
        let saved = register(&store, request("  Ada ", 62.0, 168.0), today()).unwrap();

        assert_eq!(saved.client_id.kind(), ClientKind::Mobile);
        assert_eq!(saved.name, "Ada");
        assert_eq!(profile(&store, &saved.client_id).unwrap(), saved);
    }

    #[test]
    fn test_register_rejects_invalid_metrics() {
        let store = InMemoryProfileStore::new();
        assert!(register(&store, request("", 62.0, 168.0), today()).is_err());
        assert!(register(&store, request("Ada", 0.0, 168.0), today()).is_err());
        assert!(register(&store, request("Ada", 62.0, 400.0), today()).is_err());

        let mut future = request("Ada", 62.0, 168.0);
        future.birth_date = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
        assert!(register(&store, future, today()).is_err());

        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_update_and_plan() {
        let store = InMemoryProfileStore::new();
        let saved = register(&store, request("Ada", 62.0, 168.0), today()).unwrap();

        let updated =
            update_metrics(&store, &saved.client_id, request("Ada L", 64.0, 168.0), today()).unwrap();
        assert_eq!(updated.weight_kg, Some(64.0));
        assert_eq!(updated.name, "Ada L");

        let planned = configure_plan(&store, &saved.client_id, plan()).unwrap();
        assert_eq!(planned.goal, Some(FitnessGoal::Cut));
        assert_eq!(planned.weekly_change_kg(), Some(0.5));
        assert_eq!(planned.weight_kg, Some(64.0));
    }

    #[test]
    fn test_plan_validation() {
        let store = InMemoryProfileStore::new();
        let saved = register(&store, request("Ada", 62.0, 168.0), today()).unwrap();

        let mut bad = plan();
        bad.target_change_kg = 0.0;
        assert!(configure_plan(&store, &saved.client_id, bad).is_err());

        let mut bad = plan();
        bad.target_duration_weeks = 0;
        assert!(configure_plan(&store, &saved.client_id, bad).is_err());

        let mut bad = plan();
        bad.training_frequency_per_week = 21;
        assert!(configure_plan(&store, &saved.client_id, bad).is_err());
    }

    fn plan_for(goal: FitnessGoal, change: f64) -> GoalPlan {
        GoalPlan {
            goal,
            target_change_kg: change,
            target_duration_weeks: 52,
            ..plan()
        }
    }

    fn registered(store: &InMemoryProfileStore, weight: f64, height: f64) -> ClientId {
        register(store, request("Ada", weight, height), today())
            .unwrap()
            .client_id
    }

    #[test]
    fn test_cut_plan_weight_floor() {
        let store = InMemoryProfileStore::new();
        // 30 kg at 140 cm is BMI 15.3, so only the weight floor applies
        let id = registered(&store, 60.0, 140.0);

        assert!(configure_plan(&store, &id, plan_for(FitnessGoal::Cut, 30.0)).is_ok());

        let err = configure_plan(&store, &id, plan_for(FitnessGoal::Cut, 30.5)).unwrap_err();
        assert!(matches!(err, InsightError::InvalidInput(_)));
        assert!(err.to_string().contains("below the minimum healthy weight"));
        assert!(err.to_string().contains("29.5 kg"));
    }

    #[test]
    fn test_cut_plan_bmi_floor() {
        let store = InMemoryProfileStore::new();
        let id = registered(&store, 70.0, 175.0);

        // 46 kg at 175 cm is BMI 15.02
        assert!(configure_plan(&store, &id, plan_for(FitnessGoal::Cut, 24.0)).is_ok());

        // 45 kg at 175 cm is BMI 14.7
        let err = configure_plan(&store, &id, plan_for(FitnessGoal::Cut, 25.0)).unwrap_err();
        assert!(err.to_string().contains("below the minimum healthy BMI"));

        // A cut that would end below zero never reaches the store
        assert!(configure_plan(&store, &id, plan_for(FitnessGoal::Cut, 100.0)).is_err());
        assert_eq!(profile(&store, &id).unwrap().target_change_kg, Some(24.0));
    }

    #[test]
    fn test_bulk_plan_weight_ceiling() {
        let store = InMemoryProfileStore::new();
        // 200 kg at 200 cm is exactly BMI 50, which is still allowed
        let id = registered(&store, 150.0, 200.0);

        assert!(configure_plan(&store, &id, plan_for(FitnessGoal::Bulk, 50.0)).is_ok());

        let err = configure_plan(&store, &id, plan_for(FitnessGoal::Bulk, 51.0)).unwrap_err();
        assert!(err.to_string().contains("exceeds the maximum reasonable weight"));
    }

    #[test]
    fn test_bulk_plan_bmi_ceiling() {
        let store = InMemoryProfileStore::new();
        let id = registered(&store, 100.0, 170.0);

        // 144 kg at 170 cm is BMI 49.8
        assert!(configure_plan(&store, &id, plan_for(FitnessGoal::Bulk, 44.0)).is_ok());

        // 145 kg at 170 cm is BMI 50.2
        let err = configure_plan(&store, &id, plan_for(FitnessGoal::Bulk, 45.0)).unwrap_err();
        assert!(err.to_string().contains("exceed the maximum reasonable BMI"));
    }

    #[test]
    fn test_missing_profile() {
        let store = InMemoryProfileStore::new();
        let id = ClientId::parse("mobile-ghost").unwrap();
        assert!(matches!(profile(&store, &id), Err(InsightError::ProfileNotFound(_))));
        assert!(matches!(
            configure_plan(&store, &id, plan()),
            Err(InsightError::ProfileNotFound(_))
        ));
        assert!(!delete(&store, &id).unwrap());
    }
}
