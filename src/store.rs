//! Profile storage
//!
//! The engine only needs a bulk `fetch_all` snapshot of the population; the
//! remaining operations back profile registration and maintenance. Research
//! clients are kept in a separate store keyed the same way.

use crate::error::InsightError;
use crate::types::{ClientId, Profile, Researcher};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// Trait for profile stores
pub trait ProfileStore {
    /// Complete, unordered snapshot of every stored profile
    fn fetch_all(&self) -> Result<Vec<Profile>, InsightError>;

    /// Profile owned by a client, if any
    fn find(&self, client_id: &ClientId) -> Result<Option<Profile>, InsightError>;

    /// Insert or replace the profile keyed by its client id
    fn save(&self, profile: Profile) -> Result<Profile, InsightError>;

    /// Remove a client's profile, returning whether one existed
    fn remove(&self, client_id: &ClientId) -> Result<bool, InsightError>;
}

impl<S: ProfileStore + ?Sized> ProfileStore for &S {
    fn fetch_all(&self) -> Result<Vec<Profile>, InsightError> {
        (**self).fetch_all()
    }

    fn find(&self, client_id: &ClientId) -> Result<Option<Profile>, InsightError> {
        (**self).find(client_id)
    }

    fn save(&self, profile: Profile) -> Result<Profile, InsightError> {
        (**self).save(profile)
    }

    fn remove(&self, client_id: &ClientId) -> Result<bool, InsightError> {
        (**self).remove(client_id)
    }
}

impl<S: ProfileStore + ?Sized> ProfileStore for Arc<S> {
    fn fetch_all(&self) -> Result<Vec<Profile>, InsightError> {
        (**self).fetch_all()
    }

    fn find(&self, client_id: &ClientId) -> Result<Option<Profile>, InsightError> {
        (**self).find(client_id)
    }

    fn save(&self, profile: Profile) -> Result<Profile, InsightError> {
        (**self).save(profile)
    }

    fn remove(&self, client_id: &ClientId) -> Result<bool, InsightError> {
        (**self).remove(client_id)
    }
}

/// Thread-safe in-memory store
///
/// `fetch_all` clones the map under a read lock, so scoring works on a
/// snapshot and never holds the lock.
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<BTreeMap<ClientId, Profile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from existing profiles; later duplicates win
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|p| (p.client_id.clone(), p))
            .collect();
        Self {
            profiles: RwLock::new(map),
        }
    }

    /// Load a store from a JSON array of profiles
    pub fn from_json(json: &str) -> Result<Self, InsightError> {
        let profiles: Vec<Profile> = serde_json::from_str(json)?;
        Ok(Self::with_profiles(profiles))
    }

    /// Serialize the store to a JSON array of profiles
    pub fn to_json(&self) -> Result<String, InsightError> {
        let profiles = self.fetch_all()?;
        serde_json::to_string_pretty(&profiles).map_err(InsightError::Json)
    }

    pub fn len(&self) -> Result<usize, InsightError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, InsightError> {
        Ok(self.read()?.is_empty())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<ClientId, Profile>>, InsightError> {
        self.profiles
            .read()
            .map_err(|e| InsightError::Store(format!("profile store lock poisoned: {e}")))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<ClientId, Profile>>, InsightError> {
        self.profiles
            .write()
            .map_err(|e| InsightError::Store(format!("profile store lock poisoned: {e}")))
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn fetch_all(&self) -> Result<Vec<Profile>, InsightError> {
        Ok(self.read()?.values().cloned().collect())
    }

    fn find(&self, client_id: &ClientId) -> Result<Option<Profile>, InsightError> {
        Ok(self.read()?.get(client_id).cloned())
    }

    fn save(&self, profile: Profile) -> Result<Profile, InsightError> {
        self.write()?
            .insert(profile.client_id.clone(), profile.clone());
        Ok(profile)
    }

    fn remove(&self, client_id: &ClientId) -> Result<bool, InsightError> {
        Ok(self.write()?.remove(client_id).is_some())
    }
}

/// Trait for research client stores
pub trait ResearcherStore {
    /// Researcher registered under a client id, if any
    fn find_researcher(&self, client_id: &ClientId) -> Result<Option<Researcher>, InsightError>;

    /// Insert a new researcher; fails with `InvalidInput` if the email is taken
    fn insert_researcher(&self, researcher: Researcher) -> Result<Researcher, InsightError>;
}

/// Thread-safe in-memory researcher store
///
/// The email uniqueness check and the insert happen under one write lock.
#[derive(Debug, Default)]
pub struct InMemoryResearcherStore {
    researchers: RwLock<BTreeMap<ClientId, Researcher>>,
}

impl InMemoryResearcherStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON array of researchers
    pub fn from_json(json: &str) -> Result<Self, InsightError> {
        let researchers: Vec<Researcher> = serde_json::from_str(json)?;
        let map = researchers
            .into_iter()
            .map(|r| (r.client_id.clone(), r))
            .collect();
        Ok(Self {
            researchers: RwLock::new(map),
        })
    }

    /// Serialize the store to a JSON array of researchers
    pub fn to_json(&self) -> Result<String, InsightError> {
        let researchers: Vec<Researcher> = self
            .researchers
            .read()
            .map_err(|e| InsightError::Store(format!("researcher store lock poisoned: {e}")))?
            .values()
            .cloned()
            .collect();
        serde_json::to_string_pretty(&researchers).map_err(InsightError::Json)
    }
}

impl ResearcherStore for InMemoryResearcherStore {
    fn find_researcher(&self, client_id: &ClientId) -> Result<Option<Researcher>, InsightError> {
        Ok(self
            .researchers
            .read()
            .map_err(|e| InsightError::Store(format!("researcher store lock poisoned: {e}")))?
            .get(client_id)
            .cloned())
    }

    fn insert_researcher(&self, researcher: Researcher) -> Result<Researcher, InsightError> {
        let mut researchers = self
            .researchers
            .write()
            .map_err(|e| InsightError::Store(format!("researcher store lock poisoned: {e}")))?;
        if researchers.values().any(|r| r.email == researcher.email) {
            return Err(InsightError::InvalidInput("Email already registered".to_string()));
        }
        researchers.insert(researcher.client_id.clone(), researcher.clone());
        Ok(researcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::thread;

    fn profile(id: &str, weight: f64) -> Profile {
        Profile::new(ClientId::parse(id).unwrap(), id, weight, 175.0)
    }

    #[test]
    fn test_crud() {
        let store = InMemoryProfileStore::new();
        let id = ClientId::parse("mobile-a").unwrap();

        assert_eq!(store.find(&id).unwrap(), None);
        store.save(profile("mobile-a", 70.0)).unwrap();
        assert_eq!(store.find(&id).unwrap().unwrap().weight_kg, Some(70.0));

        store.save(profile("mobile-a", 72.0)).unwrap();
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.find(&id).unwrap().unwrap().weight_kg, Some(72.0));

        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_json_round_trip_keeps_profiles() {
        let store = InMemoryProfileStore::with_profiles(vec![
            profile("mobile-a", 70.0),
            profile("mobile-b", 80.0),
        ]);
        let json = store.to_json().unwrap();
        let loaded = InMemoryProfileStore::from_json(&json).unwrap();
        assert_eq!(loaded.fetch_all().unwrap(), store.fetch_all().unwrap());
    }

    #[test]
    fn test_malformed_row_does_not_block_load() {
        let json = r#"[
            {"clientId": "mobile-good", "name": "Good", "weight": 70.0, "height": 175.0,
             "trainingFrequencyPerWeek": 4},
            {"clientId": "mobile-bad", "name": "Bad", "weight": 70.0, "height": 0.0,
             "targetDurationWeeks": -2, "trainingFrequencyPerWeek": -1}
        ]"#;
        let store = InMemoryProfileStore::from_json(json).unwrap();
        assert_eq!(store.len().unwrap(), 2);

        let bad = store.find(&ClientId::parse("mobile-bad").unwrap()).unwrap().unwrap();
        assert_eq!(bad.training_frequency_per_week, Some(0));
        assert_eq!(bad.weekly_change_kg(), None);

        let good = store.find(&ClientId::parse("mobile-good").unwrap()).unwrap().unwrap();
        let result = crate::engine::build_insights(
            &good,
            &store.fetch_all().unwrap(),
            &crate::config::InsightConfig::with_min_cohort_size(1).unwrap(),
        )
        .unwrap();
        assert_eq!(result.percentile, Some(100.0));
    }

    #[test]
    fn test_concurrent_writers_and_snapshots() {
        let store = Arc::new(InMemoryProfileStore::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store.save(profile(&format!("mobile-t{i}"), 60.0 + i as f64)).unwrap();
                    store.fetch_all().unwrap().len()
                })
            })
            .collect();

        for handle in handles {
            let seen = handle.join().unwrap();
            assert!((1..=8).contains(&seen));
        }
        assert_eq!(store.fetch_all().unwrap().len(), 8);
    }

    fn researcher(id: &str, email: &str) -> Researcher {
        Researcher {
            client_id: ClientId::parse(id).unwrap(),
            name: "Lab".to_string(),
            email: email.to_string(),
        }
    }

    #[test]
    fn test_researcher_store_rejects_duplicate_email() {
        let store = InMemoryResearcherStore::new();
        store.insert_researcher(researcher("research-a", "lab@uni.edu")).unwrap();

        let err = store
            .insert_researcher(researcher("research-b", "lab@uni.edu"))
            .unwrap_err();
        assert!(matches!(err, InsightError::InvalidInput(_)));
        assert_eq!(
            store.find_researcher(&ClientId::parse("research-b").unwrap()).unwrap(),
            None
        );

        let loaded = InMemoryResearcherStore::from_json(&store.to_json().unwrap()).unwrap();
        let found = loaded
            .find_researcher(&ClientId::parse("research-a").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(found.email, "lab@uni.edu");
    }

    #[test]
    fn test_store_through_reference_and_arc() {
        fn count(store: impl ProfileStore) -> usize {
            store.fetch_all().unwrap().len()
        }

        let store = InMemoryProfileStore::with_profiles(vec![profile("mobile-a", 70.0)]);
        assert_eq!(count(&store), 1);
        assert_eq!(count(Arc::new(store)), 1);
    }
}
