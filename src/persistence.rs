use crate::dates;
use crate::errors::StoreError;
use crate::models::{Category, Encouragement, Habit, MoodEntry};
use crate::storage::KeyValueStore;
use crate::store::HabitStore;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{error, info, warn};

pub const HABITS_KEY: &str = "habitforge-habits";
pub const MOODS_KEY: &str = "habitforge-moods";
pub const SCHEMA_VERSION_KEY: &str = "habitforge-schema-version";

/// Data written without a version key predates versioning and has the same
/// shape as version 1.
pub const SCHEMA_VERSION: u32 = 1;

/// Reads both collections and recomputes streaks as of now. Anything
/// missing, malformed or written by a newer schema comes back as empty
/// collections.
pub fn load(kv: &impl KeyValueStore) -> HabitStore {
    let (habits, moods) = load_parts(kv);
    HabitStore::from_parts(habits, moods)
}

fn load_parts(kv: &impl KeyValueStore) -> (Vec<Habit>, Vec<MoodEntry>) {
    match stored_version(kv) {
        Some(version) if version > SCHEMA_VERSION => {
            warn!("stored schema version {version} is newer than {SCHEMA_VERSION}, ignoring stored data");
            return (Vec::new(), Vec::new());
        }
        _ => {}
    }

    let habits: Vec<Habit> = load_collection(kv, HABITS_KEY);
    let moods: Vec<MoodEntry> = load_collection(kv, MOODS_KEY);
    info!(habits = habits.len(), moods = moods.len(), "state loaded");
    (habits, moods)
}

/// Overwrites the stored snapshot of both collections.
pub fn save(kv: &mut impl KeyValueStore, store: &HabitStore) {
    save_collection(kv, HABITS_KEY, store.habits());
    save_collection(kv, MOODS_KEY, store.mood_entries());
    kv.set(SCHEMA_VERSION_KEY, SCHEMA_VERSION.to_string());
}

fn stored_version(kv: &impl KeyValueStore) -> Option<u32> {
    let raw = kv.get(SCHEMA_VERSION_KEY)?;
    match raw.trim().parse() {
        Ok(version) => Some(version),
        Err(err) => {
            warn!("ignoring unreadable schema version '{raw}': {err}");
            None
        }
    }
}

fn load_collection<T: DeserializeOwned>(kv: &impl KeyValueStore, key: &str) -> Vec<T> {
    let Some(raw) = kv.get(key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(err) => {
            warn!("failed to parse stored {key}: {err}");
            Vec::new()
        }
    }
}

fn save_collection<T: Serialize>(kv: &mut impl KeyValueStore, key: &str, items: &[T]) {
    match serde_json::to_string(items) {
        Ok(payload) => kv.set(key, payload),
        Err(err) => error!("failed to serialize {key}: {err}"),
    }
}

/// A `HabitStore` that writes itself to `kv` after every mutation.
#[derive(Debug)]
pub struct PersistedStore<K> {
    store: HabitStore,
    kv: K,
}

impl<K: KeyValueStore> PersistedStore<K> {
    /// Loads the session and writes back any streak that had gone stale.
    pub fn load(kv: K) -> Self {
        Self::load_at(kv, dates::now())
    }

    pub fn load_at(kv: K, now: NaiveDateTime) -> Self {
        let (habits, moods) = load_parts(&kv);
        let stored: Vec<u32> = habits.iter().map(Habit::streak).collect();
        let store = HabitStore::from_parts_at(habits, moods, now);
        let stale = store
            .habits()
            .iter()
            .zip(&stored)
            .any(|(habit, streak)| habit.streak() != *streak);

        let mut persisted = Self { store, kv };
        if stale {
            info!("stored streaks were stale, rewriting");
            persisted.save();
        }
        persisted
    }

    pub fn store(&self) -> &HabitStore {
        &self.store
    }

    pub fn kv(&self) -> &K {
        &self.kv
    }

    pub fn kv_mut(&mut self) -> &mut K {
        &mut self.kv
    }

    pub fn into_kv(self) -> K {
        self.kv
    }

    pub fn add_habit(
        &mut self,
        name: &str,
        description: &str,
        category: Category,
    ) -> Result<Habit, StoreError> {
        let habit = self.store.add_habit(name, description, category)?;
        self.save();
        Ok(habit)
    }

    pub fn complete_habit(&mut self, id: &str) -> Option<Encouragement> {
        let encouragement = self.store.complete_habit(id)?;
        self.save();
        Some(encouragement)
    }

    pub fn add_mood_entry(&mut self, mood: u8, note: &str) -> Result<MoodEntry, StoreError> {
        let entry = self.store.add_mood_entry(mood, note)?;
        self.save();
        Ok(entry)
    }

    /// Recomputes streaks as of now and saves when any changed.
    pub fn refresh_streaks(&mut self) -> bool {
        self.refresh_streaks_at(dates::now())
    }

    pub fn refresh_streaks_at(&mut self, now: NaiveDateTime) -> bool {
        let changed = self.store.refresh_streaks_at(now);
        if changed {
            self.save();
        }
        changed
    }

    pub fn active_encouragement(&mut self, now: DateTime<Utc>) -> Option<&Encouragement> {
        self.store.active_encouragement(now)
    }

    /// Drops every stored record and empties the session.
    pub fn clear(&mut self) {
        self.kv.clear();
        self.store = HabitStore::new();
    }

    fn save(&mut self) {
        save(&mut self.kv, &self.store);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::streak::compute_streak;
    use chrono::{Duration, NaiveDate};

    const STALE_HABITS: &str = r#"[{"id":"1","name":"Walk","description":"","category":"Egzersiz","streak":5,"completedDates":["2025-01-01","2025-01-02","2025-01-03","2025-01-04","2025-01-05"],"createdAt":"2025-01-01T08:00:00.000Z"}]"#;

    #[test]
    fn empty_store_loads_empty() {
        let store = load(&MemoryStore::new());
        assert!(store.habits().is_empty());
        assert!(store.mood_entries().is_empty());
    }

    #[test]
    fn collections_round_trip() {
        let mut persisted = PersistedStore::load(MemoryStore::new());
        let id = persisted
            .add_habit("Meditate", "morning", Category::Mindfulness)
            .unwrap()
            .id;
        persisted.add_habit("Swim", "", Category::Exercise).unwrap();
        persisted.complete_habit(&id).unwrap();
        persisted.add_mood_entry(4, "felt good").unwrap();
        persisted.add_mood_entry(2, "").unwrap();

        let expected_habits = persisted.store().habits().to_vec();
        let expected_moods = persisted.store().mood_entries().to_vec();

        let reloaded = PersistedStore::load(persisted.into_kv());
        assert_eq!(reloaded.store().habits(), expected_habits.as_slice());
        assert_eq!(reloaded.store().mood_entries(), expected_moods.as_slice());
    }

    #[test]
    fn every_mutation_is_saved() {
        let mut persisted = PersistedStore::load(MemoryStore::new());
        persisted.add_habit("Read", "", Category::Learning).unwrap();
        let saved: Vec<Habit> =
            serde_json::from_str(&persisted.kv().get(HABITS_KEY).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(
            persisted.kv().get(SCHEMA_VERSION_KEY).as_deref(),
            Some("1")
        );

        persisted.add_mood_entry(5, "").unwrap();
        let saved: Vec<MoodEntry> =
            serde_json::from_str(&persisted.kv().get(MOODS_KEY).unwrap()).unwrap();
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn rejected_input_does_not_touch_storage() {
        let mut persisted = PersistedStore::load(MemoryStore::new());
        assert!(persisted.add_habit("  ", "", Category::Other).is_err());
        assert!(persisted.add_mood_entry(9, "").is_err());
        assert_eq!(persisted.kv().get(HABITS_KEY), None);
        assert_eq!(persisted.kv().get(MOODS_KEY), None);
    }

    #[test]
    fn malformed_collections_degrade_to_empty() {
        let mut kv = MemoryStore::new();
        kv.set(HABITS_KEY, "{\"broken\":".to_string());
        kv.set(MOODS_KEY, "[{\"id\":\"1\",\"date\":\"2026-01-05\",\"mood\":7}]".to_string());

        let store = load(&kv);
        assert!(store.habits().is_empty());
        assert!(store.mood_entries().is_empty());
    }

    #[test]
    fn legacy_data_without_version_loads() {
        let mut kv = MemoryStore::new();
        kv.set(
            HABITS_KEY,
            r#"[{"id":"1717171717171","name":"Walk","description":"","category":"Egzersiz","streak":1,"completedDates":["2026-01-05"],"createdAt":"2026-01-01T08:00:00.000Z"}]"#
                .to_string(),
        );
        kv.set(
            MOODS_KEY,
            r#"[{"id":"1717171717172","date":"2026-01-05","mood":4,"note":"felt good"}]"#
                .to_string(),
        );

        let store = load(&kv);
        assert_eq!(store.habits().len(), 1);
        assert_eq!(store.habits()[0].category, Category::Exercise);
        assert_eq!(store.mood_entries()[0].mood.label(), "İyi");
    }

    #[test]
    fn newer_schema_is_ignored() {
        let mut kv = MemoryStore::new();
        kv.set(SCHEMA_VERSION_KEY, "2".to_string());
        kv.set(HABITS_KEY, "[]".to_string());
        kv.set(
            MOODS_KEY,
            r#"[{"id":"1","date":"2026-01-05","mood":3,"note":""}]"#.to_string(),
        );

        assert!(load(&kv).mood_entries().is_empty());
    }

    #[test]
    fn clear_empties_session_and_storage() {
        let mut persisted = PersistedStore::load(MemoryStore::new());
        persisted.add_habit("Read", "", Category::Learning).unwrap();
        persisted.clear();
        assert!(persisted.store().habits().is_empty());
        assert_eq!(persisted.kv().get(HABITS_KEY), None);
    }

    #[test]
    fn completion_is_saved_with_fresh_streak() {
        let mut persisted = PersistedStore::load(MemoryStore::new());
        let id = persisted.add_habit("Meditate", "", Category::Mindfulness).unwrap().id;
        assert!(persisted.complete_habit(&id).is_some());
        assert!(persisted.complete_habit(&id).is_none());

        let saved: Vec<Habit> =
            serde_json::from_str(&persisted.kv().get(HABITS_KEY).unwrap()).unwrap();
        assert_eq!(saved[0].streak(), 1);
        assert!(saved[0].is_completed_on(dates::today()));
    }

    #[test]
    fn loaded_streak_matches_calculator() {
        let mut kv = MemoryStore::new();
        kv.set(HABITS_KEY, STALE_HABITS.to_string());

        let store = load(&kv);
        let habit = &store.habits()[0];
        assert_eq!(habit.streak(), compute_streak(habit.completed_dates()));
        assert_eq!(habit.streak(), 0);
    }

    #[test]
    fn stale_streaks_are_rewritten_on_load() {
        let mut kv = MemoryStore::new();
        kv.set(HABITS_KEY, STALE_HABITS.to_string());

        let persisted = PersistedStore::load(kv);
        let saved: Vec<Habit> =
            serde_json::from_str(&persisted.kv().get(HABITS_KEY).unwrap()).unwrap();
        assert_eq!(saved[0].streak(), 0);
    }

    #[test]
    fn fresh_streaks_leave_storage_alone_on_load() {
        let mut kv = MemoryStore::new();
        kv.set(HABITS_KEY, STALE_HABITS.to_string());
        let evening = NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();

        let persisted = PersistedStore::load_at(kv, evening);
        assert_eq!(persisted.store().habits()[0].streak(), 5);
        assert_eq!(persisted.kv().get(SCHEMA_VERSION_KEY), None);
    }

    #[test]
    fn refresh_saves_only_when_streak_changes() {
        let mut kv = MemoryStore::new();
        kv.set(HABITS_KEY, STALE_HABITS.to_string());
        let evening = NaiveDate::from_ymd_opt(2025, 1, 5)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        let mut persisted = PersistedStore::load_at(kv, evening);

        assert!(!persisted.refresh_streaks_at(evening + Duration::hours(2)));
        assert_eq!(persisted.kv().get(SCHEMA_VERSION_KEY), None);

        assert!(persisted.refresh_streaks_at(evening + Duration::days(3)));
        let saved: Vec<Habit> =
            serde_json::from_str(&persisted.kv().get(HABITS_KEY).unwrap()).unwrap();
        assert_eq!(saved[0].streak(), 0);
    }
}
