use crate::dates;
use crate::errors::StoreError;
use crate::models::{Category, Encouragement, Habit, Mood, MoodEntry};
use chrono::{DateTime, Duration, Local, NaiveDateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;
use uuid::Uuid;

pub const ENCOURAGEMENT_MESSAGES: [&str; 5] = [
    "Harika! Bir adım daha yaklaştın! ✨",
    "Süpersin! Bu momentum'u koru! 🌟",
    "Bravo! Kendine güvenmeye devam et! 💪",
    "Muhteşem! Her gün biraz daha güçleniyorsun! 🚀",
    "Tebrikler! Bu ilerleme gerçekten değerli! 🎉",
];

pub const ENCOURAGEMENT_TTL_SECS: i64 = 3;

/// Habits and mood entries for one session, plus the pending encouragement.
#[derive(Debug, Default)]
pub struct HabitStore {
    habits: Vec<Habit>,
    moods: Vec<MoodEntry>,
    encouragement: Option<Encouragement>,
}

impl HabitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from loaded collections, recomputing every cached
    /// streak as of now.
    pub fn from_parts(habits: Vec<Habit>, moods: Vec<MoodEntry>) -> Self {
        Self::from_parts_at(habits, moods, dates::now())
    }

    pub fn from_parts_at(habits: Vec<Habit>, moods: Vec<MoodEntry>, now: NaiveDateTime) -> Self {
        let mut store = Self {
            habits,
            moods,
            encouragement: None,
        };
        store.refresh_streaks_at(now);
        store
    }

    /// Brings every cached streak up to date. Returns true when any changed.
    pub fn refresh_streaks_at(&mut self, now: NaiveDateTime) -> bool {
        let mut changed = false;
        for habit in &mut self.habits {
            if habit.refresh_streak(now) {
                debug!(id = %habit.id, streak = habit.streak(), "streak refreshed");
                changed = true;
            }
        }
        changed
    }

    pub fn habits(&self) -> &[Habit] {
        &self.habits
    }

    pub fn mood_entries(&self) -> &[MoodEntry] {
        &self.moods
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn add_habit(
        &mut self,
        name: &str,
        description: &str,
        category: Category,
    ) -> Result<Habit, StoreError> {
        self.add_habit_at(name, description, category, Utc::now())
    }

    pub fn add_habit_at(
        &mut self,
        name: &str,
        description: &str,
        category: Category,
        created_at: DateTime<Utc>,
    ) -> Result<Habit, StoreError> {
        if name.trim().is_empty() {
            return Err(StoreError::EmptyName);
        }

        let habit = Habit::new(
            new_id(),
            name.to_string(),
            description.to_string(),
            category,
            created_at,
        );
        debug!(id = %habit.id, name = %habit.name, "habit added");
        self.habits.push(habit.clone());
        Ok(habit)
    }

    /// Marks the habit done for today. `None` means nothing changed: the id
    /// is unknown or today is already recorded.
    pub fn complete_habit(&mut self, id: &str) -> Option<Encouragement> {
        self.complete_habit_at(id, Local::now(), &mut rand::thread_rng())
    }

    pub fn complete_habit_at<R: Rng + ?Sized>(
        &mut self,
        id: &str,
        now: DateTime<Local>,
        rng: &mut R,
    ) -> Option<Encouragement> {
        let habit = self.habits.iter_mut().find(|habit| habit.id == id)?;
        if !habit.complete_on(now.date_naive(), now.naive_local()) {
            return None;
        }
        debug!(id, streak = habit.streak(), "habit completed");

        let message = ENCOURAGEMENT_MESSAGES
            .choose(rng)
            .copied()
            .unwrap_or(ENCOURAGEMENT_MESSAGES[0]);
        let encouragement = Encouragement {
            message: message.to_string(),
            expires_at: now.with_timezone(&Utc) + Duration::seconds(ENCOURAGEMENT_TTL_SECS),
        };
        self.encouragement = Some(encouragement.clone());
        Some(encouragement)
    }

    pub fn add_mood_entry(&mut self, mood: u8, note: &str) -> Result<MoodEntry, StoreError> {
        self.add_mood_entry_at(mood, note, Local::now())
    }

    pub fn add_mood_entry_at(
        &mut self,
        mood: u8,
        note: &str,
        now: DateTime<Local>,
    ) -> Result<MoodEntry, StoreError> {
        let mood = Mood::try_from(mood)?;
        let entry = MoodEntry {
            id: new_id(),
            date: now.date_naive(),
            mood,
            note: note.to_string(),
        };
        debug!(id = %entry.id, mood = mood.value(), "mood logged");
        self.moods.push(entry.clone());
        Ok(entry)
    }

    /// The pending encouragement, cleared once its expiry has passed.
    pub fn active_encouragement(&mut self, now: DateTime<Utc>) -> Option<&Encouragement> {
        if self
            .encouragement
            .as_ref()
            .is_some_and(|pending| now >= pending.expires_at)
        {
            self.encouragement = None;
        }
        self.encouragement.as_ref()
    }

    pub fn is_completed_today(&self, habit: &Habit) -> bool {
        habit.is_completed_on(dates::today())
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}
