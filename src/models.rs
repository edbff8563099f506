use crate::errors::StoreError;
use crate::streak::compute_streak_at;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    #[serde(rename = "Sağlık")]
    Health,
    #[serde(rename = "Egzersiz")]
    Exercise,
    #[serde(rename = "Beslenme")]
    Nutrition,
    #[serde(rename = "Öğrenme")]
    Learning,
    #[serde(rename = "Yaratıcılık")]
    Creativity,
    #[serde(rename = "İlişkiler")]
    Relationships,
    #[serde(rename = "Mindfulness")]
    Mindfulness,
    #[serde(rename = "Diğer")]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Health,
        Category::Exercise,
        Category::Nutrition,
        Category::Learning,
        Category::Creativity,
        Category::Relationships,
        Category::Mindfulness,
        Category::Other,
    ];

    /// The stored and displayed form.
    pub fn label(self) -> &'static str {
        match self {
            Category::Health => "Sağlık",
            Category::Exercise => "Egzersiz",
            Category::Nutrition => "Beslenme",
            Category::Learning => "Öğrenme",
            Category::Creativity => "Yaratıcılık",
            Category::Relationships => "İlişkiler",
            Category::Mindfulness => "Mindfulness",
            Category::Other => "Diğer",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Health => "health",
            Category::Exercise => "exercise",
            Category::Nutrition => "nutrition",
            Category::Learning => "learning",
            Category::Creativity => "creativity",
            Category::Relationships => "relationships",
            Category::Mindfulness => "mindfulness",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = StoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.label() == value || category.name().eq_ignore_ascii_case(value))
            .ok_or_else(|| StoreError::UnknownCategory(value.to_string()))
    }
}

/// Mood rating, always within 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Mood(u8);

impl Mood {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Çok Düşük",
            2 => "Düşük",
            3 => "Orta",
            4 => "İyi",
            _ => "Harika",
        }
    }

    pub fn all() -> impl Iterator<Item = Mood> {
        (Self::MIN..=Self::MAX).map(Mood)
    }
}

impl TryFrom<u8> for Mood {
    type Error = StoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Mood(value))
        } else {
            Err(StoreError::MoodOutOfRange(value))
        }
    }
}

impl From<Mood> for u8 {
    fn from(mood: Mood) -> Self {
        mood.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    streak: u32,
    #[serde(default)]
    completed_dates: BTreeSet<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(
        id: String,
        name: String,
        description: String,
        category: Category,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            description,
            category,
            streak: 0,
            completed_dates: BTreeSet::new(),
            created_at,
        }
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn completed_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.completed_dates
    }

    pub fn is_completed_on(&self, day: NaiveDate) -> bool {
        self.completed_dates.contains(&day)
    }

    /// Records a completion for `day` and refreshes the cached streak.
    /// Returns false when the day was already recorded.
    pub(crate) fn complete_on(&mut self, day: NaiveDate, now: NaiveDateTime) -> bool {
        if !self.completed_dates.insert(day) {
            return false;
        }
        self.refresh_streak(now);
        true
    }

    /// Recomputes the cached streak as of `now`. This is the only writer of
    /// `streak`. Returns true when the value changed.
    pub(crate) fn refresh_streak(&mut self, now: NaiveDateTime) -> bool {
        let streak = compute_streak_at(&self.completed_dates, now);
        let changed = streak != self.streak;
        self.streak = streak;
        changed
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodEntry {
    pub id: String,
    pub date: NaiveDate,
    pub mood: Mood,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Encouragement {
    pub message: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateHabitRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMoodRequest {
    pub mood: u8,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitView {
    #[serde(flatten)]
    pub habit: Habit,
    pub completed_today: bool,
}

#[derive(Debug, Serialize)]
pub struct CompleteHabitResponse {
    pub habit: HabitView,
    pub encouragement: Option<Encouragement>,
}

#[derive(Debug, Serialize)]
pub struct EncouragementResponse {
    pub encouragement: Option<Encouragement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayProgress {
    pub date: String,
    pub weekday: &'static str,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionRatio {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoodPoint {
    pub date: String,
    pub display_date: String,
    pub mood: u8,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentMood {
    pub id: String,
    pub date: String,
    pub mood: u8,
    pub label: &'static str,
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub weekly_progress: Vec<DayProgress>,
    pub weekly_total: usize,
    pub total_habits: usize,
    pub longest_streak: u32,
    pub today: CompletionRatio,
    pub mood_trend: Vec<MoodPoint>,
    pub recent_moods: Vec<RecentMood>,
}

#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    pub name: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MoodLabel {
    pub value: u8,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MetaResponse {
    pub categories: Vec<CategoryInfo>,
    pub moods: Vec<MoodLabel>,
}
