use crate::dates::{self, day_string};
use crate::models::{
    CompletionRatio, DayProgress, Habit, MoodEntry, MoodPoint, RecentMood, StatsResponse,
};
use chrono::{Datelike, Duration, NaiveDate};

pub const WEEK_DAYS: usize = 7;
pub const MOOD_TREND_WINDOW: usize = 7;
pub const RECENT_MOODS: usize = 5;

const WEEKDAYS: [&str; 7] = ["Pzt", "Sal", "Çar", "Per", "Cum", "Cmt", "Paz"];
const MONTHS: [&str; 12] = [
    "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas", "Ara",
];

pub fn build_stats(habits: &[Habit], moods: &[MoodEntry]) -> StatsResponse {
    build_stats_at(dates::today(), habits, moods)
}

pub fn build_stats_at(today: NaiveDate, habits: &[Habit], moods: &[MoodEntry]) -> StatsResponse {
    let weekly_progress = weekly_progress(habits, today);
    StatsResponse {
        weekly_total: weekly_total(&weekly_progress),
        weekly_progress,
        total_habits: habits.len(),
        longest_streak: longest_streak(habits),
        today: today_completion(habits, today),
        mood_trend: mood_trend(moods, MOOD_TREND_WINDOW),
        recent_moods: recent_moods(moods, RECENT_MOODS),
    }
}

/// One entry per day from six days before `reference` through `reference`.
/// `total` is the current habit count, also for past days.
pub fn weekly_progress(habits: &[Habit], reference: NaiveDate) -> Vec<DayProgress> {
    let mut days = Vec::with_capacity(WEEK_DAYS);
    for offset in (0..WEEK_DAYS as i64).rev() {
        let date = reference - Duration::days(offset);
        days.push(DayProgress {
            date: day_string(date),
            weekday: WEEKDAYS[date.weekday().num_days_from_monday() as usize],
            completed: completed_on(habits, date),
            total: habits.len(),
        });
    }
    days
}

pub fn weekly_total(progress: &[DayProgress]) -> usize {
    progress.iter().map(|day| day.completed).sum()
}

pub fn today_completion(habits: &[Habit], today: NaiveDate) -> CompletionRatio {
    let completed = completed_on(habits, today);
    let total = habits.len();
    let percent = if total == 0 {
        0
    } else {
        (100.0 * completed as f64 / total as f64).round() as u32
    };

    CompletionRatio {
        completed,
        total,
        percent,
    }
}

/// The last `window` entries in stored order; same-day entries stay separate.
pub fn mood_trend(entries: &[MoodEntry], window: usize) -> Vec<MoodPoint> {
    let start = entries.len().saturating_sub(window);
    entries[start..]
        .iter()
        .map(|entry| MoodPoint {
            date: day_string(entry.date),
            display_date: display_date(entry.date),
            mood: entry.mood.value(),
            label: entry.mood.label(),
        })
        .collect()
}

/// Highest cached streak across habits, 0 without habits.
pub fn longest_streak(habits: &[Habit]) -> u32 {
    habits.iter().map(Habit::streak).max().unwrap_or(0)
}

/// The last `count` entries, newest first, with their notes.
pub fn recent_moods(entries: &[MoodEntry], count: usize) -> Vec<RecentMood> {
    entries
        .iter()
        .rev()
        .take(count)
        .map(|entry| RecentMood {
            id: entry.id.clone(),
            date: day_string(entry.date),
            mood: entry.mood.value(),
            label: entry.mood.label(),
            note: entry.note.clone(),
        })
        .collect()
}

fn completed_on(habits: &[Habit], date: NaiveDate) -> usize {
    habits.iter().filter(|habit| habit.is_completed_on(date)).count()
}

fn display_date(date: NaiveDate) -> String {
    format!("{} {}", date.day(), MONTHS[date.month0() as usize])
}
