use crate::dates::{self, parse_day};
use crate::errors::AppError;
use crate::models::{
    Category, CategoryInfo, CompleteHabitResponse, CreateHabitRequest, CreateMoodRequest,
    EncouragementResponse, Habit, HabitView, MetaResponse, Mood, MoodEntry, MoodLabel,
    StatsQuery, StatsResponse,
};
use crate::persistence::PersistedStore;
use crate::state::AppState;
use crate::stats::build_stats_at;
use crate::storage::JsonFileStore;
use crate::store::HabitStore;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use tracing::{error, info};

type Tracker = PersistedStore<JsonFileStore>;

pub async fn list_habits(State(state): State<AppState>) -> Json<Vec<HabitView>> {
    let mut tracker = state.tracker.lock().await;
    refresh_streaks(&mut tracker).await;
    let store = tracker.store();
    Json(store.habits().iter().map(|habit| to_view(store, habit)).collect())
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<CreateHabitRequest>,
) -> Result<Json<HabitView>, AppError> {
    let category = match payload.category.as_deref() {
        Some(value) if !value.trim().is_empty() => value.parse::<Category>()?,
        _ => Category::default(),
    };

    let mut tracker = state.tracker.lock().await;
    let habit = tracker.add_habit(&payload.name, &payload.description, category)?;
    flush_change(&mut tracker).await?;

    info!(id = %habit.id, category = %habit.category, "created habit");
    Ok(Json(HabitView {
        habit,
        completed_today: false,
    }))
}

pub async fn complete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompleteHabitResponse>, AppError> {
    let mut tracker = state.tracker.lock().await;
    if tracker.store().habit(&id).is_none() {
        return Err(AppError::not_found(format!("no habit with id '{id}'")));
    }

    let encouragement = tracker.complete_habit(&id);
    if encouragement.is_none() {
        refresh_streaks(&mut tracker).await;
    } else {
        flush_change(&mut tracker).await?;
    }

    let store = tracker.store();
    let habit = store
        .habit(&id)
        .ok_or_else(|| AppError::not_found(format!("no habit with id '{id}'")))?;
    info!(id = %id, streak = habit.streak(), "completed habit");

    Ok(Json(CompleteHabitResponse {
        habit: to_view(store, habit),
        encouragement,
    }))
}

pub async fn list_moods(State(state): State<AppState>) -> Json<Vec<MoodEntry>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.store().mood_entries().to_vec())
}

pub async fn create_mood(
    State(state): State<AppState>,
    Json(payload): Json<CreateMoodRequest>,
) -> Result<Json<MoodEntry>, AppError> {
    let mut tracker = state.tracker.lock().await;
    let entry = tracker.add_mood_entry(payload.mood, &payload.note)?;
    flush_change(&mut tracker).await?;

    info!(id = %entry.id, mood = entry.mood.value(), "logged mood");
    Ok(Json(entry))
}

/// `?date=YYYY-MM-DD` moves the end of the weekly window; it defaults to today.
pub async fn get_stats(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    let reference = match query.date.as_deref() {
        Some(value) => parse_day(value)?,
        None => dates::today(),
    };

    let mut tracker = state.tracker.lock().await;
    refresh_streaks(&mut tracker).await;
    let store = tracker.store();
    Ok(Json(build_stats_at(reference, store.habits(), store.mood_entries())))
}

pub async fn get_encouragement(State(state): State<AppState>) -> Json<EncouragementResponse> {
    let mut tracker = state.tracker.lock().await;
    Json(EncouragementResponse {
        encouragement: tracker.active_encouragement(Utc::now()).cloned(),
    })
}

pub async fn get_meta() -> Json<MetaResponse> {
    Json(MetaResponse {
        categories: Category::ALL
            .into_iter()
            .map(|category| CategoryInfo {
                name: category.name(),
                label: category.label(),
            })
            .collect(),
        moods: Mood::all()
            .map(|mood| MoodLabel {
                value: mood.value(),
                label: mood.label(),
            })
            .collect(),
    })
}

/// Writes a mutation to disk. The session keeps the change either way.
async fn flush_change(tracker: &mut Tracker) -> Result<(), AppError> {
    tracker.kv_mut().flush().await.map_err(|err| {
        error!("failed to write data file: {}", err.message);
        AppError::unsaved(err)
    })
}

/// Streaks decay as days pass without completions; bring them up to date
/// before they are served. A failed write is retried by the next flush.
async fn refresh_streaks(tracker: &mut Tracker) {
    if tracker.refresh_streaks() {
        if let Err(err) = tracker.kv_mut().flush().await {
            error!("failed to write refreshed streaks: {}", err.message);
        }
    }
}

fn to_view(store: &HabitStore, habit: &Habit) -> HabitView {
    HabitView {
        completed_today: store.is_completed_today(habit),
        habit: habit.clone(),
    }
}
