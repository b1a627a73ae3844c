use crate::errors::AppError;
use crate::models::{
    HistoryItem, InsightsResponse, MoodEntry, SaveMoodRequest, SaveMoodResponse, TodayResponse,
};
use crate::state::AppState;
use crate::stats::{build_history, build_insights};
use crate::storage::{find_by_date, EntryStore, UpsertOutcome};
use crate::ui::{render_history, render_index};
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        State,
    },
    response::{Html, Redirect},
    Form, Json,
};
use chrono::{Local, NaiveDate};

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let today = today();
    let entries = load_entries(&state).await?;
    Ok(Html(render_index(today, find_by_date(&entries, today))))
}

pub async fn history_page() -> Html<String> {
    Html(render_history())
}

pub async fn get_today(State(state): State<AppState>) -> Result<Json<TodayResponse>, AppError> {
    let date = today();
    let entries = load_entries(&state).await?;
    let entry = find_by_date(&entries, date).cloned();
    Ok(Json(TodayResponse { date, entry }))
}

pub async fn save_mood(
    State(state): State<AppState>,
    payload: Result<Json<SaveMoodRequest>, JsonRejection>,
) -> Result<Json<SaveMoodResponse>, AppError> {
    let Json(payload) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    let response = apply_save(&state, payload).await?;
    Ok(Json(response))
}

pub async fn save_mood_form(
    State(state): State<AppState>,
    payload: Result<Form<SaveMoodRequest>, FormRejection>,
) -> Result<Redirect, AppError> {
    let Form(payload) = payload.map_err(|err| AppError::bad_request(err.body_text()))?;
    apply_save(&state, payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn get_history(State(state): State<AppState>) -> Result<Json<Vec<HistoryItem>>, AppError> {
    let entries = load_entries(&state).await?;
    Ok(Json(build_history(&entries, today())))
}

pub async fn get_insights(State(state): State<AppState>) -> Result<Json<InsightsResponse>, AppError> {
    let entries = load_entries(&state).await?;
    Ok(Json(build_insights(&entries, today())))
}

async fn apply_save(state: &AppState, payload: SaveMoodRequest) -> Result<SaveMoodResponse, AppError> {
    let date = today();
    let outcome = with_store(state, move |store| {
        let existing = store.load_all();
        store.upsert(&existing, date, payload.mood, payload.note.as_deref())
    })
    .await?;

    match outcome {
        UpsertOutcome::Saved {
            entry, persisted, ..
        } => Ok(SaveMoodResponse { entry, persisted }),
        UpsertOutcome::Rejected { .. } => {
            Err(AppError::bad_request("mood must be between 1 and 5"))
        }
    }
}

async fn load_entries(state: &AppState) -> Result<Vec<MoodEntry>, AppError> {
    with_store(state, |store| store.load_all()).await
}

/// Store backends do blocking I/O, so they run off the async worker threads.
async fn with_store<T, F>(state: &AppState, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&EntryStore) -> T + Send + 'static,
{
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || f(&store))
        .await
        .map_err(AppError::internal)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
