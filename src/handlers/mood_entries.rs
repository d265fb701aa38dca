use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Duration;
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood_entry::{
    CreateMoodEntryRequest, CreateMoodEntryResponse, MoodEntry, RecentQuery,
};
use crate::services::mood_entries::{
    MoodEntryService, DEFAULT_RECENT_TAKE, DEFAULT_RECENT_WINDOW_DAYS,
};
use crate::AppState;

const MAX_RECENT_TAKE: usize = 100;

pub async fn create_mood_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodEntryRequest>,
) -> AppResult<Json<CreateMoodEntryResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut service = MoodEntryService::new(state.db.clone(), auth_user.google_user_id);
    let id = service.create(body).await?;

    tracing::info!(entry_id = %id, "Mood entry created");
    Ok(Json(CreateMoodEntryResponse { id }))
}

pub async fn list_recent_mood_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<RecentQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let days = query.days.unwrap_or(DEFAULT_RECENT_WINDOW_DAYS).clamp(1, 365);
    let take = query.take.unwrap_or(DEFAULT_RECENT_TAKE).clamp(1, MAX_RECENT_TAKE);

    let service = MoodEntryService::new(state.db.clone(), auth_user.google_user_id);
    let entries = service.get_recent_within(Duration::days(days), take).await?;

    Ok(Json(entries))
}

pub async fn get_mood_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<MoodEntry>> {
    let service = MoodEntryService::new(state.db.clone(), auth_user.google_user_id);
    let entry = service
        .get_by_id(entry_id)
        .await?
        .ok_or(AppError::NotFound("Mood entry not found".into()))?;

    Ok(Json(entry))
}
