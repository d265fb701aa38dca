use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood_entry::MoodEntry;
use crate::services::chat::ChatClient;
use crate::services::mood_entries::{MoodEntryService, DEFAULT_RECENT_TAKE};
use crate::services::spotify::SpotifyClient;
use crate::AppState;

const DEFAULT_SEARCH_LIMIT: u32 = 8;
const MAX_SEARCH_LIMIT: u32 = 50;

/// GET /api/music/search query params
#[derive(Debug, Deserialize)]
pub struct TrackSearchQuery {
    pub q: String,
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct TrackSearchResponse {
    pub query: String,
    pub track_ids: Vec<String>,
}

pub async fn search_tracks(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Query(query): Query<TrackSearchQuery>,
) -> AppResult<Json<TrackSearchResponse>> {
    if query.q.trim().is_empty() {
        return Err(AppError::Validation("Search query is required".into()));
    }
    let limit = query
        .limit
        .unwrap_or(DEFAULT_SEARCH_LIMIT)
        .clamp(1, MAX_SEARCH_LIMIT);

    let spotify = SpotifyClient::new(&state.config)?;
    let track_ids = spotify.search_tracks(query.q.trim(), limit).await?;

    Ok(Json(TrackSearchResponse {
        query: query.q.trim().to_string(),
        track_ids,
    }))
}

/// GET /api/recommendations/music — ask the chat model for a search query
/// matching the user's latest entry, then resolve it to Spotify track ids.
pub async fn recommend_music(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<TrackSearchResponse>> {
    let service = MoodEntryService::new(state.db.clone(), auth_user.google_user_id);
    let recent = service.get_recent(DEFAULT_RECENT_TAKE).await?;

    let prompt = music_query_prompt(recent.first());
    let chat = ChatClient::new(&state.config)?;
    let query = chat.complete(&prompt).await?;
    let query = query.trim().trim_matches('"').to_string();

    let spotify = SpotifyClient::new(&state.config)?;
    let track_ids = spotify.search_tracks(&query, DEFAULT_SEARCH_LIMIT).await?;

    Ok(Json(TrackSearchResponse { query, track_ids }))
}

fn music_query_prompt(latest: Option<&MoodEntry>) -> String {
    let mood_line = match latest {
        Some(entry) => format!(
            "mood {}/10, energy {}/10, stress {}/10, primary emotion {:?}",
            entry.mood_score, entry.energy_level, entry.stress_score, entry.primary_emotion
        ),
        None => "no recent entries; assume a neutral, calm mood".to_string(),
    };

    format!(
        "Suggest a short Spotify search query (a few words, no quotes, no explanation) \
         for music that suits a person whose latest mood check-in reads: {}.",
        mood_line
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn music_prompt_mentions_latest_metrics() {
        use crate::models::mood_entry::{CopingStrategyFlags, PrimaryEmotion, SymptomFlags};
        use chrono::Utc;
        use uuid::Uuid;

        let now = Utc::now();
        let entry = MoodEntry {
            id: Uuid::new_v4(),
            google_user_id: "g".into(),
            mood_score: 9,
            primary_emotion: PrimaryEmotion::Excited,
            symptoms: SymptomFlags::default(),
            sleep_hours: 7,
            energy_level: 8,
            caffeine_drinks: 0,
            stress_score: 1,
            coping_strategies: CopingStrategyFlags::default(),
            notes: None,
            stress_cause: None,
            gratitudes: vec![],
            created_at: now,
            updated_at: now,
        };

        let prompt = music_query_prompt(Some(&entry));
        assert!(prompt.contains("mood 9/10"));
        assert!(prompt.contains("Excited"));
    }

    #[test]
    fn music_prompt_without_entries_assumes_neutral() {
        let prompt = music_query_prompt(None);
        assert!(prompt.contains("neutral"));
    }
}
