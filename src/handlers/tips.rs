use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::mood_entry::MoodEntry;
use crate::services::chat::ChatClient;
use crate::services::mood_entries::{MoodEntryService, DEFAULT_RECENT_TAKE};
use crate::AppState;

/// Three short wellness tips derived from the user's recent entries.
#[derive(Debug, Serialize, Deserialize)]
pub struct TipsResponse {
    pub tip1: String,
    pub tip2: String,
    pub tip3: String,
}

/// GET /api/recommendations/tips
pub async fn get_tips(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<TipsResponse>> {
    let service = MoodEntryService::new(state.db.clone(), auth_user.google_user_id);
    let recent = service.get_recent(DEFAULT_RECENT_TAKE).await?;

    let prompt = tips_prompt(&recent);
    let chat = ChatClient::new(&state.config)?;
    let completion = chat.complete(&prompt).await?;
    let tips = parse_tips(&completion)?;

    Ok(Json(tips))
}

fn tips_prompt(entries: &[MoodEntry]) -> String {
    let summary: Vec<String> = entries
        .iter()
        .map(|e| {
            format!(
                "- {}: mood {}/10, energy {}/10, stress {}/10, sleep {}h, emotion {:?}",
                e.created_at.date_naive(),
                e.mood_score,
                e.energy_level,
                e.stress_score,
                e.sleep_hours,
                e.primary_emotion
            )
        })
        .collect();

    let summary = if summary.is_empty() {
        "(no entries in the last 30 days)".to_string()
    } else {
        summary.join("\n")
    };

    format!(
        r#"You are a wellbeing coach. Based on this user's mood check-ins from the last 30 days, give three short, practical tips.

Check-ins:
{}

Respond with JSON only, using this exact schema:
{{ "tip1": "...", "tip2": "...", "tip3": "..." }}"#,
        summary
    )
}

fn parse_tips(completion: &str) -> AppResult<TipsResponse> {
    serde_json::from_str(completion.trim())
        .map_err(|e| AppError::External(format!("Tips response was not valid JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tips_reads_schema() {
        let tips =
            parse_tips(r#"{ "tip1": "sleep more", "tip2": "walk", "tip3": "less coffee" }"#)
                .unwrap();
        assert_eq!(tips.tip1, "sleep more");
        assert_eq!(tips.tip3, "less coffee");
    }

    #[test]
    fn parse_tips_rejects_free_text() {
        assert!(parse_tips("Here are some tips: ...").is_err());
    }

    #[test]
    fn tips_prompt_without_entries_says_so() {
        let prompt = tips_prompt(&[]);
        assert!(prompt.contains("no entries"));
    }
}
