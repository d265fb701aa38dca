use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Thin wrapper over the Spotify Web API: client-credentials token fetch
/// followed by a track search. No retry or backoff; non-success responses
/// surface as [`AppError::External`].
pub struct SpotifyClient {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
}

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const SEARCH_URL: &str = "https://api.spotify.com/v1/search";

impl SpotifyClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            client_id: config.spotify_client_id.clone(),
            client_secret: config.spotify_client_secret.clone(),
        })
    }

    /// Search for tracks matching a free-text query, returning up to `limit`
    /// track ids.
    pub async fn search_tracks(&self, query: &str, limit: u32) -> AppResult<Vec<String>> {
        let token = self.fetch_access_token().await?;

        let response = self
            .http
            .get(SEARCH_URL)
            .bearer_auth(&token)
            .query(&[
                ("q", query),
                ("type", "track"),
                ("limit", &limit.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::External(format!("Spotify search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::External(format!(
                "Spotify search error {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("Spotify search response unreadable: {}", e)))?;

        Ok(parse_track_ids(&body))
    }

    async fn fetch_access_token(&self) -> AppResult<String> {
        let response = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AppError::External(format!("Spotify token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::External(format!(
                "Spotify token error {}: {}",
                status, body
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("Spotify token response unreadable: {}", e)))?;

        body["access_token"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| AppError::External("Spotify token response missing access_token".into()))
    }
}

/// Extract non-empty track ids from a Spotify search response body.
fn parse_track_ids(body: &Value) -> Vec<String> {
    body["tracks"]["items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|track| track["id"].as_str())
                .filter(|id| !id.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
