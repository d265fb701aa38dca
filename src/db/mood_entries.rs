use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::mood_entry::{touch, GratitudeItem, MoodEntry, MoodEntryRow};

/// Filter shape for [`MoodEntryStore::list`]. Only one filter is ever needed:
/// owner plus an optional creation-time cutoff.
#[derive(Debug, Clone)]
pub struct EntryFilter {
    pub google_user_id: String,
    pub created_since: Option<DateTime<Utc>>,
}

/// Narrow storage port for mood entries. `add` only stages an entry;
/// nothing is durable until `commit`.
///
/// One instance lives for the span of one request, so the staging buffer is
/// never shared across callers.
pub struct MoodEntryStore {
    db: PgPool,
    staged: Vec<MoodEntry>,
}

impl MoodEntryStore {
    pub fn new(db: PgPool) -> Self {
        Self {
            db,
            staged: Vec::new(),
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MoodEntry>> {
        let row = sqlx::query_as::<_, MoodEntryRow>("SELECT * FROM mood_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => {
                let gratitudes = self.load_gratitudes(row.id).await?;
                Ok(Some(row.into_entry(gratitudes)))
            }
            None => Ok(None),
        }
    }

    /// Stage an entry for insertion. Timestamps are stamped at commit time,
    /// not here.
    pub fn add(&mut self, entry: MoodEntry) {
        self.staged.push(entry);
    }

    pub async fn list(&self, filter: &EntryFilter) -> AppResult<Vec<MoodEntry>> {
        let rows = match filter.created_since {
            Some(since) => {
                sqlx::query_as::<_, MoodEntryRow>(
                    r#"
                    SELECT * FROM mood_entries
                    WHERE google_user_id = $1 AND created_at >= $2
                    "#,
                )
                .bind(&filter.google_user_id)
                .bind(since)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, MoodEntryRow>(
                    "SELECT * FROM mood_entries WHERE google_user_id = $1",
                )
                .bind(&filter.google_user_id)
                .fetch_all(&self.db)
                .await?
            }
        };

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let gratitudes = self.load_gratitudes(row.id).await?;
            entries.push(row.into_entry(gratitudes));
        }
        Ok(entries)
    }

    /// Flush staged entries in one transaction. The audit instant is captured
    /// once, so every entity written by this commit carries the same
    /// created_at/updated_at.
    pub async fn commit(&mut self) -> AppResult<u64> {
        if self.staged.is_empty() {
            return Ok(0);
        }

        let now = Utc::now();
        let mut rows_affected = 0u64;
        let mut tx = self.db.begin().await?;

        for entry in self.staged.iter_mut() {
            entry.created_at = now;
            touch(entry, now);

            let result = sqlx::query(
                r#"
                INSERT INTO mood_entries
                    (id, google_user_id, mood_score, primary_emotion, symptoms,
                     sleep_hours, energy_level, caffeine_drinks, stress_score,
                     coping_strategies, notes, stress_cause, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(entry.id)
            .bind(&entry.google_user_id)
            .bind(entry.mood_score)
            .bind(entry.primary_emotion)
            .bind(entry.symptoms.to_bits())
            .bind(entry.sleep_hours)
            .bind(entry.energy_level)
            .bind(entry.caffeine_drinks)
            .bind(entry.stress_score)
            .bind(entry.coping_strategies.to_bits())
            .bind(&entry.notes)
            .bind(&entry.stress_cause)
            .bind(entry.created_at)
            .bind(entry.updated_at)
            .execute(&mut *tx)
            .await?;
            rows_affected += result.rows_affected();

            for item in &entry.gratitudes {
                let result = sqlx::query(
                    r#"
                    INSERT INTO gratitude_items (mood_entry_id, text, display_order)
                    VALUES ($1, $2, $3)
                    "#,
                )
                .bind(entry.id)
                .bind(&item.text)
                .bind(item.display_order)
                .execute(&mut *tx)
                .await?;
                rows_affected += result.rows_affected();
            }
        }

        tx.commit().await?;
        self.staged.clear();
        Ok(rows_affected)
    }

    async fn load_gratitudes(&self, entry_id: Uuid) -> AppResult<Vec<GratitudeItem>> {
        let items = sqlx::query_as::<_, (String, i32)>(
            r#"
            SELECT text, display_order FROM gratitude_items
            WHERE mood_entry_id = $1
            ORDER BY display_order ASC
            "#,
        )
        .bind(entry_id)
        .fetch_all(&self.db)
        .await?;

        Ok(items
            .into_iter()
            .map(|(text, display_order)| GratitudeItem {
                text,
                display_order,
            })
            .collect())
    }
}
