use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// One mood-tracking snapshot: scored metrics, a primary emotion,
/// symptom/coping flags, optional free text, and up to three gratitude items.
///
/// Entries are write-once: nothing updates or deletes them after commit,
/// so `created_at == updated_at` in practice.
#[derive(Debug, Clone, Serialize)]
pub struct MoodEntry {
    pub id: Uuid,
    /// Google user id from the OpenID `sub` claim. Never empty, immutable.
    pub google_user_id: String,
    pub mood_score: i32,
    pub primary_emotion: PrimaryEmotion,
    pub symptoms: SymptomFlags,
    pub sleep_hours: i32,
    pub energy_level: i32,
    pub caffeine_drinks: i32,
    pub stress_score: i32,
    pub coping_strategies: CopingStrategyFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_cause: Option<String>,
    pub gratitudes: Vec<GratitudeItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Refresh the audit timestamp. The store calls this once per commit with a
/// single wall-clock instant shared by every entity touched in that commit.
pub fn touch(entry: &mut MoodEntry, now: DateTime<Utc>) {
    entry.updated_at = now;
}

/// Short gratitude note attached to an entry, ordered by submission sequence.
#[derive(Debug, Clone, Serialize)]
pub struct GratitudeItem {
    pub text: String,
    pub display_order: i32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "primary_emotion", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PrimaryEmotion {
    Happy,
    Calm,
    Anxious,
    Sad,
    Angry,
    Stressed,
    Tired,
    Excited,
    Overwhelmed,
    Other,
}

/// Physical/mental symptoms reported with an entry. Any combination is valid,
/// including none. Persisted as an integer bitmask column; in code each flag
/// is an independent boolean.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SymptomFlags {
    pub racing_thoughts: bool,
    pub low_energy: bool,
    pub irritability: bool,
    pub appetite_changes: bool,
    pub poor_concentration: bool,
    pub chest_tightness: bool,
    pub restlessness: bool,
    pub insomnia: bool,
}

impl SymptomFlags {
    pub fn to_bits(self) -> i32 {
        let mut bits = 0;
        let flags = [
            self.racing_thoughts,
            self.low_energy,
            self.irritability,
            self.appetite_changes,
            self.poor_concentration,
            self.chest_tightness,
            self.restlessness,
            self.insomnia,
        ];
        for (i, set) in flags.into_iter().enumerate() {
            if set {
                bits |= 1 << i;
            }
        }
        bits
    }

    pub fn from_bits(bits: i32) -> Self {
        Self {
            racing_thoughts: bits & (1 << 0) != 0,
            low_energy: bits & (1 << 1) != 0,
            irritability: bits & (1 << 2) != 0,
            appetite_changes: bits & (1 << 3) != 0,
            poor_concentration: bits & (1 << 4) != 0,
            chest_tightness: bits & (1 << 5) != 0,
            restlessness: bits & (1 << 6) != 0,
            insomnia: bits & (1 << 7) != 0,
        }
    }
}

/// Coping strategies in use at the time of the entry. Same representation
/// rules as [`SymptomFlags`].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CopingStrategyFlags {
    pub talking_to_someone: bool,
    pub breathing_exercises: bool,
    pub journaling: bool,
    pub listening_to_music: bool,
    pub going_outside: bool,
    pub eating_comfort_food: bool,
    pub distracting_myself: bool,
}

impl CopingStrategyFlags {
    pub fn to_bits(self) -> i32 {
        let mut bits = 0;
        let flags = [
            self.talking_to_someone,
            self.breathing_exercises,
            self.journaling,
            self.listening_to_music,
            self.going_outside,
            self.eating_comfort_food,
            self.distracting_myself,
        ];
        for (i, set) in flags.into_iter().enumerate() {
            if set {
                bits |= 1 << i;
            }
        }
        bits
    }

    pub fn from_bits(bits: i32) -> Self {
        Self {
            talking_to_someone: bits & (1 << 0) != 0,
            breathing_exercises: bits & (1 << 1) != 0,
            journaling: bits & (1 << 2) != 0,
            listening_to_music: bits & (1 << 3) != 0,
            going_outside: bits & (1 << 4) != 0,
            eating_comfort_food: bits & (1 << 5) != 0,
            distracting_myself: bits & (1 << 6) != 0,
        }
    }
}

/// Database row shape for `mood_entries`. Gratitude items live in their own
/// table and are attached after the row fetch.
#[derive(Debug, Clone, FromRow)]
pub struct MoodEntryRow {
    pub id: Uuid,
    pub google_user_id: String,
    pub mood_score: i32,
    pub primary_emotion: PrimaryEmotion,
    pub symptoms: i32,
    pub sleep_hours: i32,
    pub energy_level: i32,
    pub caffeine_drinks: i32,
    pub stress_score: i32,
    pub coping_strategies: i32,
    pub notes: Option<String>,
    pub stress_cause: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MoodEntryRow {
    pub fn into_entry(self, gratitudes: Vec<GratitudeItem>) -> MoodEntry {
        MoodEntry {
            id: self.id,
            google_user_id: self.google_user_id,
            mood_score: self.mood_score,
            primary_emotion: self.primary_emotion,
            symptoms: SymptomFlags::from_bits(self.symptoms),
            sleep_hours: self.sleep_hours,
            energy_level: self.energy_level,
            caffeine_drinks: self.caffeine_drinks,
            stress_score: self.stress_score,
            coping_strategies: CopingStrategyFlags::from_bits(self.coping_strategies),
            notes: self.notes,
            stress_cause: self.stress_cause,
            gratitudes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// POST /api/mood-entries
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodEntryRequest {
    #[validate(range(min = 0, max = 10, message = "Mood must be between 0 and 10"))]
    pub mood_score: i32,

    pub primary_emotion: PrimaryEmotion,

    #[serde(default)]
    pub symptoms: SymptomFlags,

    #[validate(range(min = 0, max = 24, message = "Sleep must be 0-24 hours"))]
    pub sleep_hours: i32,

    #[validate(range(min = 0, max = 10, message = "Energy must be between 0 and 10"))]
    pub energy_level: i32,

    #[validate(range(min = 0, max = 100, message = "Caffeine drinks must be 0-100"))]
    pub caffeine_drinks: i32,

    #[validate(range(min = 0, max = 10, message = "Stress must be between 0 and 10"))]
    pub stress_score: i32,

    #[serde(default)]
    pub coping_strategies: CopingStrategyFlags,

    #[validate(length(max = 4000, message = "Notes must be under 4000 characters"))]
    pub notes: Option<String>,

    #[validate(length(max = 400, message = "Stress cause must be under 400 characters"))]
    pub stress_cause: Option<String>,

    /// Free-form gratitude strings; blanks are dropped and at most 3 are kept.
    #[serde(default)]
    #[validate(custom = "validate_gratitude_items")]
    pub gratitudes: Vec<String>,
}

const MAX_GRATITUDE_TEXT_LEN: usize = 128;

fn validate_gratitude_items(items: &[String]) -> Result<(), validator::ValidationError> {
    for item in items {
        if item.trim().chars().count() > MAX_GRATITUDE_TEXT_LEN {
            let mut err = validator::ValidationError::new("length");
            err.message = Some("Each gratitude item must be under 128 characters".into());
            return Err(err);
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CreateMoodEntryResponse {
    pub id: Uuid,
}

/// GET /api/mood-entries/recent query params
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    /// Recency window in days. Default: 30.
    pub days: Option<i64>,
    /// Maximum entries to return. Default: 20, clamped to 1..=100.
    pub take: Option<usize>,
}
