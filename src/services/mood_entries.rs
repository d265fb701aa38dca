use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::mood_entries::{EntryFilter, MoodEntryStore};
use crate::error::AppResult;
use crate::models::mood_entry::{CreateMoodEntryRequest, GratitudeItem, MoodEntry};

pub const DEFAULT_RECENT_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_RECENT_TAKE: usize = 20;
const MAX_GRATITUDE_ITEMS: usize = 3;

/// Orchestrates entry creation and recency queries for one authenticated
/// owner. Range validation happens at the HTTP boundary; this service copies
/// submitted fields verbatim and only normalizes text.
pub struct MoodEntryService {
    store: MoodEntryStore,
    owner_id: String,
}

impl MoodEntryService {
    pub fn new(db: PgPool, owner_id: String) -> Self {
        Self {
            store: MoodEntryStore::new(db),
            owner_id,
        }
    }

    /// Build, stage, and commit a new entry for the current owner.
    /// Returns the generated id. Store failures propagate as-is.
    pub async fn create(&mut self, submission: CreateMoodEntryRequest) -> AppResult<Uuid> {
        let entry = build_entry(&self.owner_id, submission);
        let id = entry.id;

        self.store.add(entry);
        self.store.commit().await?;

        Ok(id)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<MoodEntry>> {
        let entry = self.store.get_by_id(id).await?;
        Ok(scope_to_owner(entry, &self.owner_id))
    }

    /// Recent entries from the last 30 days.
    pub async fn get_recent(&self, take: usize) -> AppResult<Vec<MoodEntry>> {
        self.get_recent_within(Duration::days(DEFAULT_RECENT_WINDOW_DAYS), take)
            .await
    }

    /// Recent entries within an explicit window, newest first, at most `take`.
    pub async fn get_recent_within(
        &self,
        within: Duration,
        take: usize,
    ) -> AppResult<Vec<MoodEntry>> {
        let cutoff = Utc::now() - within;
        let items = self
            .store
            .list(&EntryFilter {
                google_user_id: self.owner_id.clone(),
                created_since: Some(cutoff),
            })
            .await?;

        Ok(select_recent(items, take))
    }
}

/// Assemble a normalized entry from a submission. Scalar and flag fields are
/// copied verbatim; optional text is trimmed with blanks collapsed to `None`;
/// gratitude strings are filtered to non-blank, trimmed, ordered by filtered
/// position, and capped at three.
fn build_entry(owner_id: &str, submission: CreateMoodEntryRequest) -> MoodEntry {
    let gratitudes = submission
        .gratitudes
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(MAX_GRATITUDE_ITEMS)
        .enumerate()
        .map(|(i, text)| GratitudeItem {
            text: text.to_string(),
            display_order: i as i32,
        })
        .collect();

    // Placeholder instant; the store stamps the real audit timestamps at
    // commit time.
    let now = Utc::now();

    MoodEntry {
        id: Uuid::new_v4(),
        google_user_id: owner_id.to_string(),
        mood_score: submission.mood_score,
        primary_emotion: submission.primary_emotion,
        symptoms: submission.symptoms,
        sleep_hours: submission.sleep_hours,
        energy_level: submission.energy_level,
        caffeine_drinks: submission.caffeine_drinks,
        stress_score: submission.stress_score,
        coping_strategies: submission.coping_strategies,
        notes: normalize_text(submission.notes),
        stress_cause: normalize_text(submission.stress_cause),
        gratitudes,
        created_at: now,
        updated_at: now,
    }
}

/// Trim optional text; whitespace-only input is stored as absent, never as
/// an empty string.
fn normalize_text(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Owner scoping for single-entry reads: an entry owned by someone else
/// reads as absent, never as someone else's data.
fn scope_to_owner(entry: Option<MoodEntry>, owner_id: &str) -> Option<MoodEntry> {
    entry.filter(|e| e.google_user_id == owner_id)
}

/// Order entries newest first and truncate. The sort is stable, so entries
/// sharing a created_at keep their store order.
fn select_recent(mut entries: Vec<MoodEntry>, take: usize) -> Vec<MoodEntry> {
    entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    entries.truncate(take);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    use crate::models::mood_entry::{CopingStrategyFlags, PrimaryEmotion, SymptomFlags};

    /// Mirror of the cutoff filter the store applies in SQL, so the window
    /// semantics can be checked against a seeded clock.
    fn within_window(entries: Vec<MoodEntry>, cutoff: DateTime<Utc>) -> Vec<MoodEntry> {
        entries
            .into_iter()
            .filter(|e| e.created_at >= cutoff)
            .collect()
    }

    fn submission() -> CreateMoodEntryRequest {
        CreateMoodEntryRequest {
            mood_score: 7,
            primary_emotion: PrimaryEmotion::Calm,
            symptoms: SymptomFlags::default(),
            sleep_hours: 8,
            energy_level: 5,
            caffeine_drinks: 2,
            stress_score: 3,
            coping_strategies: CopingStrategyFlags::default(),
            notes: None,
            stress_cause: None,
            gratitudes: vec![],
        }
    }

    fn entry_at(owner: &str, created_at: DateTime<Utc>) -> MoodEntry {
        let mut entry = build_entry(owner, submission());
        entry.created_at = created_at;
        entry.updated_at = created_at;
        entry
    }

    #[test]
    fn build_entry_attributes_owner_and_copies_metrics() {
        let entry = build_entry("g-owner", submission());
        assert_eq!(entry.google_user_id, "g-owner");
        assert_eq!(entry.mood_score, 7);
        assert_eq!(entry.energy_level, 5);
        assert_eq!(entry.stress_score, 3);
        assert_eq!(entry.created_at, entry.updated_at);
    }

    #[test]
    fn build_entry_filters_and_caps_gratitudes() {
        let mut sub = submission();
        sub.gratitudes = vec![
            "".into(),
            "coffee".into(),
            "sun".into(),
            "walk".into(),
            "nap".into(),
        ];

        let entry = build_entry("g-owner", sub);
        let texts: Vec<&str> = entry.gratitudes.iter().map(|g| g.text.as_str()).collect();
        let orders: Vec<i32> = entry.gratitudes.iter().map(|g| g.display_order).collect();

        assert_eq!(texts, vec!["coffee", "sun", "walk"]);
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn build_entry_trims_gratitudes_and_drops_whitespace_only() {
        let mut sub = submission();
        sub.gratitudes = vec!["  tea  ".into(), "   ".into(), "\train\n".into()];

        let entry = build_entry("g-owner", sub);
        let texts: Vec<&str> = entry.gratitudes.iter().map(|g| g.text.as_str()).collect();
        assert_eq!(texts, vec!["tea", "rain"]);
        assert_eq!(entry.gratitudes[1].display_order, 1);
    }

    #[test]
    fn blank_optional_text_is_absent() {
        let mut sub = submission();
        sub.notes = Some("   ".into());
        sub.stress_cause = Some("".into());

        let entry = build_entry("g-owner", sub);
        assert_eq!(entry.notes, None);
        assert_eq!(entry.stress_cause, None);
    }

    #[test]
    fn notes_are_trimmed() {
        let mut sub = submission();
        sub.notes = Some("  slept badly  ".into());

        let entry = build_entry("g-owner", sub);
        assert_eq!(entry.notes.as_deref(), Some("slept badly"));
    }

    #[test]
    fn select_recent_orders_newest_first_and_truncates() {
        let base = Utc::now();
        let entries = vec![
            entry_at("g", base - Duration::days(2)),
            entry_at("g", base),
            entry_at("g", base - Duration::days(1)),
            entry_at("g", base - Duration::days(3)),
        ];

        let recent = select_recent(entries, 3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].created_at, base);
        assert!(recent[0].created_at > recent[1].created_at);
        assert!(recent[1].created_at > recent[2].created_at);
    }

    #[test]
    fn select_recent_is_stable_for_equal_timestamps() {
        let at = Utc::now();
        let first = entry_at("g", at);
        let second = entry_at("g", at);
        let (first_id, second_id) = (first.id, second.id);

        let recent = select_recent(vec![first, second], 10);
        assert_eq!(recent[0].id, first_id);
        assert_eq!(recent[1].id, second_id);
    }

    #[test]
    fn select_recent_on_empty_input_is_empty() {
        assert!(select_recent(vec![], 20).is_empty());
    }

    /// Mirror of the owner filter the store applies in SQL for `list`.
    fn owned_by(entries: Vec<MoodEntry>, owner_id: &str) -> Vec<MoodEntry> {
        entries
            .into_iter()
            .filter(|e| e.google_user_id == owner_id)
            .collect()
    }

    #[test]
    fn scope_to_owner_hides_other_owners_entries() {
        let entry = entry_at("g-alice", Utc::now());
        assert!(scope_to_owner(Some(entry), "g-bob").is_none());
    }

    #[test]
    fn scope_to_owner_keeps_own_entry() {
        let entry = entry_at("g-alice", Utc::now());
        let id = entry.id;
        let scoped = scope_to_owner(Some(entry), "g-alice").unwrap();
        assert_eq!(scoped.id, id);
    }

    #[test]
    fn entries_never_cross_between_owners() {
        let now = Utc::now();
        let mixed = vec![
            entry_at("g-alice", now),
            entry_at("g-bob", now),
            entry_at("g-alice", now - Duration::days(1)),
            entry_at("g-bob", now - Duration::days(2)),
        ];

        let alices = owned_by(mixed.clone(), "g-alice");
        let bobs = owned_by(mixed, "g-bob");

        assert_eq!(alices.len(), 2);
        assert_eq!(bobs.len(), 2);
        assert!(alices.iter().all(|e| e.google_user_id == "g-alice"));
        assert!(bobs.iter().all(|e| e.google_user_id == "g-bob"));
        assert!(!alices.iter().any(|a| bobs.iter().any(|b| b.id == a.id)));
    }

    #[test]
    fn window_excludes_entries_older_than_cutoff() {
        let now = Utc::now();
        let cutoff = now - Duration::days(30);
        let entries = vec![
            entry_at("g", now - Duration::days(31)),
            entry_at("g", now - Duration::days(30)),
            entry_at("g", now - Duration::days(1)),
        ];

        let kept = within_window(entries, cutoff);
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|e| e.created_at >= cutoff));
    }
}
