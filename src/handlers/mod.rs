pub mod health;
pub mod mood_entries;
pub mod music;
pub mod tips;
