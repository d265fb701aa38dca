pub mod chat;
pub mod mood_entries;
pub mod spotify;
