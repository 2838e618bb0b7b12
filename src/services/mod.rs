pub mod organizer;
pub mod reindex;
pub mod tracker;
