pub mod database;
pub mod history;
pub mod impls;
pub mod model;

pub use database::{Database, MIGRATOR};
pub use history::{DurableHistory, HISTORY_RETENTION, HistoryStore, UnavailableHistory};
pub use model::chat_history::{HistoryEntry, HistoryRole};
