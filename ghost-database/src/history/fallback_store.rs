use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::chat_history::HistoryEntry;

/// Process-memory history, keyed by user id. Lost on restart.
#[derive(Clone, Debug, Default)]
pub struct FallbackStore {
    entries: Arc<RwLock<HashMap<u64, VecDeque<HistoryEntry>>>>,
}

impl FallbackStore {
    /// Push an entry and drop from the front until at most `retention` remain.
    pub async fn push(&self, entry: HistoryEntry, retention: usize) {
        let mut entries = self.entries.write().await;
        let conversation = entries.entry(entry.user_id).or_default();
        conversation.push_back(entry);
        while conversation.len() > retention {
            conversation.pop_front();
        }
    }

    pub async fn get(&self, user_id: u64) -> Vec<HistoryEntry> {
        self.entries
            .read()
            .await
            .get(&user_id)
            .map(|conversation| conversation.iter().cloned().collect())
            .unwrap_or_default()
    }
}
