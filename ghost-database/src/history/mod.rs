mod fallback_store;
mod postgres_store;
mod unavailable_store;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::model::chat_history::{HistoryEntry, HistoryRole};
use fallback_store::FallbackStore;

pub use unavailable_store::UnavailableHistory;

/// Most recent entries kept per correspondent, in either tier.
pub const HISTORY_RETENTION: usize = 5;

/// Durable tier of the history store.
#[async_trait]
pub trait DurableHistory: Debug + Send + Sync {
    async fn insert(&self, entry: &HistoryEntry) -> anyhow::Result<()>;

    async fn count(&self, user_id: u64) -> anyhow::Result<u64>;

    /// Remove all but the `keep` entries with the largest timestamps for
    /// `user_id`. Idempotent, so overlapping trims never cut below `keep`.
    async fn keep_newest(&self, user_id: u64, keep: u64) -> anyhow::Result<()>;

    /// All entries for `user_id`, ordered by timestamp ascending.
    async fn list(&self, user_id: u64) -> anyhow::Result<Vec<HistoryEntry>>;
}

/// Two-tier conversation history: durable storage first, process memory when
/// the durable tier fails.
///
/// The tiers are never merged. Reads only consult the fallback when the durable
/// tier returns no rows for that user, so fallback entries written during an
/// outage are not visible once durable rows exist again.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    durable: Arc<dyn DurableHistory>,
    fallback: FallbackStore,
    retention: usize,
}

impl HistoryStore {
    pub fn new(durable: Arc<dyn DurableHistory>) -> Self {
        Self {
            durable,
            fallback: FallbackStore::default(),
            retention: HISTORY_RETENTION,
        }
    }

    /// Store backed only by process memory.
    pub fn volatile() -> Self {
        Self::new(Arc::new(UnavailableHistory))
    }

    pub async fn append(&self, user_id: u64, role: HistoryRole, content: &str) {
        let entry = HistoryEntry::new(user_id, role, content);

        if let Err(err) = self.append_durable(&entry).await {
            warn!(
                ?err,
                user_id,
                role = role.as_str(),
                "failed to persist chat history; using in-memory fallback"
            );
            self.fallback.push(entry, self.retention).await;
        }
    }

    pub async fn read(&self, user_id: u64) -> Vec<HistoryEntry> {
        match self.durable.list(user_id).await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => self.fallback.get(user_id).await,
            Err(err) => {
                warn!(
                    ?err,
                    user_id, "failed to read chat history; using in-memory fallback"
                );
                self.fallback.get(user_id).await
            }
        }
    }

    async fn append_durable(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
        self.durable.insert(entry).await?;

        let count = self.durable.count(entry.user_id).await?;
        let retention = self.retention as u64;
        if count > retention {
            self.durable.keep_newest(entry.user_id, retention).await?;
        }

        Ok(())
    }
}
