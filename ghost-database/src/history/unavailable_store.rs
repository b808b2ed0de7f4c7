use async_trait::async_trait;

use crate::history::DurableHistory;
use crate::model::chat_history::HistoryEntry;

/// Durable tier used when no database is configured. Every call fails, so the
/// store always lands on its in-memory fallback.
#[derive(Clone, Debug, Default)]
pub struct UnavailableHistory;

#[async_trait]
impl DurableHistory for UnavailableHistory {
    async fn insert(&self, _entry: &HistoryEntry) -> anyhow::Result<()> {
        anyhow::bail!("durable chat history is not configured")
    }

    async fn count(&self, _user_id: u64) -> anyhow::Result<u64> {
        anyhow::bail!("durable chat history is not configured")
    }

    async fn keep_newest(&self, _user_id: u64, _keep: u64) -> anyhow::Result<()> {
        anyhow::bail!("durable chat history is not configured")
    }

    async fn list(&self, _user_id: u64) -> anyhow::Result<Vec<HistoryEntry>> {
        anyhow::bail!("durable chat history is not configured")
    }
}
