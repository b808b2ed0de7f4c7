use async_trait::async_trait;

use crate::database::Database;
use crate::history::DurableHistory;
use crate::impls::chat_history::{
    count_chat_history, insert_chat_history_entry, list_chat_history, trim_chat_history,
};
use crate::model::chat_history::HistoryEntry;

#[async_trait]
impl DurableHistory for Database {
    async fn insert(&self, entry: &HistoryEntry) -> anyhow::Result<()> {
        insert_chat_history_entry(self, entry).await
    }

    async fn count(&self, user_id: u64) -> anyhow::Result<u64> {
        count_chat_history(self, user_id).await
    }

    async fn keep_newest(&self, user_id: u64, keep: u64) -> anyhow::Result<()> {
        trim_chat_history(self, user_id, keep).await?;
        Ok(())
    }

    async fn list(&self, user_id: u64) -> anyhow::Result<Vec<HistoryEntry>> {
        list_chat_history(self, user_id).await
    }
}
