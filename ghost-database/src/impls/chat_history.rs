use anyhow::Context as _;

use crate::database::Database;
use crate::model::chat_history::{HistoryEntry, HistoryRole};

#[derive(sqlx::FromRow)]
struct ChatHistoryRow {
    user_id: i64,
    role: String,
    content: String,
    created_at: i64,
}

pub async fn insert_chat_history_entry(db: &Database, entry: &HistoryEntry) -> anyhow::Result<()> {
    let user_id_i64 = i64::try_from(entry.user_id).context("user_id out of i64 range")?;
    let created_at_i64 = i64::try_from(entry.timestamp).context("created_at out of i64 range")?;

    sqlx::query(
        "INSERT INTO chat_history (user_id, role, content, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(user_id_i64)
    .bind(entry.role.as_str())
    .bind(&entry.content)
    .bind(created_at_i64)
    .execute(db.pool())
    .await?;

    Ok(())
}

pub async fn count_chat_history(db: &Database, user_id: u64) -> anyhow::Result<u64> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chat_history WHERE user_id = $1")
        .bind(user_id_i64)
        .fetch_one(db.pool())
        .await?;

    u64::try_from(count).context("chat history count out of u64 range")
}

/// Delete every entry for a user except the `keep` newest, newest by
/// `created_at` then insertion order. Repeating the call is a no-op.
pub async fn trim_chat_history(db: &Database, user_id: u64, keep: u64) -> anyhow::Result<u64> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;
    let keep_i64 = i64::try_from(keep).context("keep count out of i64 range")?;

    let result = sqlx::query(
        "DELETE FROM chat_history
         WHERE user_id = $1
           AND id NOT IN (
               SELECT id FROM chat_history
               WHERE user_id = $1
               ORDER BY created_at DESC, id DESC
               LIMIT $2
           )",
    )
    .bind(user_id_i64)
    .bind(keep_i64)
    .execute(db.pool())
    .await?;

    Ok(result.rows_affected())
}

pub async fn list_chat_history(db: &Database, user_id: u64) -> anyhow::Result<Vec<HistoryEntry>> {
    let user_id_i64 = i64::try_from(user_id).context("user_id out of i64 range")?;

    let rows: Vec<ChatHistoryRow> = sqlx::query_as(
        "SELECT user_id, role, content, created_at
         FROM chat_history
         WHERE user_id = $1
         ORDER BY created_at ASC, id ASC",
    )
    .bind(user_id_i64)
    .fetch_all(db.pool())
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let role = HistoryRole::parse(&row.role)
            .with_context(|| format!("unknown chat history role `{}`", row.role))?;

        out.push(HistoryEntry {
            user_id: u64::try_from(row.user_id).context("user_id row out of u64 range")?,
            role,
            content: row.content,
            timestamp: u64::try_from(row.created_at).context("created_at row out of u64 range")?,
        });
    }

    Ok(out)
}
