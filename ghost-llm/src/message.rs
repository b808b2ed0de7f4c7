use serde::Serialize;

use ghost_database::{HistoryEntry, HistoryRole};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// System prompt, then stored history oldest first, then the new prompt.
pub fn build_conversation(
    system_prompt: &str,
    history: &[HistoryEntry],
    prompt: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::new(ChatRole::System, system_prompt));

    for item in history {
        let role = match item.role {
            HistoryRole::User => ChatRole::User,
            HistoryRole::Bot => ChatRole::Assistant,
        };
        messages.push(ChatMessage::new(role, item.content.clone()));
    }

    messages.push(ChatMessage::new(ChatRole::User, prompt));
    messages
}
