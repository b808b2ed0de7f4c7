use ghost_utils::time::now_unix_millis;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryRole {
    User,
    Bot,
}

impl HistoryRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Self::User),
            "bot" => Some(Self::Bot),
            _ => None,
        }
    }
}

/// One line of a correspondent's conversation. `timestamp` is unix milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub user_id: u64,
    pub role: HistoryRole,
    pub content: String,
    pub timestamp: u64,
}

impl HistoryEntry {
    /// Stamp a new entry with the current time.
    pub fn new(user_id: u64, role: HistoryRole, content: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            content: content.into(),
            timestamp: now_unix_millis(),
        }
    }
}
