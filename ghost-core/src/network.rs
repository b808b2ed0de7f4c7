use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::update::RawUpdate;

/// Maximum number of messages returned by one history fetch.
pub const FETCH_LIMIT: u8 = 20;

/// Where a logged-in network session delivers its raw updates.
pub type UpdateSink = mpsc::UnboundedSender<RawUpdate>;

/// The account this process is logged in as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelfIdentity {
    pub id: u64,
    pub username: String,
}

/// Profile fields returned by a directory lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserLookup {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
}

/// A message as stored by the chat network. `date` is unix seconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub id: u64,
    pub text: String,
    pub date: u64,
    pub out: bool,
}

/// The chat network the relay is attached to.
#[async_trait]
pub trait ChatNetwork: Send + Sync {
    /// Log in and start delivering updates into `updates`.
    async fn login(&self, updates: UpdateSink) -> anyhow::Result<SelfIdentity>;

    async fn disconnect(&self) -> anyhow::Result<()>;

    async fn send_message(&self, user_id: u64, text: &str) -> anyhow::Result<()>;

    async fn lookup_user(&self, user_id: u64) -> anyhow::Result<UserLookup>;

    /// Up to `limit` messages of the one-to-one conversation with `user_id`,
    /// newest first, older than `offset_id` when it is non-zero.
    async fn fetch_messages(
        &self,
        user_id: u64,
        offset_id: u64,
        limit: u8,
    ) -> anyhow::Result<Vec<WireMessage>>;
}
