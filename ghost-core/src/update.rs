use serde::{Deserialize, Serialize};

/// Raw update delivered by the chat network, before classification.
///
/// Fields the network may omit are optional so that partial updates still
/// decode; the classifier decides what is usable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RawUpdate {
    /// A full message carrying its peer.
    #[serde(rename = "updateNewMessage")]
    NewMessage {
        #[serde(default)]
        message: Option<RawMessage>,
    },
    /// A compact one-to-one message.
    #[serde(rename = "updateShortMessage")]
    ShortMessage(ShortMessage),
    #[serde(rename = "updateUserTyping")]
    UserTyping(UserTyping),
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub peer: Option<Peer>,
    #[serde(default)]
    pub from_id: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub out: bool,
}

/// The conversation a message belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Peer {
    /// One-to-one conversation; `user_id` is the correspondent.
    User {
        #[serde(rename = "userId")]
        user_id: u64,
    },
    Chat {
        #[serde(rename = "chatId")]
        chat_id: u64,
    },
    Channel {
        #[serde(rename = "channelId")]
        channel_id: u64,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortMessage {
    #[serde(default)]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub out: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTyping {
    #[serde(default)]
    pub user_id: Option<u64>,
}
