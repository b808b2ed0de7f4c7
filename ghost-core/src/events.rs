use tracing::warn;

use crate::update::{Peer, RawMessage, RawUpdate, ShortMessage};

/// A message normalised from any update shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingMessage {
    /// The correspondent: author of inbound messages, recipient of outbound ones.
    pub sender_id: u64,
    pub text: String,
    /// Sent in a one-to-one conversation.
    pub is_direct: bool,
    /// Authored by the logged-in account.
    pub is_outgoing: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifiedEvent {
    IncomingMessage(IncomingMessage),
    TypingNotice { user_id: u64 },
    Ignored,
}

/// Interpret a raw update. Partial updates degrade to [`ClassifiedEvent::Ignored`].
pub fn classify(update: &RawUpdate) -> ClassifiedEvent {
    match update {
        RawUpdate::NewMessage { message: Some(message) } => classify_full(message),
        RawUpdate::NewMessage { message: None } => {
            warn!("dropping message update without a message body");
            ClassifiedEvent::Ignored
        }
        RawUpdate::ShortMessage(message) => classify_short(message),
        RawUpdate::UserTyping(typing) => match typing.user_id {
            Some(user_id) => ClassifiedEvent::TypingNotice { user_id },
            None => {
                warn!("dropping typing update without a user id");
                ClassifiedEvent::Ignored
            }
        },
        RawUpdate::Other => ClassifiedEvent::Ignored,
    }
}

fn classify_full(message: &RawMessage) -> ClassifiedEvent {
    let (sender_id, is_direct) = match message.peer {
        Some(Peer::User { user_id }) => (Some(user_id), true),
        Some(Peer::Chat { .. } | Peer::Channel { .. }) => (message.from_id, false),
        None => (None, false),
    };

    let Some(sender_id) = sender_id else {
        warn!(message_id = ?message.id, "dropping message update without peer or sender");
        return ClassifiedEvent::Ignored;
    };

    ClassifiedEvent::IncomingMessage(IncomingMessage {
        sender_id,
        text: message.message.clone().unwrap_or_default(),
        is_direct,
        is_outgoing: message.out,
    })
}

fn classify_short(message: &ShortMessage) -> ClassifiedEvent {
    let Some(sender_id) = message.user_id else {
        warn!("dropping short message update without a user id");
        return ClassifiedEvent::Ignored;
    };

    ClassifiedEvent::IncomingMessage(IncomingMessage {
        sender_id,
        text: message.message.clone().unwrap_or_default(),
        is_direct: true,
        is_outgoing: message.out,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ClassifiedEvent, IncomingMessage, classify};
    use crate::update::RawUpdate;

    fn decode(value: serde_json::Value) -> RawUpdate {
        serde_json::from_value(value).unwrap()
    }

    fn incoming(sender_id: u64, text: &str, is_direct: bool, is_outgoing: bool) -> ClassifiedEvent {
        ClassifiedEvent::IncomingMessage(IncomingMessage {
            sender_id,
            text: text.to_owned(),
            is_direct,
            is_outgoing,
        })
    }

    #[test]
    fn full_message_from_user_peer_is_direct() {
        let update = decode(json!({
            "type": "updateNewMessage",
            "message": {
                "id": 10,
                "peer": { "type": "user", "userId": 42 },
                "message": "hello",
                "out": false
            }
        }));

        assert_eq!(classify(&update), incoming(42, "hello", true, false));
    }

    #[test]
    fn full_message_in_group_is_not_direct() {
        let update = decode(json!({
            "type": "updateNewMessage",
            "message": {
                "peer": { "type": "channel", "channelId": 900 },
                "fromId": 42,
                "message": "hey all"
            }
        }));

        assert_eq!(classify(&update), incoming(42, "hey all", false, false));
    }

    #[test]
    fn outgoing_flag_is_carried() {
        let update = decode(json!({
            "type": "updateNewMessage",
            "message": { "peer": { "type": "user", "userId": 42 }, "message": "sent", "out": true }
        }));

        assert_eq!(classify(&update), incoming(42, "sent", true, true));
    }

    #[test]
    fn short_message_is_direct() {
        let update = decode(json!({
            "type": "updateShortMessage",
            "userId": 7,
            "message": "yo",
            "out": false
        }));

        assert_eq!(classify(&update), incoming(7, "yo", true, false));
    }

    #[test]
    fn missing_text_becomes_empty() {
        let update = decode(json!({ "type": "updateShortMessage", "userId": 7 }));
        assert_eq!(classify(&update), incoming(7, "", true, false));
    }

    #[test]
    fn typing_update_becomes_notice() {
        let update = decode(json!({ "type": "updateUserTyping", "userId": 5 }));
        assert_eq!(classify(&update), ClassifiedEvent::TypingNotice { user_id: 5 });
    }

    #[test]
    fn unknown_update_kinds_are_ignored() {
        let update = decode(json!({ "type": "updateReadHistoryInbox", "maxId": 3 }));
        assert_eq!(update, RawUpdate::Other);
        assert_eq!(classify(&update), ClassifiedEvent::Ignored);
    }

    #[test]
    fn partial_updates_degrade_to_ignored() {
        let cases = [
            json!({ "type": "updateNewMessage" }),
            json!({ "type": "updateNewMessage", "message": { "message": "no peer" } }),
            json!({
                "type": "updateNewMessage",
                "message": { "peer": { "type": "chat", "chatId": 1 }, "message": "no sender" }
            }),
            json!({ "type": "updateShortMessage", "message": "no user" }),
            json!({ "type": "updateUserTyping" }),
        ];

        for case in cases {
            assert_eq!(classify(&decode(case.clone())), ClassifiedEvent::Ignored, "{case}");
        }
    }
}
