use std::sync::Arc;

use serde::Serialize;

use ghost_core::{Relay, WireMessage};

use crate::control::ControlCommand;
use crate::help_text;

/// Payload printed for `fetchMessages`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesPayload {
    pub user_id: u64,
    pub messages: Vec<WireMessage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandResponse {
    /// Applied; nothing to print.
    Done,
    Messages(MessagesPayload),
    Help(String),
}

/// Apply one control command to the relay.
pub async fn execute(relay: &Arc<Relay>, command: ControlCommand) -> anyhow::Result<CommandResponse> {
    match command {
        ControlCommand::Start => relay.start().await?,
        ControlCommand::Stop => relay.stop().await?,
        ControlCommand::SetReply { text } => relay.set_reply_message(text).await,
        ControlCommand::ToggleLlm { enabled } => relay.toggle_llm(enabled).await,
        ControlCommand::SetSystemPrompt { prompt } => relay.set_system_prompt(prompt).await,
        ControlCommand::SetModel { model } => relay.set_model(model).await,
        ControlCommand::SendMessage { user_id, text } => relay.send_message(user_id, &text).await?,
        ControlCommand::FetchMessages { user_id, offset_id } => {
            let messages = relay.fetch_messages(user_id, offset_id).await;
            return Ok(CommandResponse::Messages(MessagesPayload { user_id, messages }));
        }
        ControlCommand::Help => return Ok(CommandResponse::Help(help_text())),
    }

    Ok(CommandResponse::Done)
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use ghost_core::{
        BotState, ChatNetwork, Relay, ReplySettings, SelfIdentity, UpdateSink, UserLookup,
        WireMessage,
    };
    use ghost_database::{HistoryRole, HistoryStore};
    use ghost_llm::{LlmConfig, LlmDispatcher};

    use super::{CommandResponse, MessagesPayload, execute};
    use crate::control::ControlCommand;

    #[derive(Default)]
    struct RecordingNetwork {
        sent: Mutex<Vec<(u64, String)>>,
    }

    #[async_trait]
    impl ChatNetwork for RecordingNetwork {
        async fn login(&self, _updates: UpdateSink) -> anyhow::Result<SelfIdentity> {
            Ok(SelfIdentity {
                id: 1,
                username: "ghost".to_owned(),
            })
        }

        async fn disconnect(&self) -> anyhow::Result<()> {
            Ok(())
        }

        async fn send_message(&self, user_id: u64, text: &str) -> anyhow::Result<()> {
            self.sent.lock().unwrap().push((user_id, text.to_owned()));
            Ok(())
        }

        async fn lookup_user(&self, _user_id: u64) -> anyhow::Result<UserLookup> {
            Ok(UserLookup::default())
        }

        async fn fetch_messages(
            &self,
            _user_id: u64,
            offset_id: u64,
            _limit: u8,
        ) -> anyhow::Result<Vec<WireMessage>> {
            Ok(vec![WireMessage {
                id: offset_id + 1,
                text: "older".to_owned(),
                date: 1_700_000_000,
                out: true,
            }])
        }
    }

    fn relay(network: Arc<RecordingNetwork>) -> Arc<Relay> {
        let history = HistoryStore::volatile();
        let llm = LlmDispatcher::new(history.clone(), &LlmConfig::default()).unwrap();
        Arc::new(Relay::new(
            network,
            Arc::new(BotState::new(ReplySettings::default())),
            history,
            llm,
        ))
    }

    #[tokio::test]
    async fn settings_commands_update_state() {
        let relay = relay(Arc::new(RecordingNetwork::default()));

        for command in [
            ControlCommand::SetReply {
                text: "afk".to_owned(),
            },
            ControlCommand::ToggleLlm { enabled: true },
            ControlCommand::SetSystemPrompt {
                prompt: "short answers".to_owned(),
            },
            ControlCommand::SetModel {
                model: "deepinfra/x".to_owned(),
            },
        ] {
            assert_eq!(execute(&relay, command).await.unwrap(), CommandResponse::Done);
        }

        let settings = relay.state().settings().await;
        assert_eq!(settings.reply_message, "afk");
        assert!(settings.llm_enabled);
        assert_eq!(settings.system_prompt, "short answers");
        assert_eq!(settings.selected_model, "deepinfra/x");
    }

    #[tokio::test]
    async fn start_and_stop_drive_the_relay() {
        let relay = relay(Arc::new(RecordingNetwork::default()));

        execute(&relay, ControlCommand::Start).await.unwrap();
        assert!(relay.state().is_running());

        execute(&relay, ControlCommand::Stop).await.unwrap();
        assert!(!relay.state().is_running());
    }

    #[tokio::test]
    async fn send_message_sends_and_records() {
        let network = Arc::new(RecordingNetwork::default());
        let relay = relay(network.clone());

        let command = ControlCommand::SendMessage {
            user_id: 9,
            text: "ping".to_owned(),
        };
        execute(&relay, command).await.unwrap();

        assert_eq!(*network.sent.lock().unwrap(), vec![(9, "ping".to_owned())]);
        let history = relay.history().read(9).await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, HistoryRole::Bot);
    }

    #[tokio::test]
    async fn fetch_messages_returns_serializable_payload() {
        let relay = relay(Arc::new(RecordingNetwork::default()));

        let response = execute(
            &relay,
            ControlCommand::FetchMessages {
                user_id: 4,
                offset_id: 10,
            },
        )
        .await
        .unwrap();

        let CommandResponse::Messages(payload) = response else {
            panic!("expected messages, got {response:?}");
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "userId": 4,
                "messages": [{ "id": 11, "text": "older", "date": 1_700_000_000, "out": true }]
            })
        );
        assert_eq!(
            payload,
            MessagesPayload {
                user_id: 4,
                messages: payload.messages.clone()
            }
        );
    }

    #[tokio::test]
    async fn help_lists_commands() {
        let relay = relay(Arc::new(RecordingNetwork::default()));
        let CommandResponse::Help(text) = execute(&relay, ControlCommand::Help).await.unwrap()
        else {
            panic!("expected help");
        };
        assert!(text.contains("fetchMessages"));
    }
}
