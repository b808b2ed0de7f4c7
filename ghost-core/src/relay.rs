use std::sync::Arc;

use anyhow::Context as _;
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, error, info};

use ghost_database::{HistoryRole, HistoryStore};
use ghost_llm::LlmDispatcher;
use ghost_utils::formatting::preview;

use crate::directory::UserDirectory;
use crate::events::{ClassifiedEvent, IncomingMessage, classify};
use crate::network::{ChatNetwork, FETCH_LIMIT, SelfIdentity, WireMessage};
use crate::state::BotState;
use crate::update::RawUpdate;

const PROMPT_PREVIEW_CHARS: usize = 50;

/// What the relay did with one update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// A reply was sent and recorded.
    Replied { user_id: u64, reply: String },
    /// A reply was chosen but could not be sent.
    ReplyFailed { user_id: u64 },
    /// A message sent by this account from another session was logged.
    LoggedOutgoing { user_id: u64 },
    Typing { user_id: u64 },
    Skipped,
}

/// Top-level control: consumes network updates, keeps history, replies.
///
/// Updates are handled concurrently. Nothing serialises two updates from the
/// same correspondent.
pub struct Relay {
    network: Arc<dyn ChatNetwork>,
    state: Arc<BotState>,
    directory: UserDirectory,
    history: HistoryStore,
    llm: LlmDispatcher,
    identity: RwLock<Option<SelfIdentity>>,
    lifecycle: Mutex<()>,
}

impl Relay {
    pub fn new(
        network: Arc<dyn ChatNetwork>,
        state: Arc<BotState>,
        history: HistoryStore,
        llm: LlmDispatcher,
    ) -> Self {
        let directory = UserDirectory::new(Arc::clone(&network));
        Self {
            network,
            state,
            directory,
            history,
            llm,
            identity: RwLock::new(None),
            lifecycle: Mutex::new(()),
        }
    }

    pub fn state(&self) -> &BotState {
        &self.state
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub async fn self_identity(&self) -> Option<SelfIdentity> {
        self.identity.read().await.clone()
    }

    /// Log in and begin consuming updates. No-op when already running; a failed
    /// login leaves the relay stopped.
    pub async fn start(self: &Arc<Self>) -> anyhow::Result<()> {
        let _guard = self.lifecycle.lock().await;
        if self.state.is_running() {
            info!("relay is already running");
            return Ok(());
        }

        info!("starting relay");
        let (updates_tx, updates_rx) = mpsc::unbounded_channel();
        let me = match self.network.login(updates_tx).await {
            Ok(me) => me,
            Err(err) => {
                error!(?err, "login failed; relay stays stopped");
                return Err(err.context("login failed"));
            }
        };

        info!(self_id = me.id, username = %me.username, "logged in");
        *self.identity.write().await = Some(me);
        self.state.set_running(true);

        tokio::spawn(Arc::clone(self).consume(updates_rx));
        info!("listening for incoming messages");
        Ok(())
    }

    /// Disconnect from the network. No-op when already stopped.
    pub async fn stop(&self) -> anyhow::Result<()> {
        let _guard = self.lifecycle.lock().await;
        if !self.state.is_running() {
            info!("relay is already stopped");
            return Ok(());
        }

        self.state.set_running(false);
        self.network
            .disconnect()
            .await
            .context("failed to disconnect from chat network")?;
        info!("relay stopped");
        Ok(())
    }

    async fn consume(self: Arc<Self>, mut updates: mpsc::UnboundedReceiver<RawUpdate>) {
        while let Some(update) = updates.recv().await {
            let relay = Arc::clone(&self);
            tokio::spawn(async move {
                relay.handle_update(update).await;
            });
        }
        debug!("update stream closed");
    }

    pub async fn handle_update(&self, update: RawUpdate) -> RelayOutcome {
        if !self.state.is_running() {
            return RelayOutcome::Skipped;
        }

        let Some(self_id) = self.identity.read().await.as_ref().map(|me| me.id) else {
            return RelayOutcome::Skipped;
        };

        match classify(&update) {
            ClassifiedEvent::IncomingMessage(message) => {
                self.handle_message(self_id, message).await
            }
            ClassifiedEvent::TypingNotice { user_id } if user_id != self_id => {
                let profile = self.directory.resolve(user_id).await;
                info!(user_id, display_name = %profile.display_name, "user is typing");
                RelayOutcome::Typing { user_id }
            }
            ClassifiedEvent::TypingNotice { .. } | ClassifiedEvent::Ignored => {
                RelayOutcome::Skipped
            }
        }
    }

    async fn handle_message(&self, self_id: u64, message: IncomingMessage) -> RelayOutcome {
        if message.sender_id == self_id {
            return RelayOutcome::Skipped;
        }

        if message.is_direct && !message.is_outgoing {
            return self.reply_to(message).await;
        }

        if message.is_outgoing {
            let profile = self.directory.resolve(message.sender_id).await;
            info!(
                user_id = message.sender_id,
                display_name = %profile.display_name,
                text = %message.text,
                "message sent from this account"
            );
            return RelayOutcome::LoggedOutgoing {
                user_id: message.sender_id,
            };
        }

        RelayOutcome::Skipped
    }

    async fn reply_to(&self, message: IncomingMessage) -> RelayOutcome {
        let user_id = message.sender_id;
        let profile = self.directory.resolve(user_id).await;
        info!(
            user_id,
            display_name = %profile.display_name,
            text = %message.text,
            "direct message received"
        );

        self.history
            .append(user_id, HistoryRole::User, &message.text)
            .await;

        let settings = self.state.settings().await;
        let reply = if settings.llm_enabled {
            self.llm
                .generate(
                    user_id,
                    &message.text,
                    &settings.system_prompt,
                    &settings.selected_model,
                )
                .await
        } else {
            settings.reply_message
        };

        info!(
            user_id,
            display_name = %profile.display_name,
            reply = %reply,
            "replying"
        );

        if let Err(err) = self.network.send_message(user_id, &reply).await {
            error!(?err, user_id, "failed to send reply");
            return RelayOutcome::ReplyFailed { user_id };
        }

        self.history.append(user_id, HistoryRole::Bot, &reply).await;
        RelayOutcome::Replied { user_id, reply }
    }

    pub async fn set_reply_message(&self, reply_message: String) {
        info!(reply_message = %reply_message, "reply message updated");
        self.state.set_reply_message(reply_message).await;
    }

    pub async fn toggle_llm(&self, enabled: bool) {
        info!(
            "llm replies {}",
            if enabled { "enabled" } else { "disabled" }
        );
        self.state.set_llm_enabled(enabled).await;
    }

    pub async fn set_system_prompt(&self, system_prompt: String) {
        info!(
            system_prompt = %preview(&system_prompt, PROMPT_PREVIEW_CHARS),
            "system prompt updated"
        );
        self.state.set_system_prompt(system_prompt).await;
    }

    pub async fn set_model(&self, model: String) {
        info!(model = %model, "selected model updated");
        self.state.set_selected_model(model).await;
    }

    /// Send `text` to `user_id` right away and record it as a bot reply.
    pub async fn send_message(&self, user_id: u64, text: &str) -> anyhow::Result<()> {
        self.network
            .send_message(user_id, text)
            .await
            .with_context(|| format!("failed to send message to {user_id}"))?;

        let recipient = self
            .directory
            .cached_display_name(user_id)
            .await
            .unwrap_or_else(|| user_id.to_string());
        info!(user_id, recipient = %recipient, text = %text, "message sent");

        self.history.append(user_id, HistoryRole::Bot, text).await;
        Ok(())
    }

    /// Recent messages of the conversation with `user_id`, straight from the
    /// network. Empty when the fetch fails.
    pub async fn fetch_messages(&self, user_id: u64, offset_id: u64) -> Vec<WireMessage> {
        match self
            .network
            .fetch_messages(user_id, offset_id, FETCH_LIMIT)
            .await
        {
            Ok(messages) => messages,
            Err(err) => {
                error!(?err, user_id, offset_id, "failed to fetch messages");
                Vec::new()
            }
        }
    }
}
