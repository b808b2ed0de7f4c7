use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::RwLock;

use ghost_llm::prompt::DEFAULT_SYSTEM_PROMPT;

pub const DEFAULT_REPLY_MESSAGE: &str = "The person you are looking for, will be here soon...";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Operator-controlled reply behaviour.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplySettings {
    /// Sent verbatim when generated replies are disabled.
    pub reply_message: String,
    pub llm_enabled: bool,
    pub system_prompt: String,
    /// Model identifier; also decides which provider is called.
    pub selected_model: String,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            reply_message: DEFAULT_REPLY_MESSAGE.to_owned(),
            llm_enabled: false,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
            selected_model: DEFAULT_MODEL.to_owned(),
        }
    }
}

/// Process-wide runtime state shared by the relay and the control surface.
/// Changes apply to the next processed event.
#[derive(Debug, Default)]
pub struct BotState {
    running: AtomicBool,
    settings: RwLock<ReplySettings>,
}

impl BotState {
    pub fn new(settings: ReplySettings) -> Self {
        Self {
            running: AtomicBool::new(false),
            settings: RwLock::new(settings),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Copy of the current settings.
    pub async fn settings(&self) -> ReplySettings {
        self.settings.read().await.clone()
    }

    pub async fn set_reply_message(&self, reply_message: impl Into<String>) {
        self.settings.write().await.reply_message = reply_message.into();
    }

    pub async fn set_llm_enabled(&self, enabled: bool) {
        self.settings.write().await.llm_enabled = enabled;
    }

    pub async fn set_system_prompt(&self, system_prompt: impl Into<String>) {
        self.settings.write().await.system_prompt = system_prompt.into();
    }

    pub async fn set_selected_model(&self, model: impl Into<String>) {
        self.settings.write().await.selected_model = model.into();
    }
}

#[cfg(test)]
mod tests {
    use super::{BotState, DEFAULT_MODEL, DEFAULT_REPLY_MESSAGE, ReplySettings};

    #[tokio::test]
    async fn starts_stopped_with_defaults() {
        let state = BotState::default();
        assert!(!state.is_running());

        let settings = state.settings().await;
        assert_eq!(settings.reply_message, DEFAULT_REPLY_MESSAGE);
        assert_eq!(settings.selected_model, DEFAULT_MODEL);
        assert!(!settings.llm_enabled);
    }

    #[tokio::test]
    async fn setters_replace_single_fields() {
        let state = BotState::new(ReplySettings::default());
        state.set_reply_message("brb").await;
        state.set_llm_enabled(true).await;
        state.set_system_prompt("be terse").await;
        state.set_selected_model("together/x").await;

        assert_eq!(
            state.settings().await,
            ReplySettings {
                reply_message: "brb".to_owned(),
                llm_enabled: true,
                system_prompt: "be terse".to_owned(),
                selected_model: "together/x".to_owned(),
            }
        );
    }
}
