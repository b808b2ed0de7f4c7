use std::time::Duration;

use anyhow::Context as _;
use reqwest::Client;
use tracing::{error, info};

use ghost_database::HistoryStore;
use ghost_utils::formatting::preview;

use crate::config::LlmConfig;
use crate::message::build_conversation;
use crate::provider::ProviderKind;
use crate::providers::ProviderTable;

/// Ceiling on a single provider call, connection included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);
/// Text returned when a provider answers with nothing.
pub const NO_RESPONSE: &str = "No response";

const PROMPT_PREVIEW_CHARS: usize = 50;

/// Routes a completion request to the provider selected by the model identifier.
///
/// [`LlmDispatcher::generate`] always yields text: provider failures and
/// timeouts become that provider's fallback reply.
#[derive(Clone)]
pub struct LlmDispatcher {
    history: HistoryStore,
    providers: ProviderTable,
    timeout: Duration,
}

impl LlmDispatcher {
    pub fn new(history: HistoryStore, config: &LlmConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build llm http client")?;

        Ok(Self {
            history,
            providers: ProviderTable::from_config(config, http),
            timeout: REQUEST_TIMEOUT,
        })
    }

    /// Override the per-call ceiling.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn generate(
        &self,
        user_id: u64,
        prompt: &str,
        system_prompt: &str,
        model_id: &str,
    ) -> String {
        let history = self.history.read(user_id).await;
        let messages = build_conversation(system_prompt, &history, prompt);

        let kind = ProviderKind::resolve(model_id);
        let provider = self.providers.get(kind);
        let upstream_model = kind.upstream_model(model_id);

        info!(
            user_id,
            provider = kind.as_str(),
            model = model_id,
            prompt = %preview(prompt, PROMPT_PREVIEW_CHARS),
            "calling llm provider"
        );

        let outcome = tokio::time::timeout(
            self.timeout,
            provider.complete(&upstream_model, &messages, prompt),
        )
        .await;

        match outcome {
            Ok(Ok(text)) => normalize_reply(&text),
            Ok(Err(err)) => {
                error!(?err, provider = kind.as_str(), model = model_id, "llm call failed");
                provider.kind().fallback_reply().to_owned()
            }
            Err(_) => {
                error!(
                    provider = kind.as_str(),
                    model = model_id,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "llm call timed out"
                );
                provider.kind().fallback_reply().to_owned()
            }
        }
    }
}

fn normalize_reply(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        NO_RESPONSE.to_owned()
    } else {
        trimmed.to_owned()
    }
}
