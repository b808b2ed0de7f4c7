mod gemini;
mod huggingface;
mod openai_compat;

use std::sync::Arc;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use ghost_utils::formatting::preview;

use crate::config::LlmConfig;
use crate::message::ChatMessage;
use crate::provider::ProviderKind;

pub use gemini::GeminiProvider;
pub use huggingface::HuggingFaceProvider;
pub use openai_compat::OpenAiCompatProvider;

/// One language-model backend.
#[async_trait]
pub trait Provider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Produce raw (untrimmed) reply text. `model` has its routing prefix removed.
    /// `messages` is the full conversation; `prompt` is the newest user message alone.
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        prompt: &str,
    ) -> anyhow::Result<String>;
}

/// One provider instance per [`ProviderKind`].
#[derive(Clone)]
pub struct ProviderTable {
    gemini: Arc<dyn Provider>,
    huggingface: Arc<dyn Provider>,
    together: Arc<dyn Provider>,
    deepinfra: Arc<dyn Provider>,
    openrouter: Arc<dyn Provider>,
}

impl ProviderTable {
    pub fn from_config(config: &LlmConfig, http: Client) -> Self {
        let endpoints = &config.endpoints;
        Self {
            gemini: Arc::new(GeminiProvider::new(
                http.clone(),
                config.gemini_api_key.clone(),
                &endpoints.gemini,
            )),
            huggingface: Arc::new(HuggingFaceProvider::new(
                http.clone(),
                config.huggingface_api_key.clone(),
                &endpoints.huggingface,
            )),
            together: Arc::new(OpenAiCompatProvider::new(
                ProviderKind::Together,
                http.clone(),
                config.together_api_key.clone(),
                &endpoints.together,
            )),
            deepinfra: Arc::new(OpenAiCompatProvider::new(
                ProviderKind::DeepInfra,
                http.clone(),
                config.deepinfra_api_key.clone(),
                &endpoints.deepinfra,
            )),
            openrouter: Arc::new(OpenAiCompatProvider::openrouter(http, config)),
        }
    }

    pub fn get(&self, kind: ProviderKind) -> &dyn Provider {
        match kind {
            ProviderKind::Gemini => self.gemini.as_ref(),
            ProviderKind::HuggingFace => self.huggingface.as_ref(),
            ProviderKind::Together => self.together.as_ref(),
            ProviderKind::DeepInfra => self.deepinfra.as_ref(),
            ProviderKind::OpenRouter => self.openrouter.as_ref(),
        }
    }
}

fn require_api_key(api_key: Option<&str>, kind: ProviderKind) -> anyhow::Result<&str> {
    api_key.with_context(|| format!("{} api key is not configured", kind.as_str()))
}

/// Send a JSON body and decode a JSON response, treating non-2xx statuses as errors.
async fn post_json<B, R>(request: RequestBuilder, body: &B, kind: ProviderKind) -> anyhow::Result<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .with_context(|| format!("{} request failed", kind.as_str()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!(
            "{} returned {}: {}",
            kind.as_str(),
            status,
            preview(body.trim(), 200)
        );
    }

    response
        .json::<R>()
        .await
        .with_context(|| format!("failed to decode {} response", kind.as_str()))
}
