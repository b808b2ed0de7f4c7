use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_OPENROUTER_REFERER, DEFAULT_OPENROUTER_TITLE, LlmConfig};
use crate::message::ChatMessage;
use crate::provider::ProviderKind;
use crate::providers::{Provider, post_json, require_api_key};

const MAX_TOKENS: u32 = 50;
const TEMPERATURE: f64 = 0.7;

/// Chat-completions API shared by Together, DeepInfra and the OpenRouter gateway.
pub struct OpenAiCompatProvider {
    kind: ProviderKind,
    http: Client,
    api_key: Option<String>,
    base_url: String,
    extra_headers: Vec<(&'static str, String)>,
}

impl OpenAiCompatProvider {
    pub fn new(kind: ProviderKind, http: Client, api_key: Option<String>, base_url: &str) -> Self {
        Self {
            kind,
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            extra_headers: Vec::new(),
        }
    }

    /// Default gateway, which also wants attribution headers.
    pub fn openrouter(http: Client, config: &LlmConfig) -> Self {
        let referer = config
            .openrouter_referer
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENROUTER_REFERER.to_owned());
        let title = config
            .openrouter_title
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENROUTER_TITLE.to_owned());

        let mut provider = Self::new(
            ProviderKind::OpenRouter,
            http,
            config.openrouter_api_key.clone(),
            &config.endpoints.openrouter,
        );
        provider.extra_headers = vec![("HTTP-Referer", referer), ("X-Title", title)];
        provider
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl Provider for OpenAiCompatProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        _prompt: &str,
    ) -> anyhow::Result<String> {
        let api_key = require_api_key(self.api_key.as_deref(), self.kind)?;

        let mut request = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key);
        for (name, value) in &self.extra_headers {
            request = request.header(*name, value);
        }

        let body = ChatCompletionRequest {
            model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let response: ChatCompletionResponse = post_json(request, &body, self.kind).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .with_context(|| format!("{} returned no choices", self.kind.as_str()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}
