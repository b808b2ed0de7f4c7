use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::provider::ProviderKind;
use crate::providers::{Provider, post_json, require_api_key};

/// Hugging Face inference API. Only the newest prompt is sent; history is not.
pub struct HuggingFaceProvider {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl HuggingFaceProvider {
    pub fn new(http: Client, api_key: Option<String>, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

// Text-generation models answer with a one-element array; some pipelines
// return the bare object.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<Generated>),
    Single(Generated),
}

#[derive(Deserialize)]
struct Generated {
    generated_text: Option<String>,
}

#[async_trait]
impl Provider for HuggingFaceProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::HuggingFace
    }

    async fn complete(
        &self,
        model: &str,
        _messages: &[ChatMessage],
        prompt: &str,
    ) -> anyhow::Result<String> {
        let api_key = require_api_key(self.api_key.as_deref(), self.kind())?;

        let url = format!("{}/models/{}", self.base_url, model);
        let request = self.http.post(url).bearer_auth(api_key);
        let response: InferenceResponse =
            post_json(request, &InferenceRequest { inputs: prompt }, self.kind()).await?;

        let generated = match response {
            InferenceResponse::Batch(items) => items.into_iter().next(),
            InferenceResponse::Single(item) => Some(item),
        };

        Ok(generated
            .and_then(|item| item.generated_text)
            .unwrap_or_default())
    }
}
