use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;
use crate::provider::ProviderKind;
use crate::providers::{Provider, post_json, require_api_key};

/// Google generative-model API. Takes one flattened prompt with no role structure.
pub struct GeminiProvider {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(http: Client, api_key: Option<String>, base_url: &str) -> Self {
        Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[async_trait]
impl Provider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
        _prompt: &str,
    ) -> anyhow::Result<String> {
        let api_key = require_api_key(self.api_key.as_deref(), self.kind())?;

        let full_prompt = messages
            .iter()
            .map(|message| message.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let body = GenerateContentRequest {
            contents: [Content {
                parts: [Part { text: &full_prompt }],
            }],
        };

        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let request = self.http.post(url).header("x-goog-api-key", api_key);
        let response: GenerateContentResponse = post_json(request, &body, self.kind()).await?;

        let Some(candidate) = response.candidates.into_iter().next() else {
            anyhow::bail!("gemini returned no candidates");
        };

        Ok(candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<String>()
            })
            .unwrap_or_default())
    }
}
