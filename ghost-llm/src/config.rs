use std::env;

/// Base URLs for each provider. Overridable for self-hosted proxies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderEndpoints {
    pub gemini: String,
    pub huggingface: String,
    pub together: String,
    pub deepinfra: String,
    pub openrouter: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            gemini: "https://generativelanguage.googleapis.com".to_owned(),
            huggingface: "https://api-inference.huggingface.co".to_owned(),
            together: "https://api.together.xyz/v1".to_owned(),
            deepinfra: "https://api.deepinfra.com/v1/openai-compatible".to_owned(),
            openrouter: "https://openrouter.ai/api/v1".to_owned(),
        }
    }
}

/// Provider credentials and endpoints.
#[derive(Clone, Debug, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    pub huggingface_api_key: Option<String>,
    pub together_api_key: Option<String>,
    pub deepinfra_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub openrouter_referer: Option<String>,
    pub openrouter_title: Option<String>,
    pub endpoints: ProviderEndpoints,
}

pub const DEFAULT_OPENROUTER_REFERER: &str = "http://localhost:4000";
pub const DEFAULT_OPENROUTER_TITLE: &str = "Ghost Relay";

impl LlmConfig {
    pub fn from_env() -> Self {
        let defaults = ProviderEndpoints::default();
        let endpoints = ProviderEndpoints {
            gemini: env_string("GEMINI_BASE_URL").unwrap_or(defaults.gemini),
            huggingface: env_string("HUGGINGFACE_BASE_URL").unwrap_or(defaults.huggingface),
            together: env_string("TOGETHER_BASE_URL").unwrap_or(defaults.together),
            deepinfra: env_string("DEEPINFRA_BASE_URL").unwrap_or(defaults.deepinfra),
            openrouter: env_string("OPENROUTER_BASE_URL").unwrap_or(defaults.openrouter),
        };

        Self {
            gemini_api_key: env_string("GEMINI_API_KEY"),
            huggingface_api_key: env_string("HUGGINGFACE_API_KEY"),
            together_api_key: env_string("TOGETHER_API_KEY"),
            deepinfra_api_key: env_string("DEEPINFRA_API_KEY"),
            openrouter_api_key: env_string("OPENROUTER_API_KEY"),
            openrouter_referer: env_string("OPENROUTER_REFERER"),
            openrouter_title: env_string("OPENROUTER_TITLE"),
            endpoints,
        }
    }

    /// Names of providers that have credentials, for startup logging.
    pub fn configured_providers(&self) -> Vec<&'static str> {
        [
            ("gemini", &self.gemini_api_key),
            ("huggingface", &self.huggingface_api_key),
            ("together", &self.together_api_key),
            ("deepinfra", &self.deepinfra_api_key),
            ("openrouter", &self.openrouter_api_key),
        ]
        .into_iter()
        .filter(|(_, key)| key.is_some())
        .map(|(name, _)| name)
        .collect()
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}
