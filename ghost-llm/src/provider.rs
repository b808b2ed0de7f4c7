/// The language-model backends a model identifier can route to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Google's native generative-model API.
    Gemini,
    HuggingFace,
    Together,
    DeepInfra,
    /// OpenAI-compatible gateway used for every unrecognised identifier.
    OpenRouter,
}

const GEMINI_MARKER: &str = "gemini";
const HUGGINGFACE_PREFIX: &str = "huggingface/";
const TOGETHER_PREFIX: &str = "together/";
const DEEPINFRA_PREFIX: &str = "deepinfra/";

/// Reply used when a Gemini call fails.
pub const GEMINI_FALLBACK_REPLY: &str = "Jyada ho gaya, now wait.";
/// Reply used when any HTTP gateway call fails.
pub const GATEWAY_FALLBACK_REPLY: &str = "Error";

impl ProviderKind {
    /// Route a model identifier. First match wins: gemini, huggingface, together,
    /// deepinfra, then the default gateway.
    pub fn resolve(model_id: &str) -> Self {
        if model_id.contains(GEMINI_MARKER) {
            Self::Gemini
        } else if model_id.contains(HUGGINGFACE_PREFIX) {
            Self::HuggingFace
        } else if model_id.contains(TOGETHER_PREFIX) {
            Self::Together
        } else if model_id.contains(DEEPINFRA_PREFIX) {
            Self::DeepInfra
        } else {
            Self::OpenRouter
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::HuggingFace => "huggingface",
            Self::Together => "together",
            Self::DeepInfra => "deepinfra",
            Self::OpenRouter => "openrouter",
        }
    }

    /// Model name as the provider expects it, with the routing prefix removed.
    pub fn upstream_model(self, model_id: &str) -> String {
        let prefix = match self {
            Self::HuggingFace => HUGGINGFACE_PREFIX,
            Self::Together => TOGETHER_PREFIX,
            Self::DeepInfra => DEEPINFRA_PREFIX,
            Self::Gemini | Self::OpenRouter => return model_id.to_owned(),
        };
        model_id.replacen(prefix, "", 1)
    }

    pub fn fallback_reply(self) -> &'static str {
        match self {
            Self::Gemini => GEMINI_FALLBACK_REPLY,
            _ => GATEWAY_FALLBACK_REPLY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProviderKind;

    #[test]
    fn routes_model_identifiers() {
        assert_eq!(ProviderKind::resolve("gemini-2.0-flash"), ProviderKind::Gemini);
        assert_eq!(ProviderKind::resolve("huggingface/gpt2"), ProviderKind::HuggingFace);
        assert_eq!(ProviderKind::resolve("together/x"), ProviderKind::Together);
        assert_eq!(ProviderKind::resolve("deepinfra/x"), ProviderKind::DeepInfra);
        assert_eq!(ProviderKind::resolve("openai/gpt-4"), ProviderKind::OpenRouter);
        assert_eq!(ProviderKind::resolve(""), ProviderKind::OpenRouter);
    }

    #[test]
    fn gemini_wins_over_prefixes() {
        assert_eq!(
            ProviderKind::resolve("together/gemini-pro"),
            ProviderKind::Gemini
        );
        assert_eq!(
            ProviderKind::resolve("huggingface/gemini-clone"),
            ProviderKind::Gemini
        );
    }

    #[test]
    fn earlier_prefixes_win_over_later_ones() {
        assert_eq!(
            ProviderKind::resolve("huggingface/together/x"),
            ProviderKind::HuggingFace
        );
        assert_eq!(
            ProviderKind::resolve("together/deepinfra/x"),
            ProviderKind::Together
        );
    }

    #[test]
    fn strips_routing_prefix_once() {
        assert_eq!(ProviderKind::HuggingFace.upstream_model("huggingface/gpt2"), "gpt2");
        assert_eq!(
            ProviderKind::Together.upstream_model("together/meta-llama/Llama-3-8b"),
            "meta-llama/Llama-3-8b"
        );
        assert_eq!(ProviderKind::DeepInfra.upstream_model("deepinfra/x"), "x");
        assert_eq!(ProviderKind::OpenRouter.upstream_model("openai/gpt-4"), "openai/gpt-4");
        assert_eq!(ProviderKind::Gemini.upstream_model("gemini-2.0-flash"), "gemini-2.0-flash");
    }

    #[test]
    fn fallback_text_differs_for_native_provider() {
        assert_ne!(
            ProviderKind::Gemini.fallback_reply(),
            ProviderKind::OpenRouter.fallback_reply()
        );
        assert_eq!(
            ProviderKind::Together.fallback_reply(),
            ProviderKind::HuggingFace.fallback_reply()
        );
    }
}
