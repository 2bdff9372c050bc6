//! Runtime configuration. The three credentials are resolved once at startup
//! and passed around by reference; nothing is written back to the process
//! environment.

/// Endpoint and model for the decision and prompt-authoring calls.
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const OPENAI_CHAT_MODEL: &str = "gpt-4o";

/// Endpoint and model for the search-augmented completion.
pub const PERPLEXITY_CHAT_URL: &str = "https://api.perplexity.ai/chat/completions";
pub const PERPLEXITY_CHAT_MODEL: &str = "sonar-reasoning";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub replicate_api_token: String,
    pub perplexity_api_key: String,
}
