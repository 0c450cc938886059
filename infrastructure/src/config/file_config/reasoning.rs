//! Reasoning backend and rule graph configuration (`[reasoning]`, `[rule_graph]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// OpenAI-compatible chat completions endpoint.
///
/// # Example
///
/// ```toml
/// [reasoning]
/// base_url = "http://localhost:11434/v1"
/// model = "llama3.1"
/// api_key_env = "OLLAMA_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReasoningConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// HTTP request timeout
    pub request_timeout_secs: u64,
    pub temperature: f32,
}

impl Default for FileReasoningConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            request_timeout_secs: 60,
            temperature: 0.0,
        }
    }
}

impl FileReasoningConfig {
    /// API key from the configured environment variable, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    /// Local endpoints (Ollama, llama.cpp server) usually run without a key.
    pub fn is_local(&self) -> bool {
        let url = self.base_url.to_lowercase();
        url.contains("://localhost") || url.contains("://127.0.0.1")
    }
}

/// `[rule_graph]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRuleGraphConfig {
    /// JSON rule file; unset disables the rule graph
    pub path: Option<PathBuf>,
}
