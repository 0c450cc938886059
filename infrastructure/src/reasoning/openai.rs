//! OpenAI-compatible chat completions adapter for [`ReasoningService`].
//!
//! Works with any endpoint that speaks `POST {base_url}/chat/completions`
//! (OpenAI, Azure-style gateways, Ollama, llama.cpp server). The output
//! schema is sent in the system prompt and JSON mode is requested; the
//! reply is parsed leniently with [`extract_json`].

use crate::config::{ConfigurationError, FileReasoningConfig};
use async_trait::async_trait;
use policy_application::{ReasoningError, ReasoningRequest, ReasoningService};
use policy_domain::util::{extract_json, truncate_str};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Bytes of an error body kept in error messages
const MAX_ERROR_BODY: usize = 500;

/// Reasoning backend over HTTP
pub struct OpenAiReasoningService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    temperature: f32,
}

impl OpenAiReasoningService {
    /// Build from the `[reasoning]` section.
    ///
    /// A missing API key is a configuration error unless the endpoint is local.
    pub fn from_config(config: &FileReasoningConfig) -> Result<Self, ConfigurationError> {
        let api_key = config.api_key();
        if api_key.is_none() && !config.is_local() {
            return Err(ConfigurationError::MissingApiKey {
                env: config.api_key_env.clone(),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ConfigurationError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn body<'a>(&'a self, request: &'a ReasoningRequest) -> ChatRequest<'a> {
        let schema = serde_json::to_string(&request.schema.schema).unwrap_or_default();
        ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: format!(
                        "{}\n\nRespond with a single JSON object matching this schema ({}):\n{}",
                        request.system, request.schema.name, schema
                    ),
                },
                ChatMessage {
                    role: "user",
                    content: request.prompt.clone(),
                },
            ],
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    response_format: ResponseFormat,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Map a non-success HTTP status to a typed failure.
fn status_error(status: StatusCode, body: &str) -> ReasoningError {
    let detail = format!("HTTP {}: {}", status.as_u16(), truncate_str(body.trim(), MAX_ERROR_BODY));
    match status {
        StatusCode::TOO_MANY_REQUESTS => ReasoningError::RateLimited(detail),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => ReasoningError::Timeout,
        s if s.is_server_error() => ReasoningError::ServiceUnavailable(detail),
        _ => ReasoningError::MalformedOutput(detail),
    }
}

fn transport_error(e: reqwest::Error) -> ReasoningError {
    if e.is_timeout() {
        ReasoningError::Timeout
    } else {
        ReasoningError::ServiceUnavailable(e.to_string())
    }
}

/// Pull the JSON payload out of a completion response body.
fn parse_completion(body: &str) -> Result<Value, ReasoningError> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| ReasoningError::MalformedOutput(format!("Invalid response body: {}", e)))?;
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ReasoningError::MalformedOutput("Empty completion".to_string()))?;

    extract_json(&content).ok_or_else(|| {
        ReasoningError::MalformedOutput(format!(
            "No JSON in completion: {}",
            truncate_str(&content, MAX_ERROR_BODY)
        ))
    })
}

#[async_trait]
impl ReasoningService for OpenAiReasoningService {
    async fn complete(&self, request: &ReasoningRequest) -> Result<Value, ReasoningError> {
        debug!(
            "Reasoning call ({}) to {} with model {}",
            request.schema.name, self.endpoint, self.model
        );

        let mut builder = self.client.post(&self.endpoint).json(&self.body(request));
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            let err = status_error(status, &body);
            warn!("Reasoning call failed: {}", err);
            return Err(err);
        }

        parse_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy_domain::OutputSchema;
    use serde_json::json;

    fn local_config() -> FileReasoningConfig {
        FileReasoningConfig {
            base_url: "http://localhost:11434/v1/".to_string(),
            model: "llama3.1".to_string(),
            api_key_env: "POLICY_AGENTS_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            ReasoningError::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::SERVICE_UNAVAILABLE, ""),
            ReasoningError::ServiceUnavailable(_)
        ));
        assert_eq!(status_error(StatusCode::GATEWAY_TIMEOUT, ""), ReasoningError::Timeout);
        assert!(matches!(
            status_error(StatusCode::BAD_REQUEST, "bad schema"),
            ReasoningError::MalformedOutput(_)
        ));
    }

    #[test]
    fn test_parse_completion_with_fenced_json() {
        let body = json!({
            "choices": [{"message": {"content": "```json\n{\"passed\": true}\n```"}}]
        })
        .to_string();
        assert_eq!(parse_completion(&body).unwrap(), json!({"passed": true}));
    }

    #[test]
    fn test_parse_completion_failures() {
        assert!(matches!(
            parse_completion("not json"),
            Err(ReasoningError::MalformedOutput(_))
        ));
        let empty = json!({"choices": []}).to_string();
        assert!(matches!(
            parse_completion(&empty),
            Err(ReasoningError::MalformedOutput(_))
        ));
        let prose = json!({"choices": [{"message": {"content": "I cannot help"}}]}).to_string();
        assert!(matches!(
            parse_completion(&prose),
            Err(ReasoningError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_missing_key_rejected_for_remote_endpoint() {
        let config = FileReasoningConfig {
            api_key_env: "POLICY_AGENTS_TEST_UNSET_KEY_VAR".to_string(),
            ..Default::default()
        };
        let err = OpenAiReasoningService::from_config(&config).err().unwrap();
        assert!(matches!(err, ConfigurationError::MissingApiKey { .. }));
    }

    #[test]
    fn test_local_endpoint_without_key() {
        let service = OpenAiReasoningService::from_config(&local_config()).unwrap();
        assert_eq!(service.endpoint, "http://localhost:11434/v1/chat/completions");
        assert_eq!(service.model(), "llama3.1");
    }

    #[test]
    fn test_request_body_carries_schema() {
        let service = OpenAiReasoningService::from_config(&local_config()).unwrap();
        let request = ReasoningRequest::new("system", "prompt", OutputSchema::verdict());
        let body = serde_json::to_value(service.body(&request)).unwrap();
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][1]["content"], "prompt");
        assert!(
            body["messages"][0]["content"]
                .as_str()
                .unwrap()
                .contains("schema (verdict)")
        );
    }
}
