use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::ai::model::Model;
use crate::ai::{error::AiError, provider::AiProvider, types::*};

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Clone)]
pub struct OpenRouterProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

fn openrouter_model_id(model: Model) -> Result<&'static str, AiError> {
    let model_id = match model {
        Model::Gemini3ProPreview => "google/gemini-3-pro-preview",
        Model::Gemini25Pro => "google/gemini-2.5-pro",
        Model::Gemini25Flash => "google/gemini-2.5-flash",
        Model::ClaudeSonnet45 => "anthropic/claude-sonnet-4.5",
        Model::Gpt5 => "openai/gpt-5",
        Model::Qwen3Coder => "qwen/qwen3-coder",
        Model::None => {
            return Err(AiError::Terminal(anyhow::anyhow!(
                "Model {} is not supported in OpenRouter",
                model.name()
            )));
        }
    };
    Ok(model_id)
}

fn convert_to_openrouter_messages(
    messages: &[Message],
    system_prompt: &str,
) -> Vec<OpenRouterMessage> {
    let mut openrouter_messages = Vec::new();

    if !system_prompt.trim().is_empty() {
        openrouter_messages.push(OpenRouterMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
    }

    for msg in messages {
        let role = match msg.role {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };
        openrouter_messages.push(OpenRouterMessage {
            role: role.to_string(),
            content: msg.content.clone(),
        });
    }

    openrouter_messages
}

fn build_request(request: &ConversationRequest) -> Result<OpenRouterRequest, AiError> {
    Ok(OpenRouterRequest {
        model: openrouter_model_id(request.model.model)?.to_string(),
        messages: convert_to_openrouter_messages(&request.messages, &request.system_prompt),
        max_tokens: request.model.max_tokens,
        temperature: request.model.temperature,
        stream: Some(false),
        usage: Some(UsageConfig { include: true }),
    })
}

/// 413 or a "too long" body means the prompt will never fit. Rate limiting
/// and upstream failures are transient; everything else is terminal.
fn classify_error(status: u16, body: &str) -> AiError {
    let lower = body.to_lowercase();
    let err = anyhow::anyhow!("OpenRouter API error {status}: {body}");

    if status == 413 || lower.contains("too long") {
        return AiError::Terminal(err);
    }

    if status == 429 || status >= 500 {
        return AiError::Transient(err);
    }

    AiError::Terminal(err)
}

fn parse_response(response_text: &str) -> Result<ConversationResponse, AiError> {
    let openrouter_response: OpenRouterResponse =
        serde_json::from_str(response_text).map_err(|e| {
            AiError::Terminal(anyhow::anyhow!(
                "Failed to parse OpenRouter response: {} - Response: {}",
                e,
                response_text
            ))
        })?;

    let choice = openrouter_response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Terminal(anyhow::anyhow!("No choices in response")))?;

    let usage = openrouter_response
        .usage
        .map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_else(TokenUsage::empty);

    let stop_reason = match choice.finish_reason.as_deref() {
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    };

    Ok(ConversationResponse {
        content: choice.message.content.unwrap_or_default(),
        usage,
        stop_reason,
    })
}

#[async_trait::async_trait]
impl AiProvider for OpenRouterProvider {
    fn name(&self) -> &'static str {
        "OpenRouter"
    }

    fn supported_models(&self) -> HashSet<Model> {
        HashSet::from([
            Model::Gemini3ProPreview,
            Model::Gemini25Pro,
            Model::Gemini25Flash,
            Model::ClaudeSonnet45,
            Model::Gpt5,
            Model::Qwen3Coder,
        ])
    }

    async fn converse(
        &self,
        request: ConversationRequest,
    ) -> Result<ConversationResponse, AiError> {
        let openrouter_request = build_request(&request)?;
        debug!(model_id = %openrouter_request.model, "Using OpenRouter API");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("X-Title", "Sculptor")
            .json(&openrouter_request)
            .send()
            .await
            .map_err(|e| {
                debug!(?e, "OpenRouter API call failed");
                AiError::Transient(anyhow::anyhow!("Network error: {}", e))
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AiError::Transient(anyhow::anyhow!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            debug!(?status, ?response_text, "OpenRouter API returned error");
            return Err(classify_error(status.as_u16(), &response_text));
        }

        let parsed = parse_response(&response_text)?;
        info!(usage = ?parsed.usage, "OpenRouter response received");
        Ok(parsed)
    }
}

// OpenRouter API types

#[derive(Debug, Serialize)]
struct OpenRouterRequest {
    pub model: String,
    pub messages: Vec<OpenRouterMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageConfig>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct OpenRouterMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct UsageConfig {
    pub include: bool,
}

#[derive(Debug, Deserialize)]
struct OpenRouterResponse {
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::tests::test_hello_world;

    #[test]
    fn test_request_carries_system_prompt_first() {
        let request = ConversationRequest {
            messages: vec![Message::user("Generate a comparator.")],
            model: Model::Gemini3ProPreview.default_settings(),
            system_prompt: "GLOBAL ARCHITECTURE:".to_string(),
        };

        let body = serde_json::to_value(build_request(&request).unwrap()).unwrap();
        assert_eq!(body["model"], "google/gemini-3-pro-preview");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "GLOBAL ARCHITECTURE:");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["max_tokens"], 8192);
        assert!(body.get("top_p").is_none());
    }

    #[test]
    fn test_none_model_is_rejected() {
        let request = ConversationRequest {
            messages: vec![],
            model: Model::None.default_settings(),
            system_prompt: String::new(),
        };
        assert!(matches!(
            build_request(&request),
            Err(AiError::Terminal(_))
        ));
    }

    #[test]
    fn test_error_classification() {
        assert!(matches!(classify_error(413, ""), AiError::Terminal(_)));
        assert!(matches!(
            classify_error(429, "rate-limited upstream"),
            AiError::Transient(_)
        ));
        assert!(matches!(classify_error(503, "busy"), AiError::Transient(_)));
        assert!(matches!(classify_error(401, "bad key"), AiError::Terminal(_)));
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{
            "choices": [{"message": {"content": "```veriloga\nmodule m; endmodule\n```"}, "finish_reason": "length"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 30, "total_tokens": 42}
        }"#;
        let response = parse_response(body).unwrap();
        assert!(response.content.starts_with("```veriloga"));
        assert_eq!(response.usage.total_tokens, 42);
        assert_eq!(response.stop_reason, StopReason::MaxTokens);

        assert!(matches!(
            parse_response(r#"{"choices": []}"#),
            Err(AiError::Terminal(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires OpenRouter API key"]
    async fn test_openrouter_hello_world() {
        let api_key = std::env::var("OPENROUTER_API_KEY").unwrap_or_default();
        let provider = OpenRouterProvider::new(api_key).unwrap();

        if let Err(e) = test_hello_world(provider, Model::Gemini25Flash).await {
            panic!("OpenRouter hello world test failed: {e:?}");
        }
    }
}
