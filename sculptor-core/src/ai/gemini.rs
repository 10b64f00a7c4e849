//! Google Generative Language backend. Speaks the `generateContent` REST
//! endpoint directly with a `systemInstruction` and a low-temperature
//! generation config.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

use crate::ai::model::Model;
use crate::ai::{error::AiError, provider::AiProvider, types::*};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiProvider {
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

    fn endpoint(&self, model: Model) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model.name())
    }
}

fn build_request(request: &ConversationRequest) -> Result<GenerateContentRequest, AiError> {
    if !request.model.model.is_gemini() {
        return Err(AiError::Terminal(anyhow::anyhow!(
            "Model {} is not supported by Gemini",
            request.model.model.name()
        )));
    }

    let system_instruction = (!request.system_prompt.trim().is_empty()).then(|| GeminiContent {
        role: None,
        parts: vec![Part {
            text: request.system_prompt.clone(),
        }],
    });

    let contents = request
        .messages
        .iter()
        .map(|msg| GeminiContent {
            role: Some(
                match msg.role {
                    MessageRole::User => "user",
                    MessageRole::Assistant => "model",
                }
                .to_string(),
            ),
            parts: vec![Part {
                text: msg.content.clone(),
            }],
        })
        .collect();

    Ok(GenerateContentRequest {
        system_instruction,
        contents,
        generation_config: GenerationConfig {
            temperature: request.model.temperature,
            max_output_tokens: request.model.max_tokens,
        },
    })
}

fn classify_error(status: u16, body: &str) -> AiError {
    let err = anyhow::anyhow!("Gemini API error {status}: {body}");
    match status {
        429 | 500..=599 => AiError::Transient(err),
        _ => AiError::Terminal(err),
    }
}

fn parse_response(response_text: &str) -> Result<ConversationResponse, AiError> {
    let parsed: GenerateContentResponse = serde_json::from_str(response_text).map_err(|e| {
        AiError::Terminal(anyhow::anyhow!(
            "Failed to parse Gemini response: {} - Response: {}",
            e,
            response_text
        ))
    })?;

    if let Some(feedback) = &parsed.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            return Err(AiError::Terminal(anyhow::anyhow!(
                "Gemini blocked the prompt: {reason}"
            )));
        }
    }

    let candidate = parsed
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AiError::Terminal(anyhow::anyhow!("No candidates in response")))?;

    let content = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let usage = parsed
        .usage_metadata
        .map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_else(TokenUsage::empty);

    let stop_reason = match candidate.finish_reason.as_deref() {
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") => StopReason::ContentFilter,
        _ => StopReason::EndTurn,
    };

    Ok(ConversationResponse {
        content,
        usage,
        stop_reason,
    })
}

#[async_trait::async_trait]
impl AiProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    fn supported_models(&self) -> HashSet<Model> {
        HashSet::from([
            Model::Gemini3ProPreview,
            Model::Gemini25Pro,
            Model::Gemini25Flash,
        ])
    }

    async fn converse(
        &self,
        request: ConversationRequest,
    ) -> Result<ConversationResponse, AiError> {
        let body = build_request(&request)?;
        let url = self.endpoint(request.model.model);
        debug!(%url, "Using Gemini API");

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                debug!(?e, "Gemini API call failed");
                AiError::Transient(anyhow::anyhow!("Network error: {}", e))
            })?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| AiError::Transient(anyhow::anyhow!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            debug!(?status, ?response_text, "Gemini API returned error");
            return Err(classify_error(status.as_u16(), &response_text));
        }

        let parsed = parse_response(&response_text)?;
        info!(usage = ?parsed.usage, stop_reason = ?parsed.stop_reason, "Gemini response received");
        Ok(parsed)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
