//! Gemini API client for remote advice
//!
//! `TextGenerator` is the seam the advisor calls through; `GeminiClient`
//! is the production implementation. Uses a long-lived reqwest::Client for
//! connection pooling with a per-request timeout.

use crate::config::{AdvisorConfig, GenerationSettings};
use crate::error::DashboardError;
use crate::memory::ConversationMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Remote generative-text provider
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce an answer for `question` given instructions and prior turns
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ConversationMessage],
        question: &str,
    ) -> crate::Result<String>;
}

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
    generation: GenerationSettings,
}

impl GeminiClient {
    pub fn new(api_key: String, config: &AdvisorConfig) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!(
                "{}/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            generation: config.generation.clone(),
        })
    }

    /// Client for the configured credential, `None` when there is none
    pub fn from_config(config: &AdvisorConfig) -> crate::Result<Option<Self>> {
        match &config.api_key {
            Some(key) => Self::new(key.clone(), config).map(Some),
            None => Ok(None),
        }
    }

    fn build_request(
        &self,
        system_prompt: &str,
        history: &[ConversationMessage],
        question: &str,
    ) -> GeminiRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|msg| Content {
                role: Some(msg.role.as_provider_role().to_string()),
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            })
            .collect();

        contents.push(Content {
            role: Some("user".to_string()),
            parts: vec![Part {
                text: question.to_string(),
            }],
        });

        GeminiRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: self.generation.temperature,
                top_p: self.generation.top_p,
                top_k: self.generation.top_k,
                max_output_tokens: self.generation.max_output_tokens,
            },
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: system_prompt.to_string(),
                }],
            },
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ConversationMessage],
        question: &str,
    ) -> crate::Result<String> {
        let request = self.build_request(system_prompt, history, question);

        info!(turns = request.contents.len(), "Calling Gemini API");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                DashboardError::Llm(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(DashboardError::Llm(format!(
                "Gemini API returned {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            DashboardError::Llm(format!("Gemini parse error: {}", e))
        })?;

        let answer = extract_text(&gemini_response)?;

        if let Some(usage) = &gemini_response.usage_metadata {
            info!(
                prompt_tokens = usage.prompt_token_count,
                answer_tokens = usage.candidates_token_count,
                "Gemini response received"
            );
        }

        Ok(answer)
    }
}

fn extract_text(response: &GeminiResponse) -> crate::Result<String> {
    let candidate = response
        .candidates
        .first()
        .ok_or_else(|| DashboardError::Llm("No response from Gemini API".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .iter()
        .map(|p| p.text.as_str())
        .collect();

    if text.trim().is_empty() {
        return Err(DashboardError::Llm(format!(
            "Empty response from Gemini (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: SystemInstruction,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
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
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i32,
    #[serde(default)]
    candidates_token_count: i32,
}
