use crate::adapters::llm::{LLMAdapter, LLMRequest, LLMResponse, ModelConfig, DEFAULT_BASE_URL};
use crate::error::GateError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

pub struct GeminiAdapter {
    client: Client,
    config: ModelConfig,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f64,
}

impl GeminiAdapter {
    pub fn new(config: ModelConfig) -> Result<Self, GateError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GateError::Configuration(
                    "API key no encontrada. Configura GEMINI_API_KEY en las variables de entorno."
                        .to_string(),
                )
            })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| GateError::Configuration(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            api_key,
            base_url,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.base_url, self.config.api_version, self.config.model_name
        )
    }

    async fn send_with_retry<F>(&self, mut make_request: F) -> Result<reqwest::Response, GateError>
    where
        F: FnMut() -> reqwest::RequestBuilder,
    {
        const BASE_DELAY_MS: u64 = 250;
        let max_retries = self.config.max_retries;

        for attempt in 0..=max_retries {
            match make_request().send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let body = response.text().await.unwrap_or_default();
                    if is_retryable_status(status) && attempt < max_retries {
                        warn!("Review endpoint returned {status}, retrying");
                        sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1))).await;
                        continue;
                    }

                    return Err(GateError::HttpStatus {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => {
                    if attempt < max_retries {
                        warn!("Review request failed ({err}), retrying");
                        sleep(Duration::from_millis(BASE_DELAY_MS * (attempt as u64 + 1))).await;
                        continue;
                    }
                    return Err(GateError::Transport(format!(
                        "request to review endpoint failed: {err}"
                    )));
                }
            }
        }

        Err(GateError::Transport(
            "review request failed after retries".to_string(),
        ))
    }
}

#[async_trait]
impl LLMAdapter for GeminiAdapter {
    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse, GateError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
            },
        };

        let url = self.endpoint();
        debug!("Sending review request to {url}");
        let response = self
            .send_with_retry(|| {
                self.client
                    .post(&url)
                    .query(&[("key", self.api_key.as_str())])
                    .json(&body)
            })
            .await?;

        let text = response
            .text()
            .await
            .map_err(|e| GateError::Transport(format!("failed to read response body: {e}")))?;
        let value: Value = serde_json::from_str(&text)
            .map_err(|e| GateError::MalformedResponse(format!("response is not JSON: {e}")))?;

        Ok(LLMResponse {
            content: extract_verdict(&value)?,
            model: self.config.model_name.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

/// Follows `candidates[0].content.parts[0].text`.
pub fn extract_verdict(body: &Value) -> Result<String, GateError> {
    body.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| {
            GateError::MalformedResponse(
                "missing candidates[0].content.parts[0].text".to_string(),
            )
        })
}

fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}
