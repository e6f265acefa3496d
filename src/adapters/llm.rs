use crate::error::GateError;
use async_trait::async_trait;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_name: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub api_version: String,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL.to_string(),
            api_key: None,
            base_url: None,
            api_version: DEFAULT_API_VERSION.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LLMRequest {
    pub prompt: String,
}

#[derive(Debug, Clone)]
pub struct LLMResponse {
    pub content: String,
    pub model: String,
}

/// A reviewer model endpoint.
///
/// Implementations return `GateError::MalformedResponse` when the reply does
/// not carry text where it is expected, and a transport-class error for
/// network or HTTP failures.
#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse, GateError>;
    fn model_name(&self) -> &str;
}

pub fn create_adapter(config: &ModelConfig) -> Result<Box<dyn LLMAdapter>, GateError> {
    Ok(Box::new(crate::adapters::GeminiAdapter::new(config.clone())?))
}
