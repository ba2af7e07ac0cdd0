use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String, // "openai", "gemini" or "ollama"
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    pub openai: Option<OpenAIConfig>,
    pub gemini: Option<GeminiConfig>,
    pub ollama: Option<OllamaConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            timeout_seconds: default_timeout(),
            openai: None,
            gemini: None,
            ollama: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_ollama_base_url(),
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_timeout() -> u64 {
    60
}
fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}

/// One completion call: a fixed system turn plus a single user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
}

#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    /// Returns the completion text. A well-formed but empty response is
    /// `Ok` with an empty string; callers decide whether that is usable.
    async fn chat(&self, request: &CompletionRequest) -> Result<String>;
}

pub fn create_llm(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    create_llm_with_env(config, |name| std::env::var(name).ok())
}

fn create_llm_with_env<F>(config: &LlmConfig, env: F) -> Result<Arc<dyn LlmClient>>
where
    F: Fn(&str) -> Option<String>,
{
    info!("Initializing LLM client for provider: {}", config.provider);
    let timeout = Duration::from_secs(config.timeout_seconds);
    match config.provider.as_str() {
        "openai" => {
            let cfg = config.openai.clone().unwrap_or_default();
            let api_key = resolve_api_key(cfg.api_key, env(OPENAI_API_KEY_ENV))
                .context("OpenAI API key missing: set llm.openai.api_key or OPENAI_API_KEY")?;
            Ok(Arc::new(OpenAIClient::new(&api_key, cfg.base_url.as_deref(), timeout)?))
        }
        "gemini" => {
            let cfg = config.gemini.clone().unwrap_or_default();
            let api_key = resolve_api_key(cfg.api_key, env(GEMINI_API_KEY_ENV))
                .context("Gemini API key missing: set llm.gemini.api_key or GEMINI_API_KEY")?;
            Ok(Arc::new(GeminiClient::new(&api_key, cfg.base_url.as_deref(), timeout)?))
        }
        "ollama" => {
            let cfg = config.ollama.clone().unwrap_or_default();
            Ok(Arc::new(OllamaClient::new(&cfg.base_url, timeout)?))
        }
        _ => Err(anyhow!("Unknown LLM provider: {}", config.provider)),
    }
}

/// Configured key wins over the environment; blank keys count as missing.
fn resolve_api_key(configured: Option<String>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|key| !key.trim().is_empty())
        .or(from_env)
        .filter(|key| !key.trim().is_empty())
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("Failed to create HTTP client")
}

// --- OpenAI ---

struct OpenAIClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl Debug for OpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAIClient {
    fn new(api_key: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or("https://api.openai.com/v1")
                .trim_end_matches('/')
                .to_string(),
            client: build_http_client(timeout)?,
        })
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

fn chat_messages(request: &CompletionRequest) -> Vec<ChatMessage> {
    vec![
        ChatMessage { role: "system".to_string(), content: request.system.clone() },
        ChatMessage { role: "user".to_string(), content: request.user.clone() },
    ]
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessageResponse,
}

#[derive(Deserialize)]
struct OpenAIMessageResponse {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for OpenAIClient {
    async fn chat(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!("POST {} (model {})", url, request.model);

        let request_body = OpenAIRequest {
            model: request.model.clone(),
            messages: chat_messages(request),
        };

        let resp = self.client.post(&url)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .context("OpenAI request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("OpenAI API error ({}): {}", status, error_text));
        }

        let response_text = resp.text().await?;
        let result: OpenAIResponse = serde_json::from_str(&response_text).map_err(|e| {
            anyhow!("Failed to parse OpenAI response: {}. Body: {}", e, response_text)
        })?;

        match result.choices.into_iter().next() {
            Some(choice) => Ok(choice.message.content.unwrap_or_default()),
            None => {
                warn!("OpenAI response contained no choices");
                Ok(String::new())
            }
        }
    }
}

// --- Gemini ---

struct GeminiClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl GeminiClient {
    fn new(api_key: &str, base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or("https://generativelanguage.googleapis.com/v1beta")
                .trim_end_matches('/')
                .to_string(),
            client: build_http_client(timeout)?,
        })
    }
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiSystemInstruction,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Debug)]
struct GeminiError {
    message: String,
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn chat(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/models/{}:generateContent", self.base_url, request.model);
        debug!("POST {}", url);
        let url = format!("{}?key={}", url, self.api_key);

        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart { text: request.user.clone() }],
            }],
            system_instruction: GeminiSystemInstruction {
                parts: vec![GeminiPart { text: request.system.clone() }],
            },
        };

        let resp = self.client.post(&url)
            .json(&request_body)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Gemini API error ({}): {}", status, error_text));
        }

        let response_text = resp.text().await?;
        let result: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            anyhow!("Failed to parse Gemini response: {}. Body: {}", e, response_text)
        })?;

        if let Some(err) = result.error {
            return Err(anyhow!("Gemini API returned error: {}", err.message));
        }

        let Some(first) = result.candidates.and_then(|c| c.into_iter().next()) else {
            warn!("Gemini response contained no candidates");
            return Ok(String::new());
        };

        let text: String = first
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            // Safety blocks come back as a candidate without content
            let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
            warn!("Gemini response empty. Finish reason: {}", reason);
        }
        Ok(text)
    }
}

// --- Ollama ---

#[derive(Debug)]
struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(timeout)?,
        })
    }
}

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    message: OllamaMessageResponse,
}

#[derive(Deserialize)]
struct OllamaMessageResponse {
    #[serde(default)]
    content: String,
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn chat(&self, request: &CompletionRequest) -> Result<String> {
        let url = format!("{}/api/chat", self.base_url);
        debug!("POST {} (model {})", url, request.model);

        let request_body = OllamaRequest {
            model: request.model.clone(),
            messages: chat_messages(request),
            stream: false,
        };

        let resp = self.client.post(&url)
            .json(&request_body)
            .send()
            .await
            .context("Ollama request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Ollama API error ({}): {}", status, error_text));
        }

        let result: OllamaResponse = resp.json().await.context("Failed to parse Ollama response")?;
        Ok(result.message.content)
    }
}
