//! Async LLM client for villager conversation and order parsing
//!
//! Talks to either Google's Gemini API or a local Ollama server. Only the
//! text-completion endpoint of each is used; villager behavior itself never
//! depends on a model.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::error::{Result, VillageError};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_OLLAMA_MODEL: &str = "tinyllama:latest";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

const GEMINI_TIMEOUT: Duration = Duration::from_secs(10);
const OLLAMA_TIMEOUT: Duration = Duration::from_secs(55);
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Which service answers completions
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Gemini { api_key: String },
    Ollama { base_url: String },
}

/// Sampling knobs shared by both backends
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub seed: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 150,
            seed: None,
        }
    }
}

pub struct LlmClient {
    client: Client,
    backend: Backend,
    model: String,
    pub settings: GenerationSettings,
}

impl LlmClient {
    pub fn new(backend: Backend, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            backend,
            model: model.into(),
            settings: GenerationSettings::default(),
        }
    }

    /// Create a client from environment variables
    ///
    /// `LLM_BACKEND` picks `gemini` or `ollama`; when unset, Gemini is used
    /// if `GEMINI_API_KEY` is present. `LLM_MODEL` and `OLLAMA_URL` are
    /// optional.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = var("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
        let backend_name = var("LLM_BACKEND").map(|b| b.trim().to_lowercase());

        let backend = match (backend_name.as_deref(), api_key) {
            (Some("gemini"), Some(api_key)) | (None, Some(api_key)) => Backend::Gemini { api_key },
            (Some("gemini"), None) => {
                return Err(VillageError::LlmError("GEMINI_API_KEY not set".into()));
            }
            (Some("ollama"), _) => Backend::Ollama {
                base_url: var("OLLAMA_URL")
                    .unwrap_or_else(|| DEFAULT_OLLAMA_URL.into())
                    .trim_end_matches('/')
                    .to_string(),
            },
            (Some(other), _) => {
                return Err(VillageError::LlmError(format!("unknown LLM_BACKEND '{other}'")));
            }
            (None, None) => {
                return Err(VillageError::LlmError("no LLM backend configured".into()));
            }
        };

        let model = var("LLM_MODEL").unwrap_or_else(|| match &backend {
            Backend::Gemini { .. } => DEFAULT_GEMINI_MODEL.into(),
            Backend::Ollama { .. } => DEFAULT_OLLAMA_MODEL.into(),
        });
        Ok(Self::new(backend, model))
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check the backend is reachable. For Ollama this lists installed
    /// models and warns when ours is missing.
    pub async fn probe(&self) -> Result<()> {
        match &self.backend {
            Backend::Gemini { .. } => Ok(()),
            Backend::Ollama { base_url } => {
                let response = self
                    .client
                    .get(format!("{base_url}/api/tags"))
                    .timeout(PROBE_TIMEOUT)
                    .send()
                    .await
                    .map_err(|e| VillageError::LlmError(e.to_string()))?;
                if !response.status().is_success() {
                    return Err(VillageError::LlmError(format!(
                        "Ollama probe failed: {}",
                        response.status()
                    )));
                }
                let body = response
                    .text()
                    .await
                    .map_err(|e| VillageError::LlmError(e.to_string()))?;
                if body.contains(&self.model) {
                    info!(url = %base_url, model = %self.model, "Ollama server ready");
                } else {
                    warn!(url = %base_url, model = %self.model, "model not installed on Ollama server");
                }
                Ok(())
            }
        }
    }

    /// Send a completion request to the LLM
    ///
    /// # Arguments
    /// * `system` - Persona or task instructions
    /// * `user` - The text to continue or answer
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        debug!(model = %self.model, "sending completion request");
        match &self.backend {
            Backend::Gemini { api_key } => self.complete_gemini(api_key, system, user).await,
            Backend::Ollama { base_url } => self.complete_ollama(base_url, system, user).await,
        }
    }

    async fn complete_gemini(&self, api_key: &str, system: &str, user: &str) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, api_key
        );
        let request = gemini_request(&format!("{system}\n{user}"), &self.settings);

        let response = self
            .client
            .post(url)
            .timeout(GEMINI_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| VillageError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VillageError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: GeminiResponse = response
            .json()
            .await
            .map_err(|e| VillageError::LlmError(e.to_string()))?;
        completion.text()
    }

    async fn complete_ollama(&self, base_url: &str, system: &str, user: &str) -> Result<String> {
        let request = ollama_request(&self.model, system, user, &self.settings);

        let response = self
            .client
            .post(format!("{base_url}/api/generate"))
            .timeout(OLLAMA_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| VillageError::LlmError(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(VillageError::LlmError(format!("API error: {}", error_text)));
        }

        let completion: OllamaResponse = response
            .json()
            .await
            .map_err(|e| VillageError::LlmError(e.to_string()))?;
        if completion.response.trim().is_empty() {
            return Err(VillageError::LlmError("Empty response".into()));
        }
        Ok(completion.response)
    }
}

fn gemini_request(prompt: &str, settings: &GenerationSettings) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![GeminiPart {
                text: prompt.to_string(),
            }],
        }],
        generation_config: GeminiGenerationConfig {
            temperature: settings.temperature,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: settings.max_tokens,
            stop_sequences: vec!["Player:".into(), "###".into(), "\n\n".into()],
        },
    }
}

fn ollama_request(model: &str, system: &str, user: &str, settings: &GenerationSettings) -> OllamaRequest {
    OllamaRequest {
        model: model.to_string(),
        prompt: format!("[INST] <<SYS>>\n{system}\n<</SYS>>\n\n{user}"),
        stream: false,
        options: OllamaOptions {
            temperature: settings.temperature,
            num_predict: settings.max_tokens,
            top_k: 40,
            top_p: 0.9,
            repeat_penalty: 1.1,
            seed: settings.seed,
        },
    }
}

// Gemini generateContent format
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    stop_sequences: Vec<String>,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

impl GeminiResponse {
    fn text(&self) -> Result<String> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.clone())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| VillageError::LlmError("Empty response".into()))
    }
}

// Ollama /api/generate format
#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
    top_k: u32,
    top_p: f32,
    repeat_penalty: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
}
