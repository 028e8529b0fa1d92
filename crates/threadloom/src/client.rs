//! Generation client: render a prompt template, call the text-generation
//! capability, parse the reply into a typed structure.
//!
//! The client performs no retries — retry policy belongs to the caller. It
//! is stateless aside from configuration; sampling temperature is chosen per
//! call site by the stage that invokes it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Endpoint, PipelineConfig};
use crate::error::StageError;

/// A blocking round-trip to the external text-generation capability.
///
/// The production implementation speaks HTTP; tests inject scripted
/// backends so no network is involved.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &str, temperature: f64) -> Result<String, StageError>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: String,
}

/// OpenAI-compatible chat-completions backend over reqwest.
///
/// Owns the bounded per-request timeout; a call either returns or errors
/// within it.
pub struct HttpBackend {
    http: reqwest::Client,
    endpoint: Endpoint,
}

impl HttpBackend {
    pub fn new(config: &PipelineConfig) -> Result<Self, StageError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| StageError::Generation(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl CompletionBackend for HttpBackend {
    async fn complete(&self, prompt: &str, temperature: f64) -> Result<String, StageError> {
        let url = format!("{}/chat/completions", self.endpoint.url);
        let body = ChatRequest {
            model: &self.endpoint.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.endpoint.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| StageError::Generation(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(StageError::Generation(format!(
                "{url} returned {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| StageError::Generation(format!("malformed completion envelope: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| StageError::Generation("completion returned no choices".into()))
    }
}

/// Typed wrapper over a completion backend.
pub struct GenerationClient {
    backend: Arc<dyn CompletionBackend>,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// Render `template` with `vars`, submit, and parse the reply as `T`.
    pub async fn invoke<T: DeserializeOwned>(
        &self,
        template: &str,
        vars: &[(&str, &str)],
        temperature: f64,
    ) -> Result<T, StageError> {
        self.invoke_with_raw(template, vars, temperature)
            .await
            .map(|(parsed, _)| parsed)
    }

    /// Like `invoke`, but also returns the raw reply text so critic stages
    /// can keep the original payload for traceability.
    pub async fn invoke_with_raw<T: DeserializeOwned>(
        &self,
        template: &str,
        vars: &[(&str, &str)],
        temperature: f64,
    ) -> Result<(T, String), StageError> {
        let prompt = render_template(template, vars);
        debug!(prompt_len = prompt.len(), temperature, "Invoking generation backend");
        let raw = self.backend.complete(&prompt, temperature).await?;
        let parsed = parse_structured(&raw)?;
        Ok((parsed, raw))
    }
}

/// Substitute `{name}` placeholders. Braces that do not match a supplied
/// variable are left untouched, so templates may contain literal JSON.
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{name}}}"), value);
    }
    out
}

/// Parse the model reply as `T`, tolerating surrounding prose and fences.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Result<T, StageError> {
    let json = extract_json_block(raw).unwrap_or(raw);
    serde_json::from_str(json).map_err(|e| StageError::Schema(e.to_string()))
}

/// Pull the JSON payload out of a model reply. Models wrap JSON in fences
/// or prose often enough that parsing the raw text directly is hopeless.
fn extract_json_block(text: &str) -> Option<&str> {
    // ```json fenced block wins if present
    if let Some(start) = text.find("```json") {
        let json_start = start + 7;
        if let Some(end) = text[json_start..].find("```") {
            return Some(text[json_start..json_start + end].trim());
        }
    }

    // Otherwise first { to last }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}
