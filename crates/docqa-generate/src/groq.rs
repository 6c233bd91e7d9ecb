//! Groq chat-completions client (OpenAI-compatible REST API).
//!
//! Blocking `reqwest` client: each call runs to completion or fails within
//! the configured timeout.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use docqa_core::config::{GenerationSettings, Secret, GENERATION_KEY_VAR};
use docqa_core::traits::Generator;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

pub struct GroqClient {
    http: Client,
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: Secret,
}

impl GroqClient {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("No generation credential configured; set {} or generation.api_key", GENERATION_KEY_VAR))?;
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            temperature: settings.temperature,
            api_key,
        })
    }
}

impl Generator for GroqClient {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
        };
        let start = Instant::now();
        debug!(model = %self.model, prompt_chars = prompt.len(), "chat completion request");
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .map_err(|e| if e.is_timeout() { anyhow!("request timed out: {e}") } else { anyhow!("request failed: {e}") })?;
        let status = resp.status();
        let body = resp.text().context("failed to read response body")?;
        if !status.is_success() {
            bail!(describe_failure(status, &body));
        }
        let answer = parse_completion(&body)?;
        info!(model = %self.model, elapsed_ms = start.elapsed().as_millis() as u64, "answer generated");
        Ok(answer)
    }
}

pub(crate) fn parse_completion(body: &str) -> Result<String> {
    let parsed: ChatResponse = serde_json::from_str(body).context("malformed completion response")?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| anyhow!("malformed completion response: no answer text"))
}

fn describe_failure(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(api) => format!("HTTP {}: {}", status, api.error.message),
        Err(_) => format!("HTTP {}", status),
    }
}
