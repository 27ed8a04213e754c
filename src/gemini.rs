use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::ProviderError;
use crate::logging;
use crate::model::TranslationRequestBatch;
use crate::provider::{build_prompt, parse_translation_mapping, TranslationProvider};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Google Gemini `generateContent` client
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GeminiProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn from_config(config: &GeminiConfig) -> Result<Self> {
        let api_key = resolve_api_key(config.api_key.as_deref(), env::var("GEMINI_API_KEY").ok())?;
        let mut provider = Self::new(api_key)?;
        if let Some(model) = config.model.as_deref().filter(|m| !m.trim().is_empty()) {
            provider.model = model.to_string();
        }
        if let Some(endpoint) = config.endpoint.as_deref().filter(|e| !e.trim().is_empty()) {
            provider.endpoint = endpoint.to_string();
        }
        Ok(provider)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

impl TranslationProvider for GeminiProvider {
    fn translate_batch(
        &self,
        batch: &TranslationRequestBatch,
    ) -> Result<HashMap<String, String>, ProviderError> {
        let prompt = build_prompt(batch);
        logging::debug(&format!(
            "Sending {} string(s) to {} for {}",
            batch.keys.len(),
            self.model,
            batch.target_locale
        ));

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&json!({ "contents": [{ "parts": [{ "text": prompt }] }] }))
            .send()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        if !(200..300).contains(&status) {
            return Err(status_error(status, body));
        }

        let reply = reply_text(&body)?;
        parse_translation_mapping(&reply)
    }
}

fn resolve_api_key(configured: Option<&str>, from_env: Option<String>) -> Result<String> {
    if let Some(key) = configured {
        if !key.trim().is_empty() {
            return Ok(key.to_string());
        }
    }

    if let Some(key) = from_env {
        if !key.trim().is_empty() {
            return Ok(key);
        }
    }

    bail!("Gemini API key is not configured. Set gemini.apiKey in the config file or GEMINI_API_KEY.");
}

fn status_error(status: u16, body: String) -> ProviderError {
    // An invalid key is reported as 400 INVALID_ARGUMENT
    if status == 401 || status == 403 || (status == 400 && body.contains("API_KEY_INVALID")) {
        ProviderError::Unauthorized(format!("HTTP {}", status))
    } else {
        ProviderError::Status { status, body }
    }
}

/// Concatenated text parts of the first candidate
fn reply_text(body: &str) -> Result<String, ProviderError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ProviderError::MalformedResponse(
            "response has no candidate text".to_string(),
        ));
    }
    Ok(text)
}
