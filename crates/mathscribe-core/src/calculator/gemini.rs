//! Gemini API client for expression recognition.
//!
//! Encodes the normalized image as PNG, sends it with the prompt to the
//! `generateContent` endpoint, and returns the model's raw text answer.

use std::io::Cursor;

use async_trait::async_trait;
use base64::Engine;
use image::{GrayImage, ImageFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::truncate_for_log;
use crate::error::{CalcError, CalcResult};

/// Default Gemini REST base URL.
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// A generative model that reads an image and answers a prompt with text.
#[async_trait]
pub trait ExpressionModel: Send + Sync {
    async fn generate(&self, prompt: &str, image: &GrayImage) -> CalcResult<String>;
}

/// Client for the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiClient {
    /// Create a client for `model` at the default endpoint.
    pub fn new(api_key: &str, model: &str) -> CalcResult<Self> {
        Self::with_base_url(api_key, model, DEFAULT_GEMINI_URL)
    }

    /// Create a client against a custom base URL.
    pub fn with_base_url(api_key: &str, model: &str, base_url: &str) -> CalcResult<Self> {
        if api_key.trim().is_empty() {
            return Err(CalcError::Config("GEMINI_API_KEY is empty".to_string()));
        }

        Ok(Self {
            api_key: api_key.trim().to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl ExpressionModel for GeminiClient {
    async fn generate(&self, prompt: &str, image: &GrayImage) -> CalcResult<String> {
        let request = build_request(prompt, image)?;

        debug!(model = %self.model, "Calling Gemini API");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| CalcError::model_unavailable(format!("Failed to call Gemini API: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(CalcError::model_unavailable(format!(
                "Gemini API error (HTTP {}): {}",
                status,
                truncate_for_log(&error_text)
            )));
        }

        let body: GenerateResponse = response.json().await.map_err(|e| {
            CalcError::model_unavailable(format!("Failed to read Gemini API response: {}", e))
        })?;

        response_text(body)
    }
}

/// Build the request body: prompt text followed by the inline PNG.
fn build_request(prompt: &str, image: &GrayImage) -> CalcResult<GenerateRequest> {
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CalcError::model_unavailable(format!("Failed to encode image: {}", e)))?;

    let data = base64::engine::general_purpose::STANDARD.encode(&png);
    debug!(size = png.len(), "Image encoded for Gemini");

    Ok(GenerateRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text {
                    text: prompt.to_string(),
                },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: "image/png".to_string(),
                        data,
                    },
                },
            ],
        }],
    })
}

/// Concatenate the text parts of the first candidate.
fn response_text(body: GenerateResponse) -> CalcResult<String> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(CalcError::model_unavailable(
            "No text content in Gemini API response",
        ));
    }
    Ok(text)
}
