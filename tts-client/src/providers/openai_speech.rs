//! OpenAI-compatible speech provider
//!
//! Used for services that implement the OpenAI `/audio/speech` endpoint.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};
use crate::provider::{SynthesisRequest, TtsProvider};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "tts-1";

/// Provider for OpenAI-compatible speech APIs
pub struct OpenAiSpeechProvider {
    model: String,
    base_url: String,
    api_key: String,
    client: Client,
}

impl OpenAiSpeechProvider {
    /// Create a new speech provider
    pub fn new(api_key: String, base_url: Option<&str>, model: Option<&str>) -> Result<Self> {
        Ok(Self {
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key,
            client: Client::new(),
        })
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl TtsProvider for OpenAiSpeechProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<()> {
        let body = SpeechRequest {
            model: &self.model,
            input: &request.text,
            voice: &request.voice,
            response_format: "mp3",
        };

        let url = format!("{}/audio/speech", self.base_url);
        debug!("POST {} ({} chars)", url, request.text.chars().count());

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| TtsError::ApiError {
                message: format!("Request failed: {}", e),
                status_code: None,
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(TtsError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message =
                if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                    error_response.error.message
                } else {
                    error_text
                };

            return Err(TtsError::ApiError {
                message,
                status_code: Some(status.as_u16()),
            });
        }

        let audio = response.bytes().await.map_err(|e| TtsError::ApiError {
            message: format!("Failed to read audio: {}", e),
            status_code: None,
        })?;

        tokio::fs::write(&request.output_path, &audio).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "OpenAI Speech"
    }

    fn is_available(&self) -> Result<()> {
        // API key was provided in constructor
        Ok(())
    }
}
