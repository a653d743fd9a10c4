//! Gemini REST client
//!
//! One HTTP client serves both the script model and the speech model. Both go
//! through `POST {api_url}/models/{model}:generateContent`; only the request
//! body and the part of the response we read differ.

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::config::{resolve_secret, GenAiConfig};
use super::{script, speech, GeneratedSegment, ScriptGenerator, SpeechRequest, SpeechSynthesizer};
use crate::data::AudioBuffer;
use crate::error::{BridgeError, BridgeResult};

/// `generateContent` response, reduced to the fields we read
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    #[serde(default)]
    pub mime_type: Option<String>,
    pub data: String,
}

impl GenerateContentResponse {
    /// First part of the first candidate
    pub fn first_part(&self) -> Option<&Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
    }
}

#[derive(Debug)]
pub struct GeminiClient {
    config: GenAiConfig,
    api_key: String,
    client: HttpClient,
}

impl GeminiClient {
    pub fn new(config: &GenAiConfig) -> BridgeResult<Self> {
        let api_key = resolve_secret(&config.api_key);
        if api_key.is_empty() {
            return Err(BridgeError::MissingApiKey("Gemini".to_string()));
        }

        let mut builder = HttpClient::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!(
            "Gemini client ready (script: {}, speech: {})",
            config.script_model, config.speech_model
        );

        Ok(Self {
            config: config.clone(),
            api_key,
            client,
        })
    }

    async fn generate_content(&self, model: &str, body: &Value) -> BridgeResult<GenerateContentResponse> {
        let url = self.config.endpoint(model);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("[{}] API error {}: {}", model, status, body);
            return Err(BridgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        if text.len() < 1000 {
            debug!("[{}] Response: {}", model, text);
        } else {
            debug!("[{}] Response ({} bytes)", model, text.len());
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl ScriptGenerator for GeminiClient {
    async fn generate(&self, event_name: &str, content: &str) -> BridgeResult<Vec<GeneratedSegment>> {
        info!(
            "Generating script for \"{}\" from {} bytes of source material",
            event_name,
            content.len()
        );
        let body = script::request_body(event_name, content);
        let response = self.generate_content(&self.config.script_model, &body).await?;

        let text = response
            .first_part()
            .and_then(|p| p.text.as_deref())
            .ok_or(BridgeError::EmptyResponse)?;
        let segments = script::parse_script_text(text)?;

        info!("Script generated with {} segments", segments.len());
        Ok(segments)
    }
}

#[async_trait]
impl SpeechSynthesizer for GeminiClient {
    async fn synthesize(&self, request: SpeechRequest) -> BridgeResult<AudioBuffer> {
        debug!(
            "Synthesizing {} chars with voice {}",
            request.text.len(),
            request.voice_name
        );
        let body = speech::request_body(&request);
        let response = self.generate_content(&self.config.speech_model, &body).await?;
        let audio = speech::extract_audio(&response)?;

        debug!("Synthesized {:.2}s of audio", audio.duration().as_secs_f64());
        Ok(audio)
    }
}
