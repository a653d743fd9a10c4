//! Generative AI clients
//!
//! Two capabilities are consumed: turning an event's raw documents into a
//! hosting script, and turning one segment of that script into speech. Both
//! sit behind traits so the application can run against test doubles.

pub mod config;
pub mod gemini;
pub mod script;
pub mod speech;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::AudioBuffer;
use crate::error::BridgeResult;

pub use config::{resolve_secret, GenAiConfig};
pub use gemini::GeminiClient;

/// One script segment as returned by the generation service.
///
/// `segment_type` is left as a string here; the application maps it onto its
/// closed set of segment kinds and rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedSegment {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub segment_type: String,
    pub content: String,
    pub duration_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
}

/// Text to be spoken with a prebuilt voice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_name: String,
    /// Delivery hint prepended to the text, e.g. "formal global english"
    pub style: Option<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, voice_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_name: voice_name.into(),
            style: None,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    /// The text actually sent to the speech model
    pub fn prompt(&self) -> String {
        match &self.style {
            Some(style) => format!("In a {} style: {}", style, self.text),
            None => self.text.clone(),
        }
    }
}

/// Produces a hosting script from an event name and its source material
#[async_trait]
pub trait ScriptGenerator: Send + Sync {
    async fn generate(&self, event_name: &str, content: &str) -> BridgeResult<Vec<GeneratedSegment>>;
}

/// Produces speech audio for a piece of script text
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: SpeechRequest) -> BridgeResult<AudioBuffer>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Silence;

    #[async_trait]
    impl SpeechSynthesizer for Silence {
        async fn synthesize(&self, request: SpeechRequest) -> BridgeResult<AudioBuffer> {
            Ok(AudioBuffer::new(vec![0.0; request.text.len()], 24_000, 1))
        }
    }

    #[test]
    fn test_synthesizer_as_trait_object() {
        let synth: Box<dyn SpeechSynthesizer> = Box::new(Silence);
        let audio = tokio_test::block_on(synth.synthesize(SpeechRequest::new("abc", "Kore"))).unwrap();
        assert_eq!(audio.samples.len(), 3);
    }

    #[test]
    fn test_speech_prompt_with_style() {
        let request = SpeechRequest::new("Good morning.", "Kore").with_style("calm british neutral");
        assert_eq!(request.prompt(), "In a calm british neutral style: Good morning.");
    }

    #[test]
    fn test_speech_prompt_plain() {
        let request = SpeechRequest::new("Good morning.", "Puck");
        assert_eq!(request.prompt(), "Good morning.");
    }

    #[test]
    fn test_generated_segment_wire_names() {
        let json = r#"{
            "id": "s1",
            "title": "Opening",
            "type": "Welcome",
            "content": "Welcome everyone.",
            "durationMinutes": 5,
            "speakerName": null
        }"#;
        let segment: GeneratedSegment = serde_json::from_str(json).unwrap();

        assert_eq!(segment.segment_type, "Welcome");
        assert_eq!(segment.duration_minutes, 5.0);
        assert_eq!(segment.speaker_name, None);
    }
}
