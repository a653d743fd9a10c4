//! Configuration for the generative AI clients

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for the Gemini REST API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenAiConfig {
    /// API key, or `env:VAR` to read it from the environment
    #[serde(default = "default_api_key")]
    pub api_key: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_script_model")]
    pub script_model: String,

    #[serde(default = "default_speech_model")]
    pub speech_model: String,

    /// Per-request timeout. Unset means requests may take as long as the service does.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_api_key() -> String {
    "env:GEMINI_API_KEY".to_string()
}

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_script_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: default_api_key(),
            api_url: default_api_url(),
            script_model: default_script_model(),
            speech_model: default_speech_model(),
            request_timeout_secs: None,
        }
    }
}

impl GenAiConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Endpoint for `generateContent` on the given model
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            model
        )
    }
}

/// Resolve a configured secret.
///
/// `env:NAME` reads the variable `NAME`; anything else is taken literally.
/// Missing variables resolve to an empty string.
pub fn resolve_secret(value: &str) -> String {
    if let Some(var) = value.strip_prefix("env:") {
        let result = std::env::var(var).unwrap_or_default().trim().to_string();
        if result.is_empty() {
            warn!("{} is not set or empty", var);
        } else {
            debug!("{} resolved (len={})", var, result.len());
        }
        result
    } else {
        value.trim().to_string()
    }
}
