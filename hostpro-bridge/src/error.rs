//! Bridge error types

use thiserror::Error;

/// Errors raised at the boundary to remote services and the audio device
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("no API key configured for {0}")]
    MissingApiKey(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("response contained no usable content")]
    EmptyResponse,

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("invalid base64 audio payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("audio device error: {0}")]
    AudioDevice(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;
