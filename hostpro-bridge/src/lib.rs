//! # AI Host Pro Bridge
//!
//! Boundary layer between AI Host Pro and the outside world: the generative AI
//! service that writes and voices the hosting script, and the local audio
//! output device.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                  hostpro-event (sequencer, controller)           │
//! └───────┬──────────────────────┬───────────────────────┬───────────┘
//!         │ ScriptGenerator      │ SpeechSynthesizer     │ AudioSink
//!         ▼                      ▼                       ▼
//! ┌──────────────────────────────────────────┐  ┌────────────────────┐
//! │  GeminiClient (reqwest, JSON over HTTPS) │  │ AudioPlayer (cpal) │
//! │  script::request_body / speech::...      │  │ MutedOutput        │
//! └──────────────────────────────────────────┘  └────────────────────┘
//! ```
//!
//! ## Key Components
//!
//! - [`genai`] - [`ScriptGenerator`] and [`SpeechSynthesizer`] traits with the
//!   Gemini implementation and its [`GenAiConfig`]
//! - [`data`] - [`AudioBuffer`] and PCM16 payload decoding
//! - [`audio_player`] - [`AudioSink`] trait, cpal-backed [`AudioPlayer`] and
//!   device-less [`MutedOutput`]
//! - [`error`] - [`BridgeError`] / [`BridgeResult`]
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use hostpro_bridge::{GeminiClient, GenAiConfig, SpeechRequest, SpeechSynthesizer};
//!
//! let client = GeminiClient::new(&GenAiConfig::default())?;
//! let audio = client
//!     .synthesize(SpeechRequest::new("Welcome, everyone.", "Kore"))
//!     .await?;
//! ```

pub mod audio_player;
pub mod data;
pub mod error;
pub mod genai;

pub use audio_player::{open_output, AudioPlayer, AudioSink, MutedOutput, PlaybackDone};
pub use data::{decode_speech_payload, pcm16_le_to_f32, AudioBuffer, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};
pub use error::{BridgeError, BridgeResult};
pub use genai::{
    resolve_secret, GeminiClient, GenAiConfig, GeneratedSegment, ScriptGenerator, SpeechRequest,
    SpeechSynthesizer,
};
