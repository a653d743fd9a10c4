//! Audio data exchanged between the speech service, the sequencer and the output device

use base64::Engine as _;

use crate::error::{BridgeError, BridgeResult};

/// Sample rate of the speech service's PCM output (Hz)
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;

/// Channel count of the speech service's PCM output
pub const SPEECH_CHANNELS: u16 = 1;

/// Decoded, playable audio
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    /// Interleaved samples normalized to [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels.max(1) as usize
    }

    /// Playback length
    pub fn duration(&self) -> std::time::Duration {
        if self.sample_rate == 0 {
            return std::time::Duration::ZERO;
        }
        std::time::Duration::from_secs_f64(self.frame_count() as f64 / self.sample_rate as f64)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Convert little-endian signed 16-bit PCM into normalized floats.
///
/// A trailing odd byte is ignored.
pub fn pcm16_le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]) as f32 / 32768.0)
        .collect()
}

/// Decode the speech service's base64 PCM16 mono 24 kHz payload
pub fn decode_speech_payload(encoded: &str) -> BridgeResult<AudioBuffer> {
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
    let samples = pcm16_le_to_f32(&bytes);
    if samples.is_empty() {
        return Err(BridgeError::EmptyResponse);
    }
    Ok(AudioBuffer::new(samples, SPEECH_SAMPLE_RATE, SPEECH_CHANNELS))
}
