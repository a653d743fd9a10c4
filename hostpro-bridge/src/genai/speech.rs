//! Speech synthesis request and response handling

use serde_json::{json, Value};

use super::gemini::GenerateContentResponse;
use super::SpeechRequest;
use crate::data::{decode_speech_payload, AudioBuffer};
use crate::error::{BridgeError, BridgeResult};

pub fn request_body(request: &SpeechRequest) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": request.prompt() }]
        }],
        "generationConfig": {
            "responseModalities": ["AUDIO"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": request.voice_name }
                }
            }
        }
    })
}

/// Decode the inline PCM payload of the first candidate part
pub fn extract_audio(response: &GenerateContentResponse) -> BridgeResult<AudioBuffer> {
    let inline = response
        .first_part()
        .and_then(|p| p.inline_data.as_ref())
        .ok_or(BridgeError::EmptyResponse)?;
    decode_speech_payload(&inline.data)
}
