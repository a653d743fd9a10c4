//! Script generation request and response handling

use serde_json::{json, Value};

use super::GeneratedSegment;
use crate::error::{BridgeError, BridgeResult};

/// Segment kinds the model is asked to use, in their wire spelling
pub const SEGMENT_TYPES: [&str; 7] = [
    "Welcome",
    "Introduction",
    "Transition",
    "Break",
    "Session",
    "Vote of Thanks",
    "Closing",
];

/// Instruction prompt for one event
pub fn build_prompt(event_name: &str, content: &str) -> String {
    let types = SEGMENT_TYPES
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are an elite AI Event Host. Analyze the provided multi-source content for the event: \"{event_name}\".\n\
         The content may have been extracted from PDFs, Word documents and slide decks.\n\
         Your task is to:\n\
         1. Extract a clear timeline of sessions.\n\
         2. Identify all speakers and their specific roles.\n\
         3. Write professional anchor scripts for every transition.\n\
         4. Create filler announcements for gaps.\n\
         \n\
         Structure the script with these segment types only: {types}.\n\
         \n\
         Content Dump: {content}"
    )
}

/// Response schema the model must follow
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "id": { "type": "STRING" },
                "title": { "type": "STRING" },
                "type": { "type": "STRING" },
                "content": {
                    "type": "STRING",
                    "description": "The professional anchor script for this segment. Speak in a natural, authoritative, yet engaging tone."
                },
                "durationMinutes": { "type": "NUMBER" },
                "speakerName": { "type": "STRING", "nullable": true }
            },
            "required": ["id", "title", "type", "content", "durationMinutes"]
        }
    })
}

pub fn request_body(event_name: &str, content: &str) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": build_prompt(event_name, content) }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema()
        }
    })
}

/// Parse the model's JSON text into segments.
///
/// An empty array is an error: an event without a script cannot be hosted.
pub fn parse_script_text(text: &str) -> BridgeResult<Vec<GeneratedSegment>> {
    let text = strip_code_fence(text.trim());
    if text.is_empty() {
        return Err(BridgeError::EmptyResponse);
    }

    let segments: Vec<GeneratedSegment> = serde_json::from_str(text)?;
    if segments.is_empty() {
        return Err(BridgeError::MalformedResponse(
            "script contained no segments".to_string(),
        ));
    }
    Ok(segments)
}

/// Some models wrap JSON output in a markdown fence even in JSON mode
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
