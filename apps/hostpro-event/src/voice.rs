//! Voice persona for the AI anchor
//!
//! The voice identifier is never set directly. It is looked up from
//! (gender, tone) whenever either changes:
//!
//! | | Formal | Energetic | Calm | Authoritative |
//! |---|---|---|---|---|
//! | Male | Kore | Puck | Charon | Fenrir |
//! | Female | Zephyr | Zephyr | Zephyr | Zephyr |

use hostpro_bridge::SpeechRequest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Line spoken when previewing a persona
pub const PREVIEW_LINE: &str = "Welcome to our event. I will be your AI anchor for today's session.";

pub const MIN_RATE: f32 = 0.5;
pub const MAX_RATE: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    Formal,
    Energetic,
    Calm,
    Authoritative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Accent {
    #[serde(rename = "Indian Neutral")]
    IndianNeutral,
    #[serde(rename = "British Neutral")]
    BritishNeutral,
    #[serde(rename = "Global English")]
    GlobalEnglish,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Formal, Tone::Energetic, Tone::Calm, Tone::Authoritative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Formal => "Formal",
            Tone::Energetic => "Energetic",
            Tone::Calm => "Calm",
            Tone::Authoritative => "Authoritative",
        }
    }
}

impl Accent {
    pub const ALL: [Accent; 3] = [Accent::IndianNeutral, Accent::BritishNeutral, Accent::GlobalEnglish];

    pub fn as_str(&self) -> &'static str {
        match self {
            Accent::IndianNeutral => "Indian Neutral",
            Accent::BritishNeutral => "British Neutral",
            Accent::GlobalEnglish => "Global English",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        /// Case-insensitive; the first word alone is enough ("british").
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase();
                $ty::ALL
                    .into_iter()
                    .find(|v| {
                        let name = v.as_str().to_lowercase();
                        name == wanted || name.split_whitespace().next() == Some(wanted.as_str())
                    })
                    .ok_or_else(|| {
                        let options: Vec<&str> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                        format!("'{}' is not one of: {}", s.trim(), options.join(", "))
                    })
            }
        }
    };
}

display_and_parse!(Gender);
display_and_parse!(Tone);
display_and_parse!(Accent);

/// Prebuilt voice for a (gender, tone) pair
pub fn voice_name_for(gender: Gender, tone: Tone) -> &'static str {
    match (gender, tone) {
        (Gender::Male, Tone::Formal) => "Kore",
        (Gender::Male, Tone::Energetic) => "Puck",
        (Gender::Male, Tone::Calm) => "Charon",
        (Gender::Male, Tone::Authoritative) => "Fenrir",
        (Gender::Female, _) => "Zephyr",
    }
}

/// Synthetic voice persona.
///
/// Speed and pitch are kept within [`MIN_RATE`, `MAX_RATE`] and are advisory:
/// the speech service is not given them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "VoiceRecord", into = "VoiceRecord")]
pub struct VoiceConfig {
    gender: Gender,
    tone: Tone,
    accent: Accent,
    speed: f32,
    pitch: f32,
    voice_name: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self::new(Gender::Male, Tone::Formal, Accent::GlobalEnglish)
    }
}

impl VoiceConfig {
    pub fn new(gender: Gender, tone: Tone, accent: Accent) -> Self {
        Self {
            gender,
            tone,
            accent,
            speed: 1.0,
            pitch: 1.0,
            voice_name: voice_name_for(gender, tone).to_string(),
        }
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn tone(&self) -> Tone {
        self.tone
    }

    pub fn accent(&self) -> Accent {
        self.accent
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn voice_name(&self) -> &str {
        &self.voice_name
    }

    pub fn set_gender(&mut self, gender: Gender) {
        self.gender = gender;
        self.refresh_voice_name();
    }

    pub fn set_tone(&mut self, tone: Tone) {
        self.tone = tone;
        self.refresh_voice_name();
    }

    pub fn set_accent(&mut self, accent: Accent) {
        self.accent = accent;
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = clamp_rate(speed);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = clamp_rate(pitch);
    }

    fn refresh_voice_name(&mut self) {
        self.voice_name = voice_name_for(self.gender, self.tone).to_string();
    }

    /// Delivery hint, e.g. "formal global english"
    pub fn style(&self) -> String {
        format!("{} {}", self.tone.as_str().to_lowercase(), self.accent.as_str().to_lowercase())
    }

    /// Speech request for `text` spoken in this persona
    pub fn speech_request(&self, text: impl Into<String>) -> SpeechRequest {
        SpeechRequest::new(text, self.voice_name.clone()).with_style(self.style())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} ({} / {} / {}) speed {:.1}x pitch {:.1}x",
            self.voice_name, self.gender, self.tone, self.accent, self.speed, self.pitch
        )
    }
}

fn clamp_rate(value: f32) -> f32 {
    if value.is_nan() {
        return 1.0;
    }
    value.clamp(MIN_RATE, MAX_RATE)
}

/// Stored shape of a persona. Loading re-derives the voice and re-clamps rates.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceRecord {
    gender: Gender,
    tone: Tone,
    accent: Accent,
    #[serde(default = "default_rate")]
    speed: f32,
    #[serde(default = "default_rate")]
    pitch: f32,
    #[serde(default)]
    voice_name: String,
}

fn default_rate() -> f32 {
    1.0
}

impl From<VoiceRecord> for VoiceConfig {
    fn from(record: VoiceRecord) -> Self {
        let mut config = VoiceConfig::new(record.gender, record.tone, record.accent);
        config.set_speed(record.speed);
        config.set_pitch(record.pitch);
        config
    }
}

impl From<VoiceConfig> for VoiceRecord {
    fn from(config: VoiceConfig) -> Self {
        Self {
            gender: config.gender,
            tone: config.tone,
            accent: config.accent,
            speed: config.speed,
            pitch: config.pitch,
            voice_name: config.voice_name,
        }
    }
}
