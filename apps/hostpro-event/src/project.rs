//! Event projects and their script segments
//!
//! Field names follow the persisted blob: camelCase keys, `type` for the
//! segment kind and a lowercase status.

use hostpro_bridge::GeneratedSegment;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::voice::VoiceConfig;

/// Kind of a script segment. Closed set; anything else is rejected at generation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentType {
    Welcome,
    Introduction,
    Transition,
    Break,
    Session,
    #[serde(rename = "Vote of Thanks")]
    VoteOfThanks,
    Closing,
}

impl SegmentType {
    pub const ALL: [SegmentType; 7] = [
        SegmentType::Welcome,
        SegmentType::Introduction,
        SegmentType::Transition,
        SegmentType::Break,
        SegmentType::Session,
        SegmentType::VoteOfThanks,
        SegmentType::Closing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentType::Welcome => "Welcome",
            SegmentType::Introduction => "Introduction",
            SegmentType::Transition => "Transition",
            SegmentType::Break => "Break",
            SegmentType::Session => "Session",
            SegmentType::VoteOfThanks => "Vote of Thanks",
            SegmentType::Closing => "Closing",
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown segment type '{0}'")]
pub struct UnknownSegmentType(pub String);

impl FromStr for SegmentType {
    type Err = UnknownSegmentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SegmentType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownSegmentType(s.to_string()))
    }
}

/// One unit of the hosting script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSegment {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub segment_type: SegmentType,
    /// Script text to be spoken
    pub content: String,
    /// Advisory only; pacing does not depend on it
    pub duration_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub is_current: bool,
}

impl EventSegment {
    /// Convert a generated segment at position `index` of the script
    pub fn from_generated(index: usize, generated: GeneratedSegment) -> Result<Self, UnknownSegmentType> {
        Ok(Self {
            segment_type: generated.segment_type.parse()?,
            id: generated.id,
            title: generated.title,
            content: generated.content,
            duration_minutes: generated.duration_minutes,
            start_time: None,
            speaker_name: generated.speaker_name.filter(|s| !s.trim().is_empty()),
            is_completed: false,
            is_current: index == 0,
        })
    }
}

/// Convert a whole generated script, failing on the first unknown segment kind
pub fn segments_from_generated(
    generated: Vec<GeneratedSegment>,
) -> Result<Vec<EventSegment>, UnknownSegmentType> {
    generated
        .into_iter()
        .enumerate()
        .map(|(index, segment)| EventSegment::from_generated(index, segment))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Draft,
    Ready,
    Archived,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectStatus::Draft => write!(f, "draft"),
            ProjectStatus::Ready => write!(f, "ready"),
            ProjectStatus::Archived => write!(f, "archived"),
        }
    }
}

/// An event with its generated script and, once confirmed, its voice persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventProject {
    pub id: String,
    pub name: String,
    /// Creation date, `M/D/YYYY`
    pub date: String,
    #[serde(default)]
    pub description: String,
    /// Concatenated intake text the script was generated from
    #[serde(default)]
    pub raw_content: String,
    pub segments: Vec<EventSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_config: Option<VoiceConfig>,
    pub status: ProjectStatus,
}

impl EventProject {
    /// New draft project dated today
    pub fn new_draft(
        name: impl Into<String>,
        description: impl Into<String>,
        raw_content: impl Into<String>,
        segments: Vec<EventSegment>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            date: chrono::Local::now().format("%-m/%-d/%Y").to_string(),
            description: description.into(),
            raw_content: raw_content.into(),
            segments,
            voice_config: None,
            status: ProjectStatus::Draft,
        }
    }

    pub fn is_editable(&self) -> bool {
        self.status == ProjectStatus::Draft
    }

    pub fn segment_mut(&mut self, segment_id: &str) -> Option<&mut EventSegment> {
        self.segments.iter_mut().find(|s| s.id == segment_id)
    }

    /// Sum of the advisory segment durations
    pub fn total_minutes(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_minutes).sum()
    }
}
