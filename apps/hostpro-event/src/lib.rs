//! AI Host Pro - turn event planning documents into a voiced hosting program
//!
//! This crate provides:
//! - Document intake that samples uploaded files into one text blob
//! - Event projects with their generated script segments
//! - The anchor's voice persona
//! - Local persistence of confirmed events
//! - The playback sequencer and the live session that drives it
//! - The application controller that moves between the five views
//!
//! Remote generation, speech synthesis and audio output come from
//! `hostpro-bridge`.

pub mod host_app;
pub mod intake;
pub mod live_session;
pub mod project;
pub mod sequencer;
pub mod store;
pub mod upload;
pub mod voice;

pub use host_app::{AppState, AppView, HostApp, HostError, HostResult};
pub use intake::{DocumentIntake, DocumentKind, IntakeProgress, IntakeStatus, SourceFile};
pub use live_session::{spawn_live_session, LiveCommand, LiveEvent, LiveSessionHandle, LiveStatus};
pub use project::{EventProject, EventSegment, ProjectStatus, SegmentType};
pub use sequencer::{PlaybackEffect, PlaybackInput, PlaybackState, Sequencer, SequencerConfig};
pub use store::{JsonFileStore, MemoryStore, ProjectStore, StoreError};
pub use upload::UploadForm;
pub use voice::{Accent, Gender, Tone, VoiceConfig, PREVIEW_LINE};
