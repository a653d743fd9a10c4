//! Segment playback sequencer
//!
//! Pure state machine: it owns no audio, no network and no timers. Each
//! [`PlaybackInput`] yields the [`PlaybackEffect`]s the driver must carry out,
//! in order. Asynchronous work is stamped with a ticket; results carrying an
//! older ticket are ignored, which is how a pause or a skip cancels work that
//! is already in flight.
//!
//! ```text
//!            Start                AudioReady(Some)
//!   Idle ───────────▶ Requesting ─────────────────▶ Speaking
//!    ▲  ▲               Audio   │                      │
//!    │  │ AudioReady(None)      │                      │ PlaybackComplete
//!    │  └───────────────────────┘                      │
//!    └─────────────────────────────────────────────────┘
//!    │ AdvanceDue: next index, or Finished after the last
//!
//!   any (not Finished) ── Pause ──▶ Paused ── Resume ──▶ RequestingAudio
//!   any (not Finished) ── End ────▶ Finished
//! ```

use hostpro_bridge::AudioBuffer;
use log::debug;
use std::fmt;
use std::time::Duration;

/// Stamp on asynchronous work
pub type Ticket = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Between segments, or waiting for the advance delay
    Idle,
    RequestingAudio,
    Speaking,
    Paused,
    Finished,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::RequestingAudio => "requesting audio",
            PlaybackState::Speaking => "speaking",
            PlaybackState::Paused => "paused",
            PlaybackState::Finished => "finished",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackInput {
    Start,
    Pause,
    Resume,
    Next,
    Previous,
    End,
    /// Result of a speech request. `None` means the segment could not be voiced.
    AudioReady {
        ticket: Ticket,
        audio: Option<AudioBuffer>,
    },
    PlaybackComplete {
        ticket: Ticket,
    },
    AdvanceDue {
        ticket: Ticket,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEffect {
    RequestSpeech { ticket: Ticket, index: usize },
    StartPlayback { ticket: Ticket, audio: AudioBuffer },
    /// Silence output and abandon pending requests and timers
    StopPlayback,
    ScheduleAdvance { ticket: Ticket, delay: Duration },
    SegmentUnvoiced { index: usize },
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SequencerConfig {
    /// Pause between the end of one segment and the request for the next
    pub advance_delay: Duration,
    /// Move on automatically when a segment could not be voiced
    pub advance_after_unvoiced: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            advance_delay: Duration::from_secs(2),
            advance_after_unvoiced: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    config: SequencerConfig,
    segment_count: usize,
    state: PlaybackState,
    current_index: usize,
    ticket: Ticket,
}

impl Sequencer {
    pub fn new(segment_count: usize, config: SequencerConfig) -> Self {
        Self {
            config,
            segment_count,
            state: PlaybackState::Idle,
            current_index: 0,
            ticket: 0,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_speaking(&self) -> bool {
        self.state == PlaybackState::Speaking
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Apply one input and return the effects to perform, in order
    pub fn handle(&mut self, input: PlaybackInput) -> Vec<PlaybackEffect> {
        let before = self.state;
        let effects = self.transition(input);
        if self.state != before {
            debug!(
                "Sequencer {} -> {} (segment {}/{})",
                before,
                self.state,
                self.current_index + 1,
                self.segment_count
            );
        }
        effects
    }

    fn transition(&mut self, input: PlaybackInput) -> Vec<PlaybackEffect> {
        use PlaybackEffect as E;
        use PlaybackInput as I;
        use PlaybackState as S;

        if self.state == S::Finished {
            return Vec::new();
        }

        match input {
            I::Start => {
                if self.state != S::Idle || self.ticket != 0 {
                    return Vec::new();
                }
                if self.segment_count == 0 {
                    self.state = S::Finished;
                    return vec![E::Completed];
                }
                vec![self.request(0)]
            }

            I::Pause => {
                if self.state == S::Paused {
                    return Vec::new();
                }
                self.bump();
                self.state = S::Paused;
                vec![E::StopPlayback]
            }

            I::Resume => {
                if self.state != S::Paused {
                    return Vec::new();
                }
                vec![E::StopPlayback, self.request(self.current_index)]
            }

            I::Next => {
                if self.current_index + 1 >= self.segment_count {
                    return Vec::new();
                }
                vec![E::StopPlayback, self.request(self.current_index + 1)]
            }

            I::Previous => {
                if self.current_index == 0 {
                    return Vec::new();
                }
                vec![E::StopPlayback, self.request(self.current_index - 1)]
            }

            I::End => {
                self.bump();
                self.state = S::Finished;
                vec![E::StopPlayback, E::Completed]
            }

            I::AudioReady { ticket, audio } => {
                if ticket != self.ticket || self.state != S::RequestingAudio {
                    return Vec::new();
                }
                match audio {
                    Some(audio) => {
                        self.state = S::Speaking;
                        vec![E::StartPlayback { ticket, audio }]
                    }
                    None => {
                        self.state = S::Idle;
                        let mut effects = vec![E::SegmentUnvoiced {
                            index: self.current_index,
                        }];
                        if self.config.advance_after_unvoiced {
                            effects.push(E::ScheduleAdvance {
                                ticket,
                                delay: self.config.advance_delay,
                            });
                        }
                        effects
                    }
                }
            }

            I::PlaybackComplete { ticket } => {
                if ticket != self.ticket || self.state != S::Speaking {
                    return Vec::new();
                }
                self.state = S::Idle;
                vec![E::ScheduleAdvance {
                    ticket,
                    delay: self.config.advance_delay,
                }]
            }

            I::AdvanceDue { ticket } => {
                if ticket != self.ticket || self.state != S::Idle {
                    return Vec::new();
                }
                let next = self.current_index + 1;
                if next < self.segment_count {
                    vec![self.request(next)]
                } else {
                    self.bump();
                    self.state = S::Finished;
                    vec![E::Completed]
                }
            }
        }
    }

    fn bump(&mut self) -> Ticket {
        self.ticket += 1;
        self.ticket
    }

    fn request(&mut self, index: usize) -> PlaybackEffect {
        let ticket = self.bump();
        self.current_index = index;
        self.state = PlaybackState::RequestingAudio;
        PlaybackEffect::RequestSpeech { ticket, index }
    }
}
