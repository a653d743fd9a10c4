//! Live session driver
//!
//! Runs one [`Sequencer`] on a tokio task and carries out its effects: speech
//! requests and advance timers become spawned tasks, playback goes to the
//! [`AudioSink`]. Their results come back on an internal feedback channel and
//! are fed to the sequencer as inputs, so all state changes happen on the one
//! task.
//!
//! ```text
//!  LiveSessionHandle ── LiveCommand ──▶ ┌────────────┐ ── LiveEvent ──▶ shell
//!                                       │ LiveSession│
//!  synthesis task ─┐                    │ (Sequencer)│ ── play/stop ──▶ AudioSink
//!  advance timer  ─┼── Feedback ──────▶ └────────────┘
//!  sink callback  ─┘
//! ```

use hostpro_bridge::{AudioBuffer, AudioSink, SpeechSynthesizer};
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::project::EventSegment;
use crate::sequencer::{PlaybackEffect, PlaybackInput, PlaybackState, Sequencer, SequencerConfig, Ticket};
use crate::voice::VoiceConfig;

/// Operator controls during a live session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiveCommand {
    Pause,
    Resume,
    /// Pause when running, resume when paused
    TogglePause,
    Next,
    Previous,
    End,
}

/// Snapshot of the sequencer for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStatus {
    pub state: PlaybackState,
    pub current_index: usize,
    pub is_speaking: bool,
    pub segment_count: usize,
}

impl LiveStatus {
    fn of(sequencer: &Sequencer) -> Self {
        Self {
            state: sequencer.state(),
            current_index: sequencer.current_index(),
            is_speaking: sequencer.is_speaking(),
            segment_count: sequencer.segment_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiveEvent {
    StatusChanged(LiveStatus),
    /// Speech could not be produced for this segment
    SegmentUnvoiced { index: usize, title: String },
    Finished,
}

/// Results of spawned work, fed back into the sequencer
#[derive(Debug)]
enum Feedback {
    AudioReady { ticket: Ticket, audio: Option<AudioBuffer> },
    PlaybackComplete { ticket: Ticket },
    AdvanceDue { ticket: Ticket },
}

impl From<Feedback> for PlaybackInput {
    fn from(feedback: Feedback) -> Self {
        match feedback {
            Feedback::AudioReady { ticket, audio } => PlaybackInput::AudioReady { ticket, audio },
            Feedback::PlaybackComplete { ticket } => PlaybackInput::PlaybackComplete { ticket },
            Feedback::AdvanceDue { ticket } => PlaybackInput::AdvanceDue { ticket },
        }
    }
}

/// Control side of a running session
pub struct LiveSessionHandle {
    commands: mpsc::UnboundedSender<LiveCommand>,
    status: Arc<RwLock<LiveStatus>>,
    task: JoinHandle<()>,
}

impl LiveSessionHandle {
    /// Send a command. Returns false once the session has ended.
    pub fn send(&self, command: LiveCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn status(&self) -> LiveStatus {
        *self.status.read()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the session task to exit
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                warn!("Live session task failed: {}", e);
            }
        }
    }
}

/// Start hosting `segments` in the given voice. Must be called inside a tokio runtime.
pub fn spawn_live_session(
    segments: Vec<EventSegment>,
    voice: VoiceConfig,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    sink: Box<dyn AudioSink>,
    config: SequencerConfig,
) -> (LiveSessionHandle, mpsc::UnboundedReceiver<LiveEvent>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (feedback_tx, feedback_rx) = mpsc::unbounded_channel();

    let sequencer = Sequencer::new(segments.len(), config);
    let status = Arc::new(RwLock::new(LiveStatus::of(&sequencer)));

    let session = LiveSession {
        sequencer,
        segments,
        voice,
        synthesizer,
        sink,
        status: status.clone(),
        events: event_tx,
        feedback: feedback_tx,
        pending_request: None,
        pending_timer: None,
    };
    let task = tokio::spawn(session.run(command_rx, feedback_rx));

    let handle = LiveSessionHandle {
        commands: command_tx,
        status,
        task,
    };
    (handle, event_rx)
}

struct LiveSession {
    sequencer: Sequencer,
    segments: Vec<EventSegment>,
    voice: VoiceConfig,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    sink: Box<dyn AudioSink>,
    status: Arc<RwLock<LiveStatus>>,
    events: mpsc::UnboundedSender<LiveEvent>,
    feedback: mpsc::UnboundedSender<Feedback>,
    pending_request: Option<JoinHandle<()>>,
    pending_timer: Option<JoinHandle<()>>,
}

impl LiveSession {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<LiveCommand>,
        mut feedback: mpsc::UnboundedReceiver<Feedback>,
    ) {
        info!(
            "Live session started: {} segments, voice {}",
            self.segments.len(),
            self.voice.voice_name()
        );

        let mut done = self.step(PlaybackInput::Start);
        while !done {
            let input = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.input_for(command),
                    None => {
                        debug!("Command channel closed, ending live session");
                        break;
                    }
                },
                Some(result) = feedback.recv() => PlaybackInput::from(result),
            };
            done = self.step(input);
        }

        self.cancel_pending();
        self.sink.stop();
        info!("Live session ended");
    }

    fn input_for(&self, command: LiveCommand) -> PlaybackInput {
        match command {
            LiveCommand::Pause => PlaybackInput::Pause,
            LiveCommand::Resume => PlaybackInput::Resume,
            LiveCommand::TogglePause if self.sequencer.state() == PlaybackState::Paused => {
                PlaybackInput::Resume
            }
            LiveCommand::TogglePause => PlaybackInput::Pause,
            LiveCommand::Next => PlaybackInput::Next,
            LiveCommand::Previous => PlaybackInput::Previous,
            LiveCommand::End => PlaybackInput::End,
        }
    }

    /// Feed one input and perform its effects. Returns true when the session is complete.
    fn step(&mut self, input: PlaybackInput) -> bool {
        let effects = self.sequencer.handle(input);
        let mut completed = false;
        for effect in effects {
            completed |= self.apply(effect);
        }
        self.publish_status();
        if completed {
            let _ = self.events.send(LiveEvent::Finished);
        }
        completed
    }

    fn apply(&mut self, effect: PlaybackEffect) -> bool {
        match effect {
            PlaybackEffect::RequestSpeech { ticket, index } => {
                self.cancel_pending();
                self.request_speech(ticket, index);
            }
            PlaybackEffect::StartPlayback { ticket, audio } => {
                let feedback = self.feedback.clone();
                let on_finished = Box::new(move || {
                    let _ = feedback.send(Feedback::PlaybackComplete { ticket });
                });
                if let Err(e) = self.sink.play(audio, on_finished) {
                    warn!("Playback failed, skipping to the advance delay: {}", e);
                    let _ = self.feedback.send(Feedback::PlaybackComplete { ticket });
                }
            }
            PlaybackEffect::StopPlayback => {
                self.sink.stop();
                self.cancel_pending();
            }
            PlaybackEffect::ScheduleAdvance { ticket, delay } => {
                if let Some(timer) = self.pending_timer.take() {
                    timer.abort();
                }
                let feedback = self.feedback.clone();
                self.pending_timer = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = feedback.send(Feedback::AdvanceDue { ticket });
                }));
            }
            PlaybackEffect::SegmentUnvoiced { index } => {
                let title = self
                    .segments
                    .get(index)
                    .map(|s| s.title.clone())
                    .unwrap_or_default();
                warn!("Segment {} ({}) could not be voiced", index + 1, title);
                let _ = self.events.send(LiveEvent::SegmentUnvoiced { index, title });
            }
            PlaybackEffect::Completed => {
                self.sink.stop();
                self.cancel_pending();
                return true;
            }
        }
        false
    }

    fn request_speech(&mut self, ticket: Ticket, index: usize) {
        let Some(segment) = self.segments.get(index) else {
            warn!("No segment at index {}", index);
            let _ = self.feedback.send(Feedback::AudioReady { ticket, audio: None });
            return;
        };
        debug!("Requesting speech for segment {} ({})", index + 1, segment.title);

        let request = self.voice.speech_request(segment.content.clone());
        let synthesizer = self.synthesizer.clone();
        let feedback = self.feedback.clone();
        self.pending_request = Some(tokio::spawn(async move {
            let audio = match synthesizer.synthesize(request).await {
                Ok(audio) if !audio.is_empty() => Some(audio),
                Ok(_) => {
                    warn!("Speech service returned no samples for segment {}", index + 1);
                    None
                }
                Err(e) => {
                    warn!("Speech synthesis failed for segment {}: {}", index + 1, e);
                    None
                }
            };
            let _ = feedback.send(Feedback::AudioReady { ticket, audio });
        }));
    }

    fn cancel_pending(&mut self) {
        if let Some(request) = self.pending_request.take() {
            request.abort();
        }
        if let Some(timer) = self.pending_timer.take() {
            timer.abort();
        }
    }

    fn publish_status(&self) {
        let status = LiveStatus::of(&self.sequencer);
        let changed = {
            let mut current = self.status.write();
            let changed = *current != status;
            *current = status;
            changed
        };
        if changed {
            let _ = self.events.send(LiveEvent::StatusChanged(status));
        }
    }
}
