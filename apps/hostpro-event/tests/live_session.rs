//! Live session driven end to end with fake speech and output

use async_trait::async_trait;
use hostpro_bridge::{AudioBuffer, AudioSink, BridgeError, BridgeResult, PlaybackDone, SpeechRequest, SpeechSynthesizer};
use hostpro_event::{
    spawn_live_session, EventSegment, LiveCommand, LiveEvent, PlaybackState, SegmentType,
    SequencerConfig, VoiceConfig,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

fn segments(count: usize) -> Vec<EventSegment> {
    (0..count)
        .map(|i| EventSegment {
            id: format!("seg-{}", i),
            title: format!("Segment {}", i),
            segment_type: SegmentType::Session,
            content: format!("script {}", i),
            duration_minutes: 1.0,
            start_time: None,
            speaker_name: None,
            is_completed: false,
            is_current: i == 0,
        })
        .collect()
}

fn tone() -> AudioBuffer {
    AudioBuffer::new(vec![0.25; 480], 24_000, 1)
}

/// Answers immediately, failing for texts listed in `fail_on`
struct ScriptedSynth {
    fail_on: Vec<String>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedSynth {
    fn new(fail_on: &[&str]) -> Self {
        Self {
            fail_on: fail_on.iter().map(|s| s.to_string()).collect(),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSynth {
    async fn synthesize(&self, request: SpeechRequest) -> BridgeResult<AudioBuffer> {
        self.requests.lock().push(request.text.clone());
        if self.fail_on.contains(&request.text) {
            return Err(BridgeError::EmptyResponse);
        }
        Ok(tone())
    }
}

/// Never answers; reports each call
struct StalledSynth {
    called: mpsc::UnboundedSender<String>,
}

#[async_trait]
impl SpeechSynthesizer for StalledSynth {
    async fn synthesize(&self, request: SpeechRequest) -> BridgeResult<AudioBuffer> {
        let _ = self.called.send(request.text);
        std::future::pending::<()>().await;
        Ok(tone())
    }
}

/// Completes every buffer as soon as it starts
#[derive(Clone, Default)]
struct InstantSink {
    plays: Arc<Mutex<usize>>,
    stops: Arc<Mutex<usize>>,
}

impl AudioSink for InstantSink {
    fn play(&mut self, _audio: AudioBuffer, on_finished: PlaybackDone) -> BridgeResult<()> {
        *self.plays.lock() += 1;
        on_finished();
        Ok(())
    }

    fn stop(&mut self) {
        *self.stops.lock() += 1;
    }

    fn is_active(&self) -> bool {
        false
    }
}

/// Shared, ordered record of speech requests and sink calls
#[derive(Clone, Default)]
struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
    active: Arc<Mutex<usize>>,
    max_active: Arc<Mutex<usize>>,
}

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// Answers immediately and records each request in the log
struct LoggingSynth {
    log: CallLog,
}

#[async_trait]
impl SpeechSynthesizer for LoggingSynth {
    async fn synthesize(&self, request: SpeechRequest) -> BridgeResult<AudioBuffer> {
        self.log.push(format!("req {}", request.text));
        Ok(tone())
    }
}

/// Keeps each buffer playing until stopped
struct HoldingSink {
    log: CallLog,
}

impl AudioSink for HoldingSink {
    fn play(&mut self, _audio: AudioBuffer, _on_finished: PlaybackDone) -> BridgeResult<()> {
        self.log.push("play");
        let mut active = self.log.active.lock();
        *active += 1;
        let mut max_active = self.log.max_active.lock();
        *max_active = (*max_active).max(*active);
        Ok(())
    }

    fn stop(&mut self) {
        self.log.push("stop");
        *self.log.active.lock() = 0;
    }

    fn is_active(&self) -> bool {
        *self.log.active.lock() > 0
    }
}

async fn wait_for_status<P>(events: &mut mpsc::UnboundedReceiver<LiveEvent>, mut wanted: P)
where
    P: FnMut(&hostpro_event::LiveStatus) -> bool,
{
    loop {
        match events.recv().await {
            Some(LiveEvent::StatusChanged(status)) if wanted(&status) => return,
            Some(_) => continue,
            None => panic!("session ended early"),
        }
    }
}

async fn collect_until_finished(events: &mut mpsc::UnboundedReceiver<LiveEvent>) -> Vec<LiveEvent> {
    let mut seen = Vec::new();
    while let Some(event) = events.recv().await {
        let finished = event == LiveEvent::Finished;
        seen.push(event);
        if finished {
            break;
        }
    }
    seen
}

fn spoken_indices(events: &[LiveEvent]) -> Vec<usize> {
    events
        .iter()
        .filter_map(|e| match e {
            LiveEvent::StatusChanged(status) if status.is_speaking => Some(status.current_index),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_full_run_visits_segments_in_order() {
    let synth = Arc::new(ScriptedSynth::new(&[]));
    let sink = InstantSink::default();

    let (handle, mut events) = spawn_live_session(
        segments(3),
        VoiceConfig::default(),
        synth.clone(),
        Box::new(sink.clone()),
        SequencerConfig::default(),
    );

    let seen = collect_until_finished(&mut events).await;

    assert_eq!(spoken_indices(&seen), vec![0, 1, 2]);
    assert_eq!(*sink.plays.lock(), 3);
    assert_eq!(
        *synth.requests.lock(),
        vec!["script 0".to_string(), "script 1".to_string(), "script 2".to_string()]
    );
    assert_eq!(handle.status().state, PlaybackState::Finished);
    handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_pause_during_request_never_plays() {
    let (called_tx, mut called_rx) = mpsc::unbounded_channel();
    let synth = Arc::new(StalledSynth { called: called_tx });
    let sink = InstantSink::default();

    let (handle, mut events) = spawn_live_session(
        segments(3),
        VoiceConfig::default(),
        synth,
        Box::new(sink.clone()),
        SequencerConfig::default(),
    );

    assert_eq!(called_rx.recv().await.as_deref(), Some("script 0"));
    assert!(handle.send(LiveCommand::Pause));

    loop {
        match events.recv().await {
            Some(LiveEvent::StatusChanged(status)) if status.state == PlaybackState::Paused => break,
            Some(_) => continue,
            None => panic!("session ended before pausing"),
        }
    }

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(*sink.plays.lock(), 0);
    assert!(*sink.stops.lock() >= 1);
    assert_eq!(handle.status().state, PlaybackState::Paused);

    // Toggling resumes with a fresh request for the same segment
    assert!(handle.send(LiveCommand::TogglePause));
    assert_eq!(called_rx.recv().await.as_deref(), Some("script 0"));
    assert_eq!(handle.status().current_index, 0);

    assert!(handle.send(LiveCommand::End));
    let seen = collect_until_finished(&mut events).await;
    assert_eq!(seen.last(), Some(&LiveEvent::Finished));
    assert_eq!(*sink.plays.lock(), 0);
    handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_unvoiced_segment_is_reported_and_skipped() {
    let synth = Arc::new(ScriptedSynth::new(&["script 0"]));
    let sink = InstantSink::default();

    let (handle, mut events) = spawn_live_session(
        segments(2),
        VoiceConfig::default(),
        synth,
        Box::new(sink.clone()),
        SequencerConfig::default(),
    );

    let seen = collect_until_finished(&mut events).await;

    let unvoiced = seen
        .iter()
        .position(|e| matches!(e, LiveEvent::SegmentUnvoiced { index: 0, .. }))
        .expect("segment 0 reported as unvoiced");
    assert_eq!(
        seen[unvoiced],
        LiveEvent::SegmentUnvoiced {
            index: 0,
            title: "Segment 0".to_string()
        }
    );
    assert_eq!(spoken_indices(&seen), vec![1]);
    assert_eq!(*sink.plays.lock(), 1);
    handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_skip_ahead_and_back() {
    let (called_tx, mut called_rx) = mpsc::unbounded_channel();
    let synth = Arc::new(StalledSynth { called: called_tx });

    let (handle, mut events) = spawn_live_session(
        segments(2),
        VoiceConfig::default(),
        synth,
        Box::new(InstantSink::default()),
        SequencerConfig::default(),
    );
    assert_eq!(called_rx.recv().await.as_deref(), Some("script 0"));

    handle.send(LiveCommand::Previous);
    handle.send(LiveCommand::Next);
    assert_eq!(called_rx.recv().await.as_deref(), Some("script 1"));
    handle.send(LiveCommand::Next);
    handle.send(LiveCommand::Previous);
    assert_eq!(called_rx.recv().await.as_deref(), Some("script 0"));

    handle.send(LiveCommand::End);
    collect_until_finished(&mut events).await;
    handle.join().await;
}

#[tokio::test]
async fn test_empty_program_finishes_immediately() {
    let synth = Arc::new(ScriptedSynth::new(&[]));
    let (handle, mut events) = spawn_live_session(
        Vec::new(),
        VoiceConfig::default(),
        synth,
        Box::new(InstantSink::default()),
        SequencerConfig::default(),
    );

    let seen = collect_until_finished(&mut events).await;
    assert_eq!(seen.last(), Some(&LiveEvent::Finished));
    handle.join().await;
}

#[tokio::test(start_paused = true)]
async fn test_audio_is_stopped_before_the_next_request() {
    let log = CallLog::default();
    let synth = Arc::new(LoggingSynth { log: log.clone() });

    let (handle, mut events) = spawn_live_session(
        segments(3),
        VoiceConfig::default(),
        synth,
        Box::new(HoldingSink { log: log.clone() }),
        SequencerConfig::default(),
    );
    wait_for_status(&mut events, |s| s.is_speaking && s.current_index == 0).await;

    assert!(handle.send(LiveCommand::Next));
    wait_for_status(&mut events, |s| s.is_speaking && s.current_index == 1).await;

    assert!(handle.send(LiveCommand::Pause));
    wait_for_status(&mut events, |s| s.state == PlaybackState::Paused).await;
    assert_eq!(*log.active.lock(), 0);

    assert!(handle.send(LiveCommand::Resume));
    wait_for_status(&mut events, |s| s.is_speaking && s.current_index == 1).await;

    assert!(handle.send(LiveCommand::End));
    collect_until_finished(&mut events).await;
    handle.join().await;

    let entries = log.entries();
    let first_play = entries.iter().position(|e| e == "play").expect("segment 0 played");
    let first_skip = entries
        .iter()
        .position(|e| e == "req script 1")
        .expect("segment 1 requested");
    assert_eq!(entries[0], "req script 0");
    assert!(
        entries[first_play..first_skip].iter().any(|e| e == "stop"),
        "audio must stop before the next request: {:?}",
        entries
    );
    assert_eq!(entries.iter().filter(|e| *e == "play").count(), 3);
    assert_eq!(entries.iter().filter(|e| *e == "req script 1").count(), 2);
    assert!(!entries.iter().any(|e| e == "req script 2"));
    assert_eq!(entries.last().map(String::as_str), Some("stop"));
    assert_eq!(*log.max_active.lock(), 1);
    assert_eq!(*log.active.lock(), 0);
}
