//! Audio output
//!
//! The sequencer owns exactly one [`AudioSink`]. Starting a buffer replaces
//! whatever was playing, and the completion callback fires only when a buffer
//! drains on its own. A stopped buffer never reports completion.
//!
//! ```text
//! ┌──────────────┐  play/stop   ┌──────────────────────────┐   cpal callback
//! │ LiveSession  │─────────────▶│ PlaybackSlot (Mutex)     │◀──────────────────┐
//! └──────────────┘              │  samples, position, done │                   │
//!        ▲                      └──────────────────────────┘   ┌───────────────┴──┐
//!        └──────────── on_finished (drained) ──────────────────│ hostpro-audio thr│
//!                                                              └──────────────────┘
//! ```
//!
//! `cpal::Stream` is not `Send` on every platform, so the stream is built and
//! kept alive on a dedicated thread, the same way the worker threads in this
//! workspace own their resources and are stopped through a signal channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use crossbeam_channel::{bounded, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};

use crate::data::AudioBuffer;
use crate::error::{BridgeError, BridgeResult};

/// Completion callback for a buffer that played to the end
pub type PlaybackDone = Box<dyn FnOnce() + Send + 'static>;

/// Exclusive owner of the audio output
pub trait AudioSink: Send {
    /// Start playing `audio`, replacing anything currently playing.
    fn play(&mut self, audio: AudioBuffer, on_finished: PlaybackDone) -> BridgeResult<()>;

    /// Silence output immediately. Pending completion callbacks are dropped.
    fn stop(&mut self);

    /// Whether a buffer is currently playing
    fn is_active(&self) -> bool;
}

/// A buffer being played, with its read cursor
struct PlaybackSlot {
    samples: Vec<f32>,
    channels: usize,
    /// Source frames advanced per output frame
    step: f64,
    /// Fractional read position in source frames
    position: f64,
    on_finished: Option<PlaybackDone>,
}

impl PlaybackSlot {
    fn new(audio: AudioBuffer, output_rate: u32, on_finished: PlaybackDone) -> Self {
        let step = if output_rate == 0 {
            1.0
        } else {
            audio.sample_rate as f64 / output_rate as f64
        };
        Self {
            channels: audio.channels.max(1) as usize,
            samples: audio.samples,
            step,
            position: 0.0,
            on_finished: Some(on_finished),
        }
    }

    fn frame_count(&self) -> usize {
        self.samples.len() / self.channels
    }

    /// Mono mix of one source frame
    fn frame(&self, index: usize) -> f32 {
        let start = index * self.channels;
        let frame = &self.samples[start..start + self.channels];
        frame.iter().sum::<f32>() / self.channels as f32
    }

    /// Next output sample, linearly interpolated to the device rate
    fn next_sample(&mut self) -> Option<f32> {
        let frames = self.frame_count();
        let index = self.position as usize;
        if index >= frames {
            return None;
        }
        let frac = (self.position - index as f64) as f32;
        let current = self.frame(index);
        let next = if index + 1 < frames {
            self.frame(index + 1)
        } else {
            current
        };
        self.position += self.step;
        Some(current + (next - current) * frac)
    }
}

type SharedSlot = Arc<Mutex<Option<PlaybackSlot>>>;

/// Plays buffers on the default cpal output device
pub struct AudioPlayer {
    slot: SharedSlot,
    output_rate: u32,
    stop_sender: Option<Sender<()>>,
    worker_handle: Option<thread::JoinHandle<()>>,
}

impl AudioPlayer {
    /// Open the default output device and start a silent stream on it
    pub fn open_default() -> BridgeResult<Self> {
        let slot: SharedSlot = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = bounded::<BridgeResult<u32>>(1);
        let (stop_tx, stop_rx) = bounded::<()>(1);

        let worker_slot = slot.clone();
        let handle = thread::Builder::new()
            .name("hostpro-audio".to_string())
            .spawn(move || match build_stream(worker_slot) {
                Ok((stream, rate)) => {
                    let _ = ready_tx.send(Ok(rate));
                    // Keep the stream alive until asked to stop
                    let _ = stop_rx.recv();
                    drop(stream);
                    debug!("Audio output thread exiting");
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| BridgeError::AudioDevice(format!("failed to spawn audio thread: {}", e)))?;

        let output_rate = ready_rx
            .recv()
            .map_err(|_| BridgeError::AudioDevice("audio thread exited during setup".to_string()))??;

        info!("Audio output ready at {} Hz", output_rate);

        Ok(Self {
            slot,
            output_rate,
            stop_sender: Some(stop_tx),
            worker_handle: Some(handle),
        })
    }

    /// Sample rate of the output device
    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }
}

impl AudioSink for AudioPlayer {
    fn play(&mut self, audio: AudioBuffer, on_finished: PlaybackDone) -> BridgeResult<()> {
        if audio.is_empty() {
            return Err(BridgeError::AudioDevice("refusing to play an empty buffer".to_string()));
        }
        debug!(
            "Playing {} frames at {} Hz ({:.2}s)",
            audio.frame_count(),
            audio.sample_rate,
            audio.duration().as_secs_f64()
        );
        *self.slot.lock() = Some(PlaybackSlot::new(audio, self.output_rate, on_finished));
        Ok(())
    }

    fn stop(&mut self) {
        if self.slot.lock().take().is_some() {
            debug!("Playback stopped");
        }
    }

    fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.slot.lock().take();
        if let Some(stop_tx) = self.stop_sender.take() {
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.worker_handle.take() {
            let _ = handle.join();
        }
    }
}

fn build_stream(slot: SharedSlot) -> BridgeResult<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| BridgeError::AudioDevice("no default output device".to_string()))?;
    let supported = device
        .default_output_config()
        .map_err(|e| BridgeError::AudioDevice(e.to_string()))?;

    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    let output_rate = config.sample_rate.0;

    let stream = match sample_format {
        SampleFormat::F32 => build_output::<f32>(&device, &config, slot)?,
        SampleFormat::I16 => build_output::<i16>(&device, &config, slot)?,
        SampleFormat::U16 => build_output::<u16>(&device, &config, slot)?,
        other => {
            return Err(BridgeError::AudioDevice(format!(
                "unsupported output sample format {:?}",
                other
            )))
        }
    };

    stream
        .play()
        .map_err(|e| BridgeError::AudioDevice(e.to_string()))?;

    Ok((stream, output_rate))
}

fn build_output<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    slot: SharedSlot,
) -> BridgeResult<cpal::Stream>
where
    T: SizedSample + FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut finished: Option<PlaybackDone> = None;
                {
                    let mut guard = slot.lock();
                    for frame in data.chunks_mut(channels) {
                        let value = guard.as_mut().and_then(PlaybackSlot::next_sample);
                        let value = match value {
                            Some(v) => v,
                            None => {
                                if let Some(drained) = guard.take() {
                                    finished = drained.on_finished;
                                }
                                0.0
                            }
                        };
                        for sample in frame.iter_mut() {
                            *sample = T::from_sample(value);
                        }
                    }
                }
                // Called outside the lock so the callback may start the next buffer
                if let Some(done) = finished {
                    done();
                }
            },
            |err| error!("Audio output stream error: {}", err),
            None,
        )
        .map_err(|e| BridgeError::AudioDevice(e.to_string()))
}

/// Sink without a device: "plays" for the buffer's duration in silence.
///
/// Used headless, with `--mute`, and when no output device can be opened.
#[derive(Default)]
pub struct MutedOutput {
    generation: Arc<AtomicU64>,
    active: Arc<AtomicU64>,
}

impl MutedOutput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioSink for MutedOutput {
    fn play(&mut self, audio: AudioBuffer, on_finished: PlaybackDone) -> BridgeResult<()> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.active.store(generation, Ordering::SeqCst);

        let current = self.generation.clone();
        let active = self.active.clone();
        let duration = audio.duration();
        thread::Builder::new()
            .name("hostpro-muted".to_string())
            .spawn(move || {
                thread::sleep(duration);
                if current.load(Ordering::SeqCst) == generation {
                    active.store(0, Ordering::SeqCst);
                    on_finished();
                }
            })
            .map_err(|e| BridgeError::AudioDevice(format!("failed to spawn timer thread: {}", e)))?;
        Ok(())
    }

    fn stop(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.active.store(0, Ordering::SeqCst);
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) != 0
    }
}

/// Open the default device, falling back to [`MutedOutput`] when unavailable
pub fn open_output(mute: bool) -> Box<dyn AudioSink> {
    if mute {
        info!("Audio muted, using silent output");
        return Box::new(MutedOutput::new());
    }
    match AudioPlayer::open_default() {
        Ok(player) => Box::new(player),
        Err(e) => {
            warn!("Audio output unavailable ({}), continuing without sound", e);
            Box::new(MutedOutput::new())
        }
    }
}
