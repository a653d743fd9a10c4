//! Interactive terminal loop
//!
//! Reads operator commands from stdin and, while an event is live, the
//! session's events, whichever arrives first.

use anyhow::Result;
use async_trait::async_trait;
use hostpro_bridge::{
    open_output, AudioBuffer, AudioSink, BridgeError, BridgeResult, GeminiClient, GeneratedSegment,
    ScriptGenerator, SpeechRequest, SpeechSynthesizer,
};
use hostpro_event::{
    spawn_live_session, AppView, HostApp, HostError, JsonFileStore, LiveCommand, LiveEvent,
    LiveSessionHandle, LiveStatus, PlaybackState, UploadForm, VoiceConfig, PREVIEW_LINE,
};
use log::{info, warn};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::command::{help_text, parse_command, ShellCommand};
use crate::config::Settings;
use crate::views;

/// Stands in for the remote service when no API key is configured
struct Offline;

#[async_trait]
impl ScriptGenerator for Offline {
    async fn generate(&self, _event_name: &str, _content: &str) -> BridgeResult<Vec<GeneratedSegment>> {
        Err(BridgeError::MissingApiKey("Gemini".to_string()))
    }
}

#[async_trait]
impl SpeechSynthesizer for Offline {
    async fn synthesize(&self, _request: SpeechRequest) -> BridgeResult<AudioBuffer> {
        Err(BridgeError::MissingApiKey("Gemini".to_string()))
    }
}

struct LiveRun {
    handle: LiveSessionHandle,
    events: mpsc::UnboundedReceiver<LiveEvent>,
    /// Segment last shown in full
    shown_index: usize,
}

enum Input {
    Line(Option<String>),
    Live(LiveEvent),
}

pub struct Shell {
    settings: Settings,
    app: HostApp<JsonFileStore>,
    generator: Arc<dyn ScriptGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    form: UploadForm,
    voice_draft: VoiceConfig,
    live: Option<LiveRun>,
    preview_sink: Option<Box<dyn AudioSink>>,
}

impl Shell {
    pub fn new(settings: Settings, store: JsonFileStore) -> Self {
        let (generator, synthesizer): (Arc<dyn ScriptGenerator>, Arc<dyn SpeechSynthesizer>) =
            match GeminiClient::new(&settings.genai) {
                Ok(client) => {
                    let client = Arc::new(client);
                    let generator: Arc<dyn ScriptGenerator> = client.clone();
                    let synthesizer: Arc<dyn SpeechSynthesizer> = client;
                    (generator, synthesizer)
                }
                Err(e) => {
                    warn!("Generative AI unavailable: {}", e);
                    let generator: Arc<dyn ScriptGenerator> = Arc::new(Offline);
                    let synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(Offline);
                    (generator, synthesizer)
                }
            };
        info!("Saving events under {}", store.path().display());

        Self {
            settings,
            app: HostApp::new(store),
            generator,
            synthesizer,
            form: UploadForm::new(),
            voice_draft: VoiceConfig::default(),
            live: None,
            preview_sink: None,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("AI Host Pro - type 'help' for commands");
        self.render();

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            self.prompt();
            let input = tokio::select! {
                line = lines.next_line() => Input::Line(line?),
                Some(event) = next_live_event(self.live.as_mut()) => Input::Live(event),
            };

            match input {
                Input::Line(None) => break,
                Input::Line(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    if !self.handle_line(&line).await {
                        break;
                    }
                }
                Input::Live(event) => self.on_live_event(event),
            }
        }

        self.stop_live();
        Ok(())
    }

    fn prompt(&self) {
        let label = match self.app.view() {
            AppView::Dashboard => "home",
            AppView::Upload => "new",
            AppView::Timeline => "script",
            AppView::Voice => "voice",
            AppView::Live => "live",
        };
        print!("{}> ", label);
        let _ = std::io::stdout().flush();
    }

    fn render(&self) {
        let text = match self.app.view() {
            AppView::Dashboard => views::render_dashboard(self.app.projects()),
            AppView::Upload => views::render_upload(&self.form),
            AppView::Timeline => match self.app.active() {
                Some(project) => views::render_timeline(project),
                None => String::new(),
            },
            AppView::Voice => views::render_voice(&self.voice_draft),
            AppView::Live => match self.app.active() {
                Some(project) => {
                    let status = match &self.live {
                        Some(run) => run.handle.status(),
                        None => LiveStatus {
                            state: PlaybackState::Idle,
                            current_index: 0,
                            is_speaking: false,
                            segment_count: project.segments.len(),
                        },
                    };
                    format!("{}{}\n", views::render_live(project, &status), help_text(AppView::Live))
                }
                None => String::new(),
            },
        };
        print!("{}", text);
    }

    /// Returns false when the shell should exit
    async fn handle_line(&mut self, line: &str) -> bool {
        let command = match parse_command(self.app.view(), line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                return true;
            }
        };

        if let Err(e) = self.execute(command.clone()).await {
            println!("{}", e);
        }
        !matches!(command, ShellCommand::Quit)
    }

    async fn execute(&mut self, command: ShellCommand) -> Result<(), HostError> {
        match command {
            ShellCommand::Help => println!("{}\nhelp, home, quit", help_text(self.app.view())),
            ShellCommand::Quit => {}
            ShellCommand::Home => {
                self.stop_live();
                self.app.go_home();
                self.render();
            }

            ShellCommand::List => self.render(),
            ShellCommand::Open(index) => {
                let id = self
                    .app
                    .projects()
                    .get(index)
                    .map(|p| p.id.clone())
                    .ok_or_else(|| HostError::ProjectNotFound(format!("#{}", index + 1)))?;
                self.app.select_project(&id)?;
                self.enter_view();
            }
            ShellCommand::New => {
                self.form = UploadForm::new();
                self.app.create_new();
                self.render();
            }

            ShellCommand::Name(name) => self.form.event_name = name,
            ShellCommand::Description(text) => self.form.description = text,
            ShellCommand::AddFile(path) => {
                if !path.exists() {
                    println!("Note: {} does not exist; it will be sent as a placeholder", path.display());
                }
                self.form.intake.add(path);
                print!("{}", views::render_files(&self.form));
            }
            ShellCommand::RemoveFile(index) => {
                match self.form.intake.files().get(index).map(|f| f.id.clone()) {
                    Some(id) => {
                        self.form.intake.remove(&id);
                    }
                    None => println!("No document #{}", index + 1),
                }
                print!("{}", views::render_files(&self.form));
            }
            ShellCommand::ClearFiles => {
                self.form.intake.clear();
                print!("{}", views::render_files(&self.form));
            }
            ShellCommand::Files => print!("{}", views::render_files(&self.form)),
            ShellCommand::Generate => {
                println!("Analyzing documents and writing the script...");
                let generator = self.generator.clone();
                self.app
                    .process_upload(&mut self.form, generator.as_ref(), |p| println!("  {}", p))
                    .await?;
                self.form = UploadForm::new();
                self.render();
            }
            ShellCommand::Cancel => {
                self.app.cancel_upload();
                self.render();
            }

            ShellCommand::Show => self.render(),
            ShellCommand::Title(index, text) => {
                let id = self.segment_id(index)?;
                self.app.update_segment(&id, Some(text), None)?;
                self.render();
            }
            ShellCommand::Script(index, text) => {
                let id = self.segment_id(index)?;
                self.app.update_segment(&id, None, Some(text))?;
                self.render();
            }
            ShellCommand::ToVoice => {
                self.app.proceed_to_voice()?;
                self.voice_draft = self
                    .app
                    .active()
                    .and_then(|p| p.voice_config.clone())
                    .unwrap_or_default();
                self.render();
            }

            ShellCommand::Gender(gender) => {
                self.voice_draft.set_gender(gender);
                self.render();
            }
            ShellCommand::Tone(tone) => {
                self.voice_draft.set_tone(tone);
                self.render();
            }
            ShellCommand::Accent(accent) => {
                self.voice_draft.set_accent(accent);
                self.render();
            }
            ShellCommand::Speed(speed) => {
                self.voice_draft.set_speed(speed);
                self.render();
            }
            ShellCommand::Pitch(pitch) => {
                self.voice_draft.set_pitch(pitch);
                self.render();
            }
            ShellCommand::Preview => self.preview_voice().await,
            ShellCommand::Confirm => {
                self.app.confirm_voice(self.voice_draft.clone())?;
                self.enter_view();
            }
            ShellCommand::Back => {
                self.app.back_to_timeline();
                self.render();
            }

            ShellCommand::Live(command) => match &self.live {
                Some(run) => {
                    if !run.handle.send(command) {
                        println!("The session has already ended");
                    }
                }
                None => println!("No live session is running"),
            },
        }
        Ok(())
    }

    fn segment_id(&self, index: usize) -> Result<String, HostError> {
        let project = self.app.active().ok_or(HostError::NoActiveProject)?;
        project
            .segments
            .get(index)
            .map(|s| s.id.clone())
            .ok_or_else(|| HostError::SegmentNotFound(format!("#{}", index + 1)))
    }

    /// Render the current view, starting the live session when it is Live
    fn enter_view(&mut self) {
        if self.app.view() == AppView::Live {
            if let Err(e) = self.start_live() {
                println!("{}", e);
            }
        }
        self.render();
    }

    fn start_live(&mut self) -> Result<(), HostError> {
        self.stop_live();
        self.stop_preview();
        let (segments, voice) = self.app.live_program()?;
        let sink = open_output(self.settings.playback.mute);
        let (handle, events) = spawn_live_session(
            segments,
            voice,
            self.synthesizer.clone(),
            sink,
            self.settings.sequencer_config(),
        );
        self.live = Some(LiveRun {
            handle,
            events,
            shown_index: 0,
        });
        Ok(())
    }

    fn stop_live(&mut self) {
        if let Some(run) = self.live.take() {
            if run.handle.status().state != PlaybackState::Finished {
                let _ = run.handle.send(LiveCommand::End);
            }
        }
    }

    fn on_live_event(&mut self, event: LiveEvent) {
        match event {
            LiveEvent::StatusChanged(status) => {
                let moved = match self.live.as_mut() {
                    Some(run) if run.shown_index != status.current_index => {
                        run.shown_index = status.current_index;
                        true
                    }
                    _ => false,
                };
                if let Some(project) = self.app.active() {
                    if moved {
                        print!("\r{}", views::render_live(project, &status));
                    } else {
                        println!("\r{}", views::render_live_status(project, &status));
                    }
                }
            }
            LiveEvent::SegmentUnvoiced { index, title } => {
                println!("\rSegment {} ({}) could not be voiced", index + 1, title);
            }
            LiveEvent::Finished => {
                println!("\rThe event has finished.");
                self.live = None;
                self.app.finish_event();
                self.render();
            }
        }
    }

    async fn preview_voice(&mut self) {
        println!("Previewing {}...", self.voice_draft.voice_name());
        let request = self.voice_draft.speech_request(PREVIEW_LINE);
        let audio = match self.synthesizer.synthesize(request).await {
            Ok(audio) => audio,
            Err(e) => {
                println!("Preview failed: {}", e);
                return;
            }
        };

        let mute = self.settings.playback.mute;
        let sink = self.preview_sink.get_or_insert_with(|| open_output(mute));
        if let Err(e) = sink.play(audio, Box::new(|| {})) {
            println!("Preview failed: {}", e);
        }
    }

    fn stop_preview(&mut self) {
        if let Some(sink) = self.preview_sink.as_mut() {
            sink.stop();
        }
    }
}

async fn next_live_event(live: Option<&mut LiveRun>) -> Option<LiveEvent> {
    match live {
        Some(run) => run.events.recv().await,
        None => std::future::pending().await,
    }
}
