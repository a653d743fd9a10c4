//! Application controller
//!
//! Owns the view state and the project list, and performs every navigation
//! the operator can trigger. Rendering and the live session live elsewhere;
//! this type only decides what is shown and what is saved.

use hostpro_bridge::ScriptGenerator;
use log::{info, warn};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::intake::IntakeProgress;
use crate::project::{segments_from_generated, EventProject, EventSegment, ProjectStatus};
use crate::store::{ProjectStore, StoreError};
use crate::upload::UploadForm;
use crate::voice::VoiceConfig;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("upload is incomplete: {0}")]
    IncompleteUpload(String),

    #[error("reading the documents failed: {0}")]
    IntakeFailed(String),

    #[error("no script could be generated: {0}")]
    GenerationFailed(String),

    #[error("no event is open")]
    NoActiveProject,

    #[error("event {0} not found")]
    ProjectNotFound(String),

    #[error("segment {0} not found")]
    SegmentNotFound(String),

    #[error("the script is locked once the voice has been confirmed")]
    ProjectLocked,

    #[error("the event has no voice configured")]
    VoiceNotConfigured,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppView {
    Dashboard,
    Upload,
    Timeline,
    Voice,
    Live,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: AppView,
    /// Saved projects, in save order
    pub projects: Vec<EventProject>,
    /// Project being edited or hosted; may not be saved yet
    pub active: Option<EventProject>,
}

pub struct HostApp<S: ProjectStore> {
    state: AppState,
    store: S,
}

impl<S: ProjectStore> HostApp<S> {
    /// Load saved projects and open the dashboard
    pub fn new(store: S) -> Self {
        let projects = match store.load() {
            Ok(projects) => projects,
            Err(e) => {
                warn!("Could not load saved events, starting empty: {}", e);
                Vec::new()
            }
        };
        Self {
            state: AppState {
                view: AppView::Dashboard,
                projects,
                active: None,
            },
            store,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn view(&self) -> AppView {
        self.state.view
    }

    pub fn projects(&self) -> &[EventProject] {
        &self.state.projects
    }

    pub fn active(&self) -> Option<&EventProject> {
        self.state.active.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_new(&mut self) {
        self.state.active = None;
        self.state.view = AppView::Upload;
    }

    pub fn cancel_upload(&mut self) {
        self.state.view = AppView::Dashboard;
    }

    /// Read the uploaded documents, generate a script and open it on the timeline.
    ///
    /// On failure the view stays on Upload so the form can be retried.
    pub async fn process_upload<F>(
        &mut self,
        form: &mut UploadForm,
        generator: &dyn ScriptGenerator,
        mut progress: F,
    ) -> HostResult<()>
    where
        F: FnMut(&IntakeProgress),
    {
        if !form.is_complete() {
            return Err(HostError::IncompleteUpload(format!(
                "missing {}",
                form.missing_fields().join(" and ")
            )));
        }

        let content = Self::read_documents(form, &mut progress).await?;
        let event_name = form.event_name.trim().to_string();

        let generated = generator
            .generate(&event_name, &content)
            .await
            .map_err(|e| HostError::GenerationFailed(e.to_string()))?;
        if generated.is_empty() {
            return Err(HostError::GenerationFailed("the script was empty".to_string()));
        }
        let segments =
            segments_from_generated(generated).map_err(|e| HostError::GenerationFailed(e.to_string()))?;

        info!("Generated {} segments for \"{}\"", segments.len(), event_name);
        self.state.active = Some(EventProject::new_draft(
            event_name,
            form.description.trim(),
            content,
            segments,
        ));
        self.state.view = AppView::Timeline;
        Ok(())
    }

    /// Run intake on the blocking pool, forwarding progress as each file starts
    async fn read_documents<F>(form: &mut UploadForm, progress: &mut F) -> HostResult<String>
    where
        F: FnMut(&IntakeProgress),
    {
        let mut intake = form.intake.clone();
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();
        let reading = tokio::task::spawn_blocking(move || {
            let content = intake.extract_all(|update| {
                let _ = progress_tx.send(update.clone());
            });
            (intake, content)
        });

        while let Some(update) = progress_rx.recv().await {
            progress(&update);
        }
        let (intake, content) = reading
            .await
            .map_err(|e| HostError::IntakeFailed(e.to_string()))?;
        form.intake = intake;
        Ok(content)
    }

    /// Edit a segment's title and/or content while the script is still a draft
    pub fn update_segment(
        &mut self,
        segment_id: &str,
        title: Option<String>,
        content: Option<String>,
    ) -> HostResult<()> {
        let project = self.state.active.as_mut().ok_or(HostError::NoActiveProject)?;
        if !project.is_editable() {
            return Err(HostError::ProjectLocked);
        }
        let segment = project
            .segment_mut(segment_id)
            .ok_or_else(|| HostError::SegmentNotFound(segment_id.to_string()))?;

        if let Some(title) = title {
            segment.title = title;
        }
        if let Some(content) = content {
            segment.content = content;
        }
        Ok(())
    }

    pub fn proceed_to_voice(&mut self) -> HostResult<()> {
        if self.state.active.is_none() {
            return Err(HostError::NoActiveProject);
        }
        self.state.view = AppView::Voice;
        Ok(())
    }

    pub fn back_to_timeline(&mut self) {
        self.state.view = AppView::Timeline;
    }

    /// Attach the persona, mark the event ready, save it and go live
    pub fn confirm_voice(&mut self, config: VoiceConfig) -> HostResult<()> {
        let project = self.state.active.as_mut().ok_or(HostError::NoActiveProject)?;
        project.voice_config = Some(config);
        project.status = ProjectStatus::Ready;
        let project = project.clone();

        match self.state.projects.iter_mut().find(|p| p.id == project.id) {
            Some(existing) => *existing = project,
            None => self.state.projects.push(project),
        }
        self.store.save(&self.state.projects)?;

        info!("Event ready, {} saved events", self.state.projects.len());
        self.state.view = AppView::Live;
        Ok(())
    }

    /// Open a saved event: live if ready, otherwise on the timeline
    pub fn select_project(&mut self, project_id: &str) -> HostResult<()> {
        let project = self
            .state
            .projects
            .iter()
            .find(|p| p.id == project_id)
            .cloned()
            .ok_or_else(|| HostError::ProjectNotFound(project_id.to_string()))?;

        self.state.view = if project.status == ProjectStatus::Ready {
            AppView::Live
        } else {
            AppView::Timeline
        };
        self.state.active = Some(project);
        Ok(())
    }

    /// Segments and persona for hosting the active event
    pub fn live_program(&self) -> HostResult<(Vec<EventSegment>, VoiceConfig)> {
        let project = self.state.active.as_ref().ok_or(HostError::NoActiveProject)?;
        let voice = project.voice_config.clone().ok_or(HostError::VoiceNotConfigured)?;
        Ok((project.segments.clone(), voice))
    }

    pub fn finish_event(&mut self) {
        self.state.active = None;
        self.state.view = AppView::Dashboard;
    }

    pub fn go_home(&mut self) {
        self.state.view = AppView::Dashboard;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::IntakeStatus;
    use crate::store::MemoryStore;
    use crate::voice::{Accent, Gender, Tone};
    use async_trait::async_trait;
    use hostpro_bridge::{BridgeError, BridgeResult, GeneratedSegment};
    use parking_lot::Mutex;

    struct FakeGenerator {
        reply: Mutex<Option<BridgeResult<Vec<GeneratedSegment>>>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl FakeGenerator {
        fn replying(reply: BridgeResult<Vec<GeneratedSegment>>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ScriptGenerator for FakeGenerator {
        async fn generate(&self, event_name: &str, content: &str) -> BridgeResult<Vec<GeneratedSegment>> {
            self.calls.lock().push((event_name.to_string(), content.to_string()));
            self.reply.lock().take().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn segment(id: &str, kind: &str) -> GeneratedSegment {
        GeneratedSegment {
            id: id.to_string(),
            title: format!("Title {}", id),
            segment_type: kind.to_string(),
            content: format!("Content {}", id),
            duration_minutes: 2.0,
            speaker_name: None,
        }
    }

    fn form_with_file(dir: &tempfile::TempDir) -> UploadForm {
        let path = dir.path().join("agenda.txt");
        std::fs::write(&path, "9:00 Welcome everyone").unwrap();
        let mut form = UploadForm::new();
        form.event_name = "DevConf".to_string();
        form.description = "Annual meetup".to_string();
        form.intake.add(path);
        form
    }

    async fn app_at_timeline() -> HostApp<MemoryStore> {
        let dir = tempfile::tempdir().unwrap();
        let mut app = HostApp::new(MemoryStore::new());
        let mut form = form_with_file(&dir);
        let generator = FakeGenerator::replying(Ok(vec![segment("1", "Welcome"), segment("2", "Closing")]));
        app.create_new();
        app.process_upload(&mut form, &generator, |_| {}).await.unwrap();
        app
    }

    #[tokio::test]
    async fn test_process_upload_opens_timeline() {
        let app = app_at_timeline().await;

        assert_eq!(app.view(), AppView::Timeline);
        let project = app.active().unwrap();
        assert_eq!(project.status, ProjectStatus::Draft);
        assert_eq!(project.segments.len(), 2);
        assert!(project.segments[0].is_current);
        assert!(project.raw_content.contains("--- SOURCE: agenda.txt ---"));
        // Not saved until the voice is confirmed
        assert!(app.projects().is_empty());
        assert!(app.store().raw().is_none());
    }

    #[tokio::test]
    async fn test_process_upload_reports_progress_and_file_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut form = form_with_file(&dir);
        form.intake.add(dir.path().join("missing.pdf"));
        let generator = FakeGenerator::replying(Ok(vec![segment("1", "Welcome")]));
        let mut app = HostApp::new(MemoryStore::new());
        app.create_new();

        let mut seen = Vec::new();
        app.process_upload(&mut form, &generator, |p| seen.push(p.to_string()))
            .await
            .unwrap();

        assert_eq!(
            seen,
            vec!["[1/2] Reading agenda.txt".to_string(), "[2/2] Reading missing.pdf".to_string()]
        );
        let statuses: Vec<IntakeStatus> = form.intake.files().iter().map(|f| f.status).collect();
        assert_eq!(statuses, vec![IntakeStatus::Done, IntakeStatus::Error]);

        let calls = generator.calls.lock();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].1.contains("9:00 Welcome everyone"));
        assert!(calls[0].1.contains("[Binary Content from missing.pdf]"));
    }

    #[tokio::test]
    async fn test_incomplete_upload_rejected() {
        let mut app = HostApp::new(MemoryStore::new());
        let generator = FakeGenerator::replying(Ok(vec![segment("1", "Welcome")]));
        let mut form = UploadForm::new();
        app.create_new();

        let result = app.process_upload(&mut form, &generator, |_| {}).await;

        assert!(matches!(result, Err(HostError::IncompleteUpload(_))));
        assert!(generator.calls.lock().is_empty());
        assert_eq!(app.view(), AppView::Upload);
    }

    #[tokio::test]
    async fn test_generation_failures_stay_on_upload() {
        let replies = vec![
            Err(BridgeError::EmptyResponse),
            Ok(Vec::new()),
            Ok(vec![segment("1", "Welcome"), segment("2", "Lunch")]),
        ];
        for reply in replies {
            let dir = tempfile::tempdir().unwrap();
            let mut app = HostApp::new(MemoryStore::new());
            let mut form = form_with_file(&dir);
            let generator = FakeGenerator::replying(reply);
            app.create_new();

            let result = app.process_upload(&mut form, &generator, |_| {}).await;

            assert!(matches!(result, Err(HostError::GenerationFailed(_))));
            assert_eq!(app.view(), AppView::Upload);
            assert!(app.active().is_none());
            assert_eq!(form.event_name, "DevConf");
            assert_eq!(form.intake.len(), 1);
        }
    }

    #[tokio::test]
    async fn test_update_segment_only_while_draft() {
        let mut app = app_at_timeline().await;
        let first = app.active().unwrap().segments[0].id.clone();

        app.update_segment(&first, Some("Grand Opening".to_string()), None)
            .unwrap();
        app.update_segment(&first, None, Some("Hello, world.".to_string()))
            .unwrap();
        let segment = &app.active().unwrap().segments[0];
        assert_eq!(segment.title, "Grand Opening");
        assert_eq!(segment.content, "Hello, world.");

        assert!(matches!(
            app.update_segment("missing", None, None),
            Err(HostError::SegmentNotFound(_))
        ));

        app.proceed_to_voice().unwrap();
        app.confirm_voice(VoiceConfig::default()).unwrap();
        assert!(matches!(
            app.update_segment(&first, Some("Late edit".to_string()), None),
            Err(HostError::ProjectLocked)
        ));
    }

    #[tokio::test]
    async fn test_confirm_voice_saves_and_goes_live() {
        let mut app = app_at_timeline().await;
        app.proceed_to_voice().unwrap();
        assert_eq!(app.view(), AppView::Voice);

        app.back_to_timeline();
        assert_eq!(app.view(), AppView::Timeline);
        app.proceed_to_voice().unwrap();

        let voice = VoiceConfig::new(Gender::Female, Tone::Calm, Accent::BritishNeutral);
        app.confirm_voice(voice.clone()).unwrap();

        assert_eq!(app.view(), AppView::Live);
        assert_eq!(app.projects().len(), 1);
        assert_eq!(app.projects()[0].status, ProjectStatus::Ready);
        assert_eq!(app.projects()[0].voice_config.as_ref(), Some(&voice));
        assert_eq!(app.store().load().unwrap(), app.projects().to_vec());

        let (segments, live_voice) = app.live_program().unwrap();
        assert_eq!(segments.len(), 2);
        assert_eq!(live_voice.voice_name(), "Zephyr");

        // Confirming again updates in place
        app.confirm_voice(VoiceConfig::default()).unwrap();
        assert_eq!(app.projects().len(), 1);
        assert_eq!(app.projects()[0].voice_config.as_ref().map(|v| v.voice_name()), Some("Kore"));
    }

    #[tokio::test]
    async fn test_select_project_routes_by_status() {
        let mut app = app_at_timeline().await;
        app.proceed_to_voice().unwrap();
        app.confirm_voice(VoiceConfig::default()).unwrap();
        let ready_id = app.projects()[0].id.clone();

        let mut draft = app.projects()[0].clone();
        draft.id = "draft-1".to_string();
        draft.status = ProjectStatus::Draft;
        draft.voice_config = None;
        let mut projects = app.projects().to_vec();
        projects.push(draft);
        let store = MemoryStore::new();
        store.save(&projects).unwrap();
        let mut app = HostApp::new(store);

        app.select_project(&ready_id).unwrap();
        assert_eq!(app.view(), AppView::Live);

        app.select_project("draft-1").unwrap();
        assert_eq!(app.view(), AppView::Timeline);
        assert!(matches!(app.live_program(), Err(HostError::VoiceNotConfigured)));

        assert!(matches!(
            app.select_project("nope"),
            Err(HostError::ProjectNotFound(_))
        ));

        app.finish_event();
        assert_eq!(app.view(), AppView::Dashboard);
        assert!(app.active().is_none());
    }

    #[test]
    fn test_new_tolerates_corrupt_store() {
        let app = HostApp::new(MemoryStore::with_raw("{broken"));
        assert!(app.projects().is_empty());
        assert_eq!(app.view(), AppView::Dashboard);
    }

    #[test]
    fn test_navigation_without_project() {
        let mut app = HostApp::new(MemoryStore::new());

        app.create_new();
        assert_eq!(app.view(), AppView::Upload);
        app.cancel_upload();
        assert_eq!(app.view(), AppView::Dashboard);

        assert!(matches!(app.proceed_to_voice(), Err(HostError::NoActiveProject)));
        assert!(matches!(
            app.confirm_voice(VoiceConfig::default()),
            Err(HostError::NoActiveProject)
        ));

        app.go_home();
        assert_eq!(app.view(), AppView::Dashboard);
    }
}
