//! Upload → generation → timeline → voice → saved, against a fake generator

use async_trait::async_trait;
use hostpro_bridge::{BridgeResult, GeneratedSegment, ScriptGenerator};
use hostpro_event::{
    AppView, HostApp, IntakeStatus, JsonFileStore, ProjectStatus, ProjectStore, UploadForm, VoiceConfig,
};
use parking_lot::Mutex;

#[derive(Default)]
struct RecordingGenerator {
    calls: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl ScriptGenerator for RecordingGenerator {
    async fn generate(&self, event_name: &str, content: &str) -> BridgeResult<Vec<GeneratedSegment>> {
        self.calls.lock().push((event_name.to_string(), content.to_string()));
        Ok(vec![
            GeneratedSegment {
                id: "1".to_string(),
                title: "Opening".to_string(),
                segment_type: "Welcome".to_string(),
                content: "Good morning and welcome to DevConf.".to_string(),
                duration_minutes: 5.0,
                speaker_name: None,
            },
            GeneratedSegment {
                id: "2".to_string(),
                title: "Keynote".to_string(),
                segment_type: "Introduction".to_string(),
                content: "Please welcome our keynote speaker.".to_string(),
                duration_minutes: 3.0,
                speaker_name: Some("Dr. Rao".to_string()),
            },
            GeneratedSegment {
                id: "3".to_string(),
                title: "Thanks".to_string(),
                segment_type: "Vote of Thanks".to_string(),
                content: "Thank you all for coming.".to_string(),
                duration_minutes: 2.0,
                speaker_name: None,
            },
        ])
    }
}

fn agenda_text() -> String {
    let mut text = String::from("Welcome everyone to DevConf 2025.\n");
    let mut hour = 9;
    while text.len() < 5_000 {
        text.push_str(&format!(
            "{:02}:00 Session on systems programming, followed by questions from the audience.\n",
            hour % 24
        ));
        hour += 1;
    }
    text
}

#[tokio::test]
async fn test_agenda_upload_to_saved_event() {
    let dir = tempfile::tempdir().unwrap();
    let agenda_path = dir.path().join("agenda.txt");
    let agenda = agenda_text();
    std::fs::write(&agenda_path, &agenda).unwrap();

    let store_dir = dir.path().join("data");
    let mut app = HostApp::new(JsonFileStore::new(&store_dir));
    let generator = RecordingGenerator::default();

    app.create_new();
    assert_eq!(app.view(), AppView::Upload);

    let mut form = UploadForm::new();
    form.event_name = "DevConf".to_string();
    form.intake.add(&agenda_path);

    let mut progress = Vec::new();
    app.process_upload(&mut form, &generator, |p| progress.push(p.to_string()))
        .await
        .unwrap();

    // Exactly one framed section carrying the whole (sub-limit) file
    let expected_blob = format!("\n--- SOURCE: agenda.txt ---\n{}\n", agenda);
    let calls = generator.calls.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "DevConf");
    assert_eq!(calls[0].1, expected_blob);
    assert_eq!(calls[0].1.matches("--- SOURCE:").count(), 1);
    assert!(calls[0].1.contains("Welcome everyone"));
    assert_eq!(progress, vec!["[1/1] Reading agenda.txt".to_string()]);
    assert_eq!(form.intake.files()[0].status, IntakeStatus::Done);

    assert_eq!(app.view(), AppView::Timeline);
    let project = app.active().unwrap();
    assert_eq!(project.segments.len(), 3);
    assert_eq!(project.raw_content, expected_blob);
    assert_eq!(project.segments[1].speaker_name.as_deref(), Some("Dr. Rao"));

    app.proceed_to_voice().unwrap();
    app.confirm_voice(VoiceConfig::default()).unwrap();
    assert_eq!(app.view(), AppView::Live);

    // A fresh app sees the confirmed event
    let reopened = HostApp::new(JsonFileStore::new(&store_dir));
    assert_eq!(reopened.projects(), app.projects());
    assert_eq!(reopened.projects()[0].status, ProjectStatus::Ready);
    assert_eq!(JsonFileStore::new(&store_dir).load().unwrap().len(), 1);
}
