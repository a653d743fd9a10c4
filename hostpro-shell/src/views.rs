//! Text rendering of the five views

use hostpro_event::{
    EventProject, LiveStatus, PlaybackState, ProjectStatus, UploadForm, VoiceConfig,
};
use std::fmt::Write as _;

pub fn render_dashboard(projects: &[EventProject]) -> String {
    let mut out = String::from("== Dashboard ==\n");
    if projects.is_empty() {
        out.push_str("No events yet. Type 'new' to plan one.\n");
        return out;
    }
    for (i, project) in projects.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {} ({}) - {} segments, {}",
            i + 1,
            project.name,
            project.date,
            project.segments.len(),
            status_label(project.status)
        );
        let description = project.description.trim();
        let _ = writeln!(
            out,
            "     {}",
            if description.is_empty() { "No description provided." } else { description }
        );
    }
    out
}

fn status_label(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Draft => "draft",
        ProjectStatus::Ready => "ready to host",
        ProjectStatus::Archived => "archived",
    }
}

pub fn render_upload(form: &UploadForm) -> String {
    let mut out = String::from("== New Event ==\n");
    let name = if form.event_name.is_empty() {
        "(not set)"
    } else {
        form.event_name.as_str()
    };
    let _ = writeln!(out, "Name:        {}", name);
    if !form.description.is_empty() {
        let _ = writeln!(out, "Description: {}", form.description);
    }
    out.push_str(&render_files(form));
    out
}

pub fn render_files(form: &UploadForm) -> String {
    let mut out = String::new();
    if form.intake.is_empty() {
        out.push_str("Documents:   none queued\n");
        return out;
    }
    out.push_str("Documents:\n");
    for (i, file) in form.intake.files().iter().enumerate() {
        let _ = writeln!(out, "{:>3}. {} [{}] {}", i + 1, file.name, file.kind, file.status);
    }
    out
}

pub fn render_timeline(project: &EventProject) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "== {} ==  {} segments, about {:.0} min{}",
        project.name,
        project.segments.len(),
        project.total_minutes(),
        if project.is_editable() { "" } else { " (locked)" }
    );
    for (i, segment) in project.segments.iter().enumerate() {
        let _ = write!(
            out,
            "{:>3}. [{}] {} ({} min)",
            i + 1,
            segment.segment_type,
            segment.title,
            segment.duration_minutes
        );
        if let Some(speaker) = &segment.speaker_name {
            let _ = write!(out, " - {}", speaker);
        }
        out.push('\n');
        let _ = writeln!(out, "       {}", segment.content);
    }
    out
}

pub fn render_voice(config: &VoiceConfig) -> String {
    format!(
        "== Voice ==\n\
         Gender: {}\n\
         Tone:   {}\n\
         Accent: {}\n\
         Speed:  {:.1}x   Pitch: {:.1}x\n\
         Voice:  {}\n",
        config.gender(),
        config.tone(),
        config.accent(),
        config.speed(),
        config.pitch(),
        config.voice_name()
    )
}

/// One status line for the live view
pub fn render_live_status(project: &EventProject, status: &LiveStatus) -> String {
    let title = project
        .segments
        .get(status.current_index)
        .map(|s| s.title.as_str())
        .unwrap_or("");
    let marker = match status.state {
        PlaybackState::Speaking => "ON AIR",
        PlaybackState::RequestingAudio => "preparing",
        PlaybackState::Paused => "paused",
        PlaybackState::Idle => "standby",
        PlaybackState::Finished => "finished",
    };
    format!(
        "[{}] {}/{} {}",
        marker,
        (status.current_index + 1).min(status.segment_count.max(1)),
        status.segment_count,
        title
    )
}

/// Full live view: the segment on air, its script, who it is for, and the program flow
pub fn render_live(project: &EventProject, status: &LiveStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== LIVE: {} ==", project.name);
    let _ = writeln!(out, "{}", render_live_status(project, status));

    if let Some(segment) = project.segments.get(status.current_index) {
        let _ = writeln!(out, "  \"{}\"", segment.content);
        let _ = writeln!(
            out,
            "Speaker: {}",
            segment.speaker_name.as_deref().unwrap_or("Host Solo")
        );
    }

    out.push_str("Program flow:\n");
    for (i, segment) in project.segments.iter().enumerate() {
        let marker = if i == status.current_index {
            ">>"
        } else if i < status.current_index {
            "ok"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:<2} {:>2}. {} [{}]",
            marker,
            i + 1,
            segment.title,
            segment.segment_type
        );
    }
    out
}
