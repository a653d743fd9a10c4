//! Operator commands, parsed per view
//!
//! Segment and event numbers are 1-based on screen and 0-based here.

use hostpro_event::{Accent, AppView, Gender, LiveCommand, Tone};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Help,
    Quit,
    Home,

    // Dashboard
    List,
    Open(usize),
    New,

    // Upload
    Name(String),
    Description(String),
    AddFile(PathBuf),
    RemoveFile(usize),
    ClearFiles,
    Files,
    Generate,
    Cancel,

    // Timeline
    Show,
    Title(usize, String),
    Script(usize, String),
    ToVoice,

    // Voice
    Gender(Gender),
    Tone(Tone),
    Accent(Accent),
    Speed(f32),
    Pitch(f32),
    Preview,
    Confirm,
    Back,

    // Live
    Live(LiveCommand),
}

/// Parse one input line in the context of the current view
pub fn parse_command(view: AppView, line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    let word = word.to_lowercase();

    match word.as_str() {
        "help" | "?" => return Ok(ShellCommand::Help),
        "quit" | "exit" => return Ok(ShellCommand::Quit),
        "home" => return Ok(ShellCommand::Home),
        _ => {}
    }

    let command = match (view, word.as_str()) {
        (AppView::Dashboard, "list" | "ls") => ShellCommand::List,
        (AppView::Dashboard, "open") => ShellCommand::Open(parse_number(rest)?),
        (AppView::Dashboard, "new") => ShellCommand::New,

        (AppView::Upload, "name") => ShellCommand::Name(required_text(rest, "an event name")?),
        (AppView::Upload, "desc") => ShellCommand::Description(rest.to_string()),
        (AppView::Upload, "add") => ShellCommand::AddFile(PathBuf::from(required_text(rest, "a file path")?)),
        (AppView::Upload, "remove" | "rm") => ShellCommand::RemoveFile(parse_number(rest)?),
        (AppView::Upload, "clear") => ShellCommand::ClearFiles,
        (AppView::Upload, "files") => ShellCommand::Files,
        (AppView::Upload, "generate") => ShellCommand::Generate,
        (AppView::Upload, "cancel") => ShellCommand::Cancel,

        (AppView::Timeline, "show") => ShellCommand::Show,
        (AppView::Timeline, "title") => {
            let (index, text) = numbered_text(rest)?;
            ShellCommand::Title(index, text)
        }
        (AppView::Timeline, "script") => {
            let (index, text) = numbered_text(rest)?;
            ShellCommand::Script(index, text)
        }
        (AppView::Timeline, "voice") => ShellCommand::ToVoice,

        (AppView::Voice, "gender") => ShellCommand::Gender(rest.parse()?),
        (AppView::Voice, "tone") => ShellCommand::Tone(rest.parse()?),
        (AppView::Voice, "accent") => ShellCommand::Accent(rest.parse()?),
        (AppView::Voice, "speed") => ShellCommand::Speed(parse_rate(rest)?),
        (AppView::Voice, "pitch") => ShellCommand::Pitch(parse_rate(rest)?),
        (AppView::Voice, "preview") => ShellCommand::Preview,
        (AppView::Voice, "confirm") => ShellCommand::Confirm,
        (AppView::Voice, "back") => ShellCommand::Back,

        (AppView::Live, "pause") => ShellCommand::Live(LiveCommand::Pause),
        (AppView::Live, "resume") => ShellCommand::Live(LiveCommand::Resume),
        (AppView::Live, "p") => ShellCommand::Live(LiveCommand::TogglePause),
        (AppView::Live, "next" | "n") => ShellCommand::Live(LiveCommand::Next),
        (AppView::Live, "prev" | "b") => ShellCommand::Live(LiveCommand::Previous),
        (AppView::Live, "end") => ShellCommand::Live(LiveCommand::End),

        _ => return Err(format!("unknown command '{}' (type 'help')", word)),
    };
    Ok(command)
}

fn parse_number(text: &str) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("expected a number from 1, got '{}'", text)),
    }
}

fn parse_rate(text: &str) -> Result<f32, String> {
    text.parse::<f32>()
        .map_err(|_| format!("expected a number such as 1.0, got '{}'", text))
}

fn required_text(text: &str, what: &str) -> Result<String, String> {
    if text.is_empty() {
        Err(format!("expected {}", what))
    } else {
        Ok(text.to_string())
    }
}

fn numbered_text(text: &str) -> Result<(usize, String), String> {
    let (number, rest) = text
        .split_once(char::is_whitespace)
        .ok_or_else(|| "expected a segment number and new text".to_string())?;
    Ok((parse_number(number)?, required_text(rest.trim(), "new text")?))
}

/// Commands available in a view, for `help`
pub fn help_text(view: AppView) -> &'static str {
    match view {
        AppView::Dashboard => {
            "list              show saved events\n\
             open <n>          open event n\n\
             new               plan a new event"
        }
        AppView::Upload => {
            "name <text>       event name\n\
             desc <text>       short description\n\
             add <path>        queue a document\n\
             remove <n>        drop queued document n\n\
             clear             drop every queued document\n\
             files             list queued documents\n\
             generate          read documents and write the script\n\
             cancel            back to the dashboard"
        }
        AppView::Timeline => {
            "show              show the script\n\
             title <n> <text>  rename segment n\n\
             script <n> <text> replace the script of segment n\n\
             voice             choose the anchor's voice"
        }
        AppView::Voice => {
            "gender <male|female>\n\
             tone <formal|energetic|calm|authoritative>\n\
             accent <indian|british|global>\n\
             speed <0.5-2.0>   pitch <0.5-2.0>\n\
             preview           hear a sample line\n\
             confirm           save the event and go live\n\
             back              return to the script"
        }
        AppView::Live => {
            "p                 pause / resume\n\
             pause | resume\n\
             next (n)          skip to the next segment\n\
             prev (b)          back to the previous segment\n\
             end               finish the event"
        }
    }
}
