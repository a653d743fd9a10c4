//! Document intake
//!
//! Turns the organizer's uploaded files into one text blob for the script
//! generator. Documents are not parsed: the first [`SAMPLE_LIMIT_BYTES`] of
//! each file are read as (lossy) UTF-8. This is a placeholder for a real
//! extraction pipeline, and binary formats yield mostly noise.

use log::{debug, info, warn};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Bytes sampled from the head of each file
pub const SAMPLE_LIMIT_BYTES: usize = 10_000;

/// Display-only document category, derived from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Pptx,
    Txt,
    Xlsx,
    Other,
}

impl DocumentKind {
    pub fn from_file_name(name: &str) -> Self {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => DocumentKind::Pdf,
            "doc" | "docx" => DocumentKind::Docx,
            "ppt" | "pptx" => DocumentKind::Pptx,
            "txt" | "md" => DocumentKind::Txt,
            "xls" | "xlsx" => DocumentKind::Xlsx,
            _ => DocumentKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Docx => "docx",
            DocumentKind::Pptx => "pptx",
            DocumentKind::Txt => "txt",
            DocumentKind::Xlsx => "xlsx",
            DocumentKind::Other => "other",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeStatus {
    Pending,
    Processing,
    Done,
    /// The file could not be read; a placeholder was used instead
    Error,
}

impl fmt::Display for IntakeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IntakeStatus::Pending => "pending",
            IntakeStatus::Processing => "processing",
            IntakeStatus::Done => "done",
            IntakeStatus::Error => "error",
        };
        f.write_str(label)
    }
}

/// A file queued for intake
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub id: String,
    pub name: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
    pub status: IntakeStatus,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Unknown")
            .to_string();

        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind: DocumentKind::from_file_name(&name),
            name,
            path,
            status: IntakeStatus::Pending,
        }
    }
}

/// Reported before each file is processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeProgress {
    /// Zero-based position in the file list
    pub index: usize,
    pub total: usize,
    pub name: String,
}

impl fmt::Display for IntakeProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}] Reading {}", self.index + 1, self.total, self.name)
    }
}

/// Read the head of a file as text
pub fn extract_sample(path: &Path) -> io::Result<String> {
    let mut bytes = Vec::with_capacity(SAMPLE_LIMIT_BYTES);
    File::open(path)?
        .take(SAMPLE_LIMIT_BYTES as u64)
        .read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Stand-in text for a file that yielded nothing
pub fn placeholder(name: &str) -> String {
    format!("[Binary Content from {}]", name)
}

/// Section header and body for one source inside the combined blob
pub fn frame_source(name: &str, text: &str) -> String {
    format!("\n--- SOURCE: {} ---\n{}\n", name, text)
}

/// Ordered list of files to feed the script generator
#[derive(Debug, Clone, Default)]
pub struct DocumentIntake {
    files: Vec<SourceFile>,
}

impl DocumentIntake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file; returns its id
    pub fn add(&mut self, path: impl Into<PathBuf>) -> String {
        let file = SourceFile::new(path);
        debug!("Queued {} ({})", file.name, file.kind);
        let id = file.id.clone();
        self.files.push(file);
        id
    }

    /// Remove a queued file by id
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.files.len();
        self.files.retain(|f| f.id != id);
        self.files.len() != before
    }

    /// Drop every queued file
    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Read every file in order and concatenate the framed samples.
    ///
    /// Unreadable or empty files contribute a placeholder; the pipeline never aborts.
    pub fn extract_all<F>(&mut self, mut progress: F) -> String
    where
        F: FnMut(&IntakeProgress),
    {
        let total = self.files.len();
        let mut combined = String::new();

        for (index, file) in self.files.iter_mut().enumerate() {
            progress(&IntakeProgress {
                index,
                total,
                name: file.name.clone(),
            });
            file.status = IntakeStatus::Processing;

            let text = match extract_sample(&file.path) {
                Ok(text) if !text.is_empty() => {
                    file.status = IntakeStatus::Done;
                    text
                }
                Ok(_) => {
                    file.status = IntakeStatus::Done;
                    placeholder(&file.name)
                }
                Err(e) => {
                    warn!("Could not read {}: {}", file.path.display(), e);
                    file.status = IntakeStatus::Error;
                    placeholder(&file.name)
                }
            };
            combined.push_str(&frame_source(&file.name, &text));
        }

        info!("Intake finished: {} files, {} bytes", total, combined.len());
        combined
    }
}
