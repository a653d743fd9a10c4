//! Upload form: event details plus the queued source documents

use crate::intake::DocumentIntake;

#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    pub event_name: String,
    pub description: String,
    pub intake: DocumentIntake,
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A name and at least one file are required before generation
    pub fn is_complete(&self) -> bool {
        !self.event_name.trim().is_empty() && !self.intake.is_empty()
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.event_name.trim().is_empty() {
            missing.push("event name");
        }
        if self.intake.is_empty() {
            missing.push("at least one document");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness() {
        let mut form = UploadForm::new();
        assert_eq!(form.missing_fields(), vec!["event name", "at least one document"]);

        form.event_name = "   ".to_string();
        form.intake.add("agenda.txt");
        assert!(!form.is_complete());

        form.event_name = "DevConf".to_string();
        assert!(form.is_complete());
        assert!(form.missing_fields().is_empty());
    }
}
