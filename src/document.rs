//! Uploaded documents.

use chrono::{DateTime, Utc};

/// Characters shown by [`Document::preview`] by default
pub const PREVIEW_CHARS: usize = 1000;

/// An uploaded file and the text extracted from it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Sequence number of the upload within the session
    pub id: u64,
    /// Original file name
    pub name: String,
    pub bytes: Vec<u8>,
    pub uploaded_at: DateTime<Utc>,
    extracted: Option<ExtractedText>,
}

#[derive(Debug, Clone)]
struct ExtractedText {
    text: String,
    extracted_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: u64, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id,
            name: name.into(),
            bytes,
            uploaded_at: Utc::now(),
            extracted: None,
        }
    }

    /// The extracted text, once extraction has succeeded
    pub fn text(&self) -> Option<&str> {
        self.extracted.as_ref().map(|e| e.text.as_str())
    }

    pub fn extracted_at(&self) -> Option<DateTime<Utc>> {
        self.extracted.as_ref().map(|e| e.extracted_at)
    }

    /// Record the extracted text. Only the first extraction sticks.
    pub(crate) fn set_text(&mut self, text: String) -> &str {
        &self
            .extracted
            .get_or_insert_with(|| ExtractedText {
                text,
                extracted_at: Utc::now(),
            })
            .text
    }

    /// The first `limit` characters of the extracted text, with an ellipsis if cut short
    pub fn preview(&self, limit: usize) -> Option<String> {
        self.text().map(|text| match text.char_indices().nth(limit) {
            Some((end, _)) => format!("{}...", &text[..end]),
            None => text.to_string(),
        })
    }
}
