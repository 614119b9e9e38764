//! The per-user workflow: upload → extract → summarize → narrate.
//!
//! A [`Session`] caches each stage's output so repeated actions never redo earlier stages.
//! A new upload throws everything away. Re-running a stage overwrites that stage's
//! artifact; artifacts derived from the old one are kept but reported stale.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tempfile::TempDir;
use thiserror::Error;

use crate::document::Document;
use crate::extract::{ExtractionError, PdfExtractor, TextExtractor};
use crate::narration::{
    NarrationEngine, SpeechSynthesizer, SynthesisError, AUDIO_FILE_NAME, AUDIO_MIME_TYPE,
};
use crate::summarizer::{ChunkedSummarizer, ModelInvocationError, ModelLoader};
use crate::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Idle,
    Uploaded,
    Extracted,
    Summarized,
    Narrated,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStage::Idle => "idle",
            SessionStage::Uploaded => "uploaded",
            SessionStage::Extracted => "extracted",
            SessionStage::Summarized => "summarized",
            SessionStage::Narrated => "narrated",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Model(#[from] ModelInvocationError),
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error("cannot {action} while the session is {stage}")]
    InvalidTransition {
        stage: SessionStage,
        action: &'static str,
    },
}

fn invalid(stage: SessionStage, action: &'static str) -> SessionError {
    tracing::warn!(%stage, action, "Rejected session action");
    SessionError::InvalidTransition { stage, action }
}

/// The bullet summary of one document.
#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub text: String,
    /// Id of the [`Document`] this was derived from
    pub document_id: u64,
    /// Increases every time a summary is generated in the session
    pub revision: u64,
    /// Chunks the text was split into, 0 for a blank document
    pub chunk_count: usize,
    pub generated_at: DateTime<Utc>,
}

/// Narrated audio of a [`DocumentSummary`], kept in the session's temp directory.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    /// Revision of the summary that was read out
    pub summary_revision: u64,
    pub generated_at: DateTime<Utc>,
}

/// What the user gets when saving the audio.
#[derive(Debug, Clone, Copy)]
pub struct Download<'a> {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub bytes: &'a [u8],
}

pub struct Session<E: TextExtractor = PdfExtractor> {
    extractor: E,
    max_upload_bytes: usize,
    stage: SessionStage,
    document: Option<Document>,
    summary: Option<DocumentSummary>,
    audio: Option<AudioArtifact>,
    uploads: u64,
    revisions: u64,
    workdir: Option<TempDir>,
}

impl Session<PdfExtractor> {
    pub fn from_config(config: &Config) -> Self {
        Session::new(PdfExtractor, config.upload.max_bytes)
    }
}

impl<E: TextExtractor> Session<E> {
    pub fn new(extractor: E, max_upload_bytes: usize) -> Self {
        Self {
            extractor,
            max_upload_bytes,
            stage: SessionStage::Idle,
            document: None,
            summary: None,
            audio: None,
            uploads: 0,
            revisions: 0,
            workdir: None,
        }
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn extracted_text(&self) -> Option<&str> {
        self.document.as_ref().and_then(Document::text)
    }

    /// The first `limit` characters of the extracted text, see [`Document::preview`]
    pub fn preview(&self, limit: usize) -> Option<String> {
        self.document.as_ref().and_then(|d| d.preview(limit))
    }

    pub fn summary(&self) -> Option<&DocumentSummary> {
        self.summary.as_ref()
    }

    /// The last generated audio, even if the summary has changed since
    pub fn audio(&self) -> Option<&AudioArtifact> {
        self.audio.as_ref()
    }

    /// True when audio exists but was read from an older summary
    pub fn is_audio_stale(&self) -> bool {
        match (&self.audio, &self.summary) {
            (Some(audio), Some(summary)) => audio.summary_revision != summary.revision,
            (Some(_), None) => true,
            _ => false,
        }
    }

    /// The audio as a downloadable file, only if it matches the current summary
    pub fn download(&self) -> Option<Download<'_>> {
        if self.is_audio_stale() {
            return None;
        }
        self.audio.as_ref().map(|audio| Download {
            file_name: AUDIO_FILE_NAME,
            mime_type: AUDIO_MIME_TYPE,
            bytes: &audio.bytes,
        })
    }

    /// Directory holding this session's audio file, if one was created
    pub fn workdir(&self) -> Option<&Path> {
        self.workdir.as_ref().map(TempDir::path)
    }

    /// Accept a new document, dropping everything cached for the previous one, and extract
    /// its text right away.
    ///
    /// Oversized uploads are rejected before any state changes. If extraction fails the
    /// session stays [`SessionStage::Uploaded`] and [`Session::extract`] can be retried.
    pub fn upload(
        &mut self,
        name: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<&str, SessionError> {
        if bytes.len() > self.max_upload_bytes {
            return Err(ExtractionError::TooLarge {
                size: bytes.len(),
                limit: self.max_upload_bytes,
            }
            .into());
        }

        self.clear();
        self.uploads += 1;
        let document = Document::new(self.uploads, name, bytes);
        tracing::info!(id = document.id, name = %document.name, bytes = document.bytes.len(), "Document uploaded");
        self.document = Some(document);
        self.stage = SessionStage::Uploaded;

        self.extract()
    }

    /// Extract text from the uploaded document and cache it.
    pub fn extract(&mut self) -> Result<&str, SessionError> {
        if self.stage != SessionStage::Uploaded {
            return Err(invalid(self.stage, "extract text"));
        }
        let Some(document) = self.document.as_mut() else {
            return Err(invalid(self.stage, "extract text"));
        };

        let text = self
            .extractor
            .extract_text(&document.bytes)
            .inspect_err(|e| tracing::error!(error = %e, name = %document.name, "Failed to extract text"))?;

        tracing::info!(id = document.id, chars = text.chars().count(), "Text extracted");
        self.stage = SessionStage::Extracted;
        Ok(document.set_text(text))
    }

    /// Summarize the extracted text, replacing any earlier summary.
    ///
    /// On failure the previous summary, audio and stage are left as they were.
    pub async fn summarize<L: ModelLoader>(
        &mut self,
        summarizer: &ChunkedSummarizer<'_, L>,
    ) -> Result<&DocumentSummary, SessionError> {
        if !matches!(
            self.stage,
            SessionStage::Extracted | SessionStage::Summarized | SessionStage::Narrated
        ) {
            return Err(invalid(self.stage, "summarize"));
        }
        let Some((document_id, text)) = self
            .document
            .as_ref()
            .and_then(|d| d.text().map(|text| (d.id, text)))
        else {
            return Err(invalid(self.stage, "summarize"));
        };

        let summary = summarizer.summarize_chunks(text).await?;

        self.revisions += 1;
        if self.audio.is_some() {
            tracing::warn!("Summary regenerated, existing audio is now stale");
        }
        self.stage = SessionStage::Summarized;
        tracing::info!(
            document_id,
            revision = self.revisions,
            chunks = summary.chunk_count,
            "Summary generated"
        );

        Ok(self.summary.insert(DocumentSummary {
            text: summary.text,
            document_id,
            revision: self.revisions,
            chunk_count: summary.chunk_count,
            generated_at: Utc::now(),
        }))
    }

    /// Read the current summary out loud and store the MP3 in the session's temp
    /// directory, overwriting the previous file.
    pub async fn narrate<S: SpeechSynthesizer>(
        &mut self,
        narrator: &NarrationEngine<S>,
    ) -> Result<&AudioArtifact, SessionError> {
        if !matches!(
            self.stage,
            SessionStage::Summarized | SessionStage::Narrated
        ) {
            return Err(invalid(self.stage, "narrate"));
        }
        let Some(summary) = self.summary.as_ref() else {
            return Err(invalid(self.stage, "narrate"));
        };

        let bytes = narrator.synthesize(&summary.text).await?;
        let summary_revision = summary.revision;

        let path = self.audio_path().map_err(SynthesisError::from)?;
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(SynthesisError::from)?;
        tracing::info!(path = %path.display(), summary_revision, "Audio written");

        self.stage = SessionStage::Narrated;
        Ok(self.audio.insert(AudioArtifact {
            path,
            bytes,
            summary_revision,
            generated_at: Utc::now(),
        }))
    }

    /// End the session: drop every artifact and remove the temp directory.
    pub fn reset(&mut self) {
        self.clear();
        self.stage = SessionStage::Idle;
        tracing::info!("Session reset");
    }

    fn clear(&mut self) {
        self.document = None;
        self.summary = None;
        self.audio = None;
        self.workdir = None;
    }

    fn audio_path(&mut self) -> std::io::Result<PathBuf> {
        let workdir = match self.workdir.take() {
            Some(dir) => dir,
            None => tempfile::Builder::new().prefix("notecast-").tempdir()?,
        };
        let path = workdir.path().join(AUDIO_FILE_NAME);
        self.workdir = Some(workdir);
        Ok(path)
    }
}
