//! # Notecast
//!
//! Summarise PDF notes with a pretrained model and listen to the summary.
//!
//! ## Features
//!
//! - **Any length**: long documents are chunked through the model and summarised bullet by bullet
//! - **Cached workflow**: extraction, summary and audio are kept per session and only recomputed on request
//! - **Provider Agnostic**: Hugging Face inference (BART) by default, Gemini via rstructor
//! - **Narration**: MP3 audio of the summary via Google TTS

pub mod chunker;
pub mod config;
pub mod document;
pub mod extract;
pub mod gemini;
pub mod huggingface;
pub mod model;
pub mod narration;
pub mod session;
pub mod summarizer;
pub mod telemetry;
pub mod ui;

pub use chunker::{chunk, Chunk};
pub use config::Config;
pub use document::Document;
pub use extract::{ExtractionError, PdfExtractor, TextExtractor};
pub use narration::{GoogleTts, NarrationEngine, SpeechSynthesizer, SynthesisError};
pub use session::{AudioArtifact, DocumentSummary, Session, SessionError, SessionStage};
pub use summarizer::{
    ChunkedSummarizer, ChunkedSummary, LengthBounds, ModelInvocationError, ModelLoader,
    SummarizationEngine, SummarizationModel,
};
