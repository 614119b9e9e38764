//! Chunked abstractive summarization.
//!
//! [`SummarizationEngine`] owns the (expensive) model and summarizes one bounded segment at
//! a time. [`ChunkedSummarizer`] feeds it a whole document chunk by chunk and stitches the
//! results into a bullet list.

use std::future::Future;
use std::num::NonZeroUsize;

use thiserror::Error;
use tokio::sync::OnceCell;

use crate::chunker::{self, DEFAULT_CHUNK_CHARS};
use crate::config::{ConfigError, SummaryConfig};

/// Returned by [`SummarizationEngine::summarize`] for blank segments
pub const NO_CONTENT: &str = "No text to summarize.";
/// Returned by [`ChunkedSummarizer::summarize_document`] for blank documents
pub const NO_TEXT_FOUND: &str = "No text found in the document.";

const BULLET: &str = "• ";
const SEPARATOR: &str = "\n\n";

#[derive(Error, Debug)]
pub enum ModelInvocationError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("model returned no summary")]
    EmptyResponse,
    #[error("model backend failed: {0}")]
    Backend(String),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Advisory output length passed to the model with every segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthBounds {
    pub max_length: u32,
    pub min_length: u32,
}

impl Default for LengthBounds {
    fn default() -> Self {
        Self {
            max_length: 150,
            min_length: 30,
        }
    }
}

/// A loaded summarization model.
pub trait SummarizationModel {
    fn generate(
        &self,
        segment: &str,
        bounds: LengthBounds,
    ) -> impl Future<Output = Result<String, ModelInvocationError>>;
}

/// Performs the one-off initialization of a [`SummarizationModel`].
pub trait ModelLoader {
    type Model: SummarizationModel;

    fn load(&self) -> impl Future<Output = Result<Self::Model, ModelInvocationError>>;
}

/// Process-wide summarization service.
///
/// The model is loaded on the first non-blank segment and kept for the lifetime of the
/// engine. Construct one engine at startup and hand out references to it.
pub struct SummarizationEngine<L: ModelLoader> {
    loader: L,
    model: OnceCell<L::Model>,
}

impl<L: ModelLoader> SummarizationEngine<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    /// Whether the model has been initialized yet
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }

    /// Summarize a single segment. Blank segments short-circuit to [`NO_CONTENT`] without
    /// touching the model. Errors are returned as-is, never retried.
    pub async fn summarize(
        &self,
        segment: &str,
        bounds: LengthBounds,
    ) -> Result<String, ModelInvocationError> {
        if segment.trim().is_empty() {
            return Ok(NO_CONTENT.to_string());
        }

        let model = self
            .model
            .get_or_try_init(|| async {
                tracing::info!("Loading summarization model");
                self.loader
                    .load()
                    .await
                    .inspect_err(|e| tracing::error!(error = %e, "Failed to load model"))
            })
            .await?;

        let summary = model
            .generate(segment, bounds)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize segment"))?;

        Ok(summary.trim().to_string())
    }
}

/// Summarizes documents of any length by chunking them through a [`SummarizationEngine`].
pub struct ChunkedSummarizer<'e, L: ModelLoader> {
    engine: &'e SummarizationEngine<L>,
    chunk_chars: NonZeroUsize,
    bounds: LengthBounds,
}

impl<'e, L: ModelLoader> ChunkedSummarizer<'e, L> {
    /// 1024-character chunks, 30..150 summary length
    pub fn new(engine: &'e SummarizationEngine<L>) -> Self {
        Self {
            engine,
            chunk_chars: DEFAULT_CHUNK_CHARS,
            bounds: LengthBounds::default(),
        }
    }

    pub fn from_config(engine: &'e SummarizationEngine<L>, config: &SummaryConfig) -> Self {
        Self {
            engine,
            chunk_chars: config.chunk_chars,
            bounds: LengthBounds {
                max_length: config.max_length,
                min_length: config.min_length,
            },
        }
    }

    /// Summarize `text` as one bullet per chunk, in chunk order, separated by blank lines.
    ///
    /// Chunks are summarized independently and sequentially. The first failure aborts the
    /// whole document; no partial summary is returned.
    pub async fn summarize_document(&self, text: &str) -> Result<String, ModelInvocationError> {
        self.summarize_chunks(text).await.map(|summary| summary.text)
    }

    /// Like [`ChunkedSummarizer::summarize_document`], also reporting how many chunks were
    /// summarized. A blank document has no chunks.
    #[tracing::instrument(skip_all, fields(chars = text.chars().count()))]
    pub async fn summarize_chunks(
        &self,
        text: &str,
    ) -> Result<ChunkedSummary, ModelInvocationError> {
        if text.trim().is_empty() {
            return Ok(ChunkedSummary {
                text: NO_TEXT_FOUND.to_string(),
                chunk_count: 0,
            });
        }

        let chunks = chunker::chunk(text, self.chunk_chars);
        tracing::info!(count = chunks.len(), "Summarizing chunks");

        let mut bullets = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            tracing::debug!(index = chunk.index, start = chunk.start, "Summarizing chunk");
            let summary = self.engine.summarize(chunk.text, self.bounds).await?;
            bullets.push(format!("{BULLET}{summary}"));
        }

        Ok(ChunkedSummary {
            text: bullets.join(SEPARATOR),
            chunk_count: chunks.len(),
        })
    }
}

/// Output of [`ChunkedSummarizer::summarize_chunks`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedSummary {
    pub text: String,
    pub chunk_count: usize,
}
