//! Speech synthesis of summaries.
//!
//! The default synthesizer talks to the Google Translate text-to-speech endpoint, which
//! accepts short pieces of text and answers with MP3 audio. Longer text is split into
//! pieces and the MP3 segments are concatenated in order.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Url};
use thiserror::Error;

use crate::config::NarrationConfig;

/// File name offered for download
pub const AUDIO_FILE_NAME: &str = "summary_audio.mp3";
pub const AUDIO_MIME_TYPE: &str = "audio/mpeg";

/// Longest piece of text the TTS endpoint accepts in one request
const MAX_PIECE_CHARS: usize = 100;
const PIECE_BREAKS: &[char] = &['.', '!', '?', ';', ':', ',', '\n'];

const USER_AGENT: &str = concat!("notecast/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("no text to speak")]
    NoText,
    #[error("speech engine returned no usable audio")]
    InvalidAudio,
    #[error("failed to write audio: {0}")]
    Io(#[from] std::io::Error),
}

/// Text in, MP3 bytes out.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str) -> impl Future<Output = Result<Vec<u8>, SynthesisError>>;
}

/// Google Translate TTS client.
#[derive(Debug, Clone)]
pub struct GoogleTts {
    client: Client,
    endpoint: String,
    language: String,
    slow: bool,
}

impl GoogleTts {
    pub fn new(config: &NarrationConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("https://translate.google.{}/translate_tts", config.tld),
            language: config.language.clone(),
            slow: config.slow,
        })
    }

    fn piece_url(&self, piece: &str, idx: usize, total: usize) -> Result<Url, SynthesisError> {
        let speed = if self.slow { "0.3" } else { "1" };
        let params = [
            ("ie", "UTF-8".to_string()),
            ("q", piece.to_string()),
            ("tl", self.language.clone()),
            ("ttsspeed", speed.to_string()),
            ("total", total.to_string()),
            ("idx", idx.to_string()),
            ("textlen", piece.chars().count().to_string()),
            ("client", "tw-ob".to_string()),
        ];
        Url::parse_with_params(&self.endpoint, &params)
            .map_err(|e| SynthesisError::InvalidRequest(e.to_string()))
    }
}

impl SpeechSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        let pieces = split_for_speech(text, MAX_PIECE_CHARS);
        tracing::debug!(pieces = pieces.len(), "Requesting speech");

        let mut audio = Vec::new();
        for (idx, piece) in pieces.iter().enumerate() {
            let url = self.piece_url(piece, idx, pieces.len())?;
            let resp = self
                .client
                .get(url)
                .header(reqwest::header::REFERER, "https://translate.google.com/")
                .send()
                .await
                .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

            if !resp.status().is_success() {
                let status = resp.status().as_u16();
                let message = resp.text().await.unwrap_or_default();
                return Err(SynthesisError::Api { status, message });
            }

            audio.extend_from_slice(&resp.bytes().await?);
        }

        Ok(audio)
    }
}

/// Converts summary text into MP3 audio through a [`SpeechSynthesizer`].
pub struct NarrationEngine<S: SpeechSynthesizer> {
    synthesizer: S,
}

impl<S: SpeechSynthesizer> NarrationEngine<S> {
    pub fn new(synthesizer: S) -> Self {
        Self { synthesizer }
    }

    /// Synthesize `text`. Failures are surfaced as-is, never retried.
    #[tracing::instrument(skip_all, fields(chars = text.chars().count()))]
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        if text.trim().is_empty() {
            return Err(SynthesisError::NoText);
        }

        let audio = self
            .synthesizer
            .synthesize(text)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to synthesize speech"))?;

        if !looks_like_mp3(&audio) {
            tracing::error!(bytes = audio.len(), "Speech engine returned non-MP3 data");
            return Err(SynthesisError::InvalidAudio);
        }

        tracing::info!(bytes = audio.len(), "Synthesized audio");
        Ok(audio)
    }
}

/// An ID3 tag or an MPEG frame sync at the start of the stream.
pub fn looks_like_mp3(bytes: &[u8]) -> bool {
    match bytes {
        [b'I', b'D', b'3', ..] => true,
        [0xFF, second, ..] => second & 0xE0 == 0xE0,
        _ => false,
    }
}

/// Split `text` into pieces of at most `max_chars` characters, cutting after punctuation
/// where possible, then at whitespace, and mid-word only as a last resort.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut pieces = Vec::new();
    let mut rest = text.trim();

    while !rest.is_empty() {
        if rest.chars().count() <= max_chars {
            pieces.push(rest.to_string());
            break;
        }

        let limit = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(i, _)| i);
        let window = &rest[..limit];

        let cut = window
            .rfind(PIECE_BREAKS)
            .map(|i| i + window[i..].chars().next().map_or(1, char::len_utf8))
            .or_else(|| window.rfind(char::is_whitespace))
            .filter(|&i| i > 0)
            .unwrap_or(limit);

        let piece = rest[..cut].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        rest = rest[cut..].trim_start();
    }

    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_a_single_piece() {
        assert_eq!(split_for_speech("  Hello there.  ", 100), vec!["Hello there."]);
    }

    #[test]
    fn blank_text_has_no_pieces() {
        assert!(split_for_speech(" \n\t ", 100).is_empty());
    }

    #[test]
    fn prefers_punctuation_then_whitespace() {
        let pieces = split_for_speech("One two, three four five six", 12);
        assert_eq!(pieces, vec!["One two,", "three four", "five six"]);
    }

    #[test]
    fn cuts_long_words_hard() {
        let pieces = split_for_speech("abcdefghij", 4);
        assert_eq!(pieces, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn pieces_never_exceed_limit() {
        let text = "• Cells are the basic unit of life. They contain organelles!\n\n\
                    • Photosynthesis converts light energy into chemical energy in chloroplasts."
            .repeat(5);
        let pieces = split_for_speech(&text, 100);
        assert!(pieces.iter().all(|p| p.chars().count() <= 100));
        assert!(pieces.iter().all(|p| !p.trim().is_empty()));

        let original: String = text.split_whitespace().collect();
        let rejoined: String = pieces.concat().split_whitespace().collect();
        assert_eq!(original, rejoined);
    }

    #[test]
    fn bullet_glyph_starts_the_next_piece() {
        let first = format!("• {}word.", "word ".repeat(16));
        let text = format!("{first}\n\n• Second bullet text here.");
        let pieces = split_for_speech(&text, 100);
        assert_eq!(pieces, vec![first.as_str(), "• Second bullet text here."]);
        assert!(pieces.iter().all(|p| !p.ends_with('•')));
    }

    #[test]
    fn recognises_mp3_headers() {
        assert!(looks_like_mp3(b"ID3\x04\x00rest"));
        assert!(looks_like_mp3(&[0xFF, 0xF3, 0x44, 0xC4]));
        assert!(!looks_like_mp3(b"<html>"));
        assert!(!looks_like_mp3(&[]));
    }

    #[test]
    fn piece_url_encodes_query() {
        let tts = GoogleTts::new(&NarrationConfig::default()).unwrap();
        let url = tts.piece_url("a & b", 0, 2).unwrap();
        assert_eq!(url.host_str(), Some("translate.google.com"));
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("q".to_string(), "a & b".to_string())));
        assert!(query.contains(&("tl".to_string(), "en".to_string())));
        assert!(query.contains(&("total".to_string(), "2".to_string())));
    }
}
