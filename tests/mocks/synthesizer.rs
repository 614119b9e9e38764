use std::sync::{Arc, Mutex};

use notecast::{SpeechSynthesizer, SynthesisError};

/// Produces a fake MP3: an ID3 header followed by the spoken text.
#[derive(Clone, Default)]
pub struct MockSynthesizer {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail: bool,
    pub raw_output: Option<Vec<u8>>,
}

impl MockSynthesizer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn returning(bytes: &[u8]) -> Self {
        Self {
            raw_output: Some(bytes.to_vec()),
            ..Default::default()
        }
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SynthesisError> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(SynthesisError::Api {
                status: 429,
                message: "Too Many Requests".into(),
            });
        }
        if let Some(bytes) = &self.raw_output {
            return Ok(bytes.clone());
        }
        let mut audio = b"ID3\x04\x00\x00".to_vec();
        audio.extend_from_slice(text.as_bytes());
        Ok(audio)
    }
}
