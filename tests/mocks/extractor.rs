use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use notecast::{ExtractionError, TextExtractor};

/// Treats the uploaded bytes as UTF-8 text.
#[derive(Clone, Default)]
pub struct MockExtractor {
    pub calls: Arc<AtomicUsize>,
    pub failing_calls: usize,
}

impl MockExtractor {
    pub fn failing_first(failing_calls: usize) -> Self {
        Self {
            failing_calls,
            ..Default::default()
        }
    }
}

impl TextExtractor for MockExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failing_calls {
            return Err(ExtractionError::Malformed("xref table not found".into()));
        }
        String::from_utf8(bytes.to_vec()).map_err(|e| ExtractionError::Malformed(e.to_string()))
    }
}
