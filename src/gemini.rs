//! Gemini backend via rstructor.
//!
//! An alternative to the Hugging Face pipeline: a general LLM prompted to act as an
//! abstractive summarizer within the requested length bounds.

use rstructor::{GeminiClient, GeminiModel, LLMClient};

use crate::summarizer::{LengthBounds, ModelInvocationError, SummarizationModel};

const PERSONA: &str = "You are a precise note-taking assistant. You condense study notes and \
documents into faithful, self-contained summaries without adding facts.";

pub struct GeminiSummarizer {
    client: GeminiClient,
}

impl GeminiSummarizer {
    pub fn connect(api_key: &str, model: &str) -> Result<Self, ModelInvocationError> {
        let client = GeminiClient::new(api_key)
            .map_err(|e| ModelInvocationError::Backend(e.to_string()))?
            .model(parse_gemini_model(model));

        Ok(Self { client })
    }
}

impl SummarizationModel for GeminiSummarizer {
    async fn generate(
        &self,
        segment: &str,
        bounds: LengthBounds,
    ) -> Result<String, ModelInvocationError> {
        let prompt = build_prompt(segment, bounds);

        let result = self
            .client
            .generate_with_metadata(&prompt)
            .await
            .map_err(|e| ModelInvocationError::Backend(e.to_string()))?;

        let text = result.text.trim();
        if text.is_empty() {
            return Err(ModelInvocationError::EmptyResponse);
        }
        Ok(text.to_string())
    }
}

fn build_prompt(segment: &str, bounds: LengthBounds) -> String {
    format!(
        r#"{PERSONA}

Summarize the text below in prose, using between {} and {} words.
Do not use markdown, bullet points or headings. Only output the summary.

---

{segment}"#,
        bounds.min_length, bounds.max_length
    )
}

/// Parse a model string into a GeminiModel
fn parse_gemini_model(model: &str) -> GeminiModel {
    match model {
        "gemini-2.0-flash" => GeminiModel::Gemini20Flash,
        "gemini-2.5-flash" => GeminiModel::Gemini25Flash,
        "gemini-2.5-pro" => GeminiModel::Gemini25Pro,
        _ => GeminiModel::Gemini20Flash, // Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_carries_bounds_and_segment() {
        let prompt = build_prompt(
            "Mitochondria produce ATP.",
            LengthBounds {
                max_length: 150,
                min_length: 30,
            },
        );
        assert!(prompt.contains("between 30 and 150 words"));
        assert!(prompt.ends_with("Mitochondria produce ATP."));
    }
}
