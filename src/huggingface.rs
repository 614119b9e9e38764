//! Hugging Face Inference API backend.
//!
//! Runs a hosted summarization pipeline (by default `facebook/bart-large-cnn`).

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::summarizer::{LengthBounds, ModelInvocationError, SummarizationModel};

/// User-Agent string identifying this client
const USER_AGENT: &str = concat!("notecast/", env!("CARGO_PKG_VERSION"), " (https://github.com/cladam/notecast)");

/// Cold models can take a while to spin up
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    max_length: u32,
    min_length: u32,
    do_sample: bool,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct SummaryOutput {
    summary_text: String,
}

/// A summarization model served by the Hugging Face Inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceModel {
    client: Client,
    url: String,
    token: Option<String>,
}

impl HuggingFaceModel {
    /// Build a client for `model` under `endpoint`. Anonymous access works for public
    /// models but is heavily rate-limited.
    pub fn connect(
        endpoint: &str,
        model: &str,
        token: Option<String>,
    ) -> Result<Self, ModelInvocationError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}/{}", endpoint.trim_end_matches('/'), model),
            token,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SummarizationModel for HuggingFaceModel {
    async fn generate(
        &self,
        segment: &str,
        bounds: LengthBounds,
    ) -> Result<String, ModelInvocationError> {
        let body = InferenceRequest {
            inputs: segment,
            parameters: InferenceParameters {
                max_length: bounds.max_length,
                min_length: bounds.min_length,
                do_sample: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let mut request = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ModelInvocationError::Api { status, message });
        }

        let outputs = resp.json::<Vec<SummaryOutput>>().await?;
        outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .ok_or(ModelInvocationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_matches_inference_api() {
        let body = InferenceRequest {
            inputs: "some text",
            parameters: InferenceParameters {
                max_length: 150,
                min_length: 30,
                do_sample: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inputs": "some text",
                "parameters": {"max_length": 150, "min_length": 30, "do_sample": false},
                "options": {"wait_for_model": true}
            })
        );
    }

    #[test]
    fn parses_pipeline_output() {
        let outputs: Vec<SummaryOutput> =
            serde_json::from_str(r#"[{"summary_text": " A short summary. "}]"#).unwrap();
        assert_eq!(outputs[0].summary_text, " A short summary. ");
    }

    #[test]
    fn url_joins_endpoint_and_model() {
        let model = HuggingFaceModel::connect(
            "https://router.huggingface.co/hf-inference/models/",
            "facebook/bart-large-cnn",
            None,
        )
        .unwrap();
        assert_eq!(
            model.url(),
            "https://router.huggingface.co/hf-inference/models/facebook/bart-large-cnn"
        );
    }
}
