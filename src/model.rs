//! Selects and loads the configured summarization backend.

use crate::config::{ConfigError, ModelConfig};
use crate::gemini::GeminiSummarizer;
use crate::huggingface::HuggingFaceModel;
use crate::summarizer::{
    LengthBounds, ModelInvocationError, ModelLoader, SummarizationEngine, SummarizationModel,
};
use crate::Config;

/// The engine type used by the binary.
pub type DefaultEngine = SummarizationEngine<BackendLoader>;

pub enum ModelBackend {
    HuggingFace(HuggingFaceModel),
    Gemini(GeminiSummarizer),
}

impl SummarizationModel for ModelBackend {
    async fn generate(
        &self,
        segment: &str,
        bounds: LengthBounds,
    ) -> Result<String, ModelInvocationError> {
        match self {
            ModelBackend::HuggingFace(model) => model.generate(segment, bounds).await,
            ModelBackend::Gemini(model) => model.generate(segment, bounds).await,
        }
    }
}

/// Builds a [`ModelBackend`] from config on first use.
#[derive(Debug, Clone)]
pub struct BackendLoader {
    model: ModelConfig,
    hf_token: Option<String>,
    gemini_key: Option<String>,
}

impl BackendLoader {
    pub fn new(config: &Config) -> Self {
        Self {
            model: config.model.clone(),
            hf_token: config.api.hf_token.clone(),
            gemini_key: config.api.gemini_key.clone(),
        }
    }
}

impl ModelLoader for BackendLoader {
    type Model = ModelBackend;

    async fn load(&self) -> Result<ModelBackend, ModelInvocationError> {
        tracing::info!(provider = %self.model.provider, model = %self.model.name, "Connecting to model");
        match self.model.provider.as_str() {
            "huggingface" => HuggingFaceModel::connect(
                &self.model.endpoint,
                &self.model.name,
                self.hf_token.clone(),
            )
            .map(ModelBackend::HuggingFace),
            "gemini" => {
                let key = self
                    .gemini_key
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingApiKey("gemini".into()))?;
                GeminiSummarizer::connect(key, &self.model.name).map(ModelBackend::Gemini)
            }
            other => Err(ConfigError::UnknownProvider(other.to_string()).into()),
        }
    }
}
