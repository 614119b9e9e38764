use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use notecast::{LengthBounds, ModelInvocationError, ModelLoader, SummarizationModel};

#[derive(Clone, Default)]
pub struct MockModel {
    pub calls: Arc<Mutex<Vec<(String, LengthBounds)>>>,
    pub fail_on_call: Option<usize>,
}

impl MockModel {
    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Default::default()
        }
    }
}

impl SummarizationModel for MockModel {
    async fn generate(
        &self,
        segment: &str,
        bounds: LengthBounds,
    ) -> Result<String, ModelInvocationError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((segment.to_string(), bounds));
            calls.len() - 1
        };
        if self.fail_on_call == Some(call) {
            return Err(ModelInvocationError::Api {
                status: 503,
                message: "model overloaded".into(),
            });
        }
        Ok(format!("  summary of {} chars \n", segment.chars().count()))
    }
}

#[derive(Clone, Default)]
pub struct MockLoader {
    pub model: MockModel,
    pub loads: Arc<AtomicUsize>,
    pub failing_loads: usize,
}

impl MockLoader {
    pub fn new(model: MockModel) -> Self {
        Self {
            model,
            ..Default::default()
        }
    }

    pub fn failing_first(failing_loads: usize) -> Self {
        Self {
            failing_loads,
            ..Default::default()
        }
    }
}

impl ModelLoader for MockLoader {
    type Model = MockModel;

    async fn load(&self) -> Result<MockModel, ModelInvocationError> {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failing_loads {
            return Err(ModelInvocationError::Backend("model weights unavailable".into()));
        }
        Ok(self.model.clone())
    }
}
