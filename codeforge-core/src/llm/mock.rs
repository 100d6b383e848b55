//! In-memory queued-response provider used by integration-style tests for the generate/build/test
//! loop, standing in for a real HTTP call.

#![cfg(test)]

use super::errors::LLMError;
use super::traits::LLMProvider;
use async_trait::async_trait;
use std::sync::Mutex;

/// Returns one canned response per call, in order; the last response repeats once exhausted.
pub struct MockProvider {
    responses: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self { responses: Mutex::new(responses), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn invoke(&self, prompt: &str, _temperature: f32) -> Result<String, LLMError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            Ok(responses.remove(0))
        } else {
            Ok(responses.first().cloned().unwrap_or_default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_responses_in_order() {
        let provider = MockProvider::new(vec!["first".into(), "second".into()]);
        assert_eq!(provider.invoke("p1", 0.1).await.unwrap(), "first");
        assert_eq!(provider.invoke("p2", 0.1).await.unwrap(), "second");
        assert_eq!(provider.calls(), vec!["p1", "p2"]);
    }
}
