//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that returns a predefined text answer
//! and counts how often it was asked, without making API calls.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    response: Option<String>,
    calls: usize,
}

/// A mock completion model for testing purposes
#[derive(Debug, Clone, Default)]
pub struct MockCompletionModel {
    state: Arc<Mutex<MockState>>,
}

impl MockCompletionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text the mock model should answer with
    pub async fn set_text_response(&self, text: &str) {
        self.state.lock().await.response = Some(text.to_string());
    }

    /// Number of completion requests received
    pub async fn calls(&self) -> usize {
        self.state.lock().await.calls
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        let text = {
            let mut state = self.state.lock().await;
            state.calls += 1;
            state.response.clone().unwrap_or_default()
        };
        Ok(CompletionResponse {
            choice: OneOrMany::one(AssistantContent::text(&text)),
            raw_response: text,
        })
    }
}
