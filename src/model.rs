//! # LLM Client Module
//!
//! This module provides the completion model used for service tagging,
//! with built-in rate limiting to prevent API quota exhaustion.
//!
//! ## Key Components
//!
//! - `Client`: Wraps a completion model
//! - `RateLimitedCompletionModel`: Adds rate limiting to any completion model
//!
//! ## Features
//!
//! - Configurable request quota per minute
//! - Environment variable configuration for the API key
//! - Instrumentation with tracing spans around each completion

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use rig::{completion::CompletionModel, providers::gemini};

use crate::tagging::TaggingError;

#[cfg(test)]
pub mod mock_model;
pub mod ratelimited_completion;

pub use ratelimited_completion::RateLimitedCompletionModel;

/// Environment variable holding the Gemini API key
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Default Gemini model for tagging
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default completion requests allowed per minute
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    completion_model: C,
}

pub struct RateLimitResponse<T> {
    #[allow(dead_code)]
    response: T,
}

impl Client<RateLimitedCompletionModel<gemini::completion::CompletionModel>> {
    /// Build a Gemini client from the `GEMINI_API_KEY` environment variable
    pub fn new_gemini_from_env(model: &str, requests_per_minute: u32) -> Result<Self, TaggingError> {
        let gemini_api_key = std::env::var(GEMINI_API_KEY_VAR)
            .map_err(|_| TaggingError::MissingApiKey(GEMINI_API_KEY_VAR))?;
        let gemini_client = gemini::Client::new(&gemini_api_key);
        Ok(Self::new_gemini(gemini_client, model, requests_per_minute))
    }

    pub fn new_gemini(gemini_client: gemini::Client, model: &str, requests_per_minute: u32) -> Self {
        let quota = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
        let completion_limiter = RateLimiter::direct(Quota::per_minute(quota));
        let completion_model =
            RateLimitedCompletionModel::new(gemini_client.completion_model(model), completion_limiter);
        Self { completion_model }
    }
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    pub fn new(completion_model: C) -> Self {
        Self { completion_model }
    }

    pub fn completion(&self) -> &C {
        &self.completion_model
    }
}
