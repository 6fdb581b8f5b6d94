//! Quota-bound completion model for the service tagger
//!
//! Keeps the tagger under the `--requests-per-minute` quota of the
//! provider key. Every request waits on the limiter first; the provider's
//! raw response is kept opaque behind `RateLimitResponse`.

use std::sync::Arc;

use governor::DefaultDirectRateLimiter;
use rig::completion::{self, CompletionError, CompletionModel, CompletionRequest, CompletionResponse};
use tracing::{Instrument, debug_span, info_span};

use super::RateLimitResponse;

/// Wraps the tagger's completion model so every request first takes a
/// permit from a shared `governor` limiter
#[derive(Clone)]
pub struct RateLimitedCompletionModel<M: CompletionModel> {
    model: M,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M> RateLimitedCompletionModel<M>
where
    M: CompletionModel,
{
    pub fn new(model: M, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            model,
            limiter: Arc::new(limiter),
        }
    }
}

impl<M: CompletionModel> CompletionModel for RateLimitedCompletionModel<M> {
    type Response = RateLimitResponse<M::Response>;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> Result<completion::CompletionResponse<Self::Response>, CompletionError> {
        self.limiter.until_ready().instrument(debug_span!("limiter")).await;
        let response = self
            .model
            .completion(completion_request)
            .instrument(info_span!("completion"))
            .await?;
        Ok(CompletionResponse {
            choice: response.choice,
            raw_response: RateLimitResponse {
                response: response.raw_response,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockCompletionModel;
    use crate::tagging::{CompletionTagger, KnownService, ServiceTagger};
    use governor::{Quota, RateLimiter};
    use std::num::NonZeroU32;

    #[tokio::test]
    async fn test_rate_limited_model_passes_response_through() {
        let mock = MockCompletionModel::new();
        mock.set_text_response(r#"{"provided_services": ["Biostatistics"]}"#)
            .await;
        let limiter = RateLimiter::direct(Quota::per_minute(NonZeroU32::MIN));
        let model = RateLimitedCompletionModel::new(mock.clone(), limiter);

        let tagger = CompletionTagger::new(model);
        let known = vec![KnownService::new("Biostatistics", "Statistical analysis")];
        let tags = tagger.tag("We run statistics.", &known).await.unwrap();

        assert_eq!(tags.provided_services, vec!["Biostatistics"]);
        assert_eq!(mock.calls().await, 1);
    }
}
