//! Port abstraction for the hosted text-generation service.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised by completion source adapters.
    pub enum CompletionSourceError {
        /// The request was rejected as malformed by the service.
        InvalidRequest => "completion request rejected: {message}",
        /// The service throttled the request.
        RateLimited => "completion rate limited: {message}",
        /// The request did not complete within the transport timeout.
        Timeout => "completion timed out: {message}",
        /// Transport-level failure reaching the service.
        Transport => "completion transport failed: {message}",
        /// The service reply could not be decoded.
        Decode => "completion response invalid: {message}",
    }
}

/// A text-generation call: prompt string in, completion text out.
#[async_trait]
pub trait CompletionSource: Send + Sync {
    /// Generate a completion for the rendered prompt.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionSourceError>;
}

/// Canned completion source used by tests and runs without an API key.
#[derive(Debug, Clone)]
pub struct FixtureCompletionSource {
    reply: String,
}

impl Default for FixtureCompletionSource {
    fn default() -> Self {
        Self {
            reply: "I can only answer questions related to this loan product.".to_owned(),
        }
    }
}

impl FixtureCompletionSource {
    /// Construct a source that always answers with `reply`.
    #[must_use]
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl CompletionSource for FixtureCompletionSource {
    async fn complete(&self, _prompt: &str) -> Result<String, CompletionSourceError> {
        Ok(self.reply.clone())
    }
}
