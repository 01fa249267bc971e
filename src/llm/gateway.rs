//! Gateway trait for upstream completion calls

use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

use super::{
    error::UpstreamError,
    types::{ChatMessage, Completion},
};

/// A finite, lazy sequence of generated text fragments
///
/// The stream terminates when the upstream signals end-of-stream and is not
/// restartable; a new call opens a new upstream connection.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, UpstreamError>> + Send>>;

/// Interface the request handlers and the stream relay consume
///
/// Implemented by [`RekaClient`](super::RekaClient) in production and by
/// scripted mocks in tests.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Generate a whole response for the given conversation
    ///
    /// Token usage is reported when the upstream includes it; this is the
    /// only mode in which it is reliably available.
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, UpstreamError>;

    /// Generate a response as an incremental fragment stream
    ///
    /// The streaming protocol does not surface usage metadata, so callers
    /// must treat the token count as unknown (zero).
    async fn complete_streaming(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<FragmentStream, UpstreamError>;

    /// List the model identifiers the upstream exposes
    async fn list_models(&self) -> Result<Vec<String>, UpstreamError>;
}
