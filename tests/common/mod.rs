// Shared helpers for endpoint-level tests

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;
use warp::Filter;

use reka_research::llm::{ChatGateway, ChatMessage, Completion, FragmentStream, UpstreamError};
use reka_research::routes::configure_routes;
use reka_research::store::ResearchStore;

/// Model name injected into the route tree under test
pub const TEST_MODEL: &str = "reka-flash-research";

/// Gateway that replays a scripted response instead of calling upstream
///
/// The same script drives both modes: `complete` returns the concatenated
/// fragments, `complete_streaming` yields them one by one, so streaming and
/// non-streaming behavior can be compared over identical upstream output.
pub struct ScriptedGateway {
    fragments: Vec<String>,
    tokens_used: i64,
    failure: Option<String>,
}

impl ScriptedGateway {
    pub fn replying(fragments: &[&str], tokens_used: i64) -> Arc<Self> {
        Arc::new(Self {
            fragments: fragments.iter().map(|fragment| fragment.to_string()).collect(),
            tokens_used,
            failure: None,
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            fragments: vec![],
            tokens_used: 0,
            failure: Some(message.to_string()),
        })
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn complete(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
    ) -> Result<Completion, UpstreamError> {
        if let Some(message) = &self.failure {
            return Err(UpstreamError::Http {
                status: 500,
                body: message.clone(),
            });
        }
        Ok(Completion {
            text: self.fragments.concat(),
            tokens_used: self.tokens_used,
        })
    }

    async fn complete_streaming(
        &self,
        _model: &str,
        _messages: &[ChatMessage],
    ) -> Result<FragmentStream, UpstreamError> {
        if let Some(message) = &self.failure {
            return Err(UpstreamError::Http {
                status: 500,
                body: message.clone(),
            });
        }
        let items: Vec<Result<String, UpstreamError>> =
            self.fragments.iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }

    async fn list_models(&self) -> Result<Vec<String>, UpstreamError> {
        Ok(vec![
            "reka-flash-research".to_string(),
            "reka-core".to_string(),
        ])
    }
}

/// A store backed by a throwaway SQLite file
///
/// The TempDir must be kept alive for the duration of the test.
pub fn temp_store() -> (TempDir, Arc<ResearchStore>) {
    let dir = TempDir::new().expect("temp dir");
    let store = Arc::new(ResearchStore::new(dir.path().join("research.db")).expect("open store"));
    (dir, store)
}

/// The full route tree wired to a test store and gateway
pub fn test_routes(
    store: Arc<ResearchStore>,
    gateway: Arc<dyn ChatGateway>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    configure_routes(store, gateway, TEST_MODEL.to_string())
}

/// Split an event-stream body into its `data:` payloads
pub fn data_frames(body: &[u8]) -> Vec<String> {
    std::str::from_utf8(body)
        .expect("event-stream body is UTF-8")
        .lines()
        .filter_map(|line| line.strip_prefix("data:").map(|data| data.trim().to_string()))
        .filter(|data| !data.is_empty())
        .collect()
}
