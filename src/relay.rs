//! Streaming response relay
//!
//! Coordinates three parties with different lifetimes: the in-flight
//! upstream fragment stream, the live client connection, and the deferred
//! persistence write. The relay is an explicit lazy event sequence: a
//! `start` event, one `content` event per upstream fragment (never a
//! cumulative snapshot; the client concatenates), then either `complete` or
//! `error`. Persistence happens exactly once, after the upstream ends
//! normally: the store has no append-in-place operation for response text,
//! so the full text is accumulated in memory and written in a single
//! deferred insert. On any upstream error the partial text is discarded.
//!
//! Client disconnects need no special handling: warp drops the response
//! stream, which drops this generator mid-`await` and with it the upstream
//! connection. The only write site is past the upstream's normal end, so a
//! dropped stream can never leave a partial record.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use futures::stream::Stream;
use futures::StreamExt;
use pin_utils::pin_mut;
use warp::sse::Event;

use crate::llm::{ChatGateway, ChatMessage};
use crate::sse;
use crate::store::ResearchStore;

/// Everything one streaming request needs
#[derive(Debug, Clone)]
pub struct RelayRequest {
    /// Session to persist under; persistence is skipped silently when absent
    pub session_id: Option<String>,
    /// The newest user turn, stored as the record's query text
    pub query: String,
    /// Model identifier forwarded upstream and stored with the record
    pub model: String,
    /// Conversation history, already including the new user turn
    pub messages: Vec<ChatMessage>,
}

/// Client-visible relay events, in strict emission order
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Stream opened; emitted before any upstream bytes are read
    Start { session_id: Option<String> },
    /// Exactly one upstream fragment
    Content { content: String },
    /// Upstream ended normally; carries the reconciled conversation
    Complete {
        session_id: Option<String>,
        messages: Vec<ChatMessage>,
        response_time: f64,
    },
    /// Upstream failed; nothing was persisted
    Error { error: String },
}

/// Run one streaming request as a lazy event sequence
pub fn events(
    gateway: Arc<dyn ChatGateway>,
    store: Arc<ResearchStore>,
    request: RelayRequest,
) -> impl Stream<Item = RelayEvent> {
    stream! {
        let RelayRequest { session_id, query, model, mut messages } = request;

        yield RelayEvent::Start { session_id: session_id.clone() };

        let started = Instant::now();

        let upstream = match gateway.complete_streaming(&model, &messages).await {
            Ok(upstream) => upstream,
            Err(e) => {
                yield RelayEvent::Error { error: e.to_string() };
                return;
            }
        };
        pin_mut!(upstream);

        // Accumulated solely for the single deferred write and the final
        // reconciled message sequence
        let mut response_text = String::new();

        while let Some(fragment) = upstream.next().await {
            match fragment {
                Ok(content) => {
                    response_text.push_str(&content);
                    yield RelayEvent::Content { content };
                }
                Err(e) => {
                    yield RelayEvent::Error { error: e.to_string() };
                    return;
                }
            }
        }

        let response_time = started.elapsed().as_secs_f64();

        // The streaming protocol does not surface usage metadata, so the
        // token count is recorded as unknown (0)
        if let Some(session_id) = &session_id {
            if let Err(e) = store.save_query(
                session_id,
                &query,
                &response_text,
                &model,
                0,
                response_time,
            ) {
                tracing::error!(session_id = %session_id, error = %e,
                    "failed to persist streamed response");
            }
        }

        messages.push(ChatMessage::assistant(response_text));

        yield RelayEvent::Complete { session_id, messages, response_time };
    }
}

/// Run one streaming request as SSE frames, terminated by `[DONE]`
pub fn sse_events(
    gateway: Arc<dyn ChatGateway>,
    store: Arc<ResearchStore>,
    request: RelayRequest,
) -> impl Stream<Item = Result<Event, Infallible>> {
    events(gateway, store, request)
        .map(|event| match event {
            RelayEvent::Start { session_id } => sse::create_start_event(session_id.as_deref()),
            RelayEvent::Content { content } => sse::create_content_event(&content),
            RelayEvent::Complete {
                session_id,
                messages,
                response_time,
            } => sse::create_complete_event(session_id.as_deref(), &messages, response_time),
            RelayEvent::Error { error } => sse::create_error_event(&error),
        })
        .chain(futures::stream::iter(vec![sse::create_done_event()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::error::UpstreamError;
    use crate::llm::gateway::FragmentStream;
    use crate::llm::types::Completion;
    use async_trait::async_trait;
    use tempfile::tempdir;

    /// Scripted gateway: a fixed fragment sequence, or a connect failure
    struct MockGateway {
        fragments: Vec<Result<&'static str, &'static str>>,
        fail_connect: bool,
    }

    impl MockGateway {
        fn streaming(fragments: Vec<Result<&'static str, &'static str>>) -> Arc<Self> {
            Arc::new(Self {
                fragments,
                fail_connect: false,
            })
        }

        fn failing_connect() -> Arc<Self> {
            Arc::new(Self {
                fragments: vec![],
                fail_connect: true,
            })
        }
    }

    #[async_trait]
    impl ChatGateway for MockGateway {
        async fn complete(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
        ) -> Result<Completion, UpstreamError> {
            unreachable!("relay never uses the synchronous path")
        }

        async fn complete_streaming(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
        ) -> Result<FragmentStream, UpstreamError> {
            if self.fail_connect {
                return Err(UpstreamError::Http {
                    status: 500,
                    body: "upstream exploded".to_string(),
                });
            }

            let items: Vec<Result<String, UpstreamError>> = self
                .fragments
                .iter()
                .map(|fragment| match fragment {
                    Ok(text) => Ok(text.to_string()),
                    Err(message) => Err(UpstreamError::Stream(message.to_string())),
                })
                .collect();

            Ok(Box::pin(futures::stream::iter(items)))
        }

        async fn list_models(&self) -> Result<Vec<String>, UpstreamError> {
            Ok(vec![])
        }
    }

    fn temp_store() -> (tempfile::TempDir, Arc<ResearchStore>) {
        let dir = tempdir().expect("temp dir");
        let store =
            Arc::new(ResearchStore::new(dir.path().join("research.db")).expect("open store"));
        (dir, store)
    }

    fn request(session_id: Option<&str>) -> RelayRequest {
        RelayRequest {
            session_id: session_id.map(str::to_string),
            query: "What is 2+2?".to_string(),
            model: "reka-flash-research".to_string(),
            messages: vec![ChatMessage::user("What is 2+2?")],
        }
    }

    #[tokio::test]
    async fn test_successful_stream_persists_concatenation() {
        let gateway = MockGateway::streaming(vec![Ok("The "), Ok("answer "), Ok("is 4.")]);
        let (_dir, store) = temp_store();

        let collected: Vec<RelayEvent> =
            events(gateway, store.clone(), request(Some("session-1")))
                .collect()
                .await;

        assert_eq!(collected.len(), 5);
        assert_eq!(
            collected[0],
            RelayEvent::Start {
                session_id: Some("session-1".to_string())
            }
        );

        let fragments: Vec<&str> = collected
            .iter()
            .filter_map(|event| match event {
                RelayEvent::Content { content } => Some(content.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fragments, vec!["The ", "answer ", "is 4."]);

        match &collected[4] {
            RelayEvent::Complete {
                session_id,
                messages,
                response_time,
            } => {
                assert_eq!(session_id.as_deref(), Some("session-1"));
                // user turn + appended assistant turn
                assert_eq!(messages.len(), 2);
                assert_eq!(messages[1].role, "assistant");
                assert_eq!(messages[1].content, "The answer is 4.");
                assert!(*response_time >= 0.0);
            }
            other => panic!("expected Complete, got {:?}", other),
        }

        // Persisted record equals the fragment concatenation, tokens unknown
        let history = store.get_session_history("session-1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].query, "What is 2+2?");
        assert_eq!(history[0].response, "The answer is 4.");
        assert_eq!(history[0].tokens_used, 0);
    }

    #[tokio::test]
    async fn test_stream_without_session_skips_persistence() {
        let gateway = MockGateway::streaming(vec![Ok("hi")]);
        let (_dir, store) = temp_store();

        let collected: Vec<RelayEvent> = events(gateway, store.clone(), request(None))
            .collect()
            .await;

        match collected.last() {
            Some(RelayEvent::Complete { session_id, .. }) => assert!(session_id.is_none()),
            other => panic!("expected Complete, got {:?}", other),
        }

        assert!(store.get_all_sessions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connect_failure_yields_start_then_error() {
        let gateway = MockGateway::failing_connect();
        let (_dir, store) = temp_store();

        let collected: Vec<RelayEvent> =
            events(gateway, store.clone(), request(Some("session-1")))
                .collect()
                .await;

        assert_eq!(collected.len(), 2);
        assert!(matches!(collected[0], RelayEvent::Start { .. }));
        match &collected[1] {
            RelayEvent::Error { error } => assert!(error.contains("upstream exploded")),
            other => panic!("expected Error, got {:?}", other),
        }

        assert!(store.get_session_history("session-1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_midstream_failure_discards_partial_text() {
        let gateway = MockGateway::streaming(vec![Ok("par"), Ok("tial"), Err("connection reset")]);
        let (_dir, store) = temp_store();

        let collected: Vec<RelayEvent> =
            events(gateway, store.clone(), request(Some("session-1")))
                .collect()
                .await;

        // start, two content events, error
        assert_eq!(collected.len(), 4);
        assert!(matches!(collected[1], RelayEvent::Content { .. }));
        assert!(matches!(collected[2], RelayEvent::Content { .. }));
        match &collected[3] {
            RelayEvent::Error { error } => assert!(error.contains("connection reset")),
            other => panic!("expected Error, got {:?}", other),
        }

        // The partial text is not retrievable via history
        assert!(store.get_session_history("session-1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_stream_completes_with_empty_response() {
        let gateway = MockGateway::streaming(vec![]);
        let (_dir, store) = temp_store();

        let collected: Vec<RelayEvent> =
            events(gateway, store.clone(), request(Some("session-1")))
                .collect()
                .await;

        assert_eq!(collected.len(), 2);
        match &collected[1] {
            RelayEvent::Complete { messages, .. } => {
                assert_eq!(messages[1].content, "");
            }
            other => panic!("expected Complete, got {:?}", other),
        }

        let history = store.get_session_history("session-1").unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].response, "");
    }

    #[tokio::test]
    async fn test_sse_stream_appends_done_sentinel() {
        let gateway = MockGateway::streaming(vec![Ok("a"), Ok("b")]);
        let (_dir, store) = temp_store();

        let frames: Vec<Result<Event, Infallible>> =
            sse_events(gateway, store, request(Some("session-1")))
                .collect()
                .await;

        // start + 2 content + complete + [DONE]
        assert_eq!(frames.len(), 5);
        assert!(frames.iter().all(|frame| frame.is_ok()));
    }

    #[tokio::test]
    async fn test_sse_stream_terminates_error_path_with_done() {
        let gateway = MockGateway::failing_connect();
        let (_dir, store) = temp_store();

        let frames: Vec<Result<Event, Infallible>> =
            sse_events(gateway, store, request(None)).collect().await;

        // start + error + [DONE]
        assert_eq!(frames.len(), 3);
    }
}
