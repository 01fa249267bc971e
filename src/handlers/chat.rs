// POST /api/chat handler

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;
use warp::http::StatusCode;
use warp::Reply;

use super::error_reply;
use crate::llm::{ChatGateway, ChatMessage};
use crate::models::{ChatRequest, ChatResponse, ErrorResponse};
use crate::relay::{self, RelayRequest};
use crate::store::ResearchStore;

/// Serve one chat turn, either as a single JSON envelope or as a live
/// event stream depending on the request's `stream` flag
pub async fn chat_handler(
    request: ChatRequest,
    store: Arc<ResearchStore>,
    gateway: Arc<dyn ChatGateway>,
    model: String,
) -> Result<warp::reply::Response, Infallible> {
    if request.message.is_empty() {
        return Ok(error_reply(
            StatusCode::BAD_REQUEST,
            ErrorResponse::new("Message is required"),
        ));
    }

    // Resolve the session id: accept a caller-supplied one verbatim, else
    // generate and eagerly register a fresh one before any upstream call
    let session_id = match request.session_id {
        Some(id) => id,
        None => {
            let id = Uuid::new_v4().to_string();
            if let Err(e) = store.create_session(&id) {
                tracing::error!(error = %e, "failed to create session");
                return Ok(error_reply(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::with_details("Failed to create session", e),
                ));
            }
            id
        }
    };

    // The caller's history is an opaque replay buffer; append the new turn
    let mut messages = request.messages;
    messages.push(ChatMessage::user(request.message.clone()));

    if request.stream {
        let relay_request = RelayRequest {
            session_id: Some(session_id),
            query: request.message,
            model,
            messages,
        };
        let events = relay::sse_events(gateway, store, relay_request);
        return Ok(warp::sse::reply(warp::sse::keep_alive().stream(events)).into_response());
    }

    let started = Instant::now();
    match gateway.complete(&model, &messages).await {
        Ok(completion) => {
            let response_time = started.elapsed().as_secs_f64();
            messages.push(ChatMessage::assistant(completion.text.clone()));

            // The response exists independently of whether it was durably
            // recorded; a failed write is logged, not surfaced
            if let Err(e) = store.save_query(
                &session_id,
                &request.message,
                &completion.text,
                &model,
                completion.tokens_used,
                response_time,
            ) {
                tracing::error!(session_id = %session_id, error = %e,
                    "failed to persist chat response");
            }

            let body = ChatResponse {
                response: completion.text,
                messages,
                session_id,
                success: true,
            };
            Ok(warp::reply::json(&body).into_response())
        }
        Err(e) => {
            tracing::error!(error = %e, "upstream completion failed");
            Ok(error_reply(
                StatusCode::BAD_GATEWAY,
                ErrorResponse::with_details("Upstream error", e),
            ))
        }
    }
}
