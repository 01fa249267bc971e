// SSE frame constructors for the streaming chat path
//
// Every frame is a `data: <json>` payload carrying a `type` field; the
// stream is terminated by a literal `data: [DONE]` frame.

use std::convert::Infallible;
use warp::sse::Event;

use crate::llm::ChatMessage;

/// Create a start SSE event announcing the session before any upstream bytes
pub fn create_start_event(session_id: Option<&str>) -> Result<Event, Infallible> {
    let payload = serde_json::json!({
        "type": "start",
        "session_id": session_id
    });

    Ok(Event::default().data(payload.to_string()))
}

/// Create a content SSE event carrying exactly one upstream fragment
pub fn create_content_event(content: &str) -> Result<Event, Infallible> {
    let payload = serde_json::json!({
        "type": "content",
        "content": content
    });

    Ok(Event::default().data(payload.to_string()))
}

/// Create a complete SSE event with the reconciled conversation
pub fn create_complete_event(
    session_id: Option<&str>,
    messages: &[ChatMessage],
    response_time: f64,
) -> Result<Event, Infallible> {
    let payload = serde_json::json!({
        "type": "complete",
        "session_id": session_id,
        "messages": messages,
        "response_time": response_time
    });

    Ok(Event::default().data(payload.to_string()))
}

/// Create an error SSE event carrying the upstream's message
pub fn create_error_event(error: &str) -> Result<Event, Infallible> {
    let payload = serde_json::json!({
        "type": "error",
        "error": error
    });

    Ok(Event::default().data(payload.to_string()))
}

/// Create the terminal sentinel frame
pub fn create_done_event() -> Result<Event, Infallible> {
    Ok(Event::default().data("[DONE]"))
}
