//! Wire types for the OpenAI-compatible chat-completion protocol

use serde::{Deserialize, Serialize};

/// A single role-tagged message in a conversation
///
/// The role is kept as an opaque string: callers replay their own history
/// on every request and the backend does not validate its shape beyond
/// role/content pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (`user`, `assistant`, ...)
    pub role: String,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Result of a whole-response completion call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Full generated text
    pub text: String,
    /// Total token usage reported by the upstream, 0 when unknown
    pub tokens_used: i64,
}

/// Request body for `POST /chat/completions`
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model identifier
    pub model: String,
    /// Conversation history including the new user turn
    pub messages: Vec<ChatMessage>,
    /// Request incremental SSE chunks instead of a single body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

/// Response body for a non-streaming completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<CompletionChoice>,
    /// Usage metadata; only populated in non-streaming mode
    pub usage: Option<CompletionUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionUsage {
    pub total_tokens: i64,
}

/// One SSE chunk of a streaming completion
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChunk {
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
    pub finish_reason: Option<String>,
}

/// Incremental content update within a chunk
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkDelta {
    pub content: Option<String>,
}

/// Response body for `GET /models`
#[derive(Debug, Clone, Deserialize)]
pub struct ModelList {
    pub data: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelEntry {
    pub id: String,
}
