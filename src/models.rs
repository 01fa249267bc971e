// Request/response envelopes for the HTTP surface

use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;
use crate::store::{QueryRecord, SearchHit, SessionSummary, StoreStats};

// Request Types

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The new user message; required and non-empty
    #[serde(default)]
    pub message: String,
    /// Existing session to append to; a fresh one is created when absent
    #[serde(default)]
    pub session_id: Option<String>,
    /// Prior conversation turns, replayed verbatim by the caller
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Stream the response as server-sent events instead of one envelope
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Guard for destructive admin endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    pub confirm: bool,
}

// Response Types

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub messages: Vec<ChatMessage>,
    pub session_id: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<String>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionsResponse {
    pub sessions: Vec<SessionSummary>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub history: Vec<QueryRecord>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub search_term: String,
    pub results: Vec<SearchHit>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub stats: StoreStats,
    pub success: bool,
}

/// Response for admin actions (reset/clear)
#[derive(Debug, Clone, Serialize)]
pub struct ActionResponse {
    pub message: String,
    pub success: bool,
}

/// Uniform failure envelope; `success` is always false
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub success: bool,
}

impl ErrorResponse {
    /// A failure with a category message only
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
            success: false,
        }
    }

    /// A failure carrying the underlying error's own message
    pub fn with_details(error: impl Into<String>, details: impl ToString) -> Self {
        Self {
            error: error.into(),
            details: Some(details.to_string()),
            success: false,
        }
    }
}
