//! Row types returned by the research store

use serde::{Deserialize, Serialize};

/// One persisted query/response pair
///
/// Records are append-only and immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: i64,
    pub query: String,
    pub response: String,
    pub model: String,
    pub tokens_used: i64,
    /// Response latency in seconds
    pub response_time: f64,
    pub created_at: String,
}

/// A search match across stored queries and responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: i64,
    pub session_id: String,
    pub query: String,
    pub response: String,
    pub created_at: String,
}

/// A session row with its last-query summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub created_at: String,
    pub updated_at: String,
    pub query_count: i64,
    pub last_query: Option<String>,
}

/// Aggregate counts over the whole store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_queries: i64,
    pub total_sessions: i64,
    pub total_tokens: i64,
    /// Mean latency in seconds over records with a measured latency,
    /// rounded to two decimals
    pub avg_response_time: f64,
}
