//! Upstream LLM gateway
//!
//! This module wraps the OpenAI-compatible chat-completion API the backend
//! delegates generation to, in both whole-response and incremental-chunk
//! modes.

pub mod client;
pub mod error;
pub mod gateway;
pub mod sse;
pub mod types;

// Re-export commonly used types
pub use client::RekaClient;
pub use error::UpstreamError;
pub use gateway::{ChatGateway, FragmentStream};
pub use types::{ChatMessage, Completion};
