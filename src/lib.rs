// HTTP server modules
pub mod config;
pub mod handlers;
pub mod models;
pub mod relay;
pub mod routes;
pub mod sse;

// Research persistence
pub mod store;

// Upstream LLM gateway
pub mod llm;
