//! Server-Sent Events (SSE) parser for upstream streaming completions
//!
//! The OpenAI-compatible streaming format is a sequence of frames:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}
//!
//! data: {"choices":[{"delta":{},"finish_reason":"stop"}]}
//!
//! data: [DONE]
//! ```
//!
//! This parser:
//! 1. Buffers incoming bytes
//! 2. Scans for frame boundaries (double newline)
//! 3. Extracts and parses JSON from `data:` lines
//! 4. Swallows the `[DONE]` sentinel; the stream ends with the connection

use bytes::Bytes;
use futures::stream::Stream;
use futures::StreamExt;
use std::pin::Pin;

use super::error::UpstreamError;
use super::types::ChatChunk;

/// Parse a stream of bytes as completion chunks
pub fn parse_chunk_stream(
    byte_stream: Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>,
) -> Pin<Box<dyn Stream<Item = Result<ChatChunk, UpstreamError>> + Send>> {
    // Buffer to accumulate partial frames
    let mut buffer = String::new();

    let chunk_stream = byte_stream.flat_map(move |chunk_result| {
        let chunk = match chunk_result {
            Ok(bytes) => bytes,
            Err(e) => {
                return futures::stream::iter(vec![Err(UpstreamError::Stream(e.to_string()))]);
            }
        };

        // Convert bytes to string and append to buffer
        let text = match std::str::from_utf8(&chunk) {
            Ok(t) => t,
            Err(e) => {
                return futures::stream::iter(vec![Err(UpstreamError::Stream(format!(
                    "Invalid UTF-8 in stream: {}",
                    e
                )))]);
            }
        };

        buffer.push_str(text);

        // Process complete frames (delimited by \n\n)
        let mut chunks = Vec::new();
        while let Some(frame_end) = buffer.find("\n\n") {
            let frame_text = buffer[..frame_end].to_string();
            buffer.drain(..=frame_end + 1); // Remove frame + one of the newlines

            if let Some(parsed) = parse_frame(&frame_text) {
                chunks.push(parsed);
            }
        }

        // Return all chunks found in this read
        futures::stream::iter(chunks)
    });

    Box::pin(chunk_stream)
}

/// Parse a single SSE frame from its text representation
fn parse_frame(frame_text: &str) -> Option<Result<ChatChunk, UpstreamError>> {
    let mut data: Option<String> = None;

    for line in frame_text.lines() {
        let line = line.trim();

        // Skip empty lines and comments (keep-alive pings)
        if line.is_empty() || line.starts_with(':') {
            continue;
        }

        if let Some(data_val) = line.strip_prefix("data:") {
            data = Some(data_val.trim().to_string());
        }
    }

    let data = data?;

    // The terminal sentinel is not a chunk
    if data.is_empty() || data == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<ChatChunk>(&data) {
        Ok(chunk) => Some(Ok(chunk)),
        Err(e) => Some(Err(UpstreamError::Serialization(format!(
            "Failed to parse completion chunk: {}. Data: {}",
            e, data
        )))),
    }
}
