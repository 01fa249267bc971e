//! Reka client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;

use super::error::UpstreamError;
use super::gateway::{ChatGateway, FragmentStream};
use super::sse::parse_chunk_stream;
use super::types::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Completion, ModelList,
};

/// Default upstream endpoint (OpenAI-compatible)
pub const DEFAULT_BASE_URL: &str = "https://api.reka.ai/v1";

/// Client for the Reka chat-completion API
///
/// Any OpenAI-compatible endpoint works; the base URL is configurable.
pub struct RekaClient {
    /// HTTP client with bearer auth installed
    http_client: Client,
    /// API base URL without a trailing slash
    base_url: String,
}

impl RekaClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is not a valid header value or the
    /// HTTP client cannot be constructed.
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|e| UpstreamError::InvalidRequest(format!("Invalid API key: {}", e)))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http_client = Client::builder()
            .default_headers(headers)
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .map_err(|e| {
                UpstreamError::InvalidRequest(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the chat-completions endpoint URL
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    /// Build the model-listing endpoint URL
    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    /// Send a request and surface non-2xx statuses as [`UpstreamError::Http`]
    async fn send_checked(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, UpstreamError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| String::new());
            return Err(UpstreamError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatGateway for RekaClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<Completion, UpstreamError> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            stream: None,
        };

        let response = self
            .send_checked(self.http_client.post(self.completions_url()).json(&request))
            .await?;

        let completion: ChatCompletionResponse = response.json().await?;

        let tokens_used = completion.usage.map(|u| u.total_tokens).unwrap_or(0);
        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| {
                UpstreamError::InvalidResponse("completion contained no choices".to_string())
            })?;

        Ok(Completion { text, tokens_used })
    }

    async fn complete_streaming(
        &self,
        model: &str,
        messages: &[ChatMessage],
    ) -> Result<FragmentStream, UpstreamError> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.to_vec(),
            stream: Some(true),
        };

        let response = self
            .send_checked(self.http_client.post(self.completions_url()).json(&request))
            .await?;

        // Parse the SSE byte stream into chunks, then into bare fragments
        let byte_stream = response.bytes_stream();
        let chunks = parse_chunk_stream(Box::pin(byte_stream));

        let fragments = chunks.filter_map(|result| async move {
            match result {
                Ok(chunk) => chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|choice| choice.delta.content)
                    .filter(|text| !text.is_empty())
                    .map(Ok),
                Err(e) => Some(Err(e)),
            }
        });

        Ok(Box::pin(fragments))
    }

    async fn list_models(&self) -> Result<Vec<String>, UpstreamError> {
        let response = self
            .send_checked(self.http_client.get(self.models_url()))
            .await?;

        let models: ModelList = response.json().await?;
        Ok(models.data.into_iter().map(|model| model.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let client = RekaClient::new("test-key", "https://api.reka.ai/v1").unwrap();
        assert_eq!(
            client.completions_url(),
            "https://api.reka.ai/v1/chat/completions"
        );
        assert_eq!(client.models_url(), "https://api.reka.ai/v1/models");
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = RekaClient::new("test-key", "http://localhost:8080/v1/").unwrap();
        assert_eq!(
            client.completions_url(),
            "http://localhost:8080/v1/chat/completions"
        );
    }

    #[test]
    fn test_invalid_api_key_is_rejected() {
        let result = RekaClient::new("bad\nkey", DEFAULT_BASE_URL);
        assert!(matches!(result, Err(UpstreamError::InvalidRequest(_))));
    }
}
