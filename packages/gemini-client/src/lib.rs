//! Pure Google Gemini REST API client
//!
//! A minimal client for the Gemini `generateContent` endpoint with no
//! domain-specific logic. Supports plain text generation, JSON-schema
//! constrained output, and Google Search grounding.
//!
//! # Example
//!
//! ```rust,ignore
//! use gemini_client::{GeminiClient, GenerateRequest};
//!
//! let client = GeminiClient::from_env()?;
//!
//! let response = client
//!     .generate_content("gemini-3-flash-preview", GenerateRequest::user("Hello!"))
//!     .await?;
//! ```
//!
//! # Type-Safe Structured Output
//!
//! ```rust,ignore
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct Contact {
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! let contacts: Vec<Contact> = client
//!     .extract::<Vec<Contact>>("gemini-3-flash-preview", system_prompt, user_prompt, true)
//!     .await?;
//! ```

pub mod error;
pub mod schema;
pub mod types;

pub use error::{GeminiError, Result};
pub use schema::StructuredOutput;
pub use types::*;

use reqwest::Client;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Pure Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Create from environment variable `GEMINI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| GeminiError::Config("GEMINI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for proxies, test servers, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Call `models/{model}:generateContent`.
    pub async fn generate_content(
        &self,
        model: &str,
        request: GenerateRequest,
    ) -> Result<GenerateResponse> {
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/models/{}:generateContent", self.base_url, model))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Gemini request failed");
                GeminiError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<types::ErrorEnvelope>(&error_text)
                .map(|env| env.error.message)
                .unwrap_or(error_text);
            warn!(status = %status, error = %message, "Gemini API error");
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GeminiError::Parse(e.to_string()))?;

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis(),
            total_tokens = generated.usage_metadata.as_ref().map(|u| u.total_token_count),
            "Gemini generateContent"
        );

        Ok(generated)
    }

    /// Generate text and return the first candidate's content.
    pub async fn generate_text(&self, model: &str, request: GenerateRequest) -> Result<String> {
        let response = self.generate_content(model, request).await?;
        first_text(response)
    }

    /// Type-safe structured output extraction.
    ///
    /// Generates a response schema from `T`, asks for `application/json`
    /// output, and deserializes the first candidate. With `grounded` set the
    /// Google Search tool is attached to the request.
    pub async fn extract<T: StructuredOutput>(
        &self,
        model: &str,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        grounded: bool,
    ) -> Result<T> {
        let schema = T::gemini_schema();

        debug!(
            type_name = T::type_name(),
            schema = %serde_json::to_string(&schema).unwrap_or_default(),
            "Generated Gemini schema for extraction"
        );

        let mut request = GenerateRequest::user(user_prompt)
            .system(system_prompt)
            .with_generation_config(GenerationConfig::json(schema));
        if grounded {
            request = request.with_google_search();
        }

        let text = self.generate_text(model, request).await?;

        serde_json::from_str(strip_code_blocks(&text))
            .map_err(|e| GeminiError::Parse(format!("Failed to deserialize response: {}", e)))
    }
}

fn first_text(response: GenerateResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
    {
        return Err(GeminiError::Blocked(reason));
    }

    match response.text() {
        Some(text) => Ok(text),
        None => {
            let reason = response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
                .unwrap_or_else(|| "no candidates".to_string());
            Err(GeminiError::Blocked(reason))
        }
    }
}

/// Strip markdown code fences from a response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Contact {
        name: String,
        email: Option<String>,
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": text}]},
                "finishReason": "STOP"
            }]
        })
    }

    #[test]
    fn test_client_builder() {
        let client = GeminiClient::new("key-test").with_base_url("https://custom.api.com/");

        assert_eq!(client.api_key, "key-test");
        assert_eq!(client.base_url(), "https://custom.api.com");
    }

    #[test]
    fn test_strip_code_blocks() {
        assert_eq!(strip_code_blocks("```json\n[]\n```"), "[]");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  []  "), "[]");
    }

    #[tokio::test]
    async fn test_extract_parses_structured_array() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/test-model:generateContent"))
            .and(header("x-goog-api-key", "key-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body(
                r#"[{"name": "Ada", "email": "ada@example.com"}, {"name": "Bob", "email": null}]"#,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new("key-test").with_base_url(server.uri());
        let contacts: Vec<Contact> = client
            .extract("test-model", "system", "find contacts", true)
            .await
            .unwrap();

        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].email.as_deref(), Some("ada@example.com"));
        assert!(contacts[1].email.is_none());
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("key-test").with_base_url(server.uri());
        let err = client
            .generate_content("test-model", GenerateRequest::user("hi"))
            .await
            .unwrap_err();

        match &err {
            GeminiError::Api { status, message } => {
                assert_eq!(*status, 429);
                assert_eq!(message, "Resource has been exhausted");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new("key-test").with_base_url(server.uri());
        let err = client
            .generate_text("test-model", GenerateRequest::user("hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::Blocked(ref r) if r == "SAFETY"));
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("not json")))
            .mount(&server)
            .await;

        let client = GeminiClient::new("key-test").with_base_url(server.uri());
        let err = client
            .extract::<Vec<Contact>>("test-model", "system", "user", false)
            .await
            .unwrap_err();

        assert!(matches!(err, GeminiError::Parse(_)));
    }
}
