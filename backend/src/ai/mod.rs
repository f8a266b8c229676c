//! Syllabus extraction via an LLM.
//!
//! The core never talks to a model. Hosts inject a [`SyllabusExtractor`]:
//! "given syllabus text, return model output JSON text". [`AiClient`] is the
//! Anthropic-backed implementation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use syllabus::ai::{AiClient, SyllabusExtractor};
//! use syllabus::Settings;
//!
//! let client = AiClient::from_settings(&Settings::from_env()?)?;
//! let json_text = client.extract(&syllabus_text).await?;
//! ```

pub mod prompt;

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::api::logs::{log_info, log_success, log_warning};
use crate::config::{Settings, DEFAULT_AI_MODEL, DEFAULT_MAX_WEEK};

pub use crate::error::{AiError, AiResult};
pub use prompt::{system_prompt, user_prompt};

/// Anything that turns syllabus text into model output JSON text.
///
/// The returned text is untrusted and is validated by the caller.
#[async_trait]
pub trait SyllabusExtractor: Send + Sync {
    async fn extract(&self, syllabus_text: &str) -> AiResult<String>;
}

/// Anthropic API client
#[derive(Clone)]
pub struct AiClient {
    api_key: String,
    model: String,
    max_week: u32,
    http: reqwest::Client,
}

/// Anthropic API response structure
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    content_type: String,
    #[serde(default)]
    text: String,
}

/// Anthropic API error response
#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

const API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default number of attempts
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay between retries in milliseconds
const RETRY_DELAY_MS: u64 = 1000;

/// Response budget per call
const MAX_TOKENS: u32 = 4096;

/// Shortest syllabus worth sending (non-whitespace characters).
const MIN_SYLLABUS_CHARS: usize = 20;

impl AiClient {
    /// Create a new client with explicit API key
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_AI_MODEL.to_string(),
            max_week: DEFAULT_MAX_WEEK,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from loaded settings.
    pub fn from_settings(settings: &Settings) -> AiResult<Self> {
        let api_key = settings
            .anthropic_api_key
            .clone()
            .ok_or(AiError::MissingApiKey)?;
        Ok(Self::new(api_key)
            .with_model(&settings.ai_model)
            .with_max_week(settings.expand.max_week))
    }

    /// Set the model to use
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Week bound quoted in the prompt
    pub fn with_max_week(mut self, max_week: u32) -> Self {
        self.max_week = max_week;
        self
    }

    /// Extract with retries.
    async fn extract_with_retries(&self, syllabus_text: &str) -> AiResult<String> {
        let mut last_error = None;

        for attempt in 1..=DEFAULT_MAX_RETRIES {
            match self.call_api(syllabus_text).await {
                Ok(text) => return Ok(extract_json(&text)),
                Err(e) => {
                    log_warning(format!(
                        "Attempt {}/{} failed: {}",
                        attempt, DEFAULT_MAX_RETRIES, e
                    ));
                    last_error = Some(e);

                    if attempt < DEFAULT_MAX_RETRIES {
                        log_info(format!("↻ Retrying in {}ms...", RETRY_DELAY_MS));
                        tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or(AiError::EmptyResponse))
    }

    /// Call Anthropic API
    async fn call_api(&self, syllabus_text: &str) -> AiResult<String> {
        log_info(format!("📡 Calling Anthropic API (model {})...", self.model));

        let request_body = serde_json::json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "temperature": 0,
            "system": prompt::system_prompt(self.max_week),
            "messages": [
                { "role": "user", "content": prompt::user_prompt(syllabus_text) }
            ]
        });

        let response = self
            .http
            .post(API_URL)
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AiError::RequestFailed(e.to_string()))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<AnthropicError>(&body) {
                return Err(AiError::ApiError(error.error.message));
            }
            return Err(AiError::ApiError(format!("HTTP {}: {}", status, body)));
        }

        let text = response_text(&body)?;
        log_success(format!("Received {} bytes", text.len()));
        Ok(text)
    }
}

#[async_trait]
impl SyllabusExtractor for AiClient {
    async fn extract(&self, syllabus_text: &str) -> AiResult<String> {
        check_input(syllabus_text)?;
        self.extract_with_retries(syllabus_text).await
    }
}

/// Reject input too short to contain a schedule.
fn check_input(syllabus_text: &str) -> AiResult<()> {
    let chars = syllabus_text.chars().filter(|c| !c.is_whitespace()).count();
    if chars < MIN_SYLLABUS_CHARS {
        return Err(AiError::InputTooShort(chars));
    }
    Ok(())
}

/// Concatenate the text blocks of a Messages API response body.
fn response_text(body: &str) -> AiResult<String> {
    let response: AnthropicResponse =
        serde_json::from_str(body).map_err(|e| AiError::InvalidResponse(e.to_string()))?;

    let text = response
        .content
        .iter()
        .filter(|c| c.content_type == "text")
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(AiError::EmptyResponse);
    }
    Ok(text)
}

/// Extract JSON from a response that may contain markdown code blocks
///
/// Models asked for bare JSON still wrap it in fences now and then. This only
/// unwraps; it never repairs, so broken JSON stays broken.
pub fn extract_json(text: &str) -> String {
    // Try to find JSON in code block
    if let Some(start) = text.find("```json") {
        let json_start = start + 7; // len of "```json"
        if let Some(end) = text[json_start..].find("```") {
            return text[json_start..json_start + end].trim().to_string();
        }
    }

    // Try to find JSON in generic code block
    if let Some(start) = text.find("```") {
        let after_start = start + 3;
        // Skip language identifier if present
        let content_start = text[after_start..]
            .find('\n')
            .map(|i| after_start + i + 1)
            .unwrap_or(after_start);

        if let Some(end) = text[content_start..].find("```") {
            return text[content_start..content_start + end].trim().to_string();
        }
    }

    // Try to find raw JSON object
    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            return text[start..=end].to_string();
        }
    }

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = r#"Here's the schedule:

```json
{
  "recurring": [],
  "one_off": []
}
```

Done!"#;

        let json = extract_json(response);
        assert!(json.starts_with('{'));
        assert!(json.ends_with('}'));
        assert!(json.contains("\"one_off\""));
    }

    #[test]
    fn test_extract_json_from_generic_block() {
        let response = "```\n{\"recurring\": []}\n```";
        assert_eq!(extract_json(response), "{\"recurring\": []}");
    }

    #[test]
    fn test_extract_raw_json() {
        let response = r#"{"recurring": [], "one_off": []}"#;
        assert_eq!(extract_json(response), response);
    }

    #[test]
    fn test_extract_json_with_prose() {
        let response = "Sure! {\"recurring\": []} Hope this helps.";
        assert_eq!(extract_json(response), "{\"recurring\": []}");
    }

    #[test]
    fn test_extract_json_leaves_garbage_alone() {
        assert_eq!(extract_json("  no json here "), "no json here");
    }

    #[test]
    fn test_check_input() {
        assert!(matches!(check_input("   short  "), Err(AiError::InputTooShort(5))));
        assert!(check_input("CS 101: quizzes every Friday at 11:59pm").is_ok());
    }

    #[test]
    fn test_response_text() {
        let body = r#"{"content": [
            {"type": "text", "text": "{\"recurring\""},
            {"type": "tool_use", "id": "x"},
            {"type": "text", "text": ": []}"}
        ]}"#;
        assert_eq!(response_text(body).unwrap(), "{\"recurring\": []}");

        assert!(matches!(
            response_text(r#"{"content": []}"#),
            Err(AiError::EmptyResponse)
        ));
        assert!(matches!(
            response_text("<html>"),
            Err(AiError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_from_settings_requires_key() {
        let settings = Settings::default();
        assert!(matches!(
            AiClient::from_settings(&settings),
            Err(AiError::MissingApiKey)
        ));

        let settings = Settings {
            anthropic_api_key: Some("sk-test".into()),
            ..Settings::default()
        };
        let client = AiClient::from_settings(&settings).unwrap();
        assert_eq!(client.model, DEFAULT_AI_MODEL);
        assert_eq!(client.max_week, 10);
    }

    #[test]
    fn test_client_follows_environment_settings() {
        let settings = Settings::from_lookup(|key| match key {
            "ANTHROPIC_API_KEY" => Some("sk-test".into()),
            "SYLLABUS_AI_MODEL" => Some("claude-test".into()),
            "SYLLABUS_MAX_WEEK" => Some("16".into()),
            _ => None,
        })
        .unwrap();

        let client = AiClient::from_settings(&settings).unwrap();
        assert_eq!(client.model, "claude-test");
        assert_eq!(client.max_week, 16);
        assert!(system_prompt(client.max_week).contains("at most 16"));
    }

    #[tokio::test]
    async fn test_short_input_skips_api() {
        let client = AiClient::new("sk-test".into());
        let err = client.extract("hi").await.unwrap_err();
        assert!(matches!(err, AiError::InputTooShort(2)));
    }
}
