//! Gemini `generateContent` transport.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ChatBackend, ClientError};
use crate::conversation::{Role, Turn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Longest error body kept in [`ClientError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Finish reasons that mean the reply was withheld rather than empty.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: Option<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.into(),
            timeout,
        }
    }

    /// Apply `GEMINI_BASE_URL` when it is set and non-blank.
    #[must_use]
    pub fn with_env_base_url(self) -> Self {
        match std::env::var("GEMINI_BASE_URL") {
            Ok(url) => self.with_base_url(&url),
            Err(_) => self,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, url: &str) -> Self {
        let trimmed = url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.base_url = trimmed.to_string();
        }
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

/// Blocking client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    config: GeminiConfig,
    http: Client,
}

impl GeminiClient {
    /// Build the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] if the TLS backend cannot be initialized.
    pub fn new(config: GeminiConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        Ok(Self { config, http })
    }

    pub const fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

impl ChatBackend for GeminiClient {
    fn generate(&self, context: &[Turn]) -> Result<String, ClientError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ClientError::MissingApiKey)?;
        let headers = build_headers(api_key)?;
        let request = build_request(context);
        let url = self.config.endpoint();

        let started = Instant::now();
        debug!(model = %self.config.model, turns = context.len(), "sending generateContent");
        let response = self
            .http
            .post(&url)
            .headers(headers)
            .json(&request)
            .send()
            .map_err(classify_reqwest_error)?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        debug!(
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "generateContent finished"
        );

        if !status.is_success() {
            warn!(status = status.as_u16(), "generateContent rejected");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: truncate_chars(body.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|err| ClientError::Decode(err.to_string()))?;
        extract_reply(parsed)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: Role,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    #[serde(default)]
    safety_ratings: Vec<SafetyRating>,
}

#[derive(Debug, Deserialize)]
struct SafetyRating {
    category: String,
    probability: String,
}

fn build_request(context: &[Turn]) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: context
            .iter()
            .map(|turn| Content {
                role: turn.role(),
                parts: [Part { text: turn.text() }],
            })
            .collect(),
    }
}

fn build_headers(api_key: &str) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    let key = HeaderValue::from_str(api_key.trim())
        .map_err(|_| ClientError::Transport("API key contains invalid characters".to_string()))?;
    headers.insert("x-goog-api-key", key);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Ok(headers)
}

fn classify_reqwest_error(err: reqwest::Error) -> ClientError {
    let message = if err.is_timeout() {
        format!("timed out: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    };
    ClientError::Transport(message)
}

/// Reply text of the first candidate, or why there is none.
fn extract_reply(response: GenerateResponse) -> Result<String, ClientError> {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return match response.prompt_feedback {
            Some(PromptFeedback {
                block_reason: Some(reason),
                safety_ratings,
            }) => Err(ClientError::Blocked(describe_block(&reason, &safety_ratings))),
            _ => Err(ClientError::EmptyReply),
        };
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }
    match candidate.finish_reason {
        Some(reason) if BLOCKING_FINISH_REASONS.contains(&reason.as_str()) => {
            Err(ClientError::Blocked(reason))
        }
        _ => Err(ClientError::EmptyReply),
    }
}

fn describe_block(reason: &str, ratings: &[SafetyRating]) -> String {
    let flagged: Vec<String> = ratings
        .iter()
        .filter(|rating| !matches!(rating.probability.as_str(), "NEGLIGIBLE" | "LOW"))
        .map(|rating| format!("{} {}", rating.category, rating.probability))
        .collect();
    if flagged.is_empty() {
        reason.to_string()
    } else {
        format!("{reason} ({})", flagged.join(", "))
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> GenerateResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_request_body_shape() {
        let context = vec![Turn::user("hi"), Turn::model("hello"), Turn::user("bye")];
        let body = serde_json::to_value(build_request(&context)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "contents": [
                    {"role": "user", "parts": [{"text": "hi"}]},
                    {"role": "model", "parts": [{"text": "hello"}]},
                    {"role": "user", "parts": [{"text": "bye"}]},
                ]
            })
        );
    }

    #[test]
    fn test_endpoint_uses_model_and_base() {
        let config = GeminiConfig::new(None, "gemini-test", Duration::from_secs(5))
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(
            config.endpoint(),
            "http://localhost:8080/v1/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_blank_base_url_keeps_default() {
        let config = GeminiConfig::new(None, DEFAULT_MODEL, Duration::from_secs(5))
            .with_base_url("   ");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        let config = GeminiConfig::new(Some("  ".to_string()), DEFAULT_MODEL, Duration::ZERO);
        assert_eq!(config.api_key, None);
    }

    #[test]
    fn test_missing_api_key_fails_before_network() {
        let client = GeminiClient::new(GeminiConfig::new(
            None,
            DEFAULT_MODEL,
            Duration::from_secs(1),
        ))
        .unwrap();
        assert_eq!(
            client.generate(&[Turn::user("hi")]),
            Err(ClientError::MissingApiKey)
        );
        assert_eq!(client.model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_extract_reply_joins_parts() {
        let response = decode(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello "},{"text":"there"}]},"finishReason":"STOP","index":0}]}"#,
        );
        assert_eq!(extract_reply(response), Ok("Hello there".to_string()));
    }

    #[test]
    fn test_extract_reply_uses_first_candidate() {
        let response = decode(
            r#"{"candidates":[{"content":{"parts":[{"text":"one"}]}},{"content":{"parts":[{"text":"two"}]}}]}"#,
        );
        assert_eq!(extract_reply(response), Ok("one".to_string()));
    }

    #[test]
    fn test_extract_reply_without_candidates_is_empty() {
        assert_eq!(extract_reply(decode("{}")), Err(ClientError::EmptyReply));
        assert_eq!(
            extract_reply(decode(r#"{"candidates":[]}"#)),
            Err(ClientError::EmptyReply)
        );
    }

    #[test]
    fn test_extract_reply_reports_prompt_block() {
        let response = decode(
            r#"{"promptFeedback":{"blockReason":"SAFETY","safetyRatings":[
                {"category":"HARM_CATEGORY_HARASSMENT","probability":"HIGH"},
                {"category":"HARM_CATEGORY_HATE_SPEECH","probability":"NEGLIGIBLE"}]}}"#,
        );
        assert_eq!(
            extract_reply(response),
            Err(ClientError::Blocked(
                "SAFETY (HARM_CATEGORY_HARASSMENT HIGH)".to_string()
            ))
        );
    }

    #[test]
    fn test_extract_reply_reports_safety_finish() {
        let response = decode(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert_eq!(
            extract_reply(response),
            Err(ClientError::Blocked("SAFETY".to_string()))
        );
    }

    #[test]
    fn test_extract_reply_with_textless_parts_is_empty() {
        let response =
            decode(r#"{"candidates":[{"content":{"parts":[{}]},"finishReason":"STOP"}]}"#);
        assert_eq!(extract_reply(response), Err(ClientError::EmptyReply));
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo", 2), "hé…");
        assert_eq!(truncate_chars("short", 10), "short");
    }

    #[test]
    fn test_header_rejects_control_characters() {
        assert!(build_headers("good-key").is_ok());
        assert!(matches!(
            build_headers("bad\nkey"),
            Err(ClientError::Transport(_))
        ));
    }
}
