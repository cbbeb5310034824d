//! Outbound chat client for the resume assistant.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use folio_core::config::Config;

/// Upper bound on one upstream round trip.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("Folio-Resume-Server/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat upstream is not configured")]
    NotConfigured,

    #[error("timed out contacting chat upstream")]
    Timeout,

    #[error("chat upstream returned HTTP {0}")]
    Upstream(u16),

    #[error("chat transport error: {0}")]
    Transport(String),
}

impl ChatError {
    /// Text shown to the visitor in place of a model answer.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            ChatError::Timeout => {
                "Connection timeout to AI service. Please try again in a moment or use commands \
                 like \"help\", \"skills\", or \"projects\"."
            }
            ChatError::Upstream(_) => {
                "AI service error. Please try again or use basic commands like \"help\", \
                 \"skills\", or \"projects\"."
            }
            ChatError::NotConfigured | ChatError::Transport(_) => {
                "AI service temporarily unavailable. Please try basic commands like \"help\", \
                 \"skills\", or \"projects\"."
            }
        }
    }
}

/// A `generateContent`-shaped body carrying a single text candidate.
///
/// The SPA reads `candidates[0].content.parts[0].text`, so fallbacks use the
/// same shape as a real answer.
pub fn fallback_payload(message: &str) -> Value {
    json!({
        "candidates": [{
            "content": {
                "parts": [{ "text": message }]
            }
        }]
    })
}

/// Generates a reply for a visitor prompt.
#[async_trait]
pub trait ChatClient: Send + Sync + 'static {
    /// Returns the upstream JSON body unchanged on success.
    async fn generate(&self, prompt: &str) -> Result<Value, ChatError>;
}

/// Google Gemini `generateContent` client.
pub struct GeminiClient {
    http: reqwest::Client,
    url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(CHAT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
            api_key: api_key.into(),
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &Config) -> anyhow::Result<Option<Self>> {
        config
            .gemini_api_key
            .as_deref()
            .map(|key| Self::new(config.gemini_url.clone(), key))
            .transpose()
    }
}

/// Request body for one prompt.
pub fn generate_content_body(prompt: &str) -> Value {
    const BLOCK: &str = "BLOCK_MEDIUM_AND_ABOVE";
    json!({
        "contents": [{
            "parts": [{ "text": prompt }]
        }],
        "generationConfig": {
            "temperature": 0.7,
            "topK": 1,
            "topP": 1,
            "maxOutputTokens": 2048
        },
        "safetySettings": [
            { "category": "HARM_CATEGORY_HARASSMENT", "threshold": BLOCK },
            { "category": "HARM_CATEGORY_HATE_SPEECH", "threshold": BLOCK },
            { "category": "HARM_CATEGORY_SEXUALLY_EXPLICIT", "threshold": BLOCK },
            { "category": "HARM_CATEGORY_DANGEROUS_CONTENT", "threshold": BLOCK }
        ]
    })
}

fn transport_error(e: reqwest::Error) -> ChatError {
    if e.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::Transport(e.to_string())
    }
}

#[async_trait]
impl ChatClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Value, ChatError> {
        let response = self
            .http
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&generate_content_body(prompt))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Upstream(status.as_u16()));
        }

        response.json::<Value>().await.map_err(transport_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_forwards_prompt_verbatim() {
        let body = generate_content_body("what are your skills?");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "what are your skills?");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(body["safetySettings"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn fallback_has_candidate_shape() {
        let payload = fallback_payload(ChatError::Timeout.fallback_message());
        let text = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default();
        assert!(text.starts_with("Connection timeout"));
    }

    #[test]
    fn no_key_means_no_client() {
        let config = Config::from_vars(|_| None).unwrap();
        assert!(GeminiClient::from_config(&config).unwrap().is_none());

        let config = Config::from_vars(|k| {
            (k == "FOLIO_GEMINI_API_KEY").then(|| "secret".to_string())
        })
        .unwrap();
        assert!(GeminiClient::from_config(&config).unwrap().is_some());
    }
}
