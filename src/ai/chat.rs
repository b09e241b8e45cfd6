use crate::ai::prompt::{self, PlantContext};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
/// How many stored history entries accompany each request. Older turns
/// stay in the history but are not sent.
pub const HISTORY_WINDOW: usize = 10;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Why a remote exchange failed. Quota exhaustion is kept separate so the
/// caller can surface it; everything else collapses into `Unavailable`.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat API quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("chat API unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

/// Client for the hosted chat-completion endpoint. Owns the conversation
/// history for its session; history only grows after a confirmed
/// successful exchange.
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    history: Vec<Message>,
}

impl ChatClient {
    pub fn new(
        api_key: String,
        model: Option<String>,
        temperature: Option<f32>,
        max_tokens: Option<u32>,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            http,
            api_key,
            base_url: OPENAI_API_URL.to_string(),
            model: model.unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            temperature: temperature.unwrap_or(0.7),
            max_tokens: max_tokens.unwrap_or(500),
            history: Vec::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// System turn + last `HISTORY_WINDOW` history entries + the new user
    /// turn. The system turn is synthesized here and never stored.
    fn build_messages(&self, utterance: &str, plant: Option<&PlantContext>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(HISTORY_WINDOW + 2);
        messages.push(Message {
            role: "system".to_string(),
            content: prompt::system_preamble(plant),
        });

        let start = self.history.len().saturating_sub(HISTORY_WINDOW);
        messages.extend_from_slice(&self.history[start..]);

        messages.push(Message {
            role: "user".to_string(),
            content: utterance.to_string(),
        });

        messages
    }

    /// Sends the utterance to the remote endpoint. The caller must have
    /// trimmed and rejected empty input already. On success the user and
    /// assistant turns are appended to the history; any failure leaves the
    /// history untouched.
    pub async fn send(
        &mut self,
        utterance: &str,
        plant: Option<&PlantContext>,
    ) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: self.build_messages(utterance, plant),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Unavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Unavailable(e.to_string()))?;

        if !status.is_success() {
            log::warn!("chat API error ({}): {}", status, body);
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS || body.contains("quota") {
                return Err(ChatError::QuotaExceeded(status.to_string()));
            }
            return Err(ChatError::Unavailable(status.to_string()));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ChatError::Unavailable(format!("malformed response: {}", e)))?;

        let reply = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| ChatError::Unavailable("empty response from chat API".to_string()))?;

        self.history.push(Message {
            role: "user".to_string(),
            content: utterance.to_string(),
        });
        self.history.push(Message {
            role: "assistant".to_string(),
            content: reply.clone(),
        });

        Ok(reply)
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
