use crate::ai::chat::{ChatClient, ChatError, Message};
use crate::ai::local::LocalAdvisor;
use crate::ai::prompt::PlantContext;
use crate::config::Config;
use crate::services::ConversationStore;
use serde::{Deserialize, Serialize};

/// Why a reply fell back to the local advisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorReason {
    QuotaExceeded,
    Unavailable,
    Unconfigured,
}

/// What the shell renders. `success` is true even for fallback replies;
/// `fallback` signals degraded quality, not failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    pub fallback: bool,
    pub error_reason: Option<ErrorReason>,
}

const QUOTA_NOTE: &str =
    " (Note: Advanced AI features are temporarily unavailable due to quota limits.)";

/// The assistant entry point. Tries the remote model and degrades to the
/// rule-based advisor on any failure; `reply` never errors, every path
/// ends in a renderable message.
pub struct CareAssistant {
    chat: ChatClient,
    configured: bool,
    plant_context: Option<PlantContext>,
    store: Option<ConversationStore>,
}

impl CareAssistant {
    pub fn new(config: &Config) -> Self {
        let chat = ChatClient::new(
            config.openai_api_key.clone().unwrap_or_default(),
            Some(config.chat_model.clone()),
            Some(config.chat_temperature),
            Some(config.chat_max_tokens),
        )
        .with_base_url(config.chat_base_url.clone());

        let store = match ConversationStore::new(config.db_path.clone()) {
            Ok(store) => Some(store),
            Err(e) => {
                log::warn!("conversation store unavailable: {}", e);
                None
            }
        };

        Self {
            chat,
            configured: config.chat_configured,
            plant_context: None,
            store,
        }
    }

    /// Answers one utterance. The shell is responsible for trimming and
    /// rejecting empty input before calling this.
    pub async fn reply(&mut self, utterance: &str) -> Outcome {
        if !self.configured {
            log::debug!("chat API not configured, using local advisor");
            return self.fallback(utterance, ErrorReason::Unconfigured);
        }

        match self.chat.send(utterance, self.plant_context.as_ref()).await {
            Ok(reply) => {
                self.persist("user", utterance, "remote");
                self.persist("assistant", &reply, "remote");
                Outcome {
                    success: true,
                    message: reply,
                    fallback: false,
                    error_reason: None,
                }
            }
            Err(err) => {
                log::warn!("remote chat failed: {}", err);
                let reason = match err {
                    ChatError::QuotaExceeded(_) => ErrorReason::QuotaExceeded,
                    ChatError::Unavailable(_) => ErrorReason::Unavailable,
                };
                self.fallback(utterance, reason)
            }
        }
    }

    fn fallback(&mut self, utterance: &str, reason: ErrorReason) -> Outcome {
        let mut message = LocalAdvisor::classify(utterance, self.plant_context.as_ref());
        if reason == ErrorReason::QuotaExceeded {
            message.push_str(QUOTA_NOTE);
        }

        self.persist("user", utterance, "fallback");
        self.persist("assistant", &message, "fallback");

        Outcome {
            success: true,
            message,
            fallback: true,
            error_reason: Some(reason),
        }
    }

    fn persist(&self, role: &str, content: &str, model: &str) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save_message(role, content, model) {
                log::error!("failed to persist {} message: {}", role, e);
            }
        }
    }

    pub fn set_plant_context(&mut self, plant: Option<PlantContext>) {
        if let Some(plant) = &plant {
            log::info!("plant context set: {}", plant.scientific_name);
        }
        self.plant_context = plant;
    }

    pub fn plant_context(&self) -> Option<&PlantContext> {
        self.plant_context.as_ref()
    }

    pub fn history(&self) -> &[Message] {
        self.chat.history()
    }

    pub fn clear_history(&mut self) {
        self.chat.clear_history();
        if let Some(store) = &self.store {
            if let Err(e) = store.clear_session() {
                log::error!("failed to clear stored session: {}", e);
            }
        }
        log::info!("conversation history cleared");
    }

    pub fn storage_stats(&self) -> String {
        match &self.store {
            Some(store) => store
                .stats()
                .unwrap_or_else(|e| format!("stats unavailable: {}", e)),
            None => "conversation store unavailable".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::path::Path;

    fn test_config(base_url: &str, configured: bool, db_dir: &Path) -> Config {
        Config {
            openai_api_key: Some("sk-test".to_string()),
            chat_configured: configured,
            chat_base_url: base_url.to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            chat_temperature: 0.7,
            chat_max_tokens: 500,
            plantnet_api_key: None,
            plantnet_base_url: "http://unused.invalid".to_string(),
            plantnet_project: "all".to_string(),
            weather_api_key: None,
            weather_base_url: "http://unused.invalid".to_string(),
            weather_configured: false,
            places_api_key: None,
            places_base_url: "http://unused.invalid".to_string(),
            places_configured: false,
            db_path: Some(db_dir.join("sprout-test.db")),
            assistant_name: "Sprout".to_string(),
        }
    }

    fn reply_body(text: &str) -> serde_json::Value {
        json!({
            "choices": [
                { "message": { "role": "assistant", "content": text } }
            ]
        })
    }

    #[tokio::test]
    async fn unconfigured_short_circuits_without_a_network_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(reply_body("should never be sent"));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.url("/chat/completions"), false, dir.path());
        let mut assistant = CareAssistant::new(&config);

        let outcome = assistant.reply("How often should I water?").await;

        assert_eq!(mock.hits_async().await, 0);
        assert!(outcome.success);
        assert!(outcome.fallback);
        assert_eq!(outcome.error_reason, Some(ErrorReason::Unconfigured));
        assert!(outcome.message.contains("water"));
    }

    #[tokio::test]
    async fn remote_success_is_not_a_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(reply_body("Water it once a week."));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.url("/chat/completions"), true, dir.path());
        let mut assistant = CareAssistant::new(&config);

        let outcome = assistant.reply("How often should I water?").await;

        assert!(outcome.success);
        assert!(!outcome.fallback);
        assert_eq!(outcome.error_reason, None);
        assert_eq!(outcome.message, "Water it once a week.");
        assert_eq!(assistant.history().len(), 2);
    }

    #[tokio::test]
    async fn quota_failure_appends_the_caveat() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(429)
                    .json_body(json!({ "error": { "message": "Rate limit reached" } }));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.url("/chat/completions"), true, dir.path());
        let mut assistant = CareAssistant::new(&config);

        let outcome = assistant.reply("How often should I water?").await;

        assert!(outcome.fallback);
        assert_eq!(outcome.error_reason, Some(ErrorReason::QuotaExceeded));
        assert!(outcome.message.ends_with(QUOTA_NOTE));
        // failed exchange must not enter the request history
        assert!(assistant.history().is_empty());
    }

    #[tokio::test]
    async fn server_error_has_no_caveat() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(500).body("internal error");
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.url("/chat/completions"), true, dir.path());
        let mut assistant = CareAssistant::new(&config);

        let outcome = assistant.reply("How often should I water?").await;

        assert_eq!(outcome.error_reason, Some(ErrorReason::Unavailable));
        assert!(!outcome.message.ends_with(QUOTA_NOTE));
        assert!(assistant.history().is_empty());
    }

    #[tokio::test]
    async fn context_names_the_plant_when_no_keyword_matches() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config("http://unused.invalid", false, dir.path());
        let mut assistant = CareAssistant::new(&config);
        assistant.set_plant_context(Some(PlantContext {
            scientific_name: "Monstera deliciosa".to_string(),
            common_names: vec![],
        }));

        let outcome = assistant.reply("hello").await;

        assert!(outcome.success);
        assert!(outcome.fallback);
        assert_eq!(outcome.error_reason, Some(ErrorReason::Unconfigured));
        assert!(outcome.message.contains("Monstera deliciosa"));
    }

    #[tokio::test]
    async fn clear_history_empties_memory_and_store() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .header("content-type", "application/json")
                    .json_body(reply_body("Weekly."));
            })
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&server.url("/chat/completions"), true, dir.path());
        let mut assistant = CareAssistant::new(&config);

        assistant.reply("water?").await;
        assert_eq!(assistant.history().len(), 2);

        assistant.clear_history();
        assert!(assistant.history().is_empty());
        assert!(assistant.storage_stats().contains("0 in current session"));
    }
}
