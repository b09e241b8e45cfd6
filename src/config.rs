use std::env;
use std::path::PathBuf;

// Placeholder keys shipped in sample .env files. A key equal to its
// placeholder counts as "not configured" just like a missing one.
const OPENAI_KEY_PLACEHOLDER: &str = "YOUR_OPENAI_API_KEY";
const PLANTNET_KEY_PLACEHOLDER: &str = "YOUR_PLANTNET_API_KEY";
const WEATHER_KEY_PLACEHOLDER: &str = "YOUR_WEATHER_API_KEY";
const PLACES_KEY_PLACEHOLDER: &str = "YOUR_GOOGLE_MAPS_API_KEY";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    /// Whether the chat API may be attempted at all. Decided once here,
    /// not by re-inspecting the key value downstream.
    pub chat_configured: bool,
    pub chat_base_url: String,
    pub chat_model: String,
    pub chat_temperature: f32,
    pub chat_max_tokens: u32,

    pub plantnet_api_key: Option<String>,
    pub plantnet_base_url: String,
    pub plantnet_project: String,

    pub weather_api_key: Option<String>,
    pub weather_base_url: String,
    pub weather_configured: bool,

    pub places_api_key: Option<String>,
    pub places_base_url: String,
    pub places_configured: bool,

    /// Conversation database location; None means the per-user default.
    pub db_path: Option<PathBuf>,
    pub assistant_name: String,
}

/// Reads a key from the environment, treating the empty string and the
/// known placeholder as absent.
fn key_from_env(var: &str, placeholder: &str) -> Option<String> {
    match env::var(var) {
        Ok(value) if !value.trim().is_empty() && value != placeholder => Some(value),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        dotenv::dotenv().ok();

        let openai_api_key = key_from_env("OPENAI_API_KEY", OPENAI_KEY_PLACEHOLDER);
        let chat_configured = openai_api_key.is_some();

        let chat_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());

        let chat_model = env::var("OPENAI_MODEL")
            .unwrap_or_else(|_| "gpt-3.5-turbo".to_string());

        let chat_temperature = env::var("OPENAI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(0.7);

        let chat_max_tokens = env::var("OPENAI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(500);

        let plantnet_api_key = key_from_env("PLANTNET_API_KEY", PLANTNET_KEY_PLACEHOLDER);
        let plantnet_base_url = env::var("PLANTNET_BASE_URL")
            .unwrap_or_else(|_| "https://my-api.plantnet.org/v2/identify".to_string());
        let plantnet_project = env::var("PLANTNET_PROJECT")
            .unwrap_or_else(|_| "all".to_string());

        let weather_api_key = key_from_env("WEATHER_API_KEY", WEATHER_KEY_PLACEHOLDER);
        let weather_configured = weather_api_key.is_some();
        let weather_base_url = env::var("WEATHER_BASE_URL")
            .unwrap_or_else(|_| "https://api.openweathermap.org/data/2.5/weather".to_string());

        let places_api_key = key_from_env("GOOGLE_MAPS_API_KEY", PLACES_KEY_PLACEHOLDER);
        let places_configured = places_api_key.is_some();
        let places_base_url = env::var("PLACES_BASE_URL").unwrap_or_else(|_| {
            "https://maps.googleapis.com/maps/api/place/nearbysearch/json".to_string()
        });

        let db_path = env::var("SPROUT_DB_PATH").ok().map(PathBuf::from);

        Self {
            openai_api_key,
            chat_configured,
            chat_base_url,
            chat_model,
            chat_temperature,
            chat_max_tokens,
            plantnet_api_key,
            plantnet_base_url,
            plantnet_project,
            weather_api_key,
            weather_base_url,
            weather_configured,
            places_api_key,
            places_base_url,
            places_configured,
            db_path,
            assistant_name: "Sprout".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_key_counts_as_unconfigured() {
        env::set_var("SPROUT_TEST_KEY_A", OPENAI_KEY_PLACEHOLDER);
        assert_eq!(key_from_env("SPROUT_TEST_KEY_A", OPENAI_KEY_PLACEHOLDER), None);
    }

    #[test]
    fn empty_key_counts_as_unconfigured() {
        env::set_var("SPROUT_TEST_KEY_B", "   ");
        assert_eq!(key_from_env("SPROUT_TEST_KEY_B", OPENAI_KEY_PLACEHOLDER), None);
    }

    #[test]
    fn real_key_is_picked_up() {
        env::set_var("SPROUT_TEST_KEY_C", "sk-real-key");
        assert_eq!(
            key_from_env("SPROUT_TEST_KEY_C", OPENAI_KEY_PLACEHOLDER),
            Some("sk-real-key".to_string())
        );
    }
}
